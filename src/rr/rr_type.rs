// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Provides the [`Type`] structure for DNS RR types.

use std::fmt;
use std::str::FromStr;

use crate::message::Qtype;
use crate::util::{parse_generic_u16, Caseless};

////////////////////////////////////////////////////////////////////////
// RR TYPES                                                           //
////////////////////////////////////////////////////////////////////////

/// Represents the RR type of a DNS record.
///
/// An RR type is a closed tag on the wire: an unsigned 16-bit integer.
/// This wraps `u16` and provides the mnemonics of [RFC 1035 § 3.2.2]
/// (plus AAAA) as constants, along with [`Display`](fmt::Display) and
/// [`FromStr`] for their textual forms.
///
/// [RFC 1035 § 3.2.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.2
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Type(u16);

impl Type {
    pub const A: Type = Type(1);
    pub const NS: Type = Type(2);
    pub const MD: Type = Type(3);
    pub const MF: Type = Type(4);
    pub const CNAME: Type = Type(5);
    pub const SOA: Type = Type(6);
    pub const MB: Type = Type(7);
    pub const MG: Type = Type(8);
    pub const MR: Type = Type(9);
    pub const NULL: Type = Type(10);
    pub const WKS: Type = Type(11);
    pub const PTR: Type = Type(12);
    pub const HINFO: Type = Type(13);
    pub const MINFO: Type = Type(14);
    pub const MX: Type = Type(15);
    pub const TXT: Type = Type(16);
    pub const AAAA: Type = Type(28);
}

impl From<u16> for Type {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Type> for u16 {
    fn from(rr_type: Type) -> Self {
        rr_type.0
    }
}

impl From<Qtype> for Type {
    fn from(qtype: Qtype) -> Self {
        Self(qtype.into())
    }
}

const MNEMONICS: [(&str, Type); 17] = [
    ("A", Type::A),
    ("NS", Type::NS),
    ("MD", Type::MD),
    ("MF", Type::MF),
    ("CNAME", Type::CNAME),
    ("SOA", Type::SOA),
    ("MB", Type::MB),
    ("MG", Type::MG),
    ("MR", Type::MR),
    ("NULL", Type::NULL),
    ("WKS", Type::WKS),
    ("PTR", Type::PTR),
    ("HINFO", Type::HINFO),
    ("MINFO", Type::MINFO),
    ("MX", Type::MX),
    ("TXT", Type::TXT),
    ("AAAA", Type::AAAA),
];

impl FromStr for Type {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mnemonic = MNEMONICS
            .iter()
            .find(|(candidate, _)| Caseless(*candidate) == Caseless(text));
        if let Some(&(_, rr_type)) = mnemonic {
            return Ok(rr_type);
        }
        match parse_generic_u16(text, "TYPE") {
            Some(Ok(value)) => Ok(Self(value)),
            Some(Err(())) => Err("type value is not a valid unsigned 16-bit integer"),
            None => Err("unknown type"),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::A => f.write_str("A"),
            Self::NS => f.write_str("NS"),
            Self::MD => f.write_str("MD"),
            Self::MF => f.write_str("MF"),
            Self::CNAME => f.write_str("CNAME"),
            Self::SOA => f.write_str("SOA"),
            Self::MB => f.write_str("MB"),
            Self::MG => f.write_str("MG"),
            Self::MR => f.write_str("MR"),
            Self::NULL => f.write_str("NULL"),
            Self::WKS => f.write_str("WKS"),
            Self::PTR => f.write_str("PTR"),
            Self::HINFO => f.write_str("HINFO"),
            Self::MINFO => f.write_str("MINFO"),
            Self::MX => f.write_str("MX"),
            Self::TXT => f.write_str("TXT"),
            Self::AAAA => f.write_str("AAAA"),
            Self(value) => write!(f, "TYPE{value}"), // RFC 3597 § 5
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1035_types_have_expected_values() {
        assert_eq!(u16::from(Type::A), 1);
        assert_eq!(u16::from(Type::NS), 2);
        assert_eq!(u16::from(Type::CNAME), 5);
        assert_eq!(u16::from(Type::MX), 15);
        assert_eq!(u16::from(Type::TXT), 16);
    }

    #[test]
    fn type_displays_according_to_rfc3597() {
        // TYPE65280 is from the private use range, so it should always
        // be unknown.
        assert_eq!(Type::from(0xff00).to_string(), "TYPE65280");
        assert_eq!(Type::HINFO.to_string(), "HINFO");
    }

    #[test]
    fn type_parses_mnemonics_and_rfc3597_values() {
        let type_a: Type = "TYPE1".parse().unwrap();
        let type_65280: Type = "TYPE65280".parse().unwrap();
        assert_eq!(type_a, Type::A);
        assert_eq!(u16::from(type_65280), 65280);
        assert_eq!("cname".parse::<Type>(), Ok(Type::CNAME));
        assert!("TYPEX".parse::<Type>().is_err());
        assert!("SPF".parse::<Type>().is_err());
    }

    #[test]
    fn type_mnemonics_ignore_ascii_case() {
        for text in ["aaaa", "AaAa", "AAAA"] {
            assert_eq!(text.parse::<Type>(), Ok(Type::AAAA));
        }
        assert_eq!("Mx".parse::<Type>(), Ok(Type::MX));
        assert_eq!("a".parse::<Type>(), Ok(Type::A));
        assert!("a a".parse::<Type>().is_err());
    }
}
