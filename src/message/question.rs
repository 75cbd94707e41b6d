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

//! Implementation of types relating to DNS questions.

use std::fmt;
use std::str::FromStr;

use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;
use crate::util::Caseless;

////////////////////////////////////////////////////////////////////////
// QUESTIONS                                                          //
////////////////////////////////////////////////////////////////////////

/// The length of the QTYPE and QCLASS fields that follow the QNAME.
pub const QUESTION_FIXED_LEN: usize = 4;

/// An entry in the question section of a DNS message.
///
/// The wire format is given in [RFC 1035 § 4.1.2]: the QNAME as an
/// uncompressed sequence of labels, then the 16-bit [QTYPE](Qtype) and
/// [QCLASS](Qclass) in network byte order.
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    pub qname: Name,
    pub qtype: Qtype,
    pub qclass: Qclass,
}

impl Question {
    /// Returns the length of the question on the wire.
    pub fn wire_len(&self) -> usize {
        self.qname.wire_repr().len() + QUESTION_FIXED_LEN
    }

    /// Returns the QTYPE and QCLASS fields in network byte order.
    pub fn fixed_fields(&self) -> [u8; QUESTION_FIXED_LEN] {
        let mut fields = [0; QUESTION_FIXED_LEN];
        fields[0..2].copy_from_slice(&u16::from(self.qtype).to_be_bytes());
        fields[2..4].copy_from_slice(&u16::from(self.qclass).to_be_bytes());
        fields
    }

    /// Serializes the question on its own.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(self.wire_len());
        encoded.extend_from_slice(self.qname.wire_repr());
        encoded.extend_from_slice(&self.fixed_fields());
        encoded
    }
}

////////////////////////////////////////////////////////////////////////
// QTYPES                                                             //
////////////////////////////////////////////////////////////////////////

/// The QTYPE of a DNS [question](Question).
///
/// QTYPE values include the data TYPEs (see [`Type`]) as well as a few
/// values that only make sense in questions, such as [`Qtype::ANY`].
/// On the wire it is an unsigned 16-bit integer, so this wraps [`u16`].
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct Qtype(u16);

impl Qtype {
    pub const AXFR: Self = Self(252);
    pub const MAILB: Self = Self(253);
    pub const MAILA: Self = Self(254);
    pub const ANY: Self = Self(255);
}

impl From<u16> for Qtype {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Qtype> for u16 {
    fn from(qtype: Qtype) -> Self {
        qtype.0
    }
}

impl From<Type> for Qtype {
    fn from(rr_type: Type) -> Self {
        Self(rr_type.into())
    }
}

impl fmt::Display for Qtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::AXFR => f.write_str("AXFR"),
            Self::MAILB => f.write_str("MAILB"),
            Self::MAILA => f.write_str("MAILA"),
            Self::ANY => f.write_str("*"),
            _ => Type::from(*self).fmt(f),
        }
    }
}

impl fmt::Debug for Qtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Qtype {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match Caseless(text) {
            t if t == Caseless("AXFR") => Ok(Self::AXFR),
            t if t == Caseless("MAILB") => Ok(Self::MAILB),
            t if t == Caseless("MAILA") => Ok(Self::MAILA),
            t if t == Caseless("ANY") || t == Caseless("*") => Ok(Self::ANY),
            _ => Type::from_str(text).map(Into::into),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// QCLASSES                                                           //
////////////////////////////////////////////////////////////////////////

/// The QCLASS of a DNS [question](Question).
///
/// Like [`Qtype`], this is a [`u16`] wrapper covering the [`Class`]
/// values plus [`Qclass::ANY`].
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct Qclass(u16);

impl Qclass {
    pub const ANY: Self = Self(255);
}

impl From<u16> for Qclass {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Qclass> for u16 {
    fn from(qclass: Qclass) -> Self {
        qclass.0
    }
}

impl From<Class> for Qclass {
    fn from(class: Class) -> Self {
        Self(class.into())
    }
}

impl fmt::Display for Qclass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::ANY => f.write_str("*"),
            _ => Class::from(*self).fmt(f),
        }
    }
}

impl fmt::Debug for Qclass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Qclass {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match Caseless(text) {
            c if c == Caseless("ANY") || c == Caseless("*") => Ok(Self::ANY),
            _ => Class::from_str(text).map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codecrafters_question() -> Question {
        Question {
            qname: "codecrafters.io".parse().unwrap(),
            qtype: Type::A.into(),
            qclass: Class::IN.into(),
        }
    }

    #[test]
    fn encode_works() {
        assert_eq!(
            codecrafters_question().encode(),
            b"\x0ccodecrafters\x02io\x00\x00\x01\x00\x01"
        );
    }

    #[test]
    fn wire_len_is_name_plus_four() {
        let question = codecrafters_question();
        assert_eq!(question.wire_len(), 17 + 4);
        assert_eq!(question.encode().len(), question.wire_len());

        let root = Question {
            qname: Name::root(),
            qtype: Qtype::ANY,
            qclass: Qclass::ANY,
        };
        assert_eq!(root.encode(), b"\x00\x00\xff\x00\xff");
    }

    #[test]
    fn qtype_and_qclass_parse_and_display() {
        assert_eq!("*".parse::<Qtype>(), Ok(Qtype::ANY));
        assert_eq!("aaaa".parse::<Qtype>(), Ok(Type::AAAA.into()));
        assert_eq!(Qtype::from(0xff00).to_string(), "TYPE65280");
        assert_eq!("ANY".parse::<Qclass>(), Ok(Qclass::ANY));
        assert_eq!(Qclass::from(Class::CH).to_string(), "CH");
        assert!("BOGUS".parse::<Qclass>().is_err());
    }

    #[test]
    fn qtype_and_qclass_mnemonics_ignore_ascii_case() {
        assert_eq!("axfr".parse::<Qtype>(), Ok(Qtype::AXFR));
        assert_eq!("MailB".parse::<Qtype>(), Ok(Qtype::MAILB));
        assert_eq!("any".parse::<Qtype>(), Ok(Qtype::ANY));
        assert_eq!("any".parse::<Qclass>(), Ok(Qclass::ANY));
        assert_eq!("in".parse::<Qclass>(), Ok(Class::IN.into()));
    }
}
