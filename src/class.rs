// Copyright 2021 Matthew Ingwersen.
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

//! Implementation of the [`Class`] type for DNS classes.

use std::fmt;
use std::str::FromStr;

use crate::message::Qclass;
use crate::util::{parse_generic_u16, Caseless};

/// Represents a class in the DNS.
///
/// A class is represented on the wire as an unsigned 16-bit integer, so
/// this is a tag wrapping [`u16`], with [`Display`](fmt::Display) and
/// [`FromStr`] implementations and constants for the classes defined
/// in [RFC 1035 § 3.2.4].
///
/// [RFC 1035 § 3.2.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.4
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Class(u16);

impl Class {
    pub const IN: Self = Self(1);
    pub const CS: Self = Self(2);
    pub const CH: Self = Self(3);
    pub const HS: Self = Self(4);
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class(value)
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        class.0
    }
}

impl From<Qclass> for Class {
    fn from(qclass: Qclass) -> Self {
        Self(qclass.into())
    }
}

const MNEMONICS: [(&str, Class); 4] = [
    ("IN", Class::IN),
    ("CS", Class::CS),
    ("CH", Class::CH),
    ("HS", Class::HS),
];

impl FromStr for Class {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mnemonic = MNEMONICS
            .iter()
            .find(|(candidate, _)| Caseless(*candidate) == Caseless(text));
        if let Some(&(_, class)) = mnemonic {
            return Ok(class);
        }
        match parse_generic_u16(text, "CLASS") {
            Some(Ok(value)) => Ok(Self(value)),
            Some(Err(())) => Err("class value is not a valid unsigned 16-bit integer"),
            None => Err("unknown class"),
        }
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::IN => f.write_str("IN"),
            Self::CS => f.write_str("CS"),
            Self::CH => f.write_str("CH"),
            Self::HS => f.write_str("HS"),
            Self(value) => write!(f, "CLASS{value}"), // RFC 3597 § 5
        }
    }
}
