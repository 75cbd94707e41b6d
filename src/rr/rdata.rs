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

//! Implementation of the [`Rdata`] type.

use std::fmt::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr};

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// The RDATA of a resource record.
///
/// RDATA is opaque to the codec: it is written to the wire verbatim,
/// preceded by its length in the 16-bit RDLENGTH field. An `Rdata` can
/// only be constructed if it has a valid length (at most 65,535
/// octets), so the RDLENGTH of a record is always exactly the length
/// of its RDATA.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Rdata {
    octets: Box<[u8]>,
}

/// The maximum length of RDATA. This is the largest value the RDLENGTH
/// field can express.
pub const MAX_RDATA_LEN: usize = u16::MAX as usize;

impl Rdata {
    /// Returns an empty `Rdata`.
    pub fn empty() -> Self {
        Self {
            octets: Vec::new().into_boxed_slice(),
        }
    }

    /// Returns the octets of this `Rdata`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the value of the RDLENGTH field for this `Rdata`.
    pub fn rdlength(&self) -> u16 {
        // Guaranteed not to truncate by the constructors.
        self.octets.len() as u16
    }

    /// Returns the length of this `Rdata` in octets.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns whether this `Rdata` is empty.
    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }
}

impl TryFrom<&[u8]> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        octets.to_vec().try_into()
    }
}

impl TryFrom<Vec<u8>> for Rdata {
    type Error = RdataTooLongError;

    fn try_from(octets: Vec<u8>) -> Result<Self, Self::Error> {
        if octets.len() > MAX_RDATA_LEN {
            Err(RdataTooLongError)
        } else {
            Ok(Self {
                octets: octets.into_boxed_slice(),
            })
        }
    }
}

/// The RDATA of an IN A record ([RFC 1035 § 3.4.1]).
///
/// [RFC 1035 § 3.4.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.4.1
impl From<Ipv4Addr> for Rdata {
    fn from(address: Ipv4Addr) -> Self {
        Self {
            octets: Box::new(address.octets()),
        }
    }
}

/// The RDATA of an IN AAAA record ([RFC 3596 § 2.2]).
///
/// [RFC 3596 § 2.2]: https://datatracker.ietf.org/doc/html/rfc3596#section-2.2
impl From<Ipv6Addr> for Rdata {
    fn from(address: Ipv6Addr) -> Self {
        Self {
            octets: Box::new(address.octets()),
        }
    }
}

/// Formats the `Rdata` in the generic form of [RFC 3597 § 5].
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Debug for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.octets.len())?;
        if !self.octets.is_empty() {
            f.write_char(' ')?;
            for octet in self.octets.iter() {
                write!(f, "{octet:02x}")?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that RDATA would be longer than RDLENGTH can
/// express.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RdataTooLongError;

impl fmt::Display for RdataTooLongError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("RDATA is longer than 65,535 octets")
    }
}

impl std::error::Error for RdataTooLongError {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
