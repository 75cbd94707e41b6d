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

//! Implementation of the [`ResourceRecord`] type.

use super::{Rdata, Ttl, Type};
use crate::class::Class;
use crate::name::Name;

/// The length of the fixed-size fields that follow the owner of a
/// resource record: TYPE, CLASS, TTL, and RDLENGTH.
pub const RR_FIXED_LEN: usize = 10;

/// A resource record, as it appears in the answer section of a message.
///
/// The wire format is given in [RFC 1035 § 4.1.3]:
///
/// ```text
/// NAME (variable) TYPE (2) CLASS (2) TTL (4) RDLENGTH (2) RDATA
/// ```
///
/// The RDLENGTH is not stored; it is always derived from the
/// [`Rdata`], so it cannot disagree with the RDATA that follows it.
///
/// [RFC 1035 § 4.1.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.3
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ResourceRecord {
    pub owner: Name,
    pub rr_type: Type,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Rdata,
}

impl ResourceRecord {
    /// Returns the length of the record on the wire.
    pub fn wire_len(&self) -> usize {
        self.owner.wire_repr().len() + RR_FIXED_LEN + self.rdata.len()
    }

    /// Returns the TYPE, CLASS, TTL, and RDLENGTH fields in network
    /// byte order.
    pub fn fixed_fields(&self) -> [u8; RR_FIXED_LEN] {
        let mut fields = [0; RR_FIXED_LEN];
        fields[0..2].copy_from_slice(&u16::from(self.rr_type).to_be_bytes());
        fields[2..4].copy_from_slice(&u16::from(self.class).to_be_bytes());
        fields[4..8].copy_from_slice(&self.ttl.to_be_bytes());
        fields[8..10].copy_from_slice(&self.rdata.rdlength().to_be_bytes());
        fields
    }

    /// Serializes the record on its own.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(self.wire_len());
        encoded.extend_from_slice(self.owner.wire_repr());
        encoded.extend_from_slice(&self.fixed_fields());
        encoded.extend_from_slice(self.rdata.octets());
        encoded
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn make_record(owner: &str, rdata: Rdata) -> ResourceRecord {
        ResourceRecord {
            owner: owner.parse().unwrap(),
            rr_type: Type::A,
            class: Class::IN,
            ttl: Ttl::from(60),
            rdata,
        }
    }

    #[test]
    fn encode_works() {
        let record = make_record("codecrafters.io", Ipv4Addr::LOCALHOST.into());
        assert_eq!(
            record.encode(),
            b"\x0ccodecrafters\x02io\x00\
              \x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\
              \x7f\x00\x00\x01"
        );
    }

    #[test]
    fn encoded_length_and_rdlength_agree_with_rdata() {
        for rdata_len in [0, 1, 4, 16, 300] {
            let record = make_record("a.b.test.", vec![0xab; rdata_len].try_into().unwrap());
            let name_len = record.owner.wire_repr().len();
            let encoded = record.encode();
            assert_eq!(encoded.len(), RR_FIXED_LEN + name_len + rdata_len);
            assert_eq!(encoded.len(), record.wire_len());
            let rdlength = u16::from_be_bytes([encoded[name_len + 8], encoded[name_len + 9]]);
            assert_eq!(rdlength as usize, rdata_len);
        }
    }

    #[test]
    fn ttl_is_written_as_four_octets() {
        let mut record = make_record(".", Rdata::empty());
        record.ttl = Ttl::from(0x0102_0304);
        assert_eq!(&record.encode()[5..9], b"\x01\x02\x03\x04");
    }
}
