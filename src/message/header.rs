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

//! Implementation of the [`Header`] type.

use super::constants::*;
use super::reader::Error;
use super::{Opcode, Rcode};
use crate::util::read_u16;

/// The fixed 12-octet header of a DNS message.
///
/// The layout is given in [RFC 1035 § 4.1.1]: six unsigned 16-bit
/// fields in network byte order. The FLAGS word is carried opaquely;
/// the accessors below (e.g. [`Header::qr`]) are conveniences for
/// reading and writing its individual bits and leave the others alone.
///
/// The counts are plain data here. When a `Header` is part of a
/// [`Message`](super::Message), they are set from the sections the
/// message actually holds.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Creates a header with the given ID and FLAGS and zeroed counts.
    pub fn new(id: u16, flags: u16) -> Self {
        Self {
            id,
            flags,
            ..Default::default()
        }
    }

    /// Serializes the header. This cannot fail.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut octets = [0; HEADER_SIZE];
        octets[ID_START..ID_END].copy_from_slice(&self.id.to_be_bytes());
        octets[FLAGS_START..FLAGS_END].copy_from_slice(&self.flags.to_be_bytes());
        octets[QDCOUNT_START..QDCOUNT_END].copy_from_slice(&self.qdcount.to_be_bytes());
        octets[ANCOUNT_START..ANCOUNT_END].copy_from_slice(&self.ancount.to_be_bytes());
        octets[NSCOUNT_START..NSCOUNT_END].copy_from_slice(&self.nscount.to_be_bytes());
        octets[ARCOUNT_START..ARCOUNT_END].copy_from_slice(&self.arcount.to_be_bytes());
        octets
    }

    /// Reads a header from the first 12 octets of `octets`. Anything
    /// after the header is ignored.
    pub fn decode(octets: &[u8]) -> Result<Self, Error> {
        if octets.len() < HEADER_SIZE {
            return Err(Error::HeaderTooShort);
        }
        let field = |start: usize| read_u16(&octets[start..]).ok_or(Error::HeaderTooShort);
        Ok(Self {
            id: field(ID_START)?,
            flags: field(FLAGS_START)?,
            qdcount: field(QDCOUNT_START)?,
            ancount: field(ANCOUNT_START)?,
            nscount: field(NSCOUNT_START)?,
            arcount: field(ARCOUNT_START)?,
        })
    }

    /// Returns whether the QR (query response) bit is set.
    pub fn qr(&self) -> bool {
        self.flags & QR_MASK != 0
    }

    /// Sets or clears the QR (query response) bit.
    pub fn set_qr(&mut self, qr: bool) {
        self.set_bit(QR_MASK, qr);
    }

    /// Returns the OPCODE.
    pub fn opcode(&self) -> Opcode {
        Opcode::from(((self.flags & OPCODE_MASK) >> OPCODE_SHIFT) as u8)
    }

    /// Sets the OPCODE.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.flags &= !OPCODE_MASK;
        self.flags |= (u8::from(opcode) as u16) << OPCODE_SHIFT;
    }

    /// Returns whether the AA (authoritative answer) bit is set.
    pub fn aa(&self) -> bool {
        self.flags & AA_MASK != 0
    }

    /// Sets or clears the AA (authoritative answer) bit.
    pub fn set_aa(&mut self, aa: bool) {
        self.set_bit(AA_MASK, aa);
    }

    /// Returns whether the TC (truncation) bit is set.
    pub fn tc(&self) -> bool {
        self.flags & TC_MASK != 0
    }

    /// Sets or clears the TC (truncation) bit.
    pub fn set_tc(&mut self, tc: bool) {
        self.set_bit(TC_MASK, tc);
    }

    /// Returns whether the RD (recursion desired) bit is set.
    pub fn rd(&self) -> bool {
        self.flags & RD_MASK != 0
    }

    /// Sets or clears the RD (recursion desired) bit.
    pub fn set_rd(&mut self, rd: bool) {
        self.set_bit(RD_MASK, rd);
    }

    /// Returns whether the RA (recursion available) bit is set.
    pub fn ra(&self) -> bool {
        self.flags & RA_MASK != 0
    }

    /// Sets or clears the RA (recursion available) bit.
    pub fn set_ra(&mut self, ra: bool) {
        self.set_bit(RA_MASK, ra);
    }

    /// Returns the RCODE.
    pub fn rcode(&self) -> Rcode {
        Rcode::from((self.flags & RCODE_MASK) as u8)
    }

    /// Sets the RCODE.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.flags &= !RCODE_MASK;
        self.flags |= u8::from(rcode) as u16;
    }

    fn set_bit(&mut self, mask: u16, value: bool) {
        if value {
            self.flags |= mask;
        } else {
            self.flags &= !mask;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_works() {
        let header = Header {
            id: 1234,
            flags: 0x8000,
            qdcount: 1,
            ancount: 1,
            nscount: 0,
            arcount: 0,
        };
        assert_eq!(
            header.encode(),
            *b"\x04\xd2\x80\x00\x00\x01\x00\x01\x00\x00\x00\x00"
        );
    }

    #[test]
    fn decode_inverts_encode() {
        for (id, flags) in [(0, 0), (1234, 0x8000), (0xffff, 0xffff), (0x0703, 0x8400)] {
            let header = Header {
                id,
                flags,
                qdcount: 1,
                ancount: 2,
                nscount: 3,
                arcount: 0xfffe,
            };
            let encoded = header.encode();
            assert_eq!(encoded.len(), 12);
            assert_eq!(Header::decode(&encoded), Ok(header));
        }
    }

    #[test]
    fn decode_rejects_short_input() {
        assert_eq!(Header::decode(&[0; 11]), Err(Error::HeaderTooShort));
        assert_eq!(Header::decode(&[]), Err(Error::HeaderTooShort));
    }

    #[test]
    fn flag_accessors_touch_only_their_bits() {
        let mut header = Header::new(0, 0);
        header.set_qr(true);
        assert_eq!(header.flags, 0x8000);
        header.set_opcode(Opcode::Notify);
        header.set_aa(true);
        header.set_rcode(Rcode::NxDomain);
        assert_eq!(header.flags, 0xa403);
        assert!(header.qr());
        assert!(header.aa());
        assert!(!header.tc());
        assert!(!header.rd());
        assert!(!header.ra());
        assert_eq!(header.opcode(), Opcode::Notify);
        assert_eq!(header.rcode(), Rcode::NxDomain);
        header.set_qr(false);
        header.set_rcode(Rcode::NoError);
        assert_eq!(header.flags, 0x2400);
    }
}
