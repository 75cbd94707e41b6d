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

//! Implementation of the [`Reader`] type to read on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::*;
use super::question::QUESTION_FIXED_LEN;
use super::{Header, Question};
use crate::name::{self, Name};
use crate::rr::{Rdata, RdataTooLongError, ResourceRecord, RR_FIXED_LEN};
use crate::util;

////////////////////////////////////////////////////////////////////////
// READER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer containing a DNS message that enables
/// reading the message data.
///
/// A `Reader` is constructed using its [`TryFrom`] implementation. The
/// underlying buffer must contain at least a full DNS message header of
/// 12 octets; otherwise the construction will fail.
///
/// The header can be read at any time with [`Reader::header`]. For
/// questions and records, [`Reader::read_question`] and
/// [`Reader::read_rr`] read at a cursor that starts just after the
/// header, so they must be called in the order the items appear in the
/// message. Compressed names are not supported.
#[derive(Debug, Eq, PartialEq)]
pub struct Reader<'a> {
    octets: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Returns the message header.
    pub fn header(&self) -> Header {
        // The constructor guarantees that the header is present.
        Header::decode(self.octets).unwrap_or_default()
    }

    /// Reads a [`Question`] starting at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_question(&mut self) -> Result<Question> {
        let (qname, qname_len) = self.read_name()?;
        let qname_end = self.cursor + qname_len;
        let qtype = read_u16(&self.octets[qname_end..])?.into();
        let qclass = read_u16(&self.octets[qname_end + 2..])?.into();
        self.cursor = qname_end + QUESTION_FIXED_LEN;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }

    /// Reads a resource record at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_rr(&mut self) -> Result<ResourceRecord> {
        let (owner, owner_len) = self.read_name()?;
        let owner_end = self.cursor + owner_len;
        let rr_type = read_u16(&self.octets[owner_end..])?.into();
        let class = read_u16(&self.octets[owner_end + 2..])?.into();
        let ttl = read_u32(&self.octets[owner_end + 4..])?.into();
        let rdlength = read_u16(&self.octets[owner_end + 8..])? as usize;
        let rdata_start = owner_end + RR_FIXED_LEN;
        let rdata_octets = self
            .octets
            .get(rdata_start..rdata_start + rdlength)
            .ok_or(Error::UnexpectedEomInField)?;
        let rdata = Rdata::try_from(rdata_octets)?;
        self.cursor = rdata_start + rdlength;
        Ok(ResourceRecord {
            owner,
            rr_type,
            class,
            ttl,
            rdata,
        })
    }

    /// Returns whether the `Reader`'s cursor has reached the end of the
    /// message.
    pub fn at_eom(&self) -> bool {
        self.cursor >= self.octets.len()
    }

    fn read_name(&self) -> Result<(Name, usize)> {
        Name::try_from_uncompressed(&self.octets[self.cursor..]).map_err(Error::InvalidName)
    }
}

impl<'a> TryFrom<&'a [u8]> for Reader<'a> {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self> {
        if octets.len() >= HEADER_SIZE {
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
            })
        } else {
            Err(Error::HeaderTooShort)
        }
    }
}

fn read_u16(octets: &[u8]) -> Result<u16> {
    util::read_u16(octets).ok_or(Error::UnexpectedEomInField)
}

fn read_u32(octets: &[u8]) -> Result<u32> {
    util::read_u32(octets).ok_or(Error::UnexpectedEomInField)
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a header, [`Question`], or resource record
/// could not be read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    HeaderTooShort,
    UnexpectedEomInField,
    InvalidName(name::Error),
    InvalidRdata(RdataTooLongError),

    /// The message has authority or additional records, which are not
    /// decoded.
    UnsupportedSection,

    /// Octets remain after the sections announced by the header.
    TrailingOctets,
}

impl From<RdataTooLongError> for Error {
    fn from(err: RdataTooLongError) -> Self {
        Self::InvalidRdata(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::HeaderTooShort => f.write_str("header too short"),
            Self::UnexpectedEomInField => f.write_str("unexpected end of message in field"),
            Self::InvalidName(err) => write!(f, "invalid name: {err}"),
            Self::InvalidRdata(err) => err.fmt(f),
            Self::UnsupportedSection => f.write_str("authority or additional section present"),
            Self::TrailingOctets => f.write_str("trailing octets after last section"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Reader`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::super::{Qclass, Qtype};
    use super::*;
    use crate::class::Class;
    use crate::rr::{Ttl, Type};

    /// A response for codecrafters.io. IN A with a single answer.
    const CODECRAFTERS_IO_MESSAGE: &[u8] =
        b"\x04\xd2\x80\x00\x00\x01\x00\x01\x00\x00\x00\x00\
          \x0ccodecrafters\x02io\x00\x00\x01\x00\x01\
          \x0ccodecrafters\x02io\x00\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\
          \x7f\x00\x00\x01";

    #[test]
    fn reader_works() {
        let mut reader = Reader::try_from(CODECRAFTERS_IO_MESSAGE).unwrap();
        let expected_name: Name = "codecrafters.io.".parse().unwrap();

        let header = reader.header();
        assert_eq!(header.id, 1234);
        assert!(header.qr());
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.ancount, 1);

        let question = reader.read_question().unwrap();
        assert_eq!(question.qname, expected_name);
        assert_eq!(question.qtype, Qtype::from(Type::A));
        assert_eq!(question.qclass, Qclass::from(Class::IN));

        let answer = reader.read_rr().unwrap();
        assert_eq!(answer.owner, expected_name);
        assert_eq!(answer.rr_type, Type::A);
        assert_eq!(answer.class, Class::IN);
        assert_eq!(answer.ttl, Ttl::from(60));
        assert_eq!(answer.rdata.octets(), b"\x7f\x00\x00\x01");

        assert!(reader.at_eom());
    }

    #[test]
    fn reader_is_atomic_on_failure() {
        let truncated = &CODECRAFTERS_IO_MESSAGE[..CODECRAFTERS_IO_MESSAGE.len() - 1];
        let mut reader = Reader::try_from(truncated).unwrap();
        reader.read_question().unwrap();
        assert_eq!(reader.read_rr(), Err(Error::UnexpectedEomInField));
        assert_eq!(reader.read_rr(), Err(Error::UnexpectedEomInField));
        assert!(!reader.at_eom());
    }

    #[test]
    fn reader_rejects_compressed_names() {
        let message = b"\x00\x00\x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\xc0\x0c";
        let mut reader = Reader::try_from(&message[..]).unwrap();
        assert_eq!(
            reader.read_question(),
            Err(Error::InvalidName(name::Error::InvalidPointer))
        );
    }

    #[test]
    fn reader_constructor_rejects_short_message() {
        for size in 0..HEADER_SIZE {
            let buf = vec![0; size];
            assert_eq!(Reader::try_from(buf.as_slice()), Err(Error::HeaderTooShort));
        }
    }
}
