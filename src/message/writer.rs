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

//! Implementation of the [`Writer`] type to write on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::*;
use super::{Header, Question};
use crate::rr::ResourceRecord;

////////////////////////////////////////////////////////////////////////
// WRITER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer that serializes a DNS message into it.
///
/// A `Writer` is constructed using [`Writer::new`] (to set a message
/// size limit different from the underlying buffer size) or with its
/// [`TryFrom`] implementation (which sets the limit equal to the buffer
/// length). The buffer and limit must be long enough to accommodate a
/// full DNS message header of 12 octets. The header is initially
/// zeroed.
///
/// The ID and FLAGS are in a fixed position, so they can be written at
/// any time. Questions and answer records are written sequentially at a
/// cursor with [`Writer::add_question`] and [`Writer::add_answer`]; all
/// questions must come before all answers, or [`Error::OutOfOrder`] is
/// returned. Each addition is atomic: on failure, nothing is written
/// and the counts are unchanged.
///
/// QDCOUNT and ANCOUNT are tracked as items are added and only written
/// into the header by [`Writer::finish`], so they always match the
/// sections that were actually serialized. No name compression is
/// performed.
pub struct Writer<'a> {
    octets: &'a mut [u8],
    cursor: usize,
    limit: usize,
    section: Section,
    qdcount: u16,
    ancount: u16,
}

/// A type for recording which section of a DNS message a [`Writer`] is
/// currently serializing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Question,
    Answer,
}

impl<'a> Writer<'a> {
    /// Creates a new `Writer` from the underlying buffer `octets`. The
    /// message size is limited to `limit` or `octets.len()` (whichever
    /// is smaller). If that is too small to hold a full DNS message
    /// header of 12 octets, then this will fail.
    pub fn new(octets: &'a mut [u8], limit: usize) -> Result<Self> {
        let limit = limit.min(octets.len());
        if limit < HEADER_SIZE {
            Err(Error::Truncation)
        } else {
            octets[0..HEADER_SIZE].fill(0);
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
                limit,
                section: Section::Question,
                qdcount: 0,
                ancount: 0,
            })
        }
    }

    /// Returns the 16-bit ID of the message.
    pub fn id(&self) -> u16 {
        u16::from_be_bytes([self.octets[ID_START], self.octets[ID_START + 1]])
    }

    /// Sets the 16-bit ID of the message.
    pub fn set_id(&mut self, id: u16) {
        self.write_u16(ID_START, id);
    }

    /// Returns the 16-bit FLAGS word of the message.
    pub fn flags(&self) -> u16 {
        u16::from_be_bytes([self.octets[FLAGS_START], self.octets[FLAGS_START + 1]])
    }

    /// Sets the 16-bit FLAGS word of the message.
    pub fn set_flags(&mut self, flags: u16) {
        self.write_u16(FLAGS_START, flags);
    }

    /// Writes the ID, FLAGS, NSCOUNT, and ARCOUNT of `header`. QDCOUNT
    /// and ANCOUNT are ignored, since the `Writer` counts those itself.
    pub fn set_header(&mut self, header: &Header) {
        self.set_id(header.id);
        self.set_flags(header.flags);
        self.write_u16(NSCOUNT_START, header.nscount);
        self.write_u16(ARCOUNT_START, header.arcount);
    }

    /// Returns the current number of questions in the message.
    pub fn qdcount(&self) -> u16 {
        self.qdcount
    }

    /// Returns the current number of answer records in the message.
    pub fn ancount(&self) -> u16 {
        self.ancount
    }

    /// Adds a question to the message. This must be used before any
    /// answer records are added.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        if self.section != Section::Question {
            Err(Error::OutOfOrder)
        } else if let Some(new_qdcount) = self.qdcount.checked_add(1) {
            self.with_rollback(|this| {
                this.try_push(question.qname.wire_repr())?;
                this.try_push(&question.fixed_fields())
            })?;
            self.qdcount = new_qdcount;
            Ok(())
        } else {
            Err(Error::CountOverflow)
        }
    }

    /// Adds a resource record to the answer section of the message.
    /// Once an answer has been added, no more questions may be.
    pub fn add_answer(&mut self, rr: &ResourceRecord) -> Result<()> {
        if let Some(new_ancount) = self.ancount.checked_add(1) {
            self.with_rollback(|this| {
                this.section = Section::Answer;
                this.try_push(rr.owner.wire_repr())?;
                this.try_push(&rr.fixed_fields())?;
                this.try_push(rr.rdata.octets())
            })?;
            self.ancount = new_ancount;
            Ok(())
        } else {
            Err(Error::CountOverflow)
        }
    }

    /// Writes the final QDCOUNT and ANCOUNT into the header and returns
    /// the length of the message, consuming the `Writer`.
    pub fn finish(mut self) -> usize {
        self.write_u16(QDCOUNT_START, self.qdcount);
        self.write_u16(ANCOUNT_START, self.ancount);
        self.cursor
    }

    /// Executes `f(self)`, returning the result and rolling back the
    /// section and cursor to the current values first if the result is
    /// an error.
    fn with_rollback<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_section = self.section;
        let saved_cursor = self.cursor;
        let result = f(self);
        if result.is_err() {
            self.section = saved_section;
            self.cursor = saved_cursor;
        }
        result
    }

    /// Tries to write `data` to the underlying buffer at the current
    /// cursor, failing if there is not sufficient space.
    fn try_push(&mut self, data: &[u8]) -> Result<()> {
        if self.limit - self.cursor >= data.len() {
            self.octets[self.cursor..self.cursor + data.len()].copy_from_slice(data);
            self.cursor += data.len();
            Ok(())
        } else {
            Err(Error::Truncation)
        }
    }

    /// Writes `data` in network byte order to the underlying buffer at
    /// `position`. Note that this performs no bounds checking.
    fn write_u16(&mut self, position: usize, data: u16) {
        self.octets[position..position + 2].copy_from_slice(&data.to_be_bytes());
    }
}

impl<'a> TryFrom<&'a mut [u8]> for Writer<'a> {
    type Error = Error;

    fn try_from(octets: &'a mut [u8]) -> Result<Self> {
        let limit = octets.len();
        Self::new(octets, limit)
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a [`Writer`] operation failed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// Adding the question or resource record would overflow the
    /// corresponding 16-bit counter in the DNS header.
    CountOverflow,

    /// There is not enough room left in the buffer.
    Truncation,

    /// A question was added after an answer record had already been
    /// serialized.
    OutOfOrder,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::CountOverflow => f.write_str("section count would overflow"),
            Self::Truncation => f.write_str("message would be truncated"),
            Self::OutOfOrder => f.write_str("question serialized after an answer"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Writer`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use lazy_static::lazy_static;

    use super::*;
    use crate::class::Class;
    use crate::rr::{Ttl, Type};

    lazy_static! {
        static ref QUESTION: Question = Question {
            qname: "fixedns.test.".parse().unwrap(),
            qtype: Type::A.into(),
            qclass: Class::IN.into(),
        };
        static ref ANSWER: ResourceRecord = ResourceRecord {
            owner: "fixedns.test.".parse().unwrap(),
            rr_type: Type::A,
            class: Class::IN,
            ttl: Ttl::from(3600),
            rdata: Ipv4Addr::LOCALHOST.into(),
        };
    }

    #[test]
    fn writer_works() {
        let mut buf = vec![0xff; 512];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.set_id(0x0703);
        writer.set_flags(0x8400);
        writer.add_question(&QUESTION).unwrap();
        writer.add_answer(&ANSWER).unwrap();
        assert_eq!(writer.id(), 0x0703);
        assert_eq!(writer.flags(), 0x8400);
        let len = writer.finish();
        assert_eq!(
            &buf[0..len],
            b"\x07\x03\x84\x00\x00\x01\x00\x01\x00\x00\x00\x00\
              \x07fixedns\x04test\x00\x00\x01\x00\x01\
              \x07fixedns\x04test\x00\x00\x01\x00\x01\x00\x00\x0e\x10\x00\x04\
              \x7f\x00\x00\x01"
        );
    }

    #[test]
    fn writer_rejects_tiny_buffers() {
        let mut buf = [0; 11];
        assert!(matches!(Writer::try_from(buf.as_mut_slice()), Err(Error::Truncation)));
        let mut buf = [0; 512];
        assert!(matches!(Writer::new(&mut buf, 11), Err(Error::Truncation)));
    }

    #[test]
    fn writer_rejects_questions_after_answers() {
        let mut buf = [0; 512];
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        writer.add_answer(&ANSWER).unwrap();
        assert_eq!(writer.add_question(&QUESTION), Err(Error::OutOfOrder));
        assert_eq!(writer.qdcount(), 0);
        assert_eq!(writer.ancount(), 1);
    }

    #[test]
    fn writer_rolls_back_on_truncation() {
        let question_len = QUESTION.wire_len();
        let mut buf = [0; 512];
        let limit = HEADER_SIZE + question_len + ANSWER.wire_len() - 1;
        let mut writer = Writer::new(&mut buf, limit).unwrap();
        writer.add_question(&QUESTION).unwrap();
        assert_eq!(writer.add_answer(&ANSWER), Err(Error::Truncation));
        assert_eq!(writer.ancount(), 0);

        // Since the failed answer was rolled back, questions are still
        // allowed.
        let mut buf = [0; 512];
        let limit = HEADER_SIZE + ANSWER.wire_len() - 1;
        let mut writer = Writer::new(&mut buf, limit).unwrap();
        assert_eq!(writer.add_answer(&ANSWER), Err(Error::Truncation));
        writer.add_question(&QUESTION).unwrap();
        assert_eq!(writer.finish(), HEADER_SIZE + question_len);
    }

    #[test]
    fn writer_detects_qdcount_overflow() {
        let mut buf = vec![0; 2_097_152]; // 2 MiB
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        for _ in 0..u16::MAX {
            writer.add_question(&QUESTION).unwrap();
        }
        assert_eq!(writer.add_question(&QUESTION), Err(Error::CountOverflow));
    }

    #[test]
    fn writer_detects_ancount_overflow() {
        let mut buf = vec![0; 4_194_304]; // 4 MiB
        let mut writer = Writer::try_from(buf.as_mut_slice()).unwrap();
        for _ in 0..u16::MAX {
            writer.add_answer(&ANSWER).unwrap();
        }
        assert_eq!(writer.add_answer(&ANSWER), Err(Error::CountOverflow));
    }
}
