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

//! Implementation of reading and writing of DNS messages.

mod constants;
mod header;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod writer;
pub use constants::{HEADER_SIZE, MAX_UDP_MESSAGE_SIZE};
pub use header::Header;
pub use opcode::Opcode;
pub use question::{Qclass, Qtype, Question, QUESTION_FIXED_LEN};
pub use rcode::Rcode;
pub use reader::Reader;
pub use writer::Writer;

use crate::rr::ResourceRecord;

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// A complete DNS message with question and answer sections.
///
/// A `Message` is assembled with [`Message::build`], which fills in the
/// section counts of the header from the sections provided. The fields
/// are private, so the counts always agree with what
/// [`Message::serialize`] will write. Authority and additional
/// sections are not supported; NSCOUNT and ARCOUNT are always zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    header: Header,
    questions: Vec<Question>,
    answers: Vec<ResourceRecord>,
}

impl Message {
    /// Assembles a message. The ID and FLAGS are taken from `header`;
    /// the counts are set from `questions` and `answers`. This fails
    /// with [`writer::Error::CountOverflow`] if either section has more
    /// than 65,535 entries.
    pub fn build(
        header: Header,
        questions: Vec<Question>,
        answers: Vec<ResourceRecord>,
    ) -> writer::Result<Self> {
        let qdcount: u16 = questions
            .len()
            .try_into()
            .or(Err(writer::Error::CountOverflow))?;
        let ancount: u16 = answers
            .len()
            .try_into()
            .or(Err(writer::Error::CountOverflow))?;
        Ok(Self {
            header: Header {
                qdcount,
                ancount,
                nscount: 0,
                arcount: 0,
                ..header
            },
            questions,
            answers,
        })
    }

    /// Returns the message header, including the section counts.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the question section.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the answer section.
    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    /// Returns the length of the message on the wire: the 12-octet
    /// header plus the lengths of every question and answer.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE
            + self.questions.iter().map(Question::wire_len).sum::<usize>()
            + self.answers.iter().map(ResourceRecord::wire_len).sum::<usize>()
    }

    /// Serializes the message into a newly allocated buffer of exactly
    /// [`Message::wire_len`] octets.
    pub fn serialize(&self) -> writer::Result<Vec<u8>> {
        let mut octets = vec![0; self.wire_len()];
        let len = self.write(&mut octets)?;
        octets.truncate(len);
        Ok(octets)
    }

    /// Serializes the message into the start of `octets`, returning the
    /// number of octets written. If the message does not fit, this
    /// fails with [`writer::Error::Truncation`] and `octets` is left
    /// untouched.
    pub fn serialize_into(&self, octets: &mut [u8]) -> writer::Result<usize> {
        if self.wire_len() > octets.len() {
            Err(writer::Error::Truncation)
        } else {
            self.write(octets)
        }
    }

    /// Reads a message with only question and answer sections. The
    /// whole of `octets` must be consumed.
    pub fn decode(octets: &[u8]) -> reader::Result<Self> {
        let mut reader = Reader::try_from(octets)?;
        let header = reader.header();
        if header.nscount != 0 || header.arcount != 0 {
            return Err(reader::Error::UnsupportedSection);
        }
        let questions = (0..header.qdcount)
            .map(|_| reader.read_question())
            .collect::<reader::Result<Vec<_>>>()?;
        let answers = (0..header.ancount)
            .map(|_| reader.read_rr())
            .collect::<reader::Result<Vec<_>>>()?;
        if !reader.at_eom() {
            return Err(reader::Error::TrailingOctets);
        }
        Ok(Self {
            header,
            questions,
            answers,
        })
    }

    fn write(&self, octets: &mut [u8]) -> writer::Result<usize> {
        let mut writer = Writer::try_from(octets)?;
        writer.set_header(&self.header);
        for question in &self.questions {
            writer.add_question(question)?;
        }
        for answer in &self.answers {
            writer.add_answer(answer)?;
        }
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use lazy_static::lazy_static;

    use super::*;
    use crate::class::Class;
    use crate::name::Name;
    use crate::rr::{Rdata, Ttl, Type};

    lazy_static! {
        static ref CODECRAFTERS_IO: Name = "codecrafters.io".parse().unwrap();
        static ref QUESTION: Question = Question {
            qname: CODECRAFTERS_IO.clone(),
            qtype: Type::A.into(),
            qclass: Class::IN.into(),
        };
        static ref ANSWER: ResourceRecord = ResourceRecord {
            owner: CODECRAFTERS_IO.clone(),
            rr_type: Type::A,
            class: Class::IN,
            ttl: Ttl::from(60),
            rdata: Ipv4Addr::LOCALHOST.into(),
        };
    }

    fn codecrafters_message() -> Message {
        Message::build(
            Header::new(1234, 0x8000),
            vec![QUESTION.clone()],
            vec![ANSWER.clone()],
        )
        .unwrap()
    }

    #[test]
    fn serialize_works() {
        assert_eq!(
            codecrafters_message().serialize().unwrap(),
            b"\x04\xd2\x80\x00\x00\x01\x00\x01\x00\x00\x00\x00\
              \x0ccodecrafters\x02io\x00\x00\x01\x00\x01\
              \x0ccodecrafters\x02io\x00\x00\x01\x00\x01\
              \x00\x00\x00\x3c\x00\x04\x7f\x00\x00\x01"
        );
    }

    #[test]
    fn build_sets_counts_from_sections() {
        let stale = Header {
            id: 7,
            flags: 0x0100,
            qdcount: 9,
            ancount: 9,
            nscount: 9,
            arcount: 9,
        };
        let message = Message::build(stale, vec![QUESTION.clone()], Vec::new()).unwrap();
        assert_eq!(*message.header(), Header { qdcount: 1, ..Header::new(7, 0x0100) });

        let octets = message.serialize().unwrap();
        assert_eq!(&octets[4..12], b"\x00\x01\x00\x00\x00\x00\x00\x00");
    }

    #[test]
    fn length_is_sum_of_parts() {
        let mut big_answer = ANSWER.clone();
        big_answer.owner = "a.longer.owner.name.test.".parse().unwrap();
        big_answer.rdata = Rdata::try_from(vec![0; 100]).unwrap();
        let message = Message::build(
            Header::default(),
            vec![QUESTION.clone(), QUESTION.clone()],
            vec![ANSWER.clone(), big_answer.clone()],
        )
        .unwrap();
        let expected = 12 + 2 * QUESTION.wire_len() + ANSWER.wire_len() + big_answer.wire_len();
        assert_eq!(message.wire_len(), expected);
        assert_eq!(message.serialize().unwrap().len(), expected);

        let empty = Message::build(Header::default(), Vec::new(), Vec::new()).unwrap();
        assert_eq!(empty.serialize().unwrap(), [0; 12]);
    }

    #[test]
    fn serialize_into_refuses_small_buffers() {
        let message = codecrafters_message();
        let mut buf = [0xaa; 64];
        assert_eq!(
            message.serialize_into(&mut buf[..message.wire_len() - 1]),
            Err(writer::Error::Truncation)
        );
        assert!(buf.iter().all(|&octet| octet == 0xaa));

        let len = message.serialize_into(&mut buf).unwrap();
        assert_eq!(&buf[..len], message.serialize().unwrap());
    }

    #[test]
    fn build_rejects_too_many_questions() {
        let questions = vec![QUESTION.clone(); 65_536];
        assert_eq!(
            Message::build(Header::default(), questions, Vec::new()),
            Err(writer::Error::CountOverflow)
        );
    }

    #[test]
    fn decode_inverts_serialize() {
        let message = codecrafters_message();
        let octets = message.serialize().unwrap();
        assert_eq!(Message::decode(&octets), Ok(message));

        let mut with_trailer = octets.clone();
        with_trailer.push(0);
        assert_eq!(Message::decode(&with_trailer), Err(reader::Error::TrailingOctets));

        let mut with_authority = octets;
        with_authority[9] = 1;
        assert_eq!(
            Message::decode(&with_authority),
            Err(reader::Error::UnsupportedSection)
        );
    }
}
