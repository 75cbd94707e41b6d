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

//! The per-datagram processing logic of the endpoint.
//!
//! The [`Server`] structure is the heart of this module; see its
//! documentation for details.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use log::{debug, error};

use crate::class::Class;
use crate::message::{writer, Header, Message, Question};
use crate::name::{self, Name};
use crate::rr::{ResourceRecord, Ttl, Type};

/// The message-processing logic of the endpoint, abstracted from any
/// underlying network I/O provider.
///
/// A `Server` holds one canned response [`Message`]. Every message
/// submitted through [`Server::handle_message`] is answered with it,
/// whatever its content; the received octets are not parsed. An I/O
/// provider is responsible for receiving datagrams from the network and
/// sending back the responses that the `Server` produces.
pub struct Server {
    response: Message,
}

/// Indicates to the caller of [`Server::handle_message`] what kind of
/// response needs to be sent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Response {
    /// A single response is to be sent. The response has been written
    /// into the provided buffer. The length of the response is
    /// included.
    Single(usize),

    /// No response is to be sent.
    None,
}

impl Server {
    /// Creates a new `Server` that answers every message with
    /// `response`.
    pub fn new(response: Message) -> Self {
        Self { response }
    }

    /// Returns the message this `Server` answers with.
    pub fn response(&self) -> &Message {
        &self.response
    }

    /// Handles a received DNS message. This is the API through which
    /// I/O providers submit messages.
    ///
    /// `received_buf` contains the message received from `source`.
    /// `response_buf` is a buffer into which the response is
    /// serialized. If the response does not fit, an error is logged and
    /// [`Response::None`] is returned; no partial response is ever
    /// produced.
    pub fn handle_message(
        &self,
        received_buf: &[u8],
        source: SocketAddr,
        response_buf: &mut [u8],
    ) -> Response {
        debug!(
            "Received {} octets from {}; sending fixed response",
            received_buf.len(),
            source,
        );
        match self.response.serialize_into(response_buf) {
            Ok(len) => Response::Single(len),
            Err(e) => {
                error!("Failed to serialize response to {}: {}", source, e);
                Response::None
            }
        }
    }
}

/// Builds the demonstration response: ID 1234 with only the QR bit set,
/// one question for `codecrafters.io. IN A`, and one answer giving
/// `codecrafters.io. 60 IN A 127.0.0.1`.
pub fn demo_response() -> Result<Message, Error> {
    let name: Name = "codecrafters.io".parse()?;
    let question = Question {
        qname: name.clone(),
        qtype: Type::A.into(),
        qclass: Class::IN.into(),
    };
    let answer = ResourceRecord {
        owner: name,
        rr_type: Type::A,
        class: Class::IN,
        ttl: Ttl::from(60),
        rdata: Ipv4Addr::new(127, 0, 0, 1).into(),
    };
    let message = Message::build(Header::new(1234, 0x8000), vec![question], vec![answer])?;
    Ok(message)
}

/// An error that prevents a response [`Message`] from being built.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    InvalidName(name::Error),
    Write(writer::Error),
}

impl From<name::Error> for Error {
    fn from(error: name::Error) -> Self {
        Self::InvalidName(error)
    }
}

impl From<writer::Error> for Error {
    fn from(error: writer::Error) -> Self {
        Self::Write(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidName(error) => write!(f, "invalid owner name: {error}"),
            Self::Write(error) => write!(f, "failed to assemble the message: {error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidName(error) => Some(error),
            Self::Write(error) => Some(error),
        }
    }
}
