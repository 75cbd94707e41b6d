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

//! A DNS endpoint that answers every datagram with a fixed response.
//!
//! The heart of the crate is the wire-format codec in [`message`],
//! [`name`], and [`rr`]: a [`Message`](message::Message) is assembled
//! from a [`Header`](message::Header), [`Question`](message::Question)s,
//! and [`ResourceRecord`](rr::ResourceRecord)s, and serialized into the
//! on-the-wire format of [RFC 1035 § 4]. The [`server`] and [`io`]
//! modules put that codec behind a UDP socket.
//!
//! [RFC 1035 § 4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4

pub mod class;
pub mod io;
pub mod message;
pub mod name;
pub mod rr;
pub mod server;
pub mod thread;
mod util;
