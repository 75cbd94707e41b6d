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

//! Constants related to DNS messages.

pub const HEADER_SIZE: usize = 12;
pub const ID_START: usize = 0;
pub const ID_END: usize = 2;
pub const FLAGS_START: usize = 2;
pub const FLAGS_END: usize = 4;
pub const QDCOUNT_START: usize = 4;
pub const QDCOUNT_END: usize = 6;
pub const ANCOUNT_START: usize = 6;
pub const ANCOUNT_END: usize = 8;
pub const NSCOUNT_START: usize = 8;
pub const NSCOUNT_END: usize = 10;
pub const ARCOUNT_START: usize = 10;
pub const ARCOUNT_END: usize = 12;

// Bits of the 16-bit FLAGS word.
pub const QR_MASK: u16 = 0x8000;
pub const OPCODE_MASK: u16 = 0x7800;
pub const OPCODE_SHIFT: u32 = 11;
pub const AA_MASK: u16 = 0x0400;
pub const TC_MASK: u16 = 0x0200;
pub const RD_MASK: u16 = 0x0100;
pub const RA_MASK: u16 = 0x0080;
pub const RCODE_MASK: u16 = 0x000f;

/// The maximum size of a DNS message over UDP without EDNS
/// ([RFC 1035 § 2.3.4]).
///
/// [RFC 1035 § 2.3.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;
