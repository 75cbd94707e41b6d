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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_WIRE_LEN};

/// Builds the on-the-wire representation of a [`Name`] label by label.
///
/// The wire form is accumulated in a fixed-size buffer long enough for
/// any valid name, so building on the stack needs only one heap
/// allocation when the name is finished. Every operation checks the
/// limits of [RFC 1035 § 2.3.4]: a label over 63 octets or a name over
/// 255 octets is an error, and the builder is left unchanged.
///
/// A new `NameBuilder` holds a single null label. The octet written
/// for the current label's length is kept up to date as octets are
/// pushed, so the buffer is always a valid encoding once the current
/// label is the null label:
///
/// ```
/// use fixedns::name::NameBuilder;
/// let mut builder = NameBuilder::new();
/// builder.try_push_slice(b"codecrafters").unwrap();
/// builder.next_label().unwrap();
/// builder.try_push_slice(b"io").unwrap();
/// builder.next_label().unwrap(); // start the null label
/// let name = builder.finish().unwrap();
/// assert_eq!(name.wire_repr(), b"\x0ccodecrafters\x02io\x00");
/// ```
///
/// [RFC 1035 § 2.3.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    n_labels: usize,
    label_start: usize,
    label_len: u8,
}

impl NameBuilder {
    /// Constructs a new `NameBuilder`, which initially contains a
    /// single null label.
    pub fn new() -> Self {
        let mut wire_repr = ArrayVec::new();
        wire_repr.push(0);
        Self {
            wire_repr,
            n_labels: 1,
            label_start: 0,
            label_len: 0,
        }
    }

    /// Determines whether the name currently stored in the
    /// `NameBuilder` ends with the null label.
    pub fn is_fully_qualified(&self) -> bool {
        self.label_len == 0
    }

    /// Tries to add the given octet to the current label.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        self.try_push_slice(&[octet])
    }

    /// Tries to add the given octets to the current label.
    pub fn try_push_slice(&mut self, octets: &[u8]) -> Result<(), Error> {
        let new_len = self.label_len as usize + octets.len();
        if new_len > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else if octets.len() < self.wire_repr.remaining_capacity()
            && self.wire_repr.try_extend_from_slice(octets).is_ok()
        {
            // One octet always remains free for the null label.
            self.label_len = new_len as u8;
            self.wire_repr[self.label_start] = self.label_len;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Ends the current label and starts a new, initially null label.
    /// This fails if the current label is null, since a null label may
    /// only appear at the end of a name.
    pub fn next_label(&mut self) -> Result<(), Error> {
        if self.label_len == 0 {
            Err(Error::NullNonTerminal)
        } else if self.wire_repr.try_push(0).is_ok() {
            self.label_start = self.wire_repr.len() - 1;
            self.label_len = 0;
            self.n_labels += 1;
            Ok(())
        } else {
            Err(Error::NameTooLong)
        }
    }

    /// Finishes the build. The current label must be the null label.
    pub fn finish(&self) -> Result<Name, Error> {
        if self.is_fully_qualified() {
            Ok(Name {
                wire_repr: self.wire_repr.as_slice().into(),
                n_labels: self.n_labels,
            })
        } else {
            Err(Error::NonNullTerminal)
        }
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}
