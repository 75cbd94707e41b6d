// Copyright 2021 Matthew Ingwersen.
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

//! Domain names and their label encoding.
//!
//! On the wire, a domain name is a sequence of labels, each written as
//! one length octet followed by the label's octets, and terminated by
//! the null (zero-length) label ([RFC 1035 § 3.1]). [`encode_name`] and
//! [`encode_names`] produce this encoding directly from text; the
//! [`Name`] type holds an already-validated encoding for use in
//! [`Question`](crate::message::Question)s and
//! [`ResourceRecord`](crate::rr::ResourceRecord)s.
//!
//! [RFC 1035 § 3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1

use std::fmt::{self, Write};
use std::iter::FusedIterator;
use std::str::FromStr;

mod builder;
mod error;
pub use builder::NameBuilder;
pub use error::Error;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// LABEL ENCODER                                                      //
////////////////////////////////////////////////////////////////////////

/// Encodes a textual domain name into its on-the-wire form.
///
/// The name is split on `.` and each label is written as a length octet
/// followed by the label's octets, with a single null octet at the end.
/// A trailing dot is optional: `codecrafters.io` and `codecrafters.io.`
/// encode identically. No case folding is performed.
///
/// ```
/// let encoded = fixedns::name::encode_name("codecrafters.io").unwrap();
/// assert_eq!(encoded, b"\x0ccodecrafters\x02io\x00");
/// ```
pub fn encode_name(name: &str) -> Result<Vec<u8>, Error> {
    name.parse::<Name>().map(|name| name.wire_repr().to_vec())
}

/// Encodes several textual domain names one after another. Each name
/// is terminated by its own null label, so the output is the
/// concatenation of [`encode_name`] applied to each name.
pub fn encode_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<u8>, Error> {
    let mut encoded = Vec::new();
    for name in names {
        let name: Name = name.as_ref().parse()?;
        encoded.extend_from_slice(name.wire_repr());
    }
    Ok(encoded)
}

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A domain name, stored in its uncompressed on-the-wire form.
///
/// A `Name` is always valid: every label is at most 63 octets, the
/// whole encoding is at most 255 octets, and the only null label is the
/// last one. `Name`s can be constructed
///
/// * through the [`FromStr`] implementation;
/// * through a [`NameBuilder`]; or
/// * from an uncompressed on-the-wire name through
///   [`Name::try_from_uncompressed`].
///
/// Comparison is octet-for-octet, so it is case-sensitive.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Name {
    wire_repr: Box<[u8]>,
    n_labels: usize,
}

impl Name {
    /// Returns the name of the DNS root.
    pub fn root() -> Self {
        Self {
            wire_repr: vec![0].into_boxed_slice(),
            n_labels: 1,
        }
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.n_labels == 1
    }

    /// Returns an iterator over the labels of this name, including the
    /// terminal null label.
    pub fn labels(&self) -> Labels<'_> {
        Labels {
            remaining: &self.wire_repr,
        }
    }

    /// Returns the number of labels in the name, including the null
    /// label.
    pub fn len(&self) -> usize {
        self.n_labels
    }

    /// Reads an uncompressed name from the start of `octets`. On
    /// success, the name and the number of octets it occupied are
    /// returned. Compression pointers are rejected.
    pub fn try_from_uncompressed(octets: &[u8]) -> Result<(Self, usize), Error> {
        let mut cursor = 0;
        let mut n_labels = 0;
        loop {
            let len = *octets.get(cursor).ok_or(Error::UnexpectedEom)? as usize;
            if len & 0xc0 != 0 {
                return Err(Error::InvalidPointer);
            }
            let next = cursor + 1 + len;
            if next > MAX_WIRE_LEN {
                return Err(Error::NameTooLong);
            } else if next > octets.len() {
                return Err(Error::UnexpectedEom);
            }
            cursor = next;
            n_labels += 1;
            if len == 0 {
                break;
            }
        }
        let name = Self {
            wire_repr: octets[..cursor].into(),
            n_labels,
        };
        Ok((name, cursor))
    }

    /// Returns the on-the-wire representation of the name.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire_repr
    }
}

/// Formats the name in the textual format of [RFC 1035 § 5.1], always
/// fully qualified. Dots and backslashes within labels are escaped with
/// a backslash, and non-printable octets are written as `\DDD`.
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_char('.');
        }
        for label in self.labels().filter(|label| !label.is_empty()) {
            for &octet in label {
                match octet {
                    b'.' | b'\\' => write!(f, "\\{}", octet as char)?,
                    0x21..=0x7e => f.write_char(octet as char)?,
                    _ => write!(f, "\\{octet:03}")?,
                }
            }
            f.write_char('.')?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

////////////////////////////////////////////////////////////////////////
// LABEL ITERATION                                                    //
////////////////////////////////////////////////////////////////////////

/// An iterator over the labels of a [`Name`].
pub struct Labels<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.remaining.split_first()?;
        let (label, rest) = rest.split_at(len as usize);
        self.remaining = rest;
        Some(label)
    }
}

impl FusedIterator for Labels<'_> {}

////////////////////////////////////////////////////////////////////////
// NAME PARSING                                                       //
////////////////////////////////////////////////////////////////////////

/// Parses a domain name in the textual format of [RFC 1035 § 5.1].
/// The name need not end in a dot; it is always treated as fully
/// qualified. The escapes `\DDD` (a decimal octet value) and `\X` (a
/// literal character) are supported. `.` alone is the root.
///
/// [RFC 1035 § 5.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-5.1
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::StrEmpty);
        } else if s == "." {
            return Ok(Name::root());
        }

        let mut remaining_octets = s.as_bytes();
        let mut builder = NameBuilder::new();

        // To check that the string is ASCII, it suffices to check each
        // octet as we go: every multi-byte character starts with a
        // non-ASCII octet.
        while let Some(&octet) = remaining_octets.first() {
            if octet == b'\\' {
                let (value, consumed) = parse_escape(&remaining_octets[1..])?;
                builder.try_push(value)?;
                remaining_octets = &remaining_octets[consumed + 1..];
            } else if octet == b'.' {
                builder.next_label()?;
                remaining_octets = &remaining_octets[1..];
            } else if !octet.is_ascii() {
                return Err(Error::StrNotAscii);
            } else {
                builder.try_push(octet)?;
                remaining_octets = &remaining_octets[1..];
            }
        }

        if !builder.is_fully_qualified() {
            builder.next_label()?;
        }
        builder.finish()
    }
}

/// Parses an escape sequence. We expect `remaining_octets` to start
/// with the octet immediately *after* the backslash that introduces the
/// escape sequence.
fn parse_escape(remaining_octets: &[u8]) -> Result<(u8, usize), Error> {
    match remaining_octets {
        [] => Err(Error::InvalidEscape),
        [first, ..] if first.is_ascii_digit() => {
            let digits = remaining_octets.get(0..3).ok_or(Error::InvalidEscape)?;
            if !digits.iter().all(u8::is_ascii_digit) {
                return Err(Error::InvalidEscape);
            }
            let value = digits
                .iter()
                .fold(0usize, |acc, digit| 10 * acc + (digit - b'0') as usize);
            u8::try_from(value)
                .map(|value| (value, 3))
                .or(Err(Error::InvalidEscape))
        }
        [first, ..] => Ok((*first, 1)),
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks the label-encoding properties: every length prefix equals
    /// the length of the label after it, and exactly one null octet
    /// ends the encoding.
    fn assert_well_formed(encoded: &[u8], expected_labels: &[&[u8]]) {
        let mut cursor = 0;
        for label in expected_labels {
            assert_eq!(encoded[cursor] as usize, label.len());
            assert_eq!(&encoded[cursor + 1..cursor + 1 + label.len()], *label);
            cursor += 1 + label.len();
        }
        assert_eq!(&encoded[cursor..], &[0]);
    }

    #[test]
    fn encode_name_works() {
        let encoded = encode_name("codecrafters.io").unwrap();
        assert_eq!(encoded, b"\x0ccodecrafters\x02io\x00");
        assert_well_formed(&encoded, &[b"codecrafters", b"io"]);
    }

    #[test]
    fn encode_name_treats_trailing_dot_as_optional() {
        assert_eq!(
            encode_name("codecrafters.io.").unwrap(),
            encode_name("codecrafters.io").unwrap(),
        );
    }

    #[test]
    fn encode_name_preserves_case() {
        assert_eq!(encode_name("Example.COM").unwrap(), b"\x07Example\x03COM\x00");
    }

    #[test]
    fn encode_name_accepts_maximum_label_length() {
        let label = "a".repeat(MAX_LABEL_LEN);
        let encoded = encode_name(&format!("{label}.test")).unwrap();
        assert_well_formed(&encoded, &[label.as_bytes(), b"test"]);
    }

    #[test]
    fn encode_name_rejects_long_labels() {
        let label = "a".repeat(MAX_LABEL_LEN + 1);
        assert_eq!(encode_name(&label), Err(Error::LabelTooLong));
    }

    #[test]
    fn encode_name_rejects_long_names() {
        let name = vec!["a".repeat(MAX_LABEL_LEN); 4].join(".");
        assert_eq!(encode_name(&name), Err(Error::NameTooLong));
    }

    #[test]
    fn encode_name_rejects_malformed_text() {
        assert_eq!(encode_name(""), Err(Error::StrEmpty));
        assert_eq!(encode_name("a..b"), Err(Error::NullNonTerminal));
        assert_eq!(encode_name(".io"), Err(Error::NullNonTerminal));
        assert_eq!(encode_name("bücher.de"), Err(Error::StrNotAscii));
        assert_eq!(encode_name("a\\"), Err(Error::InvalidEscape));
        assert_eq!(encode_name("a\\25"), Err(Error::InvalidEscape));
        assert_eq!(encode_name("a\\256"), Err(Error::InvalidEscape));
    }

    #[test]
    fn encode_name_handles_escapes() {
        assert_eq!(encode_name("a\\.b.io").unwrap(), b"\x03a.b\x02io\x00");
        assert_eq!(encode_name("\\000.io").unwrap(), b"\x01\x00\x02io\x00");
    }

    #[test]
    fn encode_names_terminates_each_name() {
        let encoded = encode_names(&["codecrafters.io", "abc.longassdomainname.com"]).unwrap();
        assert_eq!(
            encoded,
            b"\x0ccodecrafters\x02io\x00\
              \x03abc\x11longassdomainname\x03com\x00"
        );
        assert_eq!(encode_names::<&str>(&[]).unwrap(), b"");
    }

    #[test]
    fn encode_names_fails_on_any_bad_name() {
        assert_eq!(
            encode_names(&["codecrafters.io", "a..b"]),
            Err(Error::NullNonTerminal),
        );
    }

    #[test]
    fn root_has_expected_characteristics() {
        let root: Name = ".".parse().unwrap();
        assert!(root.is_root());
        assert_eq!(root, Name::root());
        assert_eq!(root.len(), 1);
        assert_eq!(root.wire_repr(), &[0]);
        assert_eq!(root.to_string(), ".");
    }

    #[test]
    fn labels_iterator_works() {
        let name: Name = "codecrafters.io".parse().unwrap();
        let labels: Vec<&[u8]> = name.labels().collect();
        assert_eq!(labels, vec![&b"codecrafters"[..], b"io", b""]);
        assert_eq!(name.len(), 3);
    }

    #[test]
    fn display_escapes_special_octets() {
        let name: Name = "a\\.b.\\009x.io".parse().unwrap();
        assert_eq!(name.to_string(), "a\\.b.\\009x.io.");
    }

    #[test]
    fn try_from_uncompressed_works() {
        let (name, len) = Name::try_from_uncompressed(b"\x02io\x00\x00\x01").unwrap();
        assert_eq!(len, 4);
        assert_eq!(name, "io.".parse().unwrap());
    }

    #[test]
    fn try_from_uncompressed_rejects_bad_input() {
        assert_eq!(
            Name::try_from_uncompressed(b"\xc0\x0c"),
            Err(Error::InvalidPointer)
        );
        assert_eq!(
            Name::try_from_uncompressed(b"\x02io"),
            Err(Error::UnexpectedEom)
        );
        assert_eq!(
            Name::try_from_uncompressed(b"\x05io\x00"),
            Err(Error::UnexpectedEom)
        );
    }
}
