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

//! Crate-private utilities.

/// A wrapper around [`str`] references whose [`PartialEq`] and [`Eq`]
/// implementations are ASCII-case-insensitive.
pub struct Caseless<'a>(pub &'a str);

impl PartialEq for Caseless<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(other.0)
    }
}

impl Eq for Caseless<'_> {}

/// Parses the RFC 3597 generic form of a mnemonic, e.g. `TYPE65280`
/// or `CLASS1`. Returns [`None`] if `text` doesn't start with `prefix`
/// (compared case-insensitively); otherwise, the result of parsing the
/// numeric remainder.
pub fn parse_generic_u16(text: &str, prefix: &str) -> Option<Result<u16, ()>> {
    text.get(0..prefix.len())
        .filter(|start| start.eq_ignore_ascii_case(prefix))
        .map(|_| text[prefix.len()..].parse::<u16>().or(Err(())))
}

////////////////////////////////////////////////////////////////////////
// HELPERS FOR READING MULTI-BYTE INTEGERS                            //
////////////////////////////////////////////////////////////////////////

/// Reads a network-byte-order `u16` from the beginning of `octets`.
/// Returns [`None`] if there are fewer than two octets.
pub fn read_u16(octets: &[u8]) -> Option<u16> {
    let array = octets.get(0..2)?.try_into().ok()?;
    Some(u16::from_be_bytes(array))
}

/// Reads a network-byte-order `u32` from the beginning of `octets`.
/// Returns [`None`] if there are fewer than four octets.
pub fn read_u32(octets: &[u8]) -> Option<u32> {
    let array = octets.get(0..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caseless_ignores_ascii_case() {
        assert!(Caseless("cname") == Caseless("CNAME"));
        assert!(Caseless("A") != Caseless("AAAA"));
    }

    #[test]
    fn parse_generic_u16_works() {
        assert_eq!(parse_generic_u16("TYPE1", "TYPE"), Some(Ok(1)));
        assert_eq!(parse_generic_u16("type65280", "TYPE"), Some(Ok(65280)));
        assert_eq!(parse_generic_u16("TYPE65536", "TYPE"), Some(Err(())));
        assert_eq!(parse_generic_u16("CLASS1", "TYPE"), None);
        assert_eq!(parse_generic_u16("TY", "TYPE"), None);
    }

    #[test]
    fn read_helpers_require_enough_octets() {
        assert_eq!(read_u16(b"\x04\xd2\xff"), Some(1234));
        assert_eq!(read_u16(b"\x04"), None);
        assert_eq!(read_u32(b"\x00\x00\x00\x3c"), Some(60));
        assert_eq!(read_u32(b"\x00\x00\x3c"), None);
    }
}
