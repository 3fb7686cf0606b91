// Copyright 2019 The Exonum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A cursor over a byte stream being decoded.

use crate::definitions::FieldHeader;
use crate::error::{Error, Result};
use crate::length;

/// Reads primitive pieces off the front of a byte slice, tracking the
/// absolute offset for error reporting.
///
/// One parser is created per decode call and is never shared across
/// threads.
#[derive(Debug)]
pub struct BinaryParser<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BinaryParser<'a> {
    /// Creates a parser over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        BinaryParser { bytes, position: 0 }
    }

    /// The absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns `true` once all input has been consumed.
    pub fn is_end(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&self) -> Result<u8> {
        self.bytes
            .get(self.position)
            .copied()
            .ok_or_else(|| self.eof())
    }

    /// Consumes and returns one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Ok(byte)
    }

    /// Consumes and returns exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(self.eof());
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Reads a variable-length prefix and returns the value length it
    /// describes.
    pub fn read_length_prefix(&mut self) -> Result<usize> {
        let (value_length, consumed) =
            length::decode_length(&self.bytes[self.position..]).map_err(|e| self.rebase(e))?;
        self.position += consumed;
        Ok(value_length)
    }

    /// Reads a field header and returns the codes it carries.
    pub fn read_field_header(&mut self) -> Result<FieldHeader> {
        let (header, consumed) =
            FieldHeader::decode(&self.bytes[self.position..]).map_err(|e| self.rebase(e))?;
        self.position += consumed;
        Ok(header)
    }

    fn eof(&self) -> Error {
        Error::UnexpectedEof {
            offset: self.position,
            context: String::new(),
        }
    }

    /// Shifts slice-relative offsets in `error` to absolute stream offsets.
    fn rebase(&self, error: Error) -> Error {
        match error {
            Error::UnexpectedEof { offset, context } => Error::UnexpectedEof {
                offset: offset + self.position,
                context,
            },
            Error::Malformed { offset, reason } => Error::Malformed {
                offset: offset + self.position,
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_the_cursor() {
        let mut parser = BinaryParser::new(&[1, 2, 3, 4]);
        assert_eq!(parser.read_u8().unwrap(), 1);
        assert_eq!(parser.read_bytes(2).unwrap(), &[2, 3]);
        assert_eq!(parser.position(), 3);
        assert_eq!(parser.remaining(), 1);
        assert!(!parser.is_end());
        assert_eq!(parser.read_u8().unwrap(), 4);
        assert!(parser.is_end());
    }

    #[test]
    fn short_read_reports_absolute_offset() {
        let mut parser = BinaryParser::new(&[1, 2]);
        parser.read_u8().unwrap();
        match parser.read_bytes(5) {
            Err(Error::UnexpectedEof { offset, .. }) => assert_eq!(offset, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn peek_does_not_consume() {
        let mut parser = BinaryParser::new(&[9]);
        assert_eq!(parser.peek().unwrap(), 9);
        assert_eq!(parser.read_u8().unwrap(), 9);
    }

    #[test]
    fn length_prefix_offset_is_rebased() {
        // One good byte, then a two-byte prefix cut short.
        let mut parser = BinaryParser::new(&[0, 200]);
        parser.read_u8().unwrap();
        match parser.read_length_prefix() {
            Err(Error::UnexpectedEof { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
