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

//! An ordered, growable byte buffer that encode operations append into.

use crate::error::{Error, Result};

/// An append-only sequence of bytes with hex conversion helpers.
///
/// A `ByteSink` carries no protocol knowledge; one instance is created per
/// encode operation and discarded once the caller extracts the result.
///
/// # Examples
///
/// ```
/// use exonum_ledger_codec::ByteSink;
///
/// let mut sink = ByteSink::new();
/// sink.push(0x12);
/// sink.extend_from_slice(&[0x00, 0x01]);
/// assert_eq!(sink.to_hex(), "120001");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteSink {
    bytes: Vec<u8>,
}

impl ByteSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink with space for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Appends a single byte.
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Appends all bytes of `slice`.
    pub fn extend_from_slice(&mut self, slice: &[u8]) {
        self.bytes.extend_from_slice(slice);
    }

    /// Appends the contents of another sink.
    pub fn concat(&mut self, other: &ByteSink) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// Decodes a hex string and appends the resulting bytes.
    pub fn push_hex(&mut self, hex: &str) -> Result<()> {
        let decoded = hex::decode(hex).map_err(|_| Error::InvalidHex(String::new()))?;
        self.bytes.extend_from_slice(&decoded);
        Ok(())
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the sink, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Renders the accumulated bytes as an uppercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect()
    }
}

impl AsRef<[u8]> for ByteSink {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ByteSink {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}
