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

//! Opaque variable-length payloads.

use std::fmt;

use crate::error::{Error, Result};
use crate::sink::ByteSink;

/// A raw variable-length payload, hex on the JSON side.
///
/// Blobs carry signatures, public keys, memo contents and similar opaque
/// data. The caller adds the length prefix.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
    /// Wraps raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }

    /// Parses a hex string; case does not matter. Empty input is an empty
    /// blob.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        hex::decode(hex_str)
            .map(Blob)
            .map_err(|_| Error::InvalidHex(String::new()))
    }

    /// Renders the payload as uppercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02X}", byte)).collect()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for an empty payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the raw payload to `sink`.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        sink.extend_from_slice(&self.0);
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({} bytes)", self.0.len())
    }
}
