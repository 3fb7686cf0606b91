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

//! Fixed-width hash values and the 256-bit hash vector.
//!
//! Hashes travel as raw bytes on the wire and as case-insensitive hex on
//! the JSON side; output is always uppercase.

use std::fmt;

use crate::error::{Error, Result};
use crate::sink::ByteSink;

macro_rules! implement_hash {
    ($name:ident, $size:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Width of the hash in bytes.
            pub const SIZE: usize = $size;

            /// Wraps raw bytes.
            pub fn new(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }

            /// Copies a slice of exactly [`Self::SIZE`] bytes.
            pub fn from_slice(slice: &[u8]) -> Option<Self> {
                if slice.len() == $size {
                    let mut bytes = [0_u8; $size];
                    bytes.copy_from_slice(slice);
                    Some($name(bytes))
                } else {
                    None
                }
            }

            /// Parses a hex string of the exact width; case does not matter.
            pub fn from_hex(hex_str: &str) -> Result<Self> {
                let bytes =
                    hex::decode(hex_str).map_err(|_| Error::InvalidHex(String::new()))?;
                Self::from_slice(&bytes).ok_or_else(|| Error::TypeMismatch {
                    field: String::new(),
                    expected: concat!(stringify!($size), "-byte hex string"),
                })
            }

            /// Renders the hash as uppercase hex.
            pub fn to_hex(&self) -> String {
                self.0.iter().map(|byte| format!("{:02X}", byte)).collect()
            }

            /// Appends the raw bytes to `sink`.
            pub fn to_sink(&self, sink: &mut ByteSink) {
                sink.extend_from_slice(&self.0);
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "("))?;
                for byte in self.0.iter().take(4) {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "...)")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

implement_hash! { Hash128, 16, "A 128-bit hash value." }
implement_hash! { Hash160, 20, "A 160-bit hash value." }
implement_hash! { Hash256, 32, "A 256-bit hash value." }

/// A variable-length sequence of 256-bit hashes.
///
/// Serialized as the plain concatenation of its elements; the caller adds
/// the length prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vector256(Vec<Hash256>);

impl Vector256 {
    /// Wraps a list of hashes.
    pub fn new(hashes: Vec<Hash256>) -> Self {
        Vector256(hashes)
    }

    /// The wrapped hashes.
    pub fn hashes(&self) -> &[Hash256] {
        &self.0
    }

    /// Appends all hashes back to back.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        for hash in &self.0 {
            hash.to_sink(sink);
        }
    }

    /// Splits `bytes` into 32-byte hashes.
    ///
    /// The input length must be a multiple of the hash width.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % Hash256::SIZE != 0 {
            return Err(Error::Malformed {
                offset: 0,
                reason: format!("hash vector length {} is not a multiple of 32", bytes.len()),
            });
        }
        let hashes = bytes
            .chunks(Hash256::SIZE)
            .map(|chunk| Hash256::from_slice(chunk).expect("chunk width checked above"))
            .collect();
        Ok(Vector256(hashes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parse_is_case_insensitive() {
        let lower = Hash128::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let upper = Hash128::from_hex("000102030405060708090A0B0C0D0E0F").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_hex(), "000102030405060708090A0B0C0D0E0F");
    }

    #[test]
    fn wrong_width_is_rejected() {
        assert!(Hash256::from_hex("AB").is_err());
        assert!(Hash160::from_slice(&[0; 19]).is_none());
    }

    #[test]
    fn vector_splits_into_hashes() {
        let bytes = vec![7; 64];
        let vector = Vector256::from_slice(&bytes).unwrap();
        assert_eq!(vector.hashes().len(), 2);

        let mut sink = ByteSink::new();
        vector.to_sink(&mut sink);
        assert_eq!(sink.into_bytes(), bytes);
    }

    #[test]
    fn vector_rejects_ragged_input() {
        assert!(Vector256::from_slice(&[0; 33]).is_err());
    }
}
