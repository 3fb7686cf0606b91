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

//! Account identifiers and the textual-address collaborator seam.

use std::fmt;

use crate::error::{Error, Result};
use crate::sink::ByteSink;

/// Width of an account identifier payload in bytes.
pub const ACCOUNT_ID_LENGTH: usize = 20;

/// The raw 20-byte account identifier payload.
///
/// Address-format validation (version byte, checksum) is the business of an
/// [`AddressCodec`] implementation; the codec core only ever sees the
/// already-validated payload.
///
/// [`AddressCodec`]: trait.AddressCodec.html
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccountId([u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    /// Wraps raw payload bytes.
    pub fn new(bytes: [u8; ACCOUNT_ID_LENGTH]) -> Self {
        AccountId(bytes)
    }

    /// Copies a slice of exactly [`ACCOUNT_ID_LENGTH`] bytes.
    ///
    /// [`ACCOUNT_ID_LENGTH`]: constant.ACCOUNT_ID_LENGTH.html
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == ACCOUNT_ID_LENGTH {
            let mut bytes = [0_u8; ACCOUNT_ID_LENGTH];
            bytes.copy_from_slice(slice);
            Some(AccountId(bytes))
        } else {
            None
        }
    }

    /// Appends the raw payload to `sink`.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        sink.extend_from_slice(&self.0);
    }

    /// Renders the payload as uppercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02X}", byte)).collect()
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(")?;
        for byte in self.0.iter().take(4) {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "...)")
    }
}

/// Conversion between the textual address form and the raw payload.
///
/// The human-readable address encoding (base58, checksums, version bytes)
/// lives outside the codec core. Implement this trait to plug a real address
/// codec into [`LedgerCodec`]; the default [`HexAddressCodec`] keeps the
/// core self-contained.
///
/// [`LedgerCodec`]: ../codec/struct.LedgerCodec.html
/// [`HexAddressCodec`]: struct.HexAddressCodec.html
pub trait AddressCodec {
    /// Decodes a textual address into its payload.
    fn decode(&self, text: &str) -> Result<AccountId>;

    /// Encodes a payload into its textual address.
    fn encode(&self, id: &AccountId) -> String;
}

/// An [`AddressCodec`] that treats addresses as plain 40-character hex.
///
/// [`AddressCodec`]: trait.AddressCodec.html
#[derive(Debug, Clone, Copy, Default)]
pub struct HexAddressCodec;

impl AddressCodec for HexAddressCodec {
    fn decode(&self, text: &str) -> Result<AccountId> {
        let bytes = hex::decode(text).map_err(|_| Error::InvalidHex(String::new()))?;
        AccountId::from_slice(&bytes).ok_or_else(|| Error::TypeMismatch {
            field: String::new(),
            expected: "a 20-byte account identifier",
        })
    }

    fn encode(&self, id: &AccountId) -> String {
        id.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_codec_round_trip() {
        let codec = HexAddressCodec;
        let id = codec
            .decode("5e7b112523f68d2f5e879db4eac51c6698a69304")
            .unwrap();
        assert_eq!(codec.encode(&id), "5E7B112523F68D2F5E879DB4EAC51C6698A69304");
    }

    #[test]
    fn hex_codec_rejects_wrong_width() {
        let codec = HexAddressCodec;
        assert!(codec.decode("abcd").is_err());
        assert!(codec.decode("not hex at all").is_err());
    }

    #[test]
    fn sink_receives_raw_payload() {
        let id = AccountId::new([3; ACCOUNT_ID_LENGTH]);
        let mut sink = ByteSink::new();
        id.to_sink(&mut sink);
        assert_eq!(sink.len(), ACCOUNT_ID_LENGTH);
    }
}
