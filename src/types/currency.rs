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

//! Currency codes.
//!
//! A currency occupies 20 bytes on the wire. Three-letter ISO-like codes
//! are expanded into the standard layout (ASCII at bytes 12..15, zeros
//! elsewhere); a 40-character hex code passes through unchanged. The native
//! currency is the all-zero code.

use std::fmt;

use crate::error::{Error, Result};
use crate::sink::ByteSink;

/// Width of a currency code in bytes.
pub const CURRENCY_LENGTH: usize = 20;

const ISO_OFFSET: usize = 12;
const ISO_LENGTH: usize = 3;

/// A 20-byte currency code.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Currency([u8; CURRENCY_LENGTH]);

impl Currency {
    /// The native currency: the all-zero code.
    pub fn native() -> Self {
        Currency([0; CURRENCY_LENGTH])
    }

    /// Wraps raw code bytes.
    pub fn new(bytes: [u8; CURRENCY_LENGTH]) -> Self {
        Currency(bytes)
    }

    /// Copies a slice of exactly [`CURRENCY_LENGTH`] bytes.
    ///
    /// [`CURRENCY_LENGTH`]: constant.CURRENCY_LENGTH.html
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == CURRENCY_LENGTH {
            let mut bytes = [0_u8; CURRENCY_LENGTH];
            bytes.copy_from_slice(slice);
            Some(Currency(bytes))
        } else {
            None
        }
    }

    /// Parses the JSON-side textual form.
    ///
    /// Accepts the native code `"XRP"`, a 3-character ISO-like code, or an
    /// already-expanded 40-character hex code.
    pub fn from_text(text: &str) -> Result<Self> {
        if text == "XRP" {
            return Ok(Self::native());
        }
        if text.len() == ISO_LENGTH && text.chars().all(is_allowed_iso_char) {
            let mut bytes = [0_u8; CURRENCY_LENGTH];
            bytes[ISO_OFFSET..ISO_OFFSET + ISO_LENGTH].copy_from_slice(text.as_bytes());
            return Ok(Currency(bytes));
        }
        if text.len() == 2 * CURRENCY_LENGTH {
            let bytes = hex::decode(text).map_err(|_| Error::InvalidHex(String::new()))?;
            return Ok(Self::from_slice(&bytes).expect("width checked above"));
        }
        Err(Error::TypeMismatch {
            field: String::new(),
            expected: "a 3-character currency code or 40-character hex",
        })
    }

    /// Renders the JSON-side textual form.
    ///
    /// The all-zero code renders as `"XRP"`; a standard-layout code renders
    /// as its 3 characters; anything else falls back to uppercase hex.
    pub fn to_text(&self) -> String {
        if self.is_native() {
            return "XRP".to_owned();
        }
        if self.is_standard() {
            return self.0[ISO_OFFSET..ISO_OFFSET + ISO_LENGTH]
                .iter()
                .map(|byte| *byte as char)
                .collect();
        }
        self.0.iter().map(|byte| format!("{:02X}", byte)).collect()
    }

    /// Returns `true` for the all-zero native code.
    pub fn is_native(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// Returns `true` when the code uses the standard ISO-like layout.
    fn is_standard(&self) -> bool {
        let zeros_around = self.0[..ISO_OFFSET].iter().all(|byte| *byte == 0)
            && self.0[ISO_OFFSET + ISO_LENGTH..].iter().all(|byte| *byte == 0);
        let iso = &self.0[ISO_OFFSET..ISO_OFFSET + ISO_LENGTH];
        zeros_around
            && iso.iter().any(|byte| *byte != 0)
            && iso.iter().all(|byte| is_allowed_iso_char(*byte as char))
    }

    /// Appends the raw code bytes to `sink`.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        sink.extend_from_slice(&self.0);
    }
}

impl AsRef<[u8]> for Currency {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.to_text())
    }
}

fn is_allowed_iso_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "?!@#$%^&*<>(){}[]|".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_code_expands_into_standard_layout() {
        let usd = Currency::from_text("USD").unwrap();
        let mut expected = [0_u8; CURRENCY_LENGTH];
        expected[12..15].copy_from_slice(b"USD");
        assert_eq!(usd.as_ref(), &expected[..]);
        assert_eq!(usd.to_text(), "USD");
    }

    #[test]
    fn native_code_is_all_zero() {
        let native = Currency::from_text("XRP").unwrap();
        assert!(native.is_native());
        assert_eq!(native.to_text(), "XRP");
    }

    #[test]
    fn hex_code_passes_through() {
        let hex = "015841551A748AD2C1F76FF6ECB0CCCD00000000";
        let currency = Currency::from_text(hex).unwrap();
        assert_eq!(currency.to_text(), hex);
    }

    #[test]
    fn nonstandard_bytes_render_as_hex() {
        let mut bytes = [0_u8; CURRENCY_LENGTH];
        bytes[0] = 1;
        bytes[13] = b'A';
        let currency = Currency::new(bytes);
        assert_eq!(currency.to_text().len(), 40);
    }

    #[test]
    fn junk_text_is_rejected() {
        assert!(Currency::from_text("TOOLONG").is_err());
        assert!(Currency::from_text("ab").is_err());
    }
}
