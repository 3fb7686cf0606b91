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

//! Error types returned by encode and decode operations.
//!
//! Catalog *load* problems (malformed definition data, duplicate codes) are
//! reported as `failure::Error` by [`Definitions::load`] since they indicate a
//! corrupt build-time artifact rather than untrusted input. Everything a codec
//! call can hit at runtime is an [`Error`] here.
//!
//! [`Definitions::load`]: ../definitions/struct.Definitions.html#method.load
//! [`Error`]: enum.Error.html

use failure::Fail;

/// A specialized `Result` type for codec operations.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Errors that can occur while encoding a document to its binary form or
/// decoding a byte stream back.
///
/// The variants fall into four groups:
///
/// - catalog mismatches (`UnknownField`, `UnknownFieldCode`, `UnknownType`,
///   `UnknownName`) — the input refers to something the loaded catalog does
///   not describe;
/// - overflows (`LengthOverflow`, `DigitOverflow`, `ExponentOutOfRange`,
///   `AmountOutOfRange`) — a value exceeds what the wire format can carry;
/// - malformed input (`UnexpectedEof`, `InvalidHex`, `Malformed`,
///   `InvalidAmount`) — a byte stream or scalar literal cannot be parsed;
/// - `TypeMismatch` — a JSON node has the wrong shape for the field's type.
///
/// None of these are retried internally: the codec is deterministic, so an
/// identical input produces an identical error.
#[derive(Debug, Fail)]
pub enum Error {
    /// The input document contains a field name absent from the catalog.
    #[fail(display = "unknown field name: {}", _0)]
    UnknownField(String),

    /// A decoded field header does not resolve to any catalog entry.
    #[fail(
        display = "no field with type code {} and field code {}",
        type_code, field_code
    )]
    UnknownFieldCode {
        /// Type code recovered from the header.
        type_code: i16,
        /// Field code recovered from the header.
        field_code: i16,
    },

    /// A field's declared type has no codec in the registry.
    #[fail(display = "no codec for type {:?} (field {})", type_name, field)]
    UnknownType {
        /// The declared type name.
        type_name: String,
        /// The field whose type could not be dispatched.
        field: String,
    },

    /// A named constant (transaction type, result code, permission) is not
    /// present in the catalog's code tables.
    #[fail(display = "unknown name {:?} for field {}", name, field)]
    UnknownName {
        /// The field being encoded.
        field: String,
        /// The unresolvable name.
        name: String,
    },

    /// Field codes outside `1..=255` cannot be header-encoded.
    #[fail(
        display = "field codes out of header range: type {} field {}",
        type_code, field_code
    )]
    FieldCodeRange {
        /// The out-of-range type code.
        type_code: i16,
        /// The out-of-range field code.
        field_code: i16,
    },

    /// A variable-length value is longer than the largest representable
    /// prefix (918 744 bytes).
    #[fail(display = "value length {} exceeds the maximum encodable length", _0)]
    LengthOverflow(usize),

    /// A decimal has more significant digits than the target mantissa width.
    #[fail(
        display = "{} significant digits do not fit into a {}-digit mantissa",
        digits, width
    )]
    DigitOverflow {
        /// Significant digits in the value.
        digits: usize,
        /// Requested mantissa width.
        width: u32,
    },

    /// A normalized amount exponent falls outside the representable range.
    #[fail(display = "exponent {} is outside the representable range", _0)]
    ExponentOutOfRange(i32),

    /// A native amount exceeds the maximum drop count.
    #[fail(display = "amount out of range: {}", _0)]
    AmountOutOfRange(String),

    /// A scalar cannot be parsed as a decimal amount.
    #[fail(display = "cannot parse {:?} as a decimal amount", _0)]
    InvalidAmount(String),

    /// The byte stream ended before the current value was complete.
    #[fail(
        display = "unexpected end of input at offset {} while reading {}",
        offset, context
    )]
    UnexpectedEof {
        /// Byte offset at which input ran out.
        offset: usize,
        /// The field or structure being decoded.
        context: String,
    },

    /// A string that should contain hexadecimal data does not.
    #[fail(display = "invalid hex in {}", _0)]
    InvalidHex(String),

    /// The byte stream is structurally invalid at the given offset.
    #[fail(display = "malformed input at offset {}: {}", offset, reason)]
    Malformed {
        /// Byte offset of the offending data.
        offset: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// The JSON node's shape does not match the field's type.
    #[fail(display = "type mismatch for {}: expected {}", field, expected)]
    TypeMismatch {
        /// The field being encoded.
        field: String,
        /// What the codec expected to find.
        expected: &'static str,
    },
}

impl Error {
    /// Attaches a field name to errors raised below the field dispatch level.
    ///
    /// Low-level readers do not know which field they are consuming; the
    /// serializer calls this at the per-field boundary so that truncation
    /// errors report both the byte offset and the field context.
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            Error::UnexpectedEof { offset, context } => {
                let context = if context.is_empty() {
                    name.to_owned()
                } else {
                    format!("{} in {}", context, name)
                };
                Error::UnexpectedEof { offset, context }
            }
            Error::InvalidHex(context) => {
                if context.is_empty() {
                    Error::InvalidHex(name.to_owned())
                } else {
                    Error::InvalidHex(context)
                }
            }
            Error::TypeMismatch { field, expected } => {
                if field.is_empty() {
                    Error::TypeMismatch {
                        field: name.to_owned(),
                        expected,
                    }
                } else {
                    Error::TypeMismatch { field, expected }
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reports_offset_and_field() {
        let err = Error::UnexpectedEof {
            offset: 17,
            context: String::new(),
        }
        .in_field("Balance");
        assert_eq!(
            err.to_string(),
            "unexpected end of input at offset 17 while reading Balance"
        );
    }

    #[test]
    fn in_field_keeps_existing_context() {
        let err = Error::UnexpectedEof {
            offset: 3,
            context: "length prefix".to_owned(),
        }
        .in_field("Domain");
        assert_eq!(
            err.to_string(),
            "unexpected end of input at offset 3 while reading length prefix in Domain"
        );
    }
}
