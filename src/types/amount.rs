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

//! Currency amounts, native and issued.
//!
//! A native amount is a 64-bit big-endian word: the top bit is clear, the
//! second bit is set for non-negative values and the remaining 62 bits hold
//! the drop count. An issued amount packs sign, biased exponent and a
//! 16-digit mantissa into the same word and is followed by a 20-byte
//! currency code and a 20-byte issuer identifier.

use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::decimal;
use crate::error::{Error, Result};
use crate::parser::BinaryParser;
use crate::sink::ByteSink;
use crate::types::account::{AccountId, AddressCodec, ACCOUNT_ID_LENGTH};
use crate::types::currency::{Currency, CURRENCY_LENGTH};

/// The largest representable drop count.
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

/// Significant digits carried by an issued-amount mantissa.
pub const MANTISSA_WIDTH: u32 = 16;

/// Smallest normalized non-zero mantissa.
pub const MIN_MANTISSA: u64 = 1_000_000_000_000_000;

/// Smallest allowed issued-amount exponent.
pub const MIN_EXPONENT: i32 = -96;

/// Largest allowed issued-amount exponent.
pub const MAX_EXPONENT: i32 = 80;

const NOT_NATIVE_BIT: u64 = 0x8000_0000_0000_0000;
const POSITIVE_BIT: u64 = 0x4000_0000_0000_0000;
const MANTISSA_MASK: u64 = (1 << 54) - 1;
const EXPONENT_BIAS: i32 = 97;

/// A currency amount: either a native drop count or an issued balance.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    /// A native amount, in drops.
    Drops(u64),
    /// A balance denominated in an issued currency.
    Issued(IssuedAmount),
}

/// A normalized issued-currency balance.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedAmount {
    /// `0`, or a value in `[10^15, 10^16)`.
    mantissa: u64,
    /// Power of ten the mantissa is scaled by; meaningless when the
    /// mantissa is zero.
    exponent: i32,
    negative: bool,
    currency: Currency,
    issuer: AccountId,
}

impl Amount {
    /// Parses the JSON form: a decimal string of drops, or an object with
    /// `value`, `currency` and `issuer` members.
    pub fn from_json(node: &Value, addresses: &dyn AddressCodec) -> Result<Self> {
        match node {
            Value::String(text) => Ok(Amount::Drops(parse_drops(text)?)),
            Value::Object(members) => Ok(Amount::Issued(IssuedAmount::from_json(
                members, addresses,
            )?)),
            _ => Err(Error::TypeMismatch {
                field: String::new(),
                expected: "a drops string or an issued amount object",
            }),
        }
    }

    /// Appends the canonical bytes, without a length prefix.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        match self {
            Amount::Drops(drops) => {
                let mut word = [0_u8; 8];
                BigEndian::write_u64(&mut word, *drops | POSITIVE_BIT);
                sink.extend_from_slice(&word);
            }
            Amount::Issued(issued) => issued.to_sink(sink),
        }
    }

    /// Reads an amount from the byte stream.
    ///
    /// The top bit of the first word decides whether a currency and issuer
    /// follow.
    pub fn read(parser: &mut BinaryParser<'_>) -> Result<Self> {
        let word = BigEndian::read_u64(parser.read_bytes(8)?);
        if word & NOT_NATIVE_BIT == 0 {
            return Ok(Amount::Drops(word & !(NOT_NATIVE_BIT | POSITIVE_BIT)));
        }
        let mantissa = word & MANTISSA_MASK;
        let exponent = ((word >> 54) & 0xFF) as i32 - EXPONENT_BIAS;
        let negative = word & POSITIVE_BIT == 0;
        let currency = Currency::from_slice(parser.read_bytes(CURRENCY_LENGTH)?)
            .expect("read_bytes returned the requested width");
        let issuer = AccountId::from_slice(parser.read_bytes(ACCOUNT_ID_LENGTH)?)
            .expect("read_bytes returned the requested width");
        if mantissa == 0 {
            return Ok(Amount::Issued(IssuedAmount {
                mantissa: 0,
                exponent: 0,
                negative: false,
                currency,
                issuer,
            }));
        }
        Ok(Amount::Issued(IssuedAmount {
            mantissa,
            exponent,
            negative,
            currency,
            issuer,
        }))
    }

    /// Renders the JSON form.
    pub fn to_json(&self, addresses: &dyn AddressCodec) -> Value {
        match self {
            Amount::Drops(drops) => Value::String(drops.to_string()),
            Amount::Issued(issued) => issued.to_json(addresses),
        }
    }
}

impl IssuedAmount {
    /// Builds a normalized issued amount from its parts.
    pub fn new(value: &str, currency: Currency, issuer: AccountId) -> Result<Self> {
        if currency.is_native() {
            return Err(Error::TypeMismatch {
                field: String::new(),
                expected: "an issued currency other than the native code",
            });
        }
        let (mantissa, exponent, negative) = parse_value(value)?;
        Ok(IssuedAmount {
            mantissa,
            exponent,
            negative,
            currency,
            issuer,
        })
    }

    fn from_json(members: &Map<String, Value>, addresses: &dyn AddressCodec) -> Result<Self> {
        let value = json_str(members, "value")?;
        let currency = Currency::from_text(json_str(members, "currency")?)?;
        let issuer = addresses.decode(json_str(members, "issuer")?)?;
        Self::new(value, currency, issuer)
    }

    fn to_sink(&self, sink: &mut ByteSink) {
        let word = if self.mantissa == 0 {
            // Exact zero: all bits clear except the not-native marker.
            NOT_NATIVE_BIT
        } else {
            let sign = if self.negative { 0 } else { POSITIVE_BIT };
            let stored_exponent = (self.exponent + EXPONENT_BIAS) as u64;
            NOT_NATIVE_BIT | sign | (stored_exponent << 54) | self.mantissa
        };
        let mut bytes = [0_u8; 8];
        BigEndian::write_u64(&mut bytes, word);
        sink.extend_from_slice(&bytes);
        self.currency.to_sink(sink);
        self.issuer.to_sink(sink);
    }

    fn to_json(&self, addresses: &dyn AddressCodec) -> Value {
        let mut members = Map::new();
        members.insert(
            "currency".to_owned(),
            Value::String(self.currency.to_text()),
        );
        members.insert(
            "issuer".to_owned(),
            Value::String(addresses.encode(&self.issuer)),
        );
        members.insert("value".to_owned(), Value::String(self.format_value()));
        Value::Object(members)
    }

    /// Renders the numeric value as the shortest decimal string.
    fn format_value(&self) -> String {
        if self.mantissa == 0 {
            return "0".to_owned();
        }
        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }
        let digits = mantissa.to_string();
        let adjusted = exponent + digits.len() as i32 - 1;

        let unsigned = if exponent >= 0 && adjusted <= 24 {
            let zeros = "0".repeat(exponent as usize);
            format!("{}{}", digits, zeros)
        } else if exponent < 0 && adjusted >= 0 {
            let split = (adjusted + 1) as usize;
            format!("{}.{}", &digits[..split], &digits[split..])
        } else if exponent < 0 && adjusted >= -25 {
            let zeros = "0".repeat((-adjusted - 1) as usize);
            format!("0.{}{}", zeros, digits)
        } else {
            // Magnitudes beyond plain notation; still round-trips through
            // the scientific branch of the parser.
            format!("{}e{}", digits, exponent)
        };
        if self.negative {
            format!("-{}", unsigned)
        } else {
            unsigned
        }
    }
}

fn json_str<'a>(members: &'a Map<String, Value>, key: &'static str) -> Result<&'a str> {
    members
        .get(key)
        .and_then(Value::as_str)
        .ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: key,
        })
}

fn parse_drops(text: &str) -> Result<u64> {
    let drops: u64 = text
        .parse()
        .map_err(|_| Error::InvalidAmount(text.to_owned()))?;
    if drops > MAX_DROPS {
        return Err(Error::AmountOutOfRange(text.to_owned()));
    }
    Ok(drops)
}

/// Decomposes a decimal string into `(mantissa, exponent, negative)`.
///
/// Scientific notation (`"15e4"`) is handled by folding the explicit
/// exponent into the computed one, which keeps very large and very small
/// magnitudes out of the decimal backend.
fn parse_value(text: &str) -> Result<(u64, i32, bool)> {
    let (base, extra_exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(at) => {
            let exponent: i32 = text[at + 1..]
                .parse()
                .map_err(|_| Error::InvalidAmount(text.to_owned()))?;
            (&text[..at], exponent)
        }
        None => (text, 0),
    };
    let value = Decimal::from_str(base).map_err(|_| Error::InvalidAmount(text.to_owned()))?;
    if value.is_zero() {
        return Ok((0, 0, false));
    }
    let mantissa = decimal::normalized_mantissa(&value, MANTISSA_WIDTH)?;
    let exponent = decimal::exponent(&value) - (MANTISSA_WIDTH as i32 - 1) + extra_exponent;
    if exponent < MIN_EXPONENT || exponent > MAX_EXPONENT {
        return Err(Error::ExponentOutOfRange(exponent));
    }
    Ok((mantissa, exponent, value.is_sign_negative()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::account::HexAddressCodec;

    const ISSUER_HEX: &str = "5E7B112523F68D2F5E879DB4EAC51C6698A69304";

    fn issued(value: &str) -> IssuedAmount {
        let currency = Currency::from_text("USD").unwrap();
        let issuer = HexAddressCodec.decode(ISSUER_HEX).unwrap();
        IssuedAmount::new(value, currency, issuer).unwrap()
    }

    fn encoded(amount: &Amount) -> Vec<u8> {
        let mut sink = ByteSink::new();
        amount.to_sink(&mut sink);
        sink.into_bytes()
    }

    #[test]
    fn drops_set_the_positive_bit() {
        let bytes = encoded(&Amount::Drops(1000));
        assert_eq!(
            bytes,
            vec![0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xE8]
        );
    }

    #[test]
    fn drops_above_the_cap_are_rejected() {
        assert!(parse_drops("100000000000000000").is_ok());
        match parse_drops("100000000000000001") {
            Err(Error::AmountOutOfRange(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn drops_reject_fractions_and_signs() {
        assert!(parse_drops("1.5").is_err());
        assert!(parse_drops("-3").is_err());
    }

    #[test]
    fn issued_hundred_usd_is_the_known_word() {
        let bytes = encoded(&Amount::Issued(issued("100")));
        assert_eq!(
            &bytes[..8],
            &[0xD5, 0x03, 0x8D, 0x7E, 0xA4, 0xC6, 0x80, 0x00]
        );
        // 12 zero bytes, "USD", 5 zero bytes.
        assert_eq!(&bytes[8 + 12..8 + 15], b"USD");
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn negative_issued_amount_clears_the_sign_bit() {
        let bytes = encoded(&Amount::Issued(issued("-100")));
        assert_eq!(bytes[0], 0x95);
    }

    #[test]
    fn issued_zero_is_the_bare_marker_word() {
        let bytes = encoded(&Amount::Issued(issued("0")));
        assert_eq!(
            &bytes[..8],
            &[0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn equal_decimals_encode_identically() {
        assert_eq!(
            encoded(&Amount::Issued(issued("1"))),
            encoded(&Amount::Issued(issued("1.00")))
        );
    }

    #[test]
    fn issued_round_trip() {
        for value in &["100", "-100", "0", "0.011", "1234.5678", "1e80", "1e-81"] {
            let amount = Amount::Issued(issued(value));
            let bytes = encoded(&amount);
            let mut parser = BinaryParser::new(&bytes);
            let decoded = Amount::read(&mut parser).unwrap();
            assert_eq!(decoded, amount, "value {}", value);
            assert!(parser.is_end());
        }
    }

    #[test]
    fn drops_round_trip() {
        let amount = Amount::Drops(123_456_789);
        let bytes = encoded(&amount);
        let mut parser = BinaryParser::new(&bytes);
        assert_eq!(Amount::read(&mut parser).unwrap(), amount);
    }

    #[test]
    fn exponent_out_of_range_is_rejected() {
        let currency = Currency::from_text("USD").unwrap();
        let issuer = HexAddressCodec.decode(ISSUER_HEX).unwrap();
        match IssuedAmount::new("1e81", currency, issuer) {
            Err(Error::ExponentOutOfRange(exponent)) => assert_eq!(exponent, 81),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn too_many_digits_are_rejected() {
        let currency = Currency::from_text("USD").unwrap();
        let issuer = HexAddressCodec.decode(ISSUER_HEX).unwrap();
        assert!(IssuedAmount::new("1.23456789012345678", currency, issuer).is_err());
    }

    #[test]
    fn json_value_formatting() {
        let codec = HexAddressCodec;
        for (input, expected) in &[
            ("100", "100"),
            ("-100", "-100"),
            ("0", "0"),
            ("0.011", "0.011"),
            ("1234.5678", "1234.5678"),
        ] {
            let json = Amount::Issued(issued(input)).to_json(&codec);
            assert_eq!(json["value"], Value::String((*expected).to_owned()));
        }
    }

    #[test]
    fn native_currency_cannot_be_issued() {
        let issuer = HexAddressCodec.decode(ISSUER_HEX).unwrap();
        assert!(IssuedAmount::new("1", Currency::native(), issuer).is_err());
    }
}
