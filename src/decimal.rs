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

//! Decimal-to-mantissa/exponent decomposition backing issued-currency
//! amounts.
//!
//! The wire format stores a fixed-width significant-digit mantissa and a
//! separate biased exponent. The routines here are the canonicalization step
//! guaranteeing that textually different but numerically equal decimals
//! (`1`, `1.0`, `1.00`) produce identical bytes.

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Returns the decimal exponent of `value`: `precision - scale - 1`.
///
/// Zero has exponent `0` by convention (a decimal `0` has precision 1 and
/// scale 0).
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("20.2").unwrap();
/// assert_eq!(exonum_ledger_codec::decimal::exponent(&value), 1);
/// ```
pub fn exponent(value: &Decimal) -> i32 {
    if value.is_zero() {
        return 0;
    }
    let (digits, scale) = unscaled_digits(value, false);
    digits.len() as i32 - scale as i32 - 1
}

/// Computes the fixed-width mantissa of `|value|`.
///
/// Trailing fractional zeros are stripped, the remaining unscaled digit
/// string is right-padded with `'0'` to exactly `width` digits and parsed as
/// an integer. Fails with [`Error::DigitOverflow`] when the value carries
/// more significant digits than `width` allows — it cannot be represented
/// losslessly.
///
/// Not sign-aware; the caller tracks sign separately. `width` must not
/// exceed 19 digits so the result fits a `u64`.
///
/// [`Error::DigitOverflow`]: ../enum.Error.html#variant.DigitOverflow
pub fn normalized_mantissa(value: &Decimal, width: u32) -> Result<u64> {
    debug_assert!(width <= 19, "mantissa width must fit into u64");
    let (mut digits, _) = unscaled_digits(value, true);
    if digits.len() > width as usize {
        return Err(Error::DigitOverflow {
            digits: digits.len(),
            width,
        });
    }
    while digits.len() < width as usize {
        digits.push('0');
    }
    // The width bound above keeps this within u64.
    Ok(digits.parse().expect("digit string is a valid integer"))
}

/// Decomposes `|value|` into its unscaled digit string and scale.
///
/// With `strip_trailing` set, trailing fractional zeros are removed first
/// (`1.100` is treated as `1.1`). The digit string never has leading zeros;
/// zero decomposes to `"0"`.
fn unscaled_digits(value: &Decimal, strip_trailing: bool) -> (String, usize) {
    let rendered = value.abs().to_string();
    let mut parts = rendered.splitn(2, '.');
    let integral = parts.next().unwrap_or("0");
    let mut fractional = parts.next().unwrap_or("").to_owned();
    if strip_trailing {
        while fractional.ends_with('0') {
            fractional.pop();
        }
    }
    let scale = fractional.len();
    let mut digits: String = integral.chars().chain(fractional.chars()).collect();
    while digits.len() > 1 && digits.starts_with('0') {
        digits.remove(0);
    }
    (digits, scale)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn exponent_of_zero_is_zero() {
        assert_eq!(exponent(&dec("0")), 0);
        assert_eq!(exponent(&dec("0.00")), 0);
    }

    #[test]
    fn exponent_of_simple_values() {
        assert_eq!(exponent(&dec("2.2")), 0);
        assert_eq!(exponent(&dec("20.2")), 1);
        assert_eq!(exponent(&dec("0.011")), -2);
        assert_eq!(exponent(&dec("100")), 2);
        assert_eq!(exponent(&dec("-3.5")), 0);
    }

    #[test]
    fn exponent_ignores_trailing_zeros() {
        assert_eq!(exponent(&dec("1")), exponent(&dec("1.0")));
        assert_eq!(exponent(&dec("1")), exponent(&dec("1.00")));
    }

    #[test]
    fn mantissa_pads_to_width() {
        assert_eq!(normalized_mantissa(&dec("1"), 2).unwrap(), 10);
        assert_eq!(normalized_mantissa(&dec("1.1"), 3).unwrap(), 110);
        assert_eq!(
            normalized_mantissa(&dec("1111111111111111.0"), 16).unwrap(),
            1_111_111_111_111_111
        );
    }

    #[test]
    fn mantissa_is_sign_blind() {
        assert_eq!(
            normalized_mantissa(&dec("-1.1"), 3).unwrap(),
            normalized_mantissa(&dec("1.1"), 3).unwrap()
        );
    }

    #[test]
    fn mantissa_overflow_is_an_error() {
        let err = normalized_mantissa(&dec("0.1234"), 3).unwrap_err();
        match err {
            Error::DigitOverflow { digits, width } => {
                assert_eq!(digits, 4);
                assert_eq!(width, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn textually_different_equal_values_normalize_identically() {
        for text in &["1", "1.0", "1.00"] {
            assert_eq!(normalized_mantissa(&dec(text), 16).unwrap(), 10u64.pow(15));
        }
    }
}
