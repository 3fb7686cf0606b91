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

//! Variable-length prefix encoding.
//!
//! Values of variable-length fields are preceded by a 1-, 2- or 3-byte
//! prefix carrying the byte length of the value. The tier is chosen by the
//! length itself; decoders pick the branch from the first byte's range.

use crate::error::{Error, Result};

/// The largest value length a prefix can describe.
pub const MAX_LENGTH: usize = 918_744;

const TIER_ONE_MAX: usize = 192;
const TIER_TWO_MAX: usize = 12_480;

/// Encodes the length prefix for a value of `length` bytes.
///
/// Fails with [`Error::LengthOverflow`] for lengths above [`MAX_LENGTH`]:
/// the protocol defines no larger encoding.
///
/// [`Error::LengthOverflow`]: enum.Error.html#variant.LengthOverflow
/// [`MAX_LENGTH`]: constant.MAX_LENGTH.html
pub fn encode_length(length: usize) -> Result<Vec<u8>> {
    if length <= TIER_ONE_MAX {
        Ok(vec![length as u8])
    } else if length <= TIER_TWO_MAX {
        let rest = length - (TIER_ONE_MAX + 1);
        Ok(vec![193 + (rest >> 8) as u8, (rest & 0xFF) as u8])
    } else if length <= MAX_LENGTH {
        let rest = length - (TIER_TWO_MAX + 1);
        Ok(vec![
            241 + (rest >> 16) as u8,
            ((rest >> 8) & 0xFF) as u8,
            (rest & 0xFF) as u8,
        ])
    } else {
        Err(Error::LengthOverflow(length))
    }
}

/// Decodes a length prefix from the front of `bytes`.
///
/// Returns the described value length and the number of prefix bytes
/// consumed.
pub fn decode_length(bytes: &[u8]) -> Result<(usize, usize)> {
    let first = *bytes.first().ok_or_else(|| Error::UnexpectedEof {
        offset: 0,
        context: "length prefix".to_owned(),
    })? as usize;
    match first {
        0..=192 => Ok((first, 1)),
        193..=240 => {
            let second = prefix_byte(bytes, 1)?;
            Ok((193 + ((first - 193) << 8) + second, 2))
        }
        241..=254 => {
            let second = prefix_byte(bytes, 1)?;
            let third = prefix_byte(bytes, 2)?;
            Ok((12_481 + ((first - 241) << 16) + (second << 8) + third, 3))
        }
        _ => Err(Error::Malformed {
            offset: 0,
            reason: format!("invalid length prefix byte 0x{:02X}", first),
        }),
    }
}

fn prefix_byte(bytes: &[u8], index: usize) -> Result<usize> {
    bytes
        .get(index)
        .map(|byte| *byte as usize)
        .ok_or_else(|| Error::UnexpectedEof {
            offset: index,
            context: "length prefix".to_owned(),
        })
}
