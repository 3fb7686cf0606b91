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

//! Fixed-width unsigned integers.
//!
//! All integers travel big-endian with no prefix. The 8-, 16- and 32-bit
//! widths are plain JSON numbers; the 64-bit width is a 16-character hex
//! string on the JSON side, since not every consumer can hold it in a
//! double.

use byteorder::{BigEndian, ByteOrder};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::parser::BinaryParser;
use crate::sink::ByteSink;

pub(crate) fn write_u8(value: u8, sink: &mut ByteSink) {
    sink.push(value);
}

pub(crate) fn write_u16(value: u16, sink: &mut ByteSink) {
    let mut bytes = [0_u8; 2];
    BigEndian::write_u16(&mut bytes, value);
    sink.extend_from_slice(&bytes);
}

pub(crate) fn write_u32(value: u32, sink: &mut ByteSink) {
    let mut bytes = [0_u8; 4];
    BigEndian::write_u32(&mut bytes, value);
    sink.extend_from_slice(&bytes);
}

pub(crate) fn write_u64(value: u64, sink: &mut ByteSink) {
    let mut bytes = [0_u8; 8];
    BigEndian::write_u64(&mut bytes, value);
    sink.extend_from_slice(&bytes);
}

pub(crate) fn read_u8(parser: &mut BinaryParser<'_>) -> Result<u8> {
    parser.read_u8()
}

pub(crate) fn read_u16(parser: &mut BinaryParser<'_>) -> Result<u16> {
    Ok(BigEndian::read_u16(parser.read_bytes(2)?))
}

pub(crate) fn read_u32(parser: &mut BinaryParser<'_>) -> Result<u32> {
    Ok(BigEndian::read_u32(parser.read_bytes(4)?))
}

pub(crate) fn read_u64(parser: &mut BinaryParser<'_>) -> Result<u64> {
    Ok(BigEndian::read_u64(parser.read_bytes(8)?))
}

/// Extracts a bounded integer from a JSON number.
pub(crate) fn uint_from_json(node: &Value, bits: u32) -> Result<u64> {
    let number = node.as_u64().ok_or(Error::TypeMismatch {
        field: String::new(),
        expected: "an unsigned integer",
    })?;
    let max = if bits == 64 {
        u64::max_value()
    } else {
        (1_u64 << bits) - 1
    };
    if number > max {
        return Err(Error::TypeMismatch {
            field: String::new(),
            expected: "an unsigned integer within the field width",
        });
    }
    Ok(number)
}

/// Extracts a 64-bit integer from its JSON form: a 16-character hex string,
/// or a plain number for convenience.
pub(crate) fn u64_from_json(node: &Value) -> Result<u64> {
    match node {
        Value::String(text) if text.len() == 16 => u64::from_str_radix(text, 16)
            .map_err(|_| Error::InvalidHex(String::new())),
        Value::Number(_) => uint_from_json(node, 64),
        _ => Err(Error::TypeMismatch {
            field: String::new(),
            expected: "a 16-character hex string",
        }),
    }
}

pub(crate) fn u64_to_json(value: u64) -> Value {
    Value::String(format!("{:016X}", value))
}
