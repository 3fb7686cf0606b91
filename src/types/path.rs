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

//! Payment path sets.
//!
//! A path set is a sequence of alternative paths, each a sequence of steps.
//! Every step starts with a type-bitmask byte announcing which of the
//! account / currency / issuer parts follow. `0xFF` separates alternative
//! paths; `0x00` terminates the whole set — there is no length prefix.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::parser::BinaryParser;
use crate::sink::ByteSink;
use crate::types::account::{AccountId, AddressCodec, ACCOUNT_ID_LENGTH};
use crate::types::currency::{Currency, CURRENCY_LENGTH};

const STEP_ACCOUNT: u8 = 0x01;
const STEP_CURRENCY: u8 = 0x10;
const STEP_ISSUER: u8 = 0x20;
const PATH_SEPARATOR: u8 = 0xFF;
const PATH_SET_END: u8 = 0x00;

/// One hop of a payment path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathStep {
    /// Account to ripple through.
    pub account: Option<AccountId>,
    /// Currency to convert into.
    pub currency: Option<Currency>,
    /// Issuer of the new currency.
    pub issuer: Option<AccountId>,
}

impl PathStep {
    fn type_byte(&self) -> u8 {
        let mut byte = 0;
        if self.account.is_some() {
            byte |= STEP_ACCOUNT;
        }
        if self.currency.is_some() {
            byte |= STEP_CURRENCY;
        }
        if self.issuer.is_some() {
            byte |= STEP_ISSUER;
        }
        byte
    }

    fn from_json(node: &Value, addresses: &dyn AddressCodec) -> Result<Self> {
        let members = node.as_object().ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: "a path step object",
        })?;
        let step = PathStep {
            account: member(members, "account")?
                .map(|text| addresses.decode(text))
                .transpose()?,
            currency: member(members, "currency")?
                .map(Currency::from_text)
                .transpose()?,
            issuer: member(members, "issuer")?
                .map(|text| addresses.decode(text))
                .transpose()?,
        };
        if step.type_byte() == 0 {
            return Err(Error::TypeMismatch {
                field: String::new(),
                expected: "a path step with at least one part",
            });
        }
        Ok(step)
    }

    fn to_json(&self, addresses: &dyn AddressCodec) -> Value {
        let mut members = Map::new();
        if let Some(ref account) = self.account {
            members.insert("account".to_owned(), Value::String(addresses.encode(account)));
        }
        if let Some(ref currency) = self.currency {
            members.insert("currency".to_owned(), Value::String(currency.to_text()));
        }
        if let Some(ref issuer) = self.issuer {
            members.insert("issuer".to_owned(), Value::String(addresses.encode(issuer)));
        }
        Value::Object(members)
    }

    fn to_sink(&self, sink: &mut ByteSink) {
        sink.push(self.type_byte());
        if let Some(ref account) = self.account {
            account.to_sink(sink);
        }
        if let Some(ref currency) = self.currency {
            currency.to_sink(sink);
        }
        if let Some(ref issuer) = self.issuer {
            issuer.to_sink(sink);
        }
    }

    fn read(type_byte: u8, parser: &mut BinaryParser<'_>) -> Result<Self> {
        if type_byte & !(STEP_ACCOUNT | STEP_CURRENCY | STEP_ISSUER) != 0 {
            return Err(Error::Malformed {
                offset: parser.position().saturating_sub(1),
                reason: format!("unknown path step type 0x{:02X}", type_byte),
            });
        }
        let mut step = PathStep::default();
        if type_byte & STEP_ACCOUNT != 0 {
            step.account = Some(
                AccountId::from_slice(parser.read_bytes(ACCOUNT_ID_LENGTH)?)
                    .expect("read_bytes returned the requested width"),
            );
        }
        if type_byte & STEP_CURRENCY != 0 {
            step.currency = Some(
                Currency::from_slice(parser.read_bytes(CURRENCY_LENGTH)?)
                    .expect("read_bytes returned the requested width"),
            );
        }
        if type_byte & STEP_ISSUER != 0 {
            step.issuer = Some(
                AccountId::from_slice(parser.read_bytes(ACCOUNT_ID_LENGTH)?)
                    .expect("read_bytes returned the requested width"),
            );
        }
        Ok(step)
    }
}

fn member<'a>(members: &'a Map<String, Value>, key: &'static str) -> Result<Option<&'a str>> {
    match members.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(Error::TypeMismatch {
            field: String::new(),
            expected: key,
        }),
    }
}

/// One alternative path: a non-empty sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path(Vec<PathStep>);

impl Path {
    /// Wraps a list of steps.
    pub fn new(steps: Vec<PathStep>) -> Self {
        Path(steps)
    }

    /// The steps of this path.
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

/// A set of alternative payment paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSet(Vec<Path>);

impl PathSet {
    /// Wraps a list of paths.
    pub fn new(paths: Vec<Path>) -> Self {
        PathSet(paths)
    }

    /// The alternative paths.
    pub fn paths(&self) -> &[Path] {
        &self.0
    }

    /// Parses the JSON form: an array of arrays of step objects.
    pub fn from_json(node: &Value, addresses: &dyn AddressCodec) -> Result<Self> {
        let outer = node.as_array().ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: "an array of paths",
        })?;
        let mut paths = Vec::with_capacity(outer.len());
        for alternative in outer {
            let inner = alternative.as_array().ok_or(Error::TypeMismatch {
                field: String::new(),
                expected: "an array of path steps",
            })?;
            let steps = inner
                .iter()
                .map(|step| PathStep::from_json(step, addresses))
                .collect::<Result<Vec<_>>>()?;
            if steps.is_empty() {
                return Err(Error::TypeMismatch {
                    field: String::new(),
                    expected: "a non-empty path",
                });
            }
            paths.push(Path(steps));
        }
        Ok(PathSet(paths))
    }

    /// Renders the JSON form.
    pub fn to_json(&self, addresses: &dyn AddressCodec) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|path| {
                    Value::Array(
                        path.steps()
                            .iter()
                            .map(|step| step.to_json(addresses))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    /// Appends the canonical bytes, including separators and the
    /// terminator.
    pub fn to_sink(&self, sink: &mut ByteSink) {
        for (index, path) in self.0.iter().enumerate() {
            if index > 0 {
                sink.push(PATH_SEPARATOR);
            }
            for step in path.steps() {
                step.to_sink(sink);
            }
        }
        sink.push(PATH_SET_END);
    }

    /// Reads a path set up to and including its terminator.
    pub fn read(parser: &mut BinaryParser<'_>) -> Result<Self> {
        let mut paths = Vec::new();
        let mut current = Vec::new();
        loop {
            let byte = parser.read_u8()?;
            if byte == PATH_SET_END {
                if !current.is_empty() {
                    paths.push(Path(current));
                }
                break;
            }
            if byte == PATH_SEPARATOR {
                if current.is_empty() {
                    return Err(Error::Malformed {
                        offset: parser.position().saturating_sub(1),
                        reason: "empty path before separator".to_owned(),
                    });
                }
                paths.push(Path(std::mem::replace(&mut current, Vec::new())));
                continue;
            }
            current.push(PathStep::read(byte, parser)?);
        }
        Ok(PathSet(paths))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::account::HexAddressCodec;

    const ALICE: &str = "0101010101010101010101010101010101010101";
    const ISSUER: &str = "5E7B112523F68D2F5E879DB4EAC51C6698A69304";

    fn sample() -> PathSet {
        let node = json!([
            [{ "account": ALICE }],
            [
                { "currency": "USD", "issuer": ISSUER },
                { "account": ALICE }
            ]
        ]);
        PathSet::from_json(&node, &HexAddressCodec).unwrap()
    }

    #[test]
    fn wire_layout_has_separator_and_terminator() {
        let mut sink = ByteSink::new();
        sample().to_sink(&mut sink);
        let bytes = sink.into_bytes();
        // 0x01 + 20, 0xFF, 0x30 + 40, 0x01 + 20, 0x00.
        assert_eq!(bytes.len(), 1 + 20 + 1 + 1 + 40 + 1 + 20 + 1);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[21], 0xFF);
        assert_eq!(bytes[22], 0x30);
        assert_eq!(*bytes.last().unwrap(), 0x00);
    }

    #[test]
    fn round_trip() {
        let set = sample();
        let mut sink = ByteSink::new();
        set.to_sink(&mut sink);
        let bytes = sink.into_bytes();
        let mut parser = BinaryParser::new(&bytes);
        let decoded = PathSet::read(&mut parser).unwrap();
        assert_eq!(decoded, set);
        assert!(parser.is_end());
    }

    #[test]
    fn json_round_trip() {
        let set = sample();
        let json = set.to_json(&HexAddressCodec);
        let reparsed = PathSet::from_json(&json, &HexAddressCodec).unwrap();
        assert_eq!(reparsed, set);
    }

    #[test]
    fn empty_step_is_rejected() {
        let node = json!([[{}]]);
        assert!(PathSet::from_json(&node, &HexAddressCodec).is_err());
    }

    #[test]
    fn unknown_step_type_is_rejected() {
        let bytes = [0x40, 0x00];
        let mut parser = BinaryParser::new(&bytes);
        assert!(PathSet::read(&mut parser).is_err());
    }

    #[test]
    fn truncated_step_reports_eof() {
        let bytes = [0x01, 0xAA];
        let mut parser = BinaryParser::new(&bytes);
        match PathSet::read(&mut parser) {
            Err(Error::UnexpectedEof { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
