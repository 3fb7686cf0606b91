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

//! The binary serializer and deserializer.
//!
//! [`LedgerCodec`] orchestrates a whole encode or decode: it resolves the
//! document's field names against the catalog, sorts the resolved set into
//! canonical order, and for each field emits the compact header followed by
//! the value bytes — length-prefixed if and only if the catalog flags the
//! field variable-length. Decoding walks the byte stream field by field,
//! resolving headers through the catalog's reverse index.
//!
//! Both directions are pure functions of their input given a loaded
//! [`Definitions`]; a codec instance can be shared across threads.
//!
//! [`LedgerCodec`]: struct.LedgerCodec.html
//! [`Definitions`]: ../definitions/struct.Definitions.html

use log::trace;
use serde_json::{Map, Value};

use crate::definitions::{Definitions, Field, FieldHeader, FieldInstance};
use crate::error::{Error, Result};
use crate::length;
use crate::parser::BinaryParser;
use crate::sink::ByteSink;
use crate::types::{
    AccountId, AddressCodec, Amount, Blob, Hash128, Hash160, Hash256, HexAddressCodec,
    LedgerValue, PathSet, StArray, StObject, TypeTag, Vector256,
};

static HEX_ADDRESSES: HexAddressCodec = HexAddressCodec;

/// Encodes documents into the canonical binary form and back.
///
/// # Examples
///
/// ```
/// use exonum_ledger_codec::{Definitions, LedgerCodec};
/// use serde_json::json;
///
/// let codec = LedgerCodec::new(Definitions::default_set());
/// let document = json!({
///     "TransactionType": "Payment",
///     "Sequence": 1,
///     "Fee": "10",
/// });
/// let bytes = codec.serialize(&document).unwrap();
/// assert_eq!(codec.deserialize(&bytes).unwrap(), document);
/// ```
pub struct LedgerCodec<'a> {
    definitions: &'a Definitions,
    addresses: &'a dyn AddressCodec,
}

impl<'a> ::std::fmt::Debug for LedgerCodec<'a> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.debug_struct("LedgerCodec")
            .field("definitions", &self.definitions)
            .finish()
    }
}

impl<'a> LedgerCodec<'a> {
    /// Creates a codec over the given catalog, with hex textual addresses.
    pub fn new(definitions: &'a Definitions) -> Self {
        LedgerCodec {
            definitions,
            addresses: &HEX_ADDRESSES,
        }
    }

    /// Creates a codec with an injected address codec, e.g. a base58
    /// implementation living outside the core.
    pub fn with_address_codec(
        definitions: &'a Definitions,
        addresses: &'a dyn AddressCodec,
    ) -> Self {
        LedgerCodec {
            definitions,
            addresses,
        }
    }

    /// The catalog this codec resolves fields against.
    pub fn definitions(&self) -> &Definitions {
        self.definitions
    }

    /// Serializes every serialized-flagged field of `document`.
    pub fn serialize(&self, document: &Value) -> Result<Vec<u8>> {
        self.serialize_filtered(document, &|_| true)
    }

    /// Serializes the signable subset of `document`: only fields flagged as
    /// signing fields participate. The result is the exact preimage the
    /// signing layer consumes.
    pub fn serialize_signing(&self, document: &Value) -> Result<Vec<u8>> {
        self.serialize_filtered(document, &|field| field.is_signing_field)
    }

    fn serialize_filtered(
        &self,
        document: &Value,
        filter: &dyn Fn(&Field) -> bool,
    ) -> Result<Vec<u8>> {
        let members = document.as_object().ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: "a top-level object",
        })?;
        let mut entries = self.collect_entries(members, filter)?;
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        trace!("serializing {} fields", entries.len());

        let mut sink = ByteSink::new();
        for (instance, value) in &entries {
            self.write_entry(instance, value, &mut sink)?;
        }
        Ok(sink.into_bytes())
    }

    /// Decodes a byte stream into a document.
    ///
    /// The stream must contain whole fields and nothing else; trailing or
    /// truncated bytes fail the call as a whole.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut parser = BinaryParser::new(bytes);
        let entries = self.read_entries(&mut parser, false)?;
        trace!("deserialized {} fields", entries.len());

        let mut members = Map::new();
        for (instance, value) in &entries {
            members.insert(
                instance.field().name.clone(),
                self.value_to_json(instance.field(), value),
            );
        }
        Ok(Value::Object(members))
    }

    /// Resolves document members to field instances and parsed values.
    ///
    /// Fields the catalog does not serialize are skipped; names the catalog
    /// does not know are an error. The result is unsorted.
    pub(crate) fn collect_entries(
        &self,
        members: &Map<String, Value>,
        filter: &dyn Fn(&Field) -> bool,
    ) -> Result<Vec<(FieldInstance, LedgerValue)>> {
        let mut entries = Vec::with_capacity(members.len());
        for (name, node) in members {
            let field = self
                .definitions
                .field(name)
                .ok_or_else(|| Error::UnknownField(name.clone()))?;
            if !field.is_serialized || !filter(field) {
                continue;
            }
            let instance = self
                .definitions
                .instance(name)
                .cloned()
                .ok_or_else(|| Error::FieldCodeRange {
                    type_code: field.type_code,
                    field_code: field.field_code,
                })?;
            let value = self
                .value_from_json(field, node)
                .map_err(|e| e.in_field(name))?;
            entries.push((instance, value));
        }
        Ok(entries)
    }

    /// Writes one field: header, then value bytes, with a length prefix in
    /// between iff the catalog flags the field variable-length.
    pub(crate) fn write_entry(
        &self,
        instance: &FieldInstance,
        value: &LedgerValue,
        sink: &mut ByteSink,
    ) -> Result<()> {
        sink.extend_from_slice(instance.header());
        if instance.field().is_vl_encoded {
            let mut buffer = ByteSink::new();
            self.write_value(value, &mut buffer)?;
            sink.extend_from_slice(&length::encode_length(buffer.len())?);
            sink.concat(&buffer);
        } else {
            self.write_value(value, sink)?;
        }
        Ok(())
    }

    /// Appends a value's canonical bytes, without header or prefix.
    pub(crate) fn write_value(&self, value: &LedgerValue, sink: &mut ByteSink) -> Result<()> {
        use crate::types::uint;
        match value {
            LedgerValue::UInt8(value) => uint::write_u8(*value, sink),
            LedgerValue::UInt16(value) => uint::write_u16(*value, sink),
            LedgerValue::UInt32(value) => uint::write_u32(*value, sink),
            LedgerValue::UInt64(value) => uint::write_u64(*value, sink),
            LedgerValue::Hash128(hash) => hash.to_sink(sink),
            LedgerValue::Hash160(hash) => hash.to_sink(sink),
            LedgerValue::Hash256(hash) => hash.to_sink(sink),
            LedgerValue::AccountId(id) => id.to_sink(sink),
            LedgerValue::Amount(amount) => amount.to_sink(sink),
            LedgerValue::Blob(blob) => blob.to_sink(sink),
            LedgerValue::Vector256(vector) => vector.to_sink(sink),
            LedgerValue::Object(object) => object.to_sink(self, sink)?,
            LedgerValue::Array(array) => array.to_sink(self, sink)?,
            LedgerValue::PathSet(paths) => paths.to_sink(sink),
        }
        Ok(())
    }

    /// Parses a JSON node according to the field's type codec.
    pub(crate) fn value_from_json(&self, field: &Field, node: &Value) -> Result<LedgerValue> {
        use crate::types::uint;
        let tag = field.tag.ok_or_else(|| Error::UnknownType {
            type_name: field.type_name.clone(),
            field: field.name.clone(),
        })?;
        Ok(match tag {
            TypeTag::UInt8 => LedgerValue::UInt8(self.u8_from_json(field, node)?),
            TypeTag::UInt16 => LedgerValue::UInt16(self.u16_from_json(field, node)?),
            TypeTag::UInt32 => LedgerValue::UInt32(self.u32_from_json(field, node)?),
            TypeTag::UInt64 => LedgerValue::UInt64(uint::u64_from_json(node)?),
            TypeTag::Hash128 => LedgerValue::Hash128(Hash128::from_hex(hex_node(node)?)?),
            TypeTag::Hash160 => LedgerValue::Hash160(Hash160::from_hex(hex_node(node)?)?),
            TypeTag::Hash256 => LedgerValue::Hash256(Hash256::from_hex(hex_node(node)?)?),
            TypeTag::AccountId => {
                LedgerValue::AccountId(self.addresses.decode(hex_node(node)?)?)
            }
            TypeTag::Amount => LedgerValue::Amount(Amount::from_json(node, self.addresses)?),
            TypeTag::Blob => LedgerValue::Blob(Blob::from_hex(hex_node(node)?)?),
            TypeTag::Vector256 => {
                let items = node.as_array().ok_or(Error::TypeMismatch {
                    field: String::new(),
                    expected: "an array of 256-bit hashes",
                })?;
                let hashes = items
                    .iter()
                    .map(|item| Hash256::from_hex(hex_node(item)?))
                    .collect::<Result<Vec<_>>>()?;
                LedgerValue::Vector256(Vector256::new(hashes))
            }
            TypeTag::Object => LedgerValue::Object(StObject::from_json(self, node)?),
            TypeTag::Array => LedgerValue::Array(StArray::from_json(self, node)?),
            TypeTag::PathSet => LedgerValue::PathSet(PathSet::from_json(node, self.addresses)?),
        })
    }

    /// Renders a decoded value into its JSON form.
    pub(crate) fn value_to_json(&self, field: &Field, value: &LedgerValue) -> Value {
        use crate::types::uint;
        match value {
            LedgerValue::UInt8(number) => self.u8_to_json(field, *number),
            LedgerValue::UInt16(number) => self.u16_to_json(field, *number),
            LedgerValue::UInt32(number) => self.u32_to_json(field, *number),
            LedgerValue::UInt64(number) => uint::u64_to_json(*number),
            LedgerValue::Hash128(hash) => Value::String(hash.to_hex()),
            LedgerValue::Hash160(hash) => Value::String(hash.to_hex()),
            LedgerValue::Hash256(hash) => Value::String(hash.to_hex()),
            LedgerValue::AccountId(id) => Value::String(self.addresses.encode(id)),
            LedgerValue::Amount(amount) => amount.to_json(self.addresses),
            LedgerValue::Blob(blob) => Value::String(blob.to_hex()),
            LedgerValue::Vector256(vector) => Value::Array(
                vector
                    .hashes()
                    .iter()
                    .map(|hash| Value::String(hash.to_hex()))
                    .collect(),
            ),
            LedgerValue::Object(object) => object.to_json(self),
            LedgerValue::Array(array) => array.to_json(self),
            LedgerValue::PathSet(paths) => paths.to_json(self.addresses),
        }
    }

    /// Reads `(instance, value)` pairs off the stream.
    ///
    /// When `nested`, reading stops at (and consumes) the end-of-object
    /// marker; otherwise it stops at the end of input.
    pub(crate) fn read_entries(
        &self,
        parser: &mut BinaryParser<'_>,
        nested: bool,
    ) -> Result<Vec<(FieldInstance, LedgerValue)>> {
        let mut entries = Vec::new();
        loop {
            if !nested && parser.is_end() {
                break;
            }
            let header = parser.read_field_header()?;
            let instance = self.resolve_header(&header)?;
            if nested && instance == *self.object_end() {
                break;
            }
            let value = self
                .read_field_value(instance.field(), parser)
                .map_err(|e| e.in_field(&instance.field().name))?;
            entries.push((instance, value));
        }
        Ok(entries)
    }

    /// Reads one field's value, honoring the variable-length flag.
    fn read_field_value(&self, field: &Field, parser: &mut BinaryParser<'_>) -> Result<LedgerValue> {
        let tag = field.tag.ok_or_else(|| Error::UnknownType {
            type_name: field.type_name.clone(),
            field: field.name.clone(),
        })?;
        if field.is_vl_encoded {
            let length = parser.read_length_prefix()?;
            let start = parser.position();
            let bytes = parser.read_bytes(length)?;
            return match tag {
                TypeTag::Blob => Ok(LedgerValue::Blob(Blob::new(bytes.to_vec()))),
                TypeTag::AccountId => AccountId::from_slice(bytes)
                    .map(LedgerValue::AccountId)
                    .ok_or_else(|| Error::Malformed {
                        offset: start,
                        reason: format!("account identifier of {} bytes", length),
                    }),
                TypeTag::Vector256 => {
                    Vector256::from_slice(bytes)
                        .map(LedgerValue::Vector256)
                        .map_err(|e| match e {
                            Error::Malformed { reason, .. } => Error::Malformed {
                                offset: start,
                                reason,
                            },
                            other => other,
                        })
                }
                // A catalog may flag any type variable-length; the prefixed
                // bytes must then hold exactly one fixed-width value.
                _ => {
                    let mut sub = BinaryParser::new(bytes);
                    let value = self.read_fixed(tag, &mut sub)?;
                    if !sub.is_end() {
                        return Err(Error::Malformed {
                            offset: start + sub.position(),
                            reason: "length prefix longer than the value".to_owned(),
                        });
                    }
                    Ok(value)
                }
            };
        }
        self.read_fixed(tag, parser)
    }

    /// Reads a value whose extent is fixed by its type or by an internal
    /// terminator.
    fn read_fixed(&self, tag: TypeTag, parser: &mut BinaryParser<'_>) -> Result<LedgerValue> {
        use crate::types::uint;
        Ok(match tag {
            TypeTag::UInt8 => LedgerValue::UInt8(uint::read_u8(parser)?),
            TypeTag::UInt16 => LedgerValue::UInt16(uint::read_u16(parser)?),
            TypeTag::UInt32 => LedgerValue::UInt32(uint::read_u32(parser)?),
            TypeTag::UInt64 => LedgerValue::UInt64(uint::read_u64(parser)?),
            TypeTag::Hash128 => LedgerValue::Hash128(
                Hash128::from_slice(parser.read_bytes(Hash128::SIZE)?)
                    .expect("read_bytes returned the requested width"),
            ),
            TypeTag::Hash160 => LedgerValue::Hash160(
                Hash160::from_slice(parser.read_bytes(Hash160::SIZE)?)
                    .expect("read_bytes returned the requested width"),
            ),
            TypeTag::Hash256 => LedgerValue::Hash256(
                Hash256::from_slice(parser.read_bytes(Hash256::SIZE)?)
                    .expect("read_bytes returned the requested width"),
            ),
            TypeTag::AccountId => LedgerValue::AccountId(
                AccountId::from_slice(parser.read_bytes(crate::types::ACCOUNT_ID_LENGTH)?)
                    .expect("read_bytes returned the requested width"),
            ),
            TypeTag::Amount => LedgerValue::Amount(Amount::read(parser)?),
            TypeTag::Object => LedgerValue::Object(StObject::read(self, parser)?),
            TypeTag::Array => LedgerValue::Array(StArray::read(self, parser)?),
            TypeTag::PathSet => LedgerValue::PathSet(PathSet::read(parser)?),
            TypeTag::Blob | TypeTag::Vector256 => {
                return Err(Error::Malformed {
                    offset: parser.position(),
                    reason: "variable-width value without a length prefix".to_owned(),
                });
            }
        })
    }

    /// Resolves decoded header codes to a field instance.
    pub(crate) fn resolve_header(&self, header: &FieldHeader) -> Result<FieldInstance> {
        let name = self
            .definitions
            .field_name_by_code(header.type_code, header.field_code)
            .ok_or(Error::UnknownFieldCode {
                type_code: header.type_code,
                field_code: header.field_code,
            })?;
        Ok(self
            .definitions
            .instance(name)
            .cloned()
            .expect("decoded header codes are within the header range"))
    }

    /// Resolves an array element's wrapper field.
    pub(crate) fn resolve_wrapper(&self, name: &str) -> Result<FieldInstance> {
        let field = self
            .definitions
            .field(name)
            .ok_or_else(|| Error::UnknownField(name.to_owned()))?;
        if field.tag != Some(TypeTag::Object) {
            return Err(Error::TypeMismatch {
                field: name.to_owned(),
                expected: "an object-typed wrapper field",
            });
        }
        self.definitions
            .instance(name)
            .cloned()
            .ok_or_else(|| Error::FieldCodeRange {
                type_code: field.type_code,
                field_code: field.field_code,
            })
    }

    /// The end-of-object marker instance.
    pub(crate) fn object_end(&self) -> &FieldInstance {
        self.definitions.object_end()
    }

    /// The end-of-array marker instance.
    pub(crate) fn array_end(&self) -> &FieldInstance {
        self.definitions.array_end()
    }

    fn u8_from_json(&self, field: &Field, node: &Value) -> Result<u8> {
        use crate::types::uint;
        if field.name == "TransactionResult" {
            if let Some(name) = node.as_str() {
                let code = self
                    .definitions
                    .transaction_result_code(name)
                    .ok_or_else(|| Error::UnknownName {
                        field: field.name.clone(),
                        name: name.to_owned(),
                    })?;
                if code < 0 || code > 255 {
                    return Err(Error::TypeMismatch {
                        field: field.name.clone(),
                        expected: "a result representable in one byte",
                    });
                }
                return Ok(code as u8);
            }
        }
        Ok(uint::uint_from_json(node, 8)? as u8)
    }

    fn u8_to_json(&self, field: &Field, number: u8) -> Value {
        if field.name == "TransactionResult" {
            if let Some(name) = self.definitions.transaction_result_name(i16::from(number)) {
                return Value::String(name.to_owned());
            }
        }
        Value::Number(number.into())
    }

    fn u16_from_json(&self, field: &Field, node: &Value) -> Result<u16> {
        use crate::types::uint;
        let named = match (field.name.as_str(), node.as_str()) {
            ("TransactionType", Some(name)) => {
                Some((name, self.definitions.transaction_type_code(name)))
            }
            ("LedgerEntryType", Some(name)) => {
                Some((name, self.definitions.ledger_entry_type_code(name)))
            }
            _ => None,
        };
        if let Some((name, code)) = named {
            // The sentinel "invalid" entries carry negative codes and have
            // no wire form.
            let code = code.filter(|code| *code >= 0).ok_or_else(|| {
                Error::UnknownName {
                    field: field.name.clone(),
                    name: name.to_owned(),
                }
            })?;
            return Ok(code as u16);
        }
        Ok(uint::uint_from_json(node, 16)? as u16)
    }

    fn u16_to_json(&self, field: &Field, number: u16) -> Value {
        let name = match field.name.as_str() {
            "TransactionType" => self.definitions.transaction_type_name(number as i16),
            "LedgerEntryType" => self.definitions.ledger_entry_type_name(number as i16),
            _ => None,
        };
        match name {
            Some(name) => Value::String(name.to_owned()),
            None => Value::Number(number.into()),
        }
    }

    fn u32_from_json(&self, field: &Field, node: &Value) -> Result<u32> {
        use crate::types::uint;
        if field.name == "PermissionValue" {
            if let Some(name) = node.as_str() {
                let value = self
                    .definitions
                    .permission_value(name)
                    .ok_or_else(|| Error::UnknownName {
                        field: field.name.clone(),
                        name: name.to_owned(),
                    })?;
                return Ok(value);
            }
        }
        Ok(uint::uint_from_json(node, 32)? as u32)
    }

    fn u32_to_json(&self, field: &Field, number: u32) -> Value {
        if field.name == "PermissionValue" {
            if let Some(name) = self.definitions.permission_name(number) {
                return Value::String(name.to_owned());
            }
        }
        Value::Number(number.into())
    }
}

fn hex_node(node: &Value) -> Result<&str> {
    node.as_str().ok_or(Error::TypeMismatch {
        field: String::new(),
        expected: "a hex string",
    })
}
