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

//! Nested serialized arrays.

use serde_json::{Map, Value};

use crate::codec::LedgerCodec;
use crate::definitions::FieldInstance;
use crate::error::{Error, Result};
use crate::parser::BinaryParser;
use crate::sink::ByteSink;
use crate::types::{StObject, TypeTag};

/// An ordered sequence of wrapped nested objects, terminated by the
/// reserved end-of-array marker field.
///
/// Unlike object fields, array elements keep their document order — the
/// canonical sort applies within each element, not across them.
#[derive(Debug, Clone, PartialEq)]
pub struct StArray {
    elements: Vec<(FieldInstance, StObject)>,
}

impl StArray {
    /// The wrapped elements, in document order.
    pub fn elements(&self) -> &[(FieldInstance, StObject)] {
        &self.elements
    }

    /// Parses a JSON array node.
    ///
    /// Every element must be an object with exactly one member whose name
    /// resolves to an object-typed field; the member value is the wrapped
    /// sub-document.
    pub(crate) fn from_json(codec: &LedgerCodec<'_>, node: &Value) -> Result<Self> {
        let items = node.as_array().ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: "an array of wrapped objects",
        })?;
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let (name, inner) = single_member(item)?;
            let instance = codec.resolve_wrapper(name)?;
            let object = StObject::from_json(codec, inner)
                .map_err(|e| e.in_field(name))?;
            elements.push((instance, object));
        }
        Ok(StArray { elements })
    }

    /// Appends every element (wrapper header, object contents, object end
    /// marker), then the end-of-array marker.
    pub(crate) fn to_sink(&self, codec: &LedgerCodec<'_>, sink: &mut ByteSink) -> Result<()> {
        for (instance, object) in &self.elements {
            sink.extend_from_slice(instance.header());
            object.to_sink(codec, sink)?;
        }
        sink.extend_from_slice(codec.array_end().header());
        Ok(())
    }

    /// Reads wrapped elements until the end-of-array marker.
    pub(crate) fn read(codec: &LedgerCodec<'_>, parser: &mut BinaryParser<'_>) -> Result<Self> {
        let mut elements = Vec::new();
        loop {
            let header = parser.read_field_header()?;
            let instance = codec.resolve_header(&header)?;
            if instance == *codec.array_end() {
                break;
            }
            if instance.field().tag != Some(TypeTag::Object) {
                return Err(Error::Malformed {
                    offset: parser.position(),
                    reason: format!(
                        "array element {} is not an object field",
                        instance.field().name
                    ),
                });
            }
            let object = StObject::read(codec, parser)
                .map_err(|e| e.in_field(&instance.field().name))?;
            elements.push((instance, object));
        }
        Ok(StArray { elements })
    }

    /// Renders the JSON array form.
    pub(crate) fn to_json(&self, codec: &LedgerCodec<'_>) -> Value {
        Value::Array(
            self.elements
                .iter()
                .map(|(instance, object)| {
                    let mut wrapper = Map::new();
                    wrapper.insert(instance.field().name.clone(), object.to_json(codec));
                    Value::Object(wrapper)
                })
                .collect(),
        )
    }
}

fn single_member(item: &Value) -> Result<(&str, &Value)> {
    let members = item.as_object().ok_or(Error::TypeMismatch {
        field: String::new(),
        expected: "a wrapped object",
    })?;
    if members.len() != 1 {
        return Err(Error::TypeMismatch {
            field: String::new(),
            expected: "an object with exactly one member",
        });
    }
    let (name, inner) = members.iter().next().expect("length checked above");
    Ok((name.as_str(), inner))
}
