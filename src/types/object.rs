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

//! Nested serialized objects.

use serde_json::{Map, Value};

use crate::codec::LedgerCodec;
use crate::definitions::FieldInstance;
use crate::error::{Error, Result};
use crate::parser::BinaryParser;
use crate::sink::ByteSink;
use crate::types::LedgerValue;

/// A sub-document serialized with the same catalog lookup and canonical
/// ordering rules as a top-level object, terminated by the reserved
/// end-of-object marker field.
#[derive(Debug, Clone, PartialEq)]
pub struct StObject {
    entries: Vec<(FieldInstance, LedgerValue)>,
}

impl StObject {
    /// Builds an object from entries, establishing canonical order.
    pub(crate) fn from_entries(mut entries: Vec<(FieldInstance, LedgerValue)>) -> Self {
        entries.sort_by(|left, right| left.0.cmp(&right.0));
        StObject { entries }
    }

    /// The fields of this object, in canonical order.
    pub fn entries(&self) -> &[(FieldInstance, LedgerValue)] {
        &self.entries
    }

    /// Parses a JSON object node into a nested object.
    pub(crate) fn from_json(codec: &LedgerCodec<'_>, node: &Value) -> Result<Self> {
        let members = node.as_object().ok_or(Error::TypeMismatch {
            field: String::new(),
            expected: "an object",
        })?;
        let entries = codec.collect_entries(members, &|field| field.is_serialized)?;
        Ok(Self::from_entries(entries))
    }

    /// Appends every field in canonical order, then the end-of-object
    /// marker.
    pub(crate) fn to_sink(&self, codec: &LedgerCodec<'_>, sink: &mut ByteSink) -> Result<()> {
        for (instance, value) in &self.entries {
            codec.write_entry(instance, value, sink)?;
        }
        sink.extend_from_slice(codec.object_end().header());
        Ok(())
    }

    /// Reads fields until the end-of-object marker.
    pub(crate) fn read(codec: &LedgerCodec<'_>, parser: &mut BinaryParser<'_>) -> Result<Self> {
        let entries = codec.read_entries(parser, true)?;
        Ok(StObject { entries })
    }

    /// Renders the JSON object form.
    pub(crate) fn to_json(&self, codec: &LedgerCodec<'_>) -> Value {
        let mut members = Map::new();
        for (instance, value) in &self.entries {
            members.insert(
                instance.field().name.clone(),
                codec.value_to_json(instance.field(), value),
            );
        }
        Value::Object(members)
    }
}
