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

//! The field catalog.
//!
//! `Definitions` holds every piece of process-wide protocol metadata: the
//! field table, the type/ledger-entry/transaction-type/result code tables
//! and the derived permission table. It is built once from a versioned
//! definition data file and is read-only afterwards, so a single instance
//! can be shared freely across threads.
//!
//! The codec takes an explicit `&Definitions`; [`Definitions::default_set`]
//! provides the memoized parse of the embedded data file for callers that
//! do not maintain their own catalog.
//!
//! [`Definitions::default_set`]: struct.Definitions.html#method.default_set

pub use self::field::{Field, FieldHeader, FieldInstance};

mod field;

use failure::{bail, ensure, format_err};
use lazy_static::lazy_static;
use log::debug;
use serde_derive::Deserialize;

use std::collections::{BTreeMap, HashMap};

use crate::types::TypeTag;

/// The definition data the crate ships with.
const DEFAULT_DEFINITIONS: &str = include_str!("default.json");

/// Granular permissions occupy a reserved numeric range; everything below
/// it is derived from transaction type codes.
const GRANULAR_PERMISSION_BASE: u32 = 65_537;

lazy_static! {
    static ref DEFAULT: Definitions =
        Definitions::load(DEFAULT_DEFINITIONS).expect("embedded field catalog is valid");
}

/// The loaded, validated catalog.
///
/// Lookup tables are bidirectional where decoding needs them to be: field
/// codes resolve back to names, and the named-constant tables (transaction
/// types, results, ledger entry types, permissions) translate both ways.
#[derive(Debug)]
pub struct Definitions {
    fields: HashMap<String, Field>,
    instances: HashMap<String, FieldInstance>,
    by_code: HashMap<(i16, i16), String>,
    types: HashMap<String, i16>,
    ledger_entry_types: HashMap<String, i16>,
    ledger_entry_types_by_code: HashMap<i16, String>,
    transaction_types: HashMap<String, i16>,
    transaction_types_by_code: HashMap<i16, String>,
    transaction_results: HashMap<String, i16>,
    transaction_results_by_code: HashMap<i16, String>,
    permissions: HashMap<String, u32>,
    permissions_by_value: HashMap<u32, String>,
    object_end: FieldInstance,
    array_end: FieldInstance,
}

#[derive(Debug, Deserialize)]
struct RawDefinitions {
    #[serde(rename = "TYPES")]
    types: BTreeMap<String, i16>,
    #[serde(rename = "LEDGER_ENTRY_TYPES")]
    ledger_entry_types: BTreeMap<String, i16>,
    #[serde(rename = "FIELDS")]
    fields: Vec<(String, RawField)>,
    #[serde(rename = "TRANSACTION_RESULTS")]
    transaction_results: BTreeMap<String, i16>,
    #[serde(rename = "TRANSACTION_TYPES")]
    transaction_types: BTreeMap<String, i16>,
    #[serde(rename = "GRANULAR_PERMISSIONS", default)]
    granular_permissions: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    nth: i16,
    #[serde(rename = "isVLEncoded")]
    is_vl_encoded: bool,
    #[serde(rename = "isSerialized")]
    is_serialized: bool,
    #[serde(rename = "isSigningField")]
    is_signing_field: bool,
    #[serde(rename = "type")]
    type_name: String,
}

impl Definitions {
    /// The memoized catalog built from the embedded definition data.
    ///
    /// The first caller pays the parse cost; everyone afterwards shares the
    /// same completed instance.
    pub fn default_set() -> &'static Definitions {
        &DEFAULT
    }

    /// Parses and validates a definition data file.
    ///
    /// Fails on malformed JSON, on a field naming an absent type, and on
    /// duplicate names or duplicate `(type, field)` code pairs — all of
    /// which mean the data file itself is broken, not the caller's input.
    pub fn load(json: &str) -> Result<Self, failure::Error> {
        let raw: RawDefinitions = serde_json::from_str(json)?;

        let mut fields = HashMap::with_capacity(raw.fields.len());
        let mut instances = HashMap::new();
        let mut by_code = HashMap::with_capacity(raw.fields.len());
        for (name, entry) in raw.fields {
            let type_code = *raw
                .types
                .get(&entry.type_name)
                .ok_or_else(|| format_err!("field {} has unknown type {}", name, entry.type_name))?;
            let field = Field {
                name: name.clone(),
                type_name: entry.type_name.clone(),
                type_code,
                field_code: entry.nth,
                is_signing_field: entry.is_signing_field,
                is_serialized: entry.is_serialized,
                is_vl_encoded: entry.is_vl_encoded,
                tag: TypeTag::from_name(&entry.type_name),
            };
            if by_code.insert((type_code, entry.nth), name.clone()).is_some() {
                bail!(
                    "duplicate field codes ({}, {}) at field {}",
                    type_code,
                    entry.nth,
                    name
                );
            }
            if let Ok(instance) = FieldInstance::new(field.clone()) {
                instances.insert(name.clone(), instance);
            }
            if fields.insert(name.clone(), field).is_some() {
                bail!("duplicate field name {}", name);
            }
        }

        let object_end = instances
            .get("ObjectEndMarker")
            .cloned()
            .ok_or_else(|| format_err!("catalog lacks the end-of-object marker"))?;
        let array_end = instances
            .get("ArrayEndMarker")
            .cloned()
            .ok_or_else(|| format_err!("catalog lacks the end-of-array marker"))?;

        let mut permissions: HashMap<String, u32> = HashMap::new();
        for (name, value) in &raw.granular_permissions {
            ensure!(
                *value >= GRANULAR_PERMISSION_BASE,
                "granular permission {} is below the reserved range",
                name
            );
            permissions.insert(name.clone(), *value);
        }
        for (name, code) in &raw.transaction_types {
            if *code < 0 {
                // The sentinel "invalid" type carries no permission.
                continue;
            }
            ensure!(
                permissions
                    .insert(name.clone(), *code as u32 + 1)
                    .is_none(),
                "permission name {} is defined twice",
                name
            );
        }
        let permissions_by_value = invert(&permissions)?;

        let definitions = Definitions {
            ledger_entry_types_by_code: invert(&raw.ledger_entry_types)?,
            transaction_types_by_code: invert(&raw.transaction_types)?,
            transaction_results_by_code: invert(&raw.transaction_results)?,
            fields,
            instances,
            by_code,
            types: raw.types.into_iter().collect(),
            ledger_entry_types: raw.ledger_entry_types.into_iter().collect(),
            transaction_types: raw.transaction_types.into_iter().collect(),
            transaction_results: raw.transaction_results.into_iter().collect(),
            permissions,
            permissions_by_value,
            object_end,
            array_end,
        };
        debug!(
            "loaded field catalog: {} fields, {} types",
            definitions.fields.len(),
            definitions.types.len()
        );
        Ok(definitions)
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Looks up a header-encodable field instance by name.
    ///
    /// Fields whose codes fall outside the header range have no instance.
    pub fn instance(&self, name: &str) -> Option<&FieldInstance> {
        self.instances.get(name)
    }

    /// Resolves decoded header codes back to a field name.
    pub fn field_name_by_code(&self, type_code: i16, field_code: i16) -> Option<&str> {
        self.by_code
            .get(&(type_code, field_code))
            .map(String::as_str)
    }

    /// The numeric code of a type name.
    pub fn type_code(&self, name: &str) -> Option<i16> {
        self.types.get(name).copied()
    }

    /// The numeric code of a ledger entry type name.
    pub fn ledger_entry_type_code(&self, name: &str) -> Option<i16> {
        self.ledger_entry_types.get(name).copied()
    }

    /// The name of a ledger entry type code.
    pub fn ledger_entry_type_name(&self, code: i16) -> Option<&str> {
        self.ledger_entry_types_by_code.get(&code).map(String::as_str)
    }

    /// The numeric code of a transaction type name.
    pub fn transaction_type_code(&self, name: &str) -> Option<i16> {
        self.transaction_types.get(name).copied()
    }

    /// The name of a transaction type code.
    pub fn transaction_type_name(&self, code: i16) -> Option<&str> {
        self.transaction_types_by_code.get(&code).map(String::as_str)
    }

    /// The numeric code of a transaction result name.
    pub fn transaction_result_code(&self, name: &str) -> Option<i16> {
        self.transaction_results.get(name).copied()
    }

    /// The name of a transaction result code.
    pub fn transaction_result_name(&self, code: i16) -> Option<&str> {
        self.transaction_results_by_code.get(&code).map(String::as_str)
    }

    /// The numeric value of a permission name.
    ///
    /// Covers both granular permissions (the reserved range) and the
    /// per-transaction-type permissions derived as `code + 1`.
    pub fn permission_value(&self, name: &str) -> Option<u32> {
        self.permissions.get(name).copied()
    }

    /// The name of a permission value.
    pub fn permission_name(&self, value: u32) -> Option<&str> {
        self.permissions_by_value.get(&value).map(String::as_str)
    }

    /// The end-of-object marker instance.
    pub(crate) fn object_end(&self) -> &FieldInstance {
        &self.object_end
    }

    /// The end-of-array marker instance.
    pub(crate) fn array_end(&self) -> &FieldInstance {
        &self.array_end
    }
}

/// Builds the code-to-name inverse of a table, rejecting duplicate codes.
fn invert<'a, M, C>(table: &'a M) -> Result<HashMap<C, String>, failure::Error>
where
    &'a M: IntoIterator<Item = (&'a String, &'a C)>,
    C: Copy + Eq + ::std::hash::Hash + ::std::fmt::Display + 'a,
{
    let mut inverse = HashMap::new();
    for (name, code) in table {
        if inverse.insert(*code, name.clone()).is_some() {
            bail!("duplicate code {} in table", code);
        }
    }
    Ok(inverse)
}
