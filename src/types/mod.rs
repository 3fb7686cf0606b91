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

//! The serialized-type registry.
//!
//! Every protocol type the catalog can name has a codec here. Dispatch is a
//! closed enumeration: a field's type name is resolved to a [`TypeTag`]
//! once, at catalog load, never by reflection at encode time.
//!
//! [`TypeTag`]: enum.TypeTag.html

pub use self::account::{AccountId, AddressCodec, HexAddressCodec, ACCOUNT_ID_LENGTH};
pub use self::amount::{Amount, IssuedAmount, MAX_DROPS};
pub use self::array::StArray;
pub use self::blob::Blob;
pub use self::currency::{Currency, CURRENCY_LENGTH};
pub use self::hash::{Hash128, Hash160, Hash256, Vector256};
pub use self::object::StObject;
pub use self::path::{Path, PathSet, PathStep};

pub mod account;
pub mod amount;
pub mod array;
pub mod blob;
pub mod currency;
pub mod hash;
pub mod object;
pub mod path;
pub(crate) mod uint;

/// Identifies which codec serializes a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 128-bit hash.
    Hash128,
    /// 160-bit hash.
    Hash160,
    /// 256-bit hash.
    Hash256,
    /// 20-byte account identifier.
    AccountId,
    /// Native or issued currency amount.
    Amount,
    /// Opaque variable-length payload.
    Blob,
    /// Sequence of 256-bit hashes.
    Vector256,
    /// Nested object.
    Object,
    /// Nested array of wrapped objects.
    Array,
    /// Payment path set.
    PathSet,
}

impl TypeTag {
    /// Resolves a catalog type name to its codec.
    ///
    /// Returns `None` for names with no wire representation (the catalog
    /// also describes pseudo-types such as whole transactions).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "UInt8" => TypeTag::UInt8,
            "UInt16" => TypeTag::UInt16,
            "UInt32" => TypeTag::UInt32,
            "UInt64" => TypeTag::UInt64,
            "Hash128" => TypeTag::Hash128,
            "Hash160" => TypeTag::Hash160,
            "Hash256" => TypeTag::Hash256,
            "AccountID" => TypeTag::AccountId,
            "Amount" => TypeTag::Amount,
            "Blob" => TypeTag::Blob,
            "Vector256" => TypeTag::Vector256,
            "STObject" => TypeTag::Object,
            "STArray" => TypeTag::Array,
            "PathSet" => TypeTag::PathSet,
            _ => return None,
        })
    }
}

/// A decoded field value, one variant per registry entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerValue {
    /// 8-bit unsigned integer.
    UInt8(u8),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 128-bit hash.
    Hash128(Hash128),
    /// 160-bit hash.
    Hash160(Hash160),
    /// 256-bit hash.
    Hash256(Hash256),
    /// Account identifier.
    AccountId(AccountId),
    /// Currency amount.
    Amount(Amount),
    /// Opaque payload.
    Blob(Blob),
    /// Sequence of 256-bit hashes.
    Vector256(Vector256),
    /// Nested object.
    Object(StObject),
    /// Nested array.
    Array(StArray),
    /// Payment path set.
    PathSet(PathSet),
}
