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

//! The canonical binary codec for a ledger protocol's transaction and
//! ledger-object model. It converts a structured, named-field JSON document
//! into a deterministic byte sequence, and back. The binary form is the
//! exact byte sequence the protocol hashes and signs, so every encoding
//! rule (field ordering, length-prefix thresholds, numeric packing) is
//! bit-exact and stable across implementations.
//!
//! # Field catalog
//!
//! Every protocol field is described by a [`Field`]: a name, a declared
//! type, a `(type code, field code)` pair and three flags (participates in
//! signing, participates in the serialized form, is variable-length
//! encoded). The whole catalog is a [`Definitions`] value, built once from
//! a versioned definition data file and read-only afterwards — it can be
//! shared freely across threads. Callers that do not maintain their own
//! catalog use [`Definitions::default_set`], the memoized parse of the
//! embedded data file.
//!
//! # Encoding
//!
//! A [`LedgerCodec`] borrows a catalog and serializes documents: each
//! present field is resolved by name, the resolved set is sorted into the
//! canonical `(type code, field code)` order, and every field is emitted as
//! a compact 1–3 byte header followed by its value bytes — preceded by a
//! variable-length prefix if and only if the catalog flags the field
//! variable-length. [`LedgerCodec::serialize_signing`] restricts the output
//! to signing fields, producing the exact preimage the signing layer
//! consumes. Decoding inverts every step, resolving headers through the
//! catalog's reverse index.
//!
//! ```
//! use exonum_ledger_codec::{Definitions, LedgerCodec};
//! use serde_json::json;
//!
//! let codec = LedgerCodec::new(Definitions::default_set());
//! let document = json!({
//!     "TransactionType": "Payment",
//!     "Sequence": 1,
//!     "Fee": "10",
//! });
//! let bytes = codec.serialize(&document).unwrap();
//! assert_eq!(codec.deserialize(&bytes).unwrap(), document);
//! ```
//!
//! # Serialized types
//!
//! Dispatch over a field's declared type is a closed enumeration,
//! [`TypeTag`], bound at catalog load: fixed-width unsigned integers,
//! 128/160/256-bit hashes, account identifiers, blobs, native and issued
//! currency amounts, hash vectors, payment path sets and
//! recursively-nested objects and arrays. Issued amounts rely on the
//! [`decimal`] module to decompose an arbitrary-precision decimal into the
//! fixed-width mantissa and biased exponent the wire format packs into a
//! single 64-bit word.
//!
//! The textual form of account identifiers (base58, checksums) lives
//! outside this crate: implement [`AddressCodec`] and plug it in through
//! [`LedgerCodec::with_address_codec`]. The default treats addresses as
//! plain hex.
//!
//! [`Field`]: struct.Field.html
//! [`Definitions`]: struct.Definitions.html
//! [`Definitions::default_set`]: struct.Definitions.html#method.default_set
//! [`LedgerCodec`]: struct.LedgerCodec.html
//! [`LedgerCodec::serialize_signing`]: struct.LedgerCodec.html#method.serialize_signing
//! [`LedgerCodec::with_address_codec`]: struct.LedgerCodec.html#method.with_address_codec
//! [`TypeTag`]: types/enum.TypeTag.html
//! [`decimal`]: decimal/index.html
//! [`AddressCodec`]: types/trait.AddressCodec.html

#![warn(
    missing_debug_implementations,
    unsafe_code,
    bare_trait_objects,
    missing_docs
)]

pub use self::{
    codec::LedgerCodec,
    definitions::{Definitions, Field, FieldHeader, FieldInstance},
    error::{Error, Result},
    parser::BinaryParser,
    sink::ByteSink,
};

pub mod decimal;
pub mod length;
pub mod types;

mod codec;
mod definitions;
mod error;
mod parser;
mod sink;
