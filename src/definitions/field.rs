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

//! Field descriptors, the compact field header codec and the canonical
//! field order.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::TypeTag;

/// Immutable metadata describing one protocol field.
///
/// Sourced from the catalog at load time and never mutated afterwards. A
/// field is uniquely identified by its name; `(type_code, field_code)`
/// pairs are unique as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// The field's name, the key used in documents.
    pub name: String,
    /// Declared type name, as spelled in the catalog.
    pub type_name: String,
    /// Numeric code of the field's type.
    pub type_code: i16,
    /// Position of the field within its type.
    pub field_code: i16,
    /// Whether the field participates in the signable subset.
    pub is_signing_field: bool,
    /// Whether the field appears in the serialized form at all.
    pub is_serialized: bool,
    /// Whether the value is preceded by a length prefix.
    pub is_vl_encoded: bool,
    /// The codec dispatched for this field, bound at catalog load.
    ///
    /// `None` for catalog entries whose type has no wire representation;
    /// attempting to encode such a field reports [`Error::UnknownType`].
    ///
    /// [`Error::UnknownType`]: ../enum.Error.html#variant.UnknownType
    pub tag: Option<TypeTag>,
}

/// The `(type code, field code)` pair identifying a field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    /// Numeric type code.
    pub type_code: i16,
    /// Numeric field code.
    pub field_code: i16,
}

impl FieldHeader {
    /// Produces the compact 1-, 2- or 3-byte header.
    ///
    /// Codes below 16 pack into a shared nibble byte; larger codes spill
    /// into trailing bytes. Codes outside `1..=255` cannot be represented.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let out_of_range = |code: i16| code < 1 || code > 255;
        if out_of_range(self.type_code) || out_of_range(self.field_code) {
            return Err(Error::FieldCodeRange {
                type_code: self.type_code,
                field_code: self.field_code,
            });
        }
        let type_code = self.type_code as u8;
        let field_code = self.field_code as u8;
        let bytes = match (type_code < 16, field_code < 16) {
            (true, true) => vec![type_code << 4 | field_code],
            (true, false) => vec![type_code << 4, field_code],
            (false, true) => vec![field_code, type_code],
            (false, false) => vec![0, type_code, field_code],
        };
        Ok(bytes)
    }

    /// Recovers the codes from the front of `bytes`.
    ///
    /// Returns the header and the number of bytes consumed. Non-canonical
    /// encodings (a spilled code that would have fit in its nibble) are
    /// rejected.
    pub fn decode(bytes: &[u8]) -> Result<(FieldHeader, usize)> {
        let first = *bytes.first().ok_or_else(|| Error::UnexpectedEof {
            offset: 0,
            context: "field header".to_owned(),
        })?;
        let high = first >> 4;
        let low = first & 0x0F;
        match (high, low) {
            (0, 0) => {
                let type_code = spilled_code(bytes, 1)?;
                let field_code = spilled_code(bytes, 2)?;
                Ok((
                    FieldHeader {
                        type_code,
                        field_code,
                    },
                    3,
                ))
            }
            (0, field_code) => {
                let type_code = spilled_code(bytes, 1)?;
                Ok((
                    FieldHeader {
                        type_code,
                        field_code: i16::from(field_code),
                    },
                    2,
                ))
            }
            (type_code, 0) => {
                let field_code = spilled_code(bytes, 1)?;
                Ok((
                    FieldHeader {
                        type_code: i16::from(type_code),
                        field_code,
                    },
                    2,
                ))
            }
            (type_code, field_code) => Ok((
                FieldHeader {
                    type_code: i16::from(type_code),
                    field_code: i16::from(field_code),
                },
                1,
            )),
        }
    }
}

/// Reads a spilled code byte; it must not have fit into a nibble.
fn spilled_code(bytes: &[u8], index: usize) -> Result<i16> {
    let code = *bytes.get(index).ok_or_else(|| Error::UnexpectedEof {
        offset: index,
        context: "field header".to_owned(),
    })?;
    if code < 16 {
        return Err(Error::Malformed {
            offset: index,
            reason: format!("non-canonical field header: spilled code {}", code),
        });
    }
    Ok(i16::from(code))
}

/// A catalog field bound to its precomputed header bytes.
///
/// Instances define the canonical total order used whenever several fields
/// are serialized together: ascending by `(type_code, field_code)`, and
/// nothing else. Two instances with equal codes are equal in this order
/// regardless of any other attribute.
#[derive(Debug, Clone)]
pub struct FieldInstance {
    field: Field,
    header: Vec<u8>,
}

impl FieldInstance {
    /// Binds a field to its header bytes.
    ///
    /// Fails for fields whose codes fall outside the header-encodable
    /// range.
    pub fn new(field: Field) -> Result<Self> {
        let header = FieldHeader {
            type_code: field.type_code,
            field_code: field.field_code,
        }
        .encode()?;
        Ok(FieldInstance { field, header })
    }

    /// The underlying field descriptor.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The precomputed header bytes.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    fn sort_key(&self) -> (i16, i16) {
        (self.field.type_code, self.field.field_code)
    }
}

impl PartialEq for FieldInstance {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for FieldInstance {}

impl PartialOrd for FieldInstance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldInstance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, type_code: i16, field_code: i16) -> Field {
        Field {
            name: name.to_owned(),
            type_name: "UInt32".to_owned(),
            type_code,
            field_code,
            is_signing_field: true,
            is_serialized: true,
            is_vl_encoded: false,
            tag: Some(TypeTag::UInt32),
        }
    }

    #[test]
    fn header_single_byte() {
        let header = FieldHeader {
            type_code: 1,
            field_code: 2,
        };
        assert_eq!(header.encode().unwrap(), vec![0x12]);
    }

    #[test]
    fn header_spilled_field_code() {
        let header = FieldHeader {
            type_code: 1,
            field_code: 20,
        };
        assert_eq!(header.encode().unwrap(), vec![0x10, 20]);
    }

    #[test]
    fn header_spilled_type_code() {
        let header = FieldHeader {
            type_code: 20,
            field_code: 1,
        };
        assert_eq!(header.encode().unwrap(), vec![0x01, 20]);
    }

    #[test]
    fn header_both_spilled() {
        let header = FieldHeader {
            type_code: 20,
            field_code: 20,
        };
        assert_eq!(header.encode().unwrap(), vec![0x00, 20, 20]);
    }

    #[test]
    fn header_rejects_out_of_range_codes() {
        for &(type_code, field_code) in &[(0, 1), (1, 0), (256, 1), (1, 256), (-1, 1)] {
            let header = FieldHeader {
                type_code,
                field_code,
            };
            assert!(header.encode().is_err(), "{:?}", header);
        }
    }

    #[test]
    fn header_decode_inverts_encode() {
        for &(type_code, field_code) in &[(1, 2), (1, 20), (20, 1), (20, 20), (255, 255)] {
            let header = FieldHeader {
                type_code,
                field_code,
            };
            let encoded = header.encode().unwrap();
            let (decoded, consumed) = FieldHeader::decode(&encoded).unwrap();
            assert_eq!(decoded, header);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn header_decode_rejects_non_canonical_spill() {
        // Field code 2 would have fit into the nibble.
        assert!(FieldHeader::decode(&[0x10, 2]).is_err());
    }

    #[test]
    fn instances_order_by_codes_only() {
        let a = FieldInstance::new(field("A", 1, 2)).unwrap();
        let b = FieldInstance::new(field("B", 1, 3)).unwrap();
        let c = FieldInstance::new(field("C", 2, 1)).unwrap();
        assert!(a < b);
        assert!(b < c);

        // Equal codes compare equal no matter the other attributes.
        let mut twin = field("Z", 1, 2);
        twin.is_vl_encoded = true;
        let twin = FieldInstance::new(twin).unwrap();
        assert_eq!(a.cmp(&twin), Ordering::Equal);
    }

    #[test]
    fn sorting_is_independent_of_input_order() {
        let mut instances = vec![
            FieldInstance::new(field("C", 2, 1)).unwrap(),
            FieldInstance::new(field("A", 1, 2)).unwrap(),
            FieldInstance::new(field("B", 1, 3)).unwrap(),
        ];
        instances.sort();
        let names: Vec<_> = instances
            .iter()
            .map(|instance| instance.field().name.clone())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
