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

//! End-to-end codec tests over a known transaction and its canonical hex
//! form.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use exonum_ledger_codec::{Definitions, Error, LedgerCodec};

/// A payment transaction covering every major type: integers, amounts
/// (native and issued), blobs, account identifiers and a nested memo array.
fn payment() -> Value {
    json!({
        "TransactionType": "Payment",
        "Flags": 2_147_483_648_u32,
        "Sequence": 2,
        "DestinationTag": 23_480,
        "Amount": {
            "currency": "USD",
            "issuer": "5E7B112523F68D2F5E879DB4EAC51C6698A69304",
            "value": "1",
        },
        "Fee": "12",
        "SigningPubKey":
            "ED5F5AC8B98974A3CA843326D9B88CEBD0560177B973EE0B149F782CFAA06DC66A",
        "TxnSignature":
            "C3646313B08EED6AF4392261A31B961F10C66CB733DB7F6CD9EAB079857834C8\
             B0334270A2C037E63CDCCC1932E0832882B7B7066ECD2FAEDEB4A83DF8AE6303",
        "Account": "B5F762798A53D543A014CAF8B297CFF8F2F937E8",
        "Destination": "FBEF9A3F2F6CE7C1D82AD33D128F2327D5B1C9E6",
        "Memos": [{
            "Memo": {
                "MemoType":
                    "687474703A2F2F6578616D706C652E636F6D2F6D656D6F2F67656E65726963",
                "MemoData": "72656E74",
            }
        }],
    })
}

/// The canonical bytes of [`payment`], computed independently from the wire
/// rules: headers, canonical field order, length prefixes, amount packing.
const PAYMENT_HEX: &str = "\
    120000228000000024000000022E00005BB861D4838D7EA4C68000000000000000000000\
    00000055534400000000005E7B112523F68D2F5E879DB4EAC51C6698A6930468400000000\
    000000C7321ED5F5AC8B98974A3CA843326D9B88CEBD0560177B973EE0B149F782CFAA06D\
    C66A7440C3646313B08EED6AF4392261A31B961F10C66CB733DB7F6CD9EAB079857834C8B\
    0334270A2C037E63CDCCC1932E0832882B7B7066ECD2FAEDEB4A83DF8AE63038114B5F762\
    798A53D543A014CAF8B297CFF8F2F937E88314FBEF9A3F2F6CE7C1D82AD33D128F2327D5B\
    1C9E6F9EA7C1F687474703A2F2F6578616D706C652E636F6D2F6D656D6F2F67656E657269\
    637D0472656E74E1F1";

/// Same bytes with the non-signing `TxnSignature` field removed.
const PAYMENT_SIGNING_HEX: &str = "\
    120000228000000024000000022E00005BB861D4838D7EA4C68000000000000000000000\
    00000055534400000000005E7B112523F68D2F5E879DB4EAC51C6698A6930468400000000\
    000000C7321ED5F5AC8B98974A3CA843326D9B88CEBD0560177B973EE0B149F782CFAA06D\
    C66A8114B5F762798A53D543A014CAF8B297CFF8F2F937E88314FBEF9A3F2F6CE7C1D82AD\
    33D128F2327D5B1C9E6F9EA7C1F687474703A2F2F6578616D706C652E636F6D2F6D656D6F\
    2F67656E657269637D0472656E74E1F1";

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
}

#[test]
fn payment_encodes_to_the_known_blob() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let bytes = codec.serialize(&payment()).unwrap();
    assert_eq!(to_hex(&bytes), PAYMENT_HEX);
}

#[test]
fn known_blob_decodes_to_the_payment() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let bytes = hex::decode(PAYMENT_HEX).unwrap();
    assert_eq!(codec.deserialize(&bytes).unwrap(), payment());
}

#[test]
fn signing_subset_drops_the_signature() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let bytes = codec.serialize_signing(&payment()).unwrap();
    assert_eq!(to_hex(&bytes), PAYMENT_SIGNING_HEX);
}

#[test]
fn encoding_is_deterministic() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let first = codec.serialize(&payment()).unwrap();
    let second = codec.serialize(&payment()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn field_order_in_the_document_does_not_matter() {
    let codec = LedgerCodec::new(Definitions::default_set());
    // The same members spelled back to front.
    let mut scrambled = serde_json::Map::new();
    let payment = payment();
    for (name, value) in payment.as_object().unwrap().iter().rev() {
        scrambled.insert(name.clone(), value.clone());
    }
    let bytes = codec.serialize(&Value::Object(scrambled)).unwrap();
    assert_eq!(to_hex(&bytes), PAYMENT_HEX);
}

#[test]
fn round_trip_normalizes_equal_decimals() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let verbose = json!({
        "Amount": {
            "currency": "USD",
            "issuer": "5E7B112523F68D2F5E879DB4EAC51C6698A69304",
            "value": "1.00",
        },
    });
    let bytes = codec.serialize(&verbose).unwrap();
    let decoded = codec.deserialize(&bytes).unwrap();
    assert_eq!(decoded["Amount"]["value"], json!("1"));
}

#[test]
fn issued_zero_amount_round_trips() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let document = json!({
        "Amount": {
            "currency": "USD",
            "issuer": "5E7B112523F68D2F5E879DB4EAC51C6698A69304",
            "value": "0",
        },
    });
    let bytes = codec.serialize(&document).unwrap();
    // Header, then the bare not-native marker word.
    assert_eq!(
        &bytes[..9],
        &[0x61, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
    let decoded = codec.deserialize(&bytes).unwrap();
    assert_eq!(decoded["Amount"]["value"], json!("0"));
}

#[test]
fn unknown_field_name_is_rejected() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let document = json!({ "NoSuchField": 1 });
    match codec.serialize(&document) {
        Err(Error::UnknownField(name)) => assert_eq!(name, "NoSuchField"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn truncated_stream_reports_offset_and_field() {
    let codec = LedgerCodec::new(Definitions::default_set());
    let bytes = hex::decode(PAYMENT_HEX).unwrap();
    match codec.deserialize(&bytes[..20]) {
        Err(Error::UnexpectedEof { offset, context }) => {
            assert!(offset <= 20);
            assert!(!context.is_empty());
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unresolvable_header_is_rejected() {
    let codec = LedgerCodec::new(Definitions::default_set());
    // Type 9, field 9: no such catalog entry.
    match codec.deserialize(&[0x99]) {
        Err(Error::UnknownFieldCode {
            type_code,
            field_code,
        }) => {
            assert_eq!(type_code, 9);
            assert_eq!(field_code, 9);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn codec_is_shareable_across_threads() {
    let definitions = Definitions::default_set();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(move || {
                let codec = LedgerCodec::new(definitions);
                to_hex(&codec.serialize(&payment()).unwrap())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), PAYMENT_HEX);
    }
}
