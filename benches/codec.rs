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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use exonum_ledger_codec::{Definitions, LedgerCodec};

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

fn bench_codec(c: &mut Criterion) {
    let definitions = Definitions::default_set();
    let codec = LedgerCodec::new(definitions);
    let document = payment();
    let bytes = codec.serialize(&document).unwrap();

    c.bench_function("codec/serialize", |b| {
        b.iter(|| codec.serialize(black_box(&document)).unwrap())
    });
    c.bench_function("codec/serialize_signing", |b| {
        b.iter(|| codec.serialize_signing(black_box(&document)).unwrap())
    });
    c.bench_function("codec/deserialize", |b| {
        b.iter(|| codec.deserialize(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
