//! Shared test helpers for `txflow-core` unit tests.
//!
//! Builders for records (`record`, `input`, `output`) and for canned
//! Esplora JSON (`esplora_tx`, `esplora_input`, `esplora_output`) so that
//! tests across modules share a single source of dummy data.

use bitcoin::Amount;
use serde_json::{json, Value};

use crate::types::{TxInput, TxOutput, TxRecord};

// ==============================================================================
// Record Builders
// ==============================================================================

pub fn record(txid: &str, vin: Vec<TxInput>, vout: Vec<TxOutput>) -> TxRecord {
    TxRecord {
        txid: txid.to_owned(),
        label: None,
        vin,
        vout,
    }
}

/// An input spending `txid:vout` with no resolved value.
pub fn input(txid: &str, vout: u32) -> TxInput {
    TxInput {
        txid: txid.to_owned(),
        vout,
        value: None,
    }
}

pub fn output(address: &str, sats: u64) -> TxOutput {
    TxOutput {
        address: address.to_owned(),
        value: Amount::from_sat(sats),
    }
}

// ==============================================================================
// Esplora JSON Builders
// ==============================================================================

/// A `/tx/{txid}` response body in Esplora's shape.
pub fn esplora_tx(txid: &str, vin: Vec<Value>, vout: Vec<Value>) -> Value {
    json!({
        "txid": txid,
        "version": 2,
        "locktime": 0,
        "vin": vin,
        "vout": vout,
        "size": 222,
        "weight": 561,
        "fee": 1000,
        "status": { "confirmed": true, "block_height": 100 }
    })
}

/// A spending input, optionally with the embedded `prevout` value.
pub fn esplora_input(prev_txid: &str, vout: u32, prevout_sats: Option<u64>) -> Value {
    let prevout = prevout_sats.map(|sats| {
        json!({
            "scriptpubkey": "0014aabbccddeeff00112233445566778899aabbccdd",
            "scriptpubkey_type": "v0_p2wpkh",
            "scriptpubkey_address": "bcrt1qprev",
            "value": sats
        })
    });
    json!({
        "txid": prev_txid,
        "vout": vout,
        "prevout": prevout,
        "scriptsig": "",
        "is_coinbase": false,
        "sequence": 4294967293u32
    })
}

pub fn esplora_coinbase_input() -> Value {
    json!({
        "txid": "0000000000000000000000000000000000000000000000000000000000000000",
        "vout": 4294967295u32,
        "prevout": null,
        "scriptsig": "0151",
        "is_coinbase": true,
        "sequence": 4294967295u32
    })
}

pub fn esplora_output(address: &str, sats: u64) -> Value {
    json!({
        "scriptpubkey": "0014aabbccddeeff00112233445566778899aabbccdd",
        "scriptpubkey_type": "v0_p2wpkh",
        "scriptpubkey_address": address,
        "value": sats
    })
}
