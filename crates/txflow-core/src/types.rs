//! Domain types shared by the fetcher and the graph builder.
//!
//! `TxRecord` is the unit written to (and read back from) the intermediate
//! file. Amounts are `bitcoin::Amount` throughout and cross file boundaries
//! as BTC decimals.

use bitcoin::{Amount, Denomination};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ==============================================================================
// Identifier List Entries
// ==============================================================================

/// One line of the identifier list: a txid with an optional display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEntry {
    pub txid: String,
    pub label: Option<String>,
}

// ==============================================================================
// Transaction Records
// ==============================================================================

/// A fetched transaction reduced to what the flow graph needs.
///
/// Coinbase inputs are never stored, so a coinbase transaction has an
/// empty `vin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub txid: String,
    #[serde(
        default,
        alias = "tx_label",
        deserialize_with = "deserialize_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "deserialize_inputs")]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

impl TxRecord {
    pub fn new(txid: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            label: None,
            vin: Vec::new(),
            vout: Vec::new(),
        }
    }

    /// Sum of all output values, saturating at `Amount::MAX`.
    pub fn total_output(&self) -> Amount {
        self.vout
            .iter()
            .fold(Amount::ZERO, |acc, out| {
                acc.checked_add(out.value).unwrap_or(Amount::MAX)
            })
    }
}

/// A reference to the previous output being spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxInput {
    pub txid: String,
    pub vout: u32,
    /// Value of the spent output, when the fetcher could resolve it.
    #[serde(
        with = "bitcoin::amount::serde::as_btc::opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Amount>,
}

/// Placeholder txid some producers write for coinbase inputs.
const COINBASE_TXID: &str = "coinbase";

/// An input as found in a record line. Coinbase inputs carry no txid
/// (`{"coinbase":"04ff..."}`) or the `coinbase` placeholder.
#[derive(Deserialize)]
struct RawInput {
    #[serde(default, alias = "prev_txid")]
    txid: Option<String>,
    #[serde(default, alias = "vout_index")]
    vout: Option<u32>,
    #[serde(default, with = "bitcoin::amount::serde::as_btc::opt")]
    value: Option<Amount>,
}

fn deserialize_inputs<'de, D>(deserializer: D) -> Result<Vec<TxInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut inputs = Vec::new();
    for raw in Vec::<RawInput>::deserialize(deserializer)? {
        let Some(txid) = raw.txid.filter(|t| !t.is_empty() && t != COINBASE_TXID) else {
            continue;
        };
        let vout = raw.vout.ok_or_else(|| D::Error::missing_field("vout"))?;
        inputs.push(TxInput {
            txid,
            vout,
            value: raw.value,
        });
    }
    Ok(inputs)
}

fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.map(|l| l.trim().to_owned()).filter(|l| !l.is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    pub value: Amount,
}

// ==============================================================================
// BTC Decimal Helpers
// ==============================================================================

/// Render an amount as a BTC decimal without trailing zeros (`1.5`, `0.0001`).
pub fn format_btc(amount: Amount) -> String {
    amount.to_string_in(Denomination::Bitcoin)
}

/// Parse a non-negative BTC decimal with at most 8 fractional digits.
pub fn parse_btc(s: &str) -> Result<Amount, CoreError> {
    Amount::from_str_in(s.trim(), Denomination::Bitcoin)
        .map_err(|e| CoreError::InvalidTxData(format!("invalid BTC amount `{s}`: {e}")))
}
