//! Fetcher: identifier list → Esplora → intermediate record file.
//!
//! Identifiers are processed strictly in order, one request at a time.
//! A failure for one identifier is logged and recorded in the
//! [`FetchSummary`]; it never stops the run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use bitcoin::Amount;

use crate::error::CoreError;
use crate::esplora::{EsploraApi, EsploraTx, PrevoutMode, DEFAULT_BASE_URL};
use crate::ids::load_id_list;
use crate::records::RecordFormat;
use crate::types::{IdEntry, TxInput, TxOutput, TxRecord};

// ==============================================================================
// Configuration
// ==============================================================================

/// Everything a fetch run needs, built once from CLI arguments.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    /// Sleep after every API request.
    pub delay: Duration,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    pub format: RecordFormat,
    pub prevout: PrevoutMode,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            delay: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            format: RecordFormat::Json,
            prevout: PrevoutMode::Lookup,
        }
    }
}

/// Convert a user-supplied number of seconds into a `Duration`, rejecting
/// negative, NaN and infinite values.
pub fn duration_from_secs(secs: f64, what: &str) -> Result<Duration, CoreError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| CoreError::Config(format!("invalid {what} `{secs}`: {e}")))
}

// ==============================================================================
// Run Summary
// ==============================================================================

#[derive(Debug, Default)]
pub struct FetchSummary {
    pub requested: usize,
    pub written: usize,
    pub skipped: Vec<SkippedTx>,
}

#[derive(Debug, Clone)]
pub struct SkippedTx {
    pub txid: String,
    pub reason: String,
}

// ==============================================================================
// Fetch Pipeline
// ==============================================================================

/// Read the identifier list at `input`, fetch every entry, and write the
/// records to `output` (created or truncated).
///
/// An unreadable identifier list fails before any request is made.
pub async fn run(
    api: &dyn EsploraApi,
    config: &FetchConfig,
    input: &Path,
    output: &Path,
) -> Result<FetchSummary, CoreError> {
    let entries = load_id_list(input)?;
    let file = File::create(output).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            e.kind(),
            format!("create output file {}: {e}", output.display()),
        ))
    })?;
    let mut writer = BufWriter::new(file);
    fetch_into(api, config, &entries, &mut writer).await
}

/// Fetch `entries` in order and write one encoded line per success.
/// Each line is flushed as soon as it is written.
pub async fn fetch_into<W: Write>(
    api: &dyn EsploraApi,
    config: &FetchConfig,
    entries: &[IdEntry],
    writer: &mut W,
) -> Result<FetchSummary, CoreError> {
    let codec = config.format.codec();
    let mut summary = FetchSummary {
        requested: entries.len(),
        ..Default::default()
    };
    tracing::info!(
        count = entries.len(),
        format = %config.format,
        prevout = %config.prevout,
        "fetching transactions"
    );

    for (idx, entry) in entries.iter().enumerate() {
        tracing::info!(
            "fetching transaction {}/{}: {}",
            idx + 1,
            entries.len(),
            entry.txid
        );

        let line = match fetch_record(api, config.prevout, entry)
            .await
            .and_then(|record| codec.encode(&record))
        {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(txid = %entry.txid, error = %err, "skipping transaction");
                summary.skipped.push(SkippedTx {
                    txid: entry.txid.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        writeln!(writer, "{line}")?;
        writer.flush()?;
        summary.written += 1;
    }

    tracing::info!(
        requested = summary.requested,
        written = summary.written,
        skipped = summary.skipped.len(),
        "fetch finished"
    );
    Ok(summary)
}

/// Fetch one identifier and convert it into a `TxRecord`, resolving input
/// values according to `prevout`.
pub async fn fetch_record(
    api: &dyn EsploraApi,
    prevout: PrevoutMode,
    entry: &IdEntry,
) -> Result<TxRecord, CoreError> {
    let tx = api.get_transaction(&entry.txid).await?;
    if !tx.txid.eq_ignore_ascii_case(&entry.txid) {
        return Err(CoreError::InvalidTxData(format!(
            "requested {} but API returned {}",
            entry.txid, tx.txid
        )));
    }

    let mut record = convert_transaction(tx)?;
    record.label = entry.label.clone();

    if prevout == PrevoutMode::Lookup {
        for input in record.vin.iter_mut().filter(|input| input.value.is_none()) {
            input.value = lookup_input_value(api, &record.txid, input).await;
        }
    }
    Ok(record)
}

async fn lookup_input_value(api: &dyn EsploraApi, txid: &str, input: &TxInput) -> Option<Amount> {
    match api.get_output_value(&input.txid, input.vout).await {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::warn!(
                txid,
                prev_txid = %input.txid,
                vout = input.vout,
                "funding transaction has no such output; input value unknown"
            );
            None
        }
        Err(err) => {
            tracing::warn!(
                txid,
                prev_txid = %input.txid,
                vout = input.vout,
                error = %err,
                "could not resolve input value"
            );
            None
        }
    }
}

/// Convert an Esplora transaction into a record using only data embedded in
/// the response. Coinbase inputs are dropped.
pub fn convert_transaction(tx: EsploraTx) -> Result<TxRecord, CoreError> {
    let vin = tx
        .vin
        .into_iter()
        .filter(|input| !input.is_coinbase)
        .map(|input| -> Result<TxInput, CoreError> {
            let txid = input
                .txid
                .filter(|t| !t.is_empty())
                .ok_or_else(|| CoreError::InvalidTxData("input missing txid".into()))?;
            let vout = input
                .vout
                .ok_or_else(|| CoreError::InvalidTxData(format!("input {txid} missing vout")))?;
            Ok(TxInput {
                txid,
                vout,
                value: input.prevout.map(|p| Amount::from_sat(p.value)),
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let vout = tx
        .vout
        .into_iter()
        .map(|output| TxOutput {
            address: output.address(),
            value: Amount::from_sat(output.value),
        })
        .collect();

    Ok(TxRecord {
        txid: tx.txid,
        label: None,
        vin,
        vout,
    })
}
