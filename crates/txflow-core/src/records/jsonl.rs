//! Line-delimited JSON records: one `TxRecord` object per line.

use crate::error::CoreError;
use crate::types::TxRecord;

use super::{parse_error, RecordCodec};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesCodec;

impl RecordCodec for JsonLinesCodec {
    fn encode(&self, record: &TxRecord) -> Result<String, CoreError> {
        serde_json::to_string(record)
            .map_err(|e| CoreError::InvalidTxData(format!("serialize record {}: {e}", record.txid)))
    }

    fn decode(&self, line: &str, line_num: usize) -> Result<TxRecord, CoreError> {
        let record: TxRecord =
            serde_json::from_str(line).map_err(|e| parse_error(line_num, e.to_string()))?;
        if record.txid.trim().is_empty() {
            return Err(parse_error(line_num, "empty txid"));
        }
        Ok(record)
    }
}
