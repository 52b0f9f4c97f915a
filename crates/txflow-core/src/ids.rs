//! Identifier list parsing.
//!
//! One txid per line with an optional `,label` suffix. Blank lines and
//! `#` comments are ignored.

use std::path::Path;
use std::str::FromStr;

use bitcoin::Txid;

use crate::error::CoreError;
use crate::types::IdEntry;

/// Read and parse an identifier list. A missing file surfaces as
/// `CoreError::Io` with `ErrorKind::NotFound`.
pub fn load_id_list(path: &Path) -> Result<Vec<IdEntry>, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Io(std::io::Error::new(
            e.kind(),
            format!("read identifier list {}: {e}", path.display()),
        ))
    })?;
    Ok(parse_id_list(&content))
}

pub fn parse_id_list(content: &str) -> Vec<IdEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(line_num, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let (txid, label) = match line.split_once(',') {
                Some((txid, label)) => (txid.trim(), Some(label.trim())),
                None => (line, None),
            };
            if txid.is_empty() {
                tracing::warn!(line = line_num + 1, "identifier list entry has no txid");
                return None;
            }
            if Txid::from_str(txid).is_err() {
                tracing::warn!(
                    line = line_num + 1,
                    txid,
                    "identifier is not a 64-character hex txid; fetching anyway"
                );
            }

            Some(IdEntry {
                txid: txid.to_owned(),
                label: label.filter(|l| !l.is_empty()).map(str::to_owned),
            })
        })
        .collect()
}
