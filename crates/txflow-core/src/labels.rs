//! Display labels for graph nodes.
//!
//! Two sources feed a [`LabelMap`]: inline labels from the identifier list
//! (`txid,label`) and a side JSON object mapping address → label. Labels
//! carried inside records sit between the two when resolving (see
//! [`LabelMap::resolve`]).

use std::collections::HashMap;
use std::path::Path;

use crate::error::CoreError;
use crate::types::IdEntry;

/// Unlabelled identifiers longer than this are shortened for display.
const SHORTEN_THRESHOLD: usize = 11;

#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    inline: HashMap<String, String>,
    address_map: HashMap<String, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register inline labels from identifier list entries. Later entries
    /// for the same txid overwrite earlier ones.
    pub fn add_id_entries(&mut self, entries: &[IdEntry]) {
        for entry in entries {
            if let Some(label) = &entry.label {
                self.inline.insert(entry.txid.clone(), label.clone());
            }
        }
    }

    pub fn insert_address_label(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.address_map.insert(key.into(), label.into());
    }

    /// Load an address map file, failing if it is missing or malformed.
    /// Returns the number of entries read.
    pub fn add_address_map_file(&mut self, path: &Path) -> Result<usize, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Io(std::io::Error::new(
                e.kind(),
                format!("read address map {}: {e}", path.display()),
            ))
        })?;
        let parsed = parse_address_map(&content)?;
        let count = parsed.len();
        self.address_map.extend(parsed);
        Ok(count)
    }

    /// Best-effort variant for the default `addr_map.json`: a missing file
    /// is normal and a malformed one is logged and ignored.
    pub fn add_address_map_file_if_present(&mut self, path: &Path) -> usize {
        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "address map not found; unlabelled addresses will be shortened"
            );
            return 0;
        }
        match self.add_address_map_file(path) {
            Ok(count) => {
                tracing::info!(path = %path.display(), entries = count, "loaded address map");
                count
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "ignoring unreadable address map"
                );
                0
            }
        }
    }

    /// Resolve the display label for an identifier or address.
    ///
    /// Precedence: identifier list label, then the label stored in the
    /// record, then the address map.
    pub fn resolve<'a>(&'a self, id: &str, record_label: Option<&'a str>) -> Option<&'a str> {
        self.inline
            .get(id)
            .map(String::as_str)
            .or(record_label)
            .or_else(|| self.address_map.get(id).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.inline.len() + self.address_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.address_map.is_empty()
    }
}

fn parse_address_map(content: &str) -> Result<HashMap<String, String>, CoreError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| CoreError::LabelMap(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| CoreError::LabelMap("expected a JSON object of address → label".into()))?;

    object
        .iter()
        .map(|(address, label)| {
            label
                .as_str()
                .map(|label| (address.clone(), label.to_owned()))
                .ok_or_else(|| {
                    CoreError::LabelMap(format!("label for `{address}` must be a string"))
                })
        })
        .collect()
}

/// Shorten a long identifier to `abcd...wxyz`. Short identifiers are
/// returned unchanged.
pub fn shorten_identifier(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= SHORTEN_THRESHOLD {
        return id.to_owned();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
