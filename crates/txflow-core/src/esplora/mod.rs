//! Esplora block-explorer API abstraction layer.
//!
//! Defines the [`EsploraApi`] trait and provides an HTTP implementation
//! ([`HttpEsploraClient`]) plus a test mock (`mock::MockEsplora`).

mod client;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use client::HttpEsploraClient;
pub use types::{EsploraTx, EsploraVin, EsploraVout};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bitcoin::Amount;

use crate::error::CoreError;

/// Default Esplora base URL (a local `electrs`/Esplora HTTP endpoint).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002";

/// The subset of the Esplora HTTP API that the fetcher needs.
#[async_trait]
pub trait EsploraApi: Send + Sync {
    /// Fetch a transaction via `GET /tx/{txid}`.
    async fn get_transaction(&self, txid: &str) -> Result<EsploraTx, CoreError>;

    /// Resolve the value of `txid:vout` by fetching the funding transaction.
    /// Returns `None` if the transaction has no output at that index.
    async fn get_output_value(&self, txid: &str, vout: u32) -> Result<Option<Amount>, CoreError> {
        let tx = self.get_transaction(txid).await?;
        Ok(tx
            .vout
            .get(vout as usize)
            .map(|output| Amount::from_sat(output.value)))
    }
}

// ==============================================================================
// Prevout Resolution Strategy
// ==============================================================================

/// How input values are resolved when building records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrevoutMode {
    /// Only use `prevout` objects embedded in the `/tx/{txid}` response.
    Embedded,
    /// Use the embedded `prevout` when present, otherwise issue a secondary
    /// `/tx/{prev_txid}` request for the spent output.
    #[default]
    Lookup,
}

impl fmt::Display for PrevoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::Lookup => write!(f, "lookup"),
        }
    }
}

impl FromStr for PrevoutMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedded" => Ok(Self::Embedded),
            "lookup" => Ok(Self::Lookup),
            other => Err(CoreError::Config(format!(
                "unknown prevout mode `{other}`; expected embedded or lookup"
            ))),
        }
    }
}
