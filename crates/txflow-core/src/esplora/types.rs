//! Esplora `/tx/{txid}` response types.
//!
//! Only the fields the fetcher reads are modelled; everything else in the
//! response (status, fee, witness data) is ignored during deserialization.

use serde::Deserialize;

/// Hex characters of `scriptpubkey` kept in placeholder addresses.
const SCRIPT_PREVIEW_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraTx {
    pub txid: String,
    pub vin: Vec<EsploraVin>,
    pub vout: Vec<EsploraVout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraVin {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub vout: Option<u32>,
    /// The spent output, embedded by Esplora for non-coinbase inputs.
    #[serde(default)]
    pub prevout: Option<EsploraVout>,
    #[serde(default)]
    pub is_coinbase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EsploraVout {
    #[serde(default)]
    pub scriptpubkey: String,
    #[serde(default)]
    pub scriptpubkey_type: Option<String>,
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    /// Older Esplora builds report a list instead of a single address.
    #[serde(default)]
    pub scriptpubkey_addresses: Vec<String>,
    /// Value in satoshis.
    pub value: u64,
}

impl EsploraVout {
    /// The receiving address, or a `[type:script...]` placeholder for
    /// outputs without one (OP_RETURN, bare multisig, P2PK).
    pub fn address(&self) -> String {
        if let Some(address) = &self.scriptpubkey_address {
            return address.clone();
        }
        if let Some(address) = self.scriptpubkey_addresses.first() {
            return address.clone();
        }

        let script_type = self.scriptpubkey_type.as_deref().unwrap_or("unknown");
        let preview: String = self.scriptpubkey.chars().take(SCRIPT_PREVIEW_LEN).collect();
        let ellipsis = if self.scriptpubkey.len() > SCRIPT_PREVIEW_LEN {
            "..."
        } else {
            ""
        };
        format!("[{script_type}:{preview}{ellipsis}]")
    }
}
