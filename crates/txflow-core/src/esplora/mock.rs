use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ApiError, CoreError};

use super::types::EsploraTx;
use super::EsploraApi;

/// A mock Esplora backend for testing. Returns canned transactions from a
/// `HashMap` populated via the builder pattern and records every requested
/// txid in call order.
pub struct MockEsplora {
    transactions: HashMap<String, EsploraTx>,
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl MockEsplora {
    pub fn builder() -> MockEsploraBuilder {
        MockEsploraBuilder {
            transactions: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    /// Txids requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }
}

pub struct MockEsploraBuilder {
    transactions: HashMap<String, EsploraTx>,
    failures: HashMap<String, u16>,
}

impl MockEsploraBuilder {
    /// Register a transaction from an Esplora-shaped JSON value.
    pub fn with_tx_json(mut self, raw: serde_json::Value) -> Self {
        let tx: EsploraTx = serde_json::from_value(raw).expect("mock tx JSON must deserialize");
        self.transactions.insert(tx.txid.clone(), tx);
        self
    }

    /// Make requests for `txid` fail with the given HTTP status.
    pub fn with_failure(mut self, txid: &str, status: u16) -> Self {
        self.failures.insert(txid.to_owned(), status);
        self
    }

    pub fn build(self) -> MockEsplora {
        MockEsplora {
            transactions: self.transactions,
            failures: self.failures,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EsploraApi for MockEsplora {
    async fn get_transaction(&self, txid: &str) -> Result<EsploraTx, CoreError> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(txid.to_owned());

        if let Some(status) = self.failures.get(txid) {
            return Err(ApiError::Status {
                status: *status,
                url: format!("mock://tx/{txid}"),
            }
            .into());
        }
        self.transactions
            .get(txid)
            .cloned()
            .ok_or_else(|| CoreError::TxNotFound(txid.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;

    use super::*;
    use crate::test_util::{esplora_coinbase_input, esplora_output, esplora_tx};

    #[tokio::test]
    async fn get_output_value_reads_funding_output() {
        let api = MockEsplora::builder()
            .with_tx_json(esplora_tx(
                "funding",
                vec![esplora_coinbase_input()],
                vec![esplora_output("a", 1_000), esplora_output("b", 2_000)],
            ))
            .build();

        assert_eq!(
            api.get_output_value("funding", 1).await.unwrap(),
            Some(Amount::from_sat(2_000))
        );
        assert_eq!(api.get_output_value("funding", 9).await.unwrap(), None);
        assert!(matches!(
            api.get_output_value("missing", 0).await,
            Err(CoreError::TxNotFound(_))
        ));
        assert_eq!(api.calls(), vec!["funding", "funding", "missing"]);
    }

    #[tokio::test]
    async fn configured_failures_return_status_errors() {
        let api = MockEsplora::builder().with_failure("bad", 500).build();
        let err = api.get_transaction("bad").await.expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Api(ApiError::Status { status: 500, .. })
        ));
    }
}
