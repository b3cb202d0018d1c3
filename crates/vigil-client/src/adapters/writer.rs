//! # RPC Ledger Writer
//!
//! Submits signer-produced wire transactions via JSON-RPC
//! (`sendTransaction`). The signing credential stays behind the injected
//! [`TransferSigner`]; this adapter never sees key material.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::errors::DispatchError;
use crate::ports::{LedgerWriter, TransferSigner};

/// Ledger writer backed by a JSON-RPC endpoint and an external signer.
pub struct RpcLedgerWriter {
    http: reqwest::Client,
    rpc_url: String,
    signer: Arc<dyn TransferSigner>,
}

impl RpcLedgerWriter {
    /// Create a new writer with a 30 second request timeout (submission
    /// confirmation can be slow under load).
    pub fn new(
        rpc_url: impl Into<String>,
        signer: Arc<dyn TransferSigner>,
    ) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DispatchError::Submission(e.to_string()))?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            signer,
        })
    }
}

#[async_trait]
impl LedgerWriter for RpcLedgerWriter {
    async fn transfer(&self, recipient: &str, amount: u64) -> Result<String, DispatchError> {
        let wire_tx = self.signer.sign_transfer(recipient, amount).await?;
        let encoded = BASE64.encode(&wire_tx);

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [encoded, { "encoding": "base64" }],
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Submission(e.to_string()))?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| DispatchError::Confirmation(e.to_string()))?;

        if let Some(err) = envelope.get("error") {
            return Err(DispatchError::Submission(format!("rpc error: {err}")));
        }

        let signature = envelope
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::Confirmation("missing signature in response".to_string())
            })?
            .to_string();

        info!(
            "[vigil-client] transfer submitted: {} -> {} ({} minor units)",
            signature, recipient, amount
        );
        Ok(signature)
    }
}
