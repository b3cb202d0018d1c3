//! # REST Status Source
//!
//! Reads the lifecycle state from an HTTP status endpoint instead of the
//! ledger. Produces the same core types as the chain adapter - the
//! subscription engine cannot tell them apart.
//!
//! Endpoints:
//! - `GET {base}/status` -> `{heartbeatsRemaining, phase, status, isAlive,
//!   birth, timestamp}`
//! - `GET {base}/vault`  -> `{exists, deathTimestamp, resurrectionTime,
//!   daysUntilResurrection, isReady}`
//!
//! The status document omits the burn counter and identity keys, so
//! `total_consumed` is derived as `capacity - remaining` (burns are the only
//! consumption) and identities are zeroed opaque pass-through. The `phase`
//! and `status` strings are ignored: phase is always derived locally from
//! the counters.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use vigil_core::{LifecycleSnapshot, SnapshotError, VaultRecord};

use crate::ports::SnapshotSource;

/// Wire shape of the status document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusDocument {
    heartbeats_remaining: u64,
    #[serde(default)]
    #[allow(dead_code)]
    phase: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    status: Option<String>,
    is_alive: bool,
    birth: i64,
    timestamp: i64,
}

/// Wire shape of the vault document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VaultDocument {
    exists: bool,
    #[serde(default)]
    death_timestamp: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    resurrection_time: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    days_until_resurrection: Option<f64>,
    #[serde(default)]
    #[allow(dead_code)]
    is_ready: bool,
}

/// Snapshot source backed by a REST status endpoint.
pub struct RestStatusSource {
    http: reqwest::Client,
    base_url: String,
    total_capacity: u64,
    id: String,
}

impl RestStatusSource {
    /// Create a new REST source with a 10 second request timeout.
    pub fn new(base_url: impl Into<String>, total_capacity: u64) -> Result<Self, SnapshotError> {
        Self::with_timeout(base_url, total_capacity, Duration::from_secs(10))
    }

    /// Create with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        total_capacity: u64,
        timeout: Duration,
    ) -> Result<Self, SnapshotError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SnapshotError::Network(e.to_string()))?;
        let id = format!("rest:{base_url}");
        Ok(Self {
            http,
            base_url,
            total_capacity,
            id,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, SnapshotError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SnapshotError::Timeout
            } else {
                SnapshotError::Network(e.to_string())
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SnapshotError::NotFound);
        }
        if !response.status().is_success() {
            return Err(SnapshotError::Network(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

/// Map the status document onto the core snapshot type.
fn snapshot_from_status(doc: &StatusDocument, total_capacity: u64) -> LifecycleSnapshot {
    LifecycleSnapshot {
        authority: [0u8; 32],
        mint: [0u8; 32],
        wallet: [0u8; 32],
        remaining: doc.heartbeats_remaining,
        total_capacity,
        is_alive: doc.is_alive,
        birth_timestamp: doc.birth,
        last_event_timestamp: doc.timestamp,
        total_consumed: total_capacity.saturating_sub(doc.heartbeats_remaining),
    }
}

/// Map the vault document onto the core vault type.
fn vault_from_document(doc: &VaultDocument) -> Option<VaultRecord> {
    if !doc.exists {
        return None;
    }
    let mut record = VaultRecord::unsealed();
    record.is_sealed = true;
    record.death_timestamp = doc.death_timestamp.unwrap_or(0);
    Some(record)
}

#[async_trait]
impl SnapshotSource for RestStatusSource {
    async fn fetch_snapshot(&self) -> Result<LifecycleSnapshot, SnapshotError> {
        let doc: StatusDocument = self.get_json("status").await?;
        let snapshot = snapshot_from_status(&doc, self.total_capacity);
        debug!(
            "[vigil-client] rest snapshot: remaining={} alive={}",
            snapshot.remaining, snapshot.is_alive
        );
        Ok(snapshot)
    }

    async fn fetch_vault(&self) -> Result<Option<VaultRecord>, SnapshotError> {
        // A 404 from the vault endpoint means no vault has been sealed yet,
        // which is absence of data rather than a failure.
        match self.get_json::<VaultDocument>("vault").await {
            Ok(doc) => Ok(vault_from_document(&doc)),
            Err(SnapshotError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The REST surface exposes no balances; use a chain source for reads
    /// that need them.
    async fn fetch_balance(&self, _address: &str) -> Result<u64, SnapshotError> {
        Err(SnapshotError::NotFound)
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}
