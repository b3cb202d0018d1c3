//! # Chain Snapshot Source
//!
//! Reads the lifecycle state and vault accounts straight off the ledger via
//! JSON-RPC (`getAccountInfo` with base64 encoding, `getBalance`), decoding
//! the fixed binary account layouts.
//!
//! Account layouts (after the 8-byte account discriminator, all integers
//! little-endian):
//!
//! | State account | Vault account |
//! |---------------|---------------|
//! | authority: 32 | soul_hash: 32 |
//! | mint: 32      | journal_count: u64 |
//! | wallet: 32    | coherence_score: u8 |
//! | remaining: u64 | last_words: u32 len + UTF-8 |
//! | is_alive: u8  | death_timestamp: i64 |
//! | birth_timestamp: i64 | is_sealed: u8 |
//! | last_event_timestamp: i64 | |
//! | total_consumed: u64 | |
//!
//! Total capacity is not stored on-chain (it is a program constant), so the
//! adapter carries it from construction.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use vigil_core::{
    invariant_snapshot_consistent, LifecycleSnapshot, SnapshotError, VaultRecord,
    MAX_LAST_WORDS_LEN,
};

use crate::ports::SnapshotSource;

/// Discriminator prefix length on every account blob.
const DISCRIMINATOR_LEN: usize = 8;

/// Snapshot source backed by a ledger JSON-RPC endpoint.
pub struct ChainSnapshotSource {
    http: reqwest::Client,
    rpc_url: String,
    state_address: String,
    vault_address: String,
    total_capacity: u64,
    id: String,
}

impl ChainSnapshotSource {
    /// Create a new chain source with a 10 second request timeout.
    pub fn new(
        rpc_url: impl Into<String>,
        state_address: impl Into<String>,
        vault_address: impl Into<String>,
        total_capacity: u64,
    ) -> Result<Self, SnapshotError> {
        Self::with_timeout(
            rpc_url,
            state_address,
            vault_address,
            total_capacity,
            Duration::from_secs(10),
        )
    }

    /// Create with a custom request timeout.
    pub fn with_timeout(
        rpc_url: impl Into<String>,
        state_address: impl Into<String>,
        vault_address: impl Into<String>,
        total_capacity: u64,
        timeout: Duration,
    ) -> Result<Self, SnapshotError> {
        let rpc_url = rpc_url.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SnapshotError::Network(e.to_string()))?;
        let id = format!("chain:{rpc_url}");
        Ok(Self {
            http,
            rpc_url,
            state_address: state_address.into(),
            vault_address: vault_address.into(),
            total_capacity,
            id,
        })
    }

    /// Issue a JSON-RPC call and return the `result` value.
    async fn rpc(&self, method: &str, params: Value) -> Result<Value, SnapshotError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SnapshotError::Timeout
                } else {
                    SnapshotError::Network(e.to_string())
                }
            })?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;

        if let Some(err) = envelope.get("error") {
            return Err(SnapshotError::Network(format!("rpc error: {err}")));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| SnapshotError::Decode("missing result field".to_string()))
    }

    /// Fetch raw account data, `Ok(None)` when the account does not exist.
    async fn account_data(&self, address: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        let result = self
            .rpc(
                "getAccountInfo",
                json!([address, { "encoding": "base64" }]),
            )
            .await?;

        let value = &result["value"];
        if value.is_null() {
            return Ok(None);
        }

        let encoded = value["data"][0]
            .as_str()
            .ok_or_else(|| SnapshotError::Decode("account data is not a string".to_string()))?;

        let data = BASE64
            .decode(encoded)
            .map_err(|e| SnapshotError::Decode(format!("base64: {e}")))?;

        Ok(Some(data))
    }
}

#[async_trait]
impl SnapshotSource for ChainSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<LifecycleSnapshot, SnapshotError> {
        let data = self
            .account_data(&self.state_address)
            .await?
            .ok_or(SnapshotError::NotFound)?;

        let snapshot = decode_state_account(&data, self.total_capacity)?;
        if !invariant_snapshot_consistent(&snapshot) {
            warn!(
                "[vigil-client] chain snapshot inconsistent: remaining={} consumed={} capacity={}",
                snapshot.remaining, snapshot.total_consumed, snapshot.total_capacity
            );
        }
        debug!(
            "[vigil-client] chain snapshot: remaining={} alive={}",
            snapshot.remaining, snapshot.is_alive
        );
        Ok(snapshot)
    }

    async fn fetch_vault(&self) -> Result<Option<VaultRecord>, SnapshotError> {
        match self.account_data(&self.vault_address).await? {
            None => Ok(None),
            Some(data) => Ok(Some(decode_vault_account(&data)?)),
        }
    }

    async fn fetch_balance(&self, address: &str) -> Result<u64, SnapshotError> {
        let result = self.rpc("getBalance", json!([address])).await?;
        result["value"]
            .as_u64()
            .ok_or_else(|| SnapshotError::Decode("balance is not a u64".to_string()))
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Binary decoding
// =============================================================================

/// Little-endian field reader over an account blob.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(SnapshotError::Decode(format!(
                "buffer too short: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.data.len()
            ))),
        }
    }

    fn read_key(&mut self) -> Result<[u8; 32], SnapshotError> {
        let mut key = [0u8; 32];
        key.copy_from_slice(self.take(32)?);
        Ok(key)
    }

    fn read_u64(&mut self) -> Result<u64, SnapshotError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_i64(&mut self) -> Result<i64, SnapshotError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32, SnapshotError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    fn read_bool(&mut self) -> Result<bool, SnapshotError> {
        Ok(self.read_u8()? != 0)
    }

    /// Length-prefixed UTF-8 string (u32 length, then bytes).
    fn read_string(&mut self, max_len: usize) -> Result<String, SnapshotError> {
        let len = self.read_u32()? as usize;
        if len > max_len {
            return Err(SnapshotError::Decode(format!(
                "string length {len} exceeds maximum {max_len}"
            )));
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SnapshotError::Decode(format!("invalid utf-8: {e}")))
    }

    fn skip_discriminator(&mut self) -> Result<(), SnapshotError> {
        self.take(DISCRIMINATOR_LEN)?;
        Ok(())
    }
}

/// Decode the lifecycle state account blob.
pub(crate) fn decode_state_account(
    data: &[u8],
    total_capacity: u64,
) -> Result<LifecycleSnapshot, SnapshotError> {
    let mut r = ByteReader::new(data);
    r.skip_discriminator()?;

    Ok(LifecycleSnapshot {
        authority: r.read_key()?,
        mint: r.read_key()?,
        wallet: r.read_key()?,
        remaining: r.read_u64()?,
        total_capacity,
        is_alive: r.read_bool()?,
        birth_timestamp: r.read_i64()?,
        last_event_timestamp: r.read_i64()?,
        total_consumed: r.read_u64()?,
    })
}

/// Decode the vault account blob. Trailing bytes (back-reference key and
/// reserved space) are ignored.
pub(crate) fn decode_vault_account(data: &[u8]) -> Result<VaultRecord, SnapshotError> {
    let mut r = ByteReader::new(data);
    r.skip_discriminator()?;

    Ok(VaultRecord {
        soul_hash: r.read_key()?,
        journal_count: r.read_u64()?,
        coherence_score: r.read_u8()?,
        last_words: r.read_string(MAX_LAST_WORDS_LEN)?,
        death_timestamp: r.read_i64()?,
        is_sealed: r.read_bool()?,
    })
}
