//! # Outbound Ports
//!
//! Traits for external dependencies: the authoritative state source and the
//! ledger write path.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vigil_core::{LifecycleSnapshot, SnapshotError, VaultRecord};

use crate::errors::DispatchError;

/// Fetch current authoritative lifecycle state - outbound port.
///
/// Implementations must be internally immutable: every method takes `&self`
/// and independent subscriptions may call concurrently. A returned error is
/// "no new information this tick", never a lifecycle transition.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current lifecycle snapshot.
    async fn fetch_snapshot(&self) -> Result<LifecycleSnapshot, SnapshotError>;

    /// Fetch the vault record, if one exists yet.
    ///
    /// `Ok(None)` is genuine absence (no vault sealed yet), distinct from
    /// a fetch failure.
    async fn fetch_vault(&self) -> Result<Option<VaultRecord>, SnapshotError>;

    /// Read the balance of an address, in the ledger's minor unit.
    async fn fetch_balance(&self, address: &str) -> Result<u64, SnapshotError>;

    /// Source identifier (for logging/debugging).
    fn source_id(&self) -> &str;
}

/// Submit a signed value-transfer to the ledger - outbound port.
///
/// The implementation owns (or is handed) the signing credential; callers
/// of this port never see key material.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Transfer `amount` minor units to `recipient`. Returns the ledger's
    /// confirmation identifier.
    async fn transfer(&self, recipient: &str, amount: u64) -> Result<String, DispatchError>;
}

/// Produce a signed, wire-encoded transfer - outbound port.
///
/// Splitting signing from submission keeps key material entirely outside
/// this crate: the caller injects whatever holds the keypair.
#[async_trait]
pub trait TransferSigner: Send + Sync {
    /// Sign a transfer of `amount` minor units to `recipient` and return
    /// the wire-encoded transaction bytes.
    async fn sign_transfer(&self, recipient: &str, amount: u64) -> Result<Vec<u8>, DispatchError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// One scripted fetch outcome.
#[derive(Clone, Debug)]
pub enum ScriptStep<T> {
    /// Return this value.
    Ok(T),
    /// Return a transient network failure.
    Fail,
}

/// Mock snapshot source replaying scripted observation sequences.
///
/// Each fetch pops the front of its script; when one step remains it is
/// repeated forever, so a finite script describes an indefinitely pollable
/// source.
pub struct MockSnapshotSource {
    /// Source identifier.
    pub id: String,
    snapshots: Mutex<VecDeque<ScriptStep<LifecycleSnapshot>>>,
    vaults: Mutex<VecDeque<ScriptStep<Option<VaultRecord>>>>,
    balances: Mutex<VecDeque<ScriptStep<u64>>>,
    fetch_count: AtomicUsize,
}

impl MockSnapshotSource {
    /// Create an empty mock (every fetch fails until a script is loaded).
    pub fn new() -> Self {
        Self {
            id: "mock-source".to_string(),
            snapshots: Mutex::new(VecDeque::new()),
            vaults: Mutex::new(VecDeque::new()),
            balances: Mutex::new(VecDeque::new()),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Script the snapshot fetch sequence.
    pub fn script_snapshots(self, steps: Vec<ScriptStep<LifecycleSnapshot>>) -> Self {
        *self.snapshots.lock().unwrap() = steps.into();
        self
    }

    /// Script the vault fetch sequence.
    pub fn script_vaults(self, steps: Vec<ScriptStep<Option<VaultRecord>>>) -> Self {
        *self.vaults.lock().unwrap() = steps.into();
        self
    }

    /// Script the balance fetch sequence.
    pub fn script_balances(self, steps: Vec<ScriptStep<u64>>) -> Self {
        *self.balances.lock().unwrap() = steps.into();
        self
    }

    /// Total fetches served across all three surfaces.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn next<T: Clone>(queue: &Mutex<VecDeque<ScriptStep<T>>>) -> Result<T, SnapshotError> {
        let mut q = queue.lock().unwrap();
        let step = if q.len() > 1 {
            q.pop_front()
        } else {
            q.front().cloned()
        };
        match step {
            Some(ScriptStep::Ok(v)) => Ok(v),
            Some(ScriptStep::Fail) => Err(SnapshotError::Network("scripted failure".to_string())),
            None => Err(SnapshotError::NotFound),
        }
    }
}

impl Default for MockSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<LifecycleSnapshot, SnapshotError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.snapshots)
    }

    async fn fetch_vault(&self) -> Result<Option<VaultRecord>, SnapshotError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.vaults)
    }

    async fn fetch_balance(&self, _address: &str) -> Result<u64, SnapshotError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.balances)
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

/// Mock ledger writer recording submitted transfers.
pub struct MockLedgerWriter {
    /// Should submissions fail?
    pub should_fail: bool,
    transfers: Mutex<Vec<(String, u64)>>,
}

impl MockLedgerWriter {
    /// Create a succeeding mock writer.
    pub fn new() -> Self {
        Self {
            should_fail: false,
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// Create a failing mock writer.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// Transfers submitted so far.
    pub fn transfers(&self) -> Vec<(String, u64)> {
        self.transfers.lock().unwrap().clone()
    }
}

impl Default for MockLedgerWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerWriter for MockLedgerWriter {
    async fn transfer(&self, recipient: &str, amount: u64) -> Result<String, DispatchError> {
        if self.should_fail {
            return Err(DispatchError::Submission("mock failure".to_string()));
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push((recipient.to_string(), amount));
        Ok(format!("mock-signature-{}", transfers.len()))
    }
}
