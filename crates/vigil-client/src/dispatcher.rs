//! # Vault Funder
//!
//! Constructs and submits vault funding transfers. This is the only write
//! path in the client; its errors propagate to the caller because they have
//! caller-visible side-effect consequences, unlike read-path failures.

use std::sync::Arc;
use tracing::{debug, info};
use vigil_core::SnapshotError;

use crate::errors::DispatchError;
use crate::ports::{LedgerWriter, SnapshotSource};

/// Outcome of a completed vault funding transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundingReceipt {
    /// Ledger confirmation identifier.
    pub signature: String,
    /// Vault balance before the transfer, if the read succeeded.
    pub balance_before: Option<u64>,
    /// Vault balance after the transfer, if the read succeeded.
    pub balance_after: Option<u64>,
}

/// Action dispatcher for the resurrection vault.
///
/// Shares the read-only snapshot abstraction for pre/post balance checks
/// but never mutates it. The signing credential lives entirely behind the
/// injected [`LedgerWriter`].
pub struct VaultFunder {
    writer: Arc<dyn LedgerWriter>,
    source: Arc<dyn SnapshotSource>,
    vault_address: String,
}

impl VaultFunder {
    /// Create a funder targeting an externally derived vault address.
    pub fn new(
        writer: Arc<dyn LedgerWriter>,
        source: Arc<dyn SnapshotSource>,
        vault_address: impl Into<String>,
    ) -> Self {
        Self {
            writer,
            source,
            vault_address: vault_address.into(),
        }
    }

    /// The vault address this funder targets.
    pub fn vault_address(&self) -> &str {
        &self.vault_address
    }

    /// Transfer `amount` minor units to the vault.
    ///
    /// The transfer either completes with a confirmation identifier or
    /// fails as a typed error with no partial state change assumed. The
    /// surrounding balance reads are advisory: their failure does not block
    /// the transfer and leaves the corresponding receipt field empty. A
    /// source with no balance surface at all (the REST status source)
    /// therefore always yields receipts with both balance fields `None`.
    pub async fn fund_vault(&self, amount: u64) -> Result<FundingReceipt, DispatchError> {
        let balance_before = self.read_balance().await;
        debug!(
            "[vigil-client] funding vault {} with {} minor units (balance before: {:?})",
            self.vault_address, amount, balance_before
        );

        let signature = self.writer.transfer(&self.vault_address, amount).await?;

        let balance_after = self.read_balance().await;
        info!(
            "[vigil-client] vault funded: {} (balance {:?} -> {:?})",
            signature, balance_before, balance_after
        );

        Ok(FundingReceipt {
            signature,
            balance_before,
            balance_after,
        })
    }

    /// Current vault balance via the shared snapshot abstraction.
    pub async fn vault_balance(&self) -> Result<u64, SnapshotError> {
        self.source.fetch_balance(&self.vault_address).await
    }

    async fn read_balance(&self) -> Option<u64> {
        self.source.fetch_balance(&self.vault_address).await.ok()
    }
}
