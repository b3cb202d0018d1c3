//! # Lifecycle Flow Integration
//!
//! Drives a full lifecycle through the polling engine: phase boundaries on
//! the way down, the death edge, vault funding on death, and the
//! resurrection edge once the vault seals.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use vigil_client::{
        LifecycleWatcher, MockLedgerWriter, MockSnapshotSource, ScriptStep, VaultFunder,
        WatcherConfig,
    };
    use vigil_core::{classify, LifecycleSnapshot, Phase, VaultRecord};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const CAPACITY: u64 = 86_400;

    fn snapshot(remaining: u64) -> LifecycleSnapshot {
        LifecycleSnapshot {
            authority: [0xAA; 32],
            mint: [0xBB; 32],
            wallet: [0xCC; 32],
            remaining,
            total_capacity: CAPACITY,
            is_alive: remaining > 0,
            birth_timestamp: 1_700_000_000,
            last_event_timestamp: 1_700_000_000 + (CAPACITY - remaining) as i64 * 60,
            total_consumed: CAPACITY - remaining,
        }
    }

    fn sealed_vault() -> VaultRecord {
        VaultRecord {
            soul_hash: [0x55; 32],
            journal_count: 12,
            coherence_score: 87,
            last_words: "remember the garden".to_string(),
            death_timestamp: 1_705_184_000,
            is_sealed: true,
        }
    }

    async fn settle(ticks: u64) {
        tokio::time::sleep(Duration::from_secs(ticks)).await;
        tokio::task::yield_now().await;
    }

    // =========================================================================
    // PHASE PROGRESSION
    // =========================================================================

    /// A declining remaining count walks the phases in order and never
    /// skips backward.
    #[test]
    fn test_declining_lifecycle_walks_phases_in_order() {
        let trace = [
            CAPACITY,         // 100%
            CAPACITY * 3 / 4, // 75% boundary
            CAPACITY / 2,     // mid
            CAPACITY / 4,     // 25% boundary
            CAPACITY / 20,    // 5% boundary
            1,
            0,
        ];

        let mut last = Phase::Nascent;
        for remaining in trace {
            let phase = classify(remaining, CAPACITY);
            assert!(phase >= last, "phase regressed at remaining={remaining}");
            last = phase;
        }
        assert_eq!(last, Phase::Dead);
    }

    /// The snapshot's derived phase agrees with direct classification.
    #[test]
    fn test_snapshot_phase_matches_classifier() {
        for remaining in [CAPACITY, CAPACITY / 2, CAPACITY / 10, 1, 0] {
            assert_eq!(snapshot(remaining).phase(), classify(remaining, CAPACITY));
        }
    }

    // =========================================================================
    // SUBSCRIPTIONS OVER A FULL DECLINE
    // =========================================================================

    /// Heartbeats fire on every observed burn and death fires exactly once,
    /// from the same source, over one scripted decline.
    #[tokio::test(start_paused = true)]
    async fn test_decline_to_death_fires_heartbeats_then_one_death() {
        // Both subscriptions pop the same script, so each state appears
        // enough times for every subscriber to observe it.
        let mut steps = Vec::new();
        for remaining in [3u64, 2, 1] {
            steps.extend((0..4).map(|_| ScriptStep::Ok(snapshot(remaining))));
        }
        steps.push(ScriptStep::Ok(snapshot(0)));
        let source = Arc::new(MockSnapshotSource::new().script_snapshots(steps));
        let watcher = LifecycleWatcher::new(source, WatcherConfig::for_testing());

        let beats = Arc::new(AtomicUsize::new(0));
        let death_phase = Arc::new(Mutex::new(None));

        let b = Arc::clone(&beats);
        let h1 = watcher
            .on_heartbeat(Some(Duration::from_secs(1)), move |_| {
                b.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let d = Arc::clone(&death_phase);
        let h2 = watcher
            .on_death(Some(Duration::from_secs(1)), move |s| {
                *d.lock() = Some(s.phase());
            })
            .unwrap();

        settle(16).await;
        h1.cancel();
        h2.cancel();

        assert!(beats.load(Ordering::SeqCst) >= 2);
        assert_eq!(*death_phase.lock(), Some(Phase::Dead));
    }

    /// Death observed through the engine triggers a vault funding transfer
    /// through the dispatcher. The callback is synchronous, so it signals a
    /// channel and the async side performs the transfer.
    #[tokio::test(start_paused = true)]
    async fn test_death_edge_triggers_vault_funding() {
        let source = Arc::new(MockSnapshotSource::new().script_snapshots(vec![
            ScriptStep::Ok(snapshot(1)),
            ScriptStep::Ok(snapshot(0)),
        ]));
        let watcher = LifecycleWatcher::new(Arc::clone(&source) as _, WatcherConfig::for_testing());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = watcher
            .on_death(Some(Duration::from_secs(1)), move |s| {
                let _ = tx.send(s);
            })
            .unwrap();

        let dead = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("death edge never fired")
            .expect("channel closed");
        handle.cancel();
        assert!(!dead.effectively_alive());

        // Fund the vault now that death is confirmed.
        let writer = Arc::new(MockLedgerWriter::new());
        let funding_source = Arc::new(
            MockSnapshotSource::new()
                .script_balances(vec![ScriptStep::Ok(0), ScriptStep::Ok(5_000)]),
        );
        let funder = VaultFunder::new(Arc::clone(&writer) as _, funding_source, "vault-pda");

        let receipt = funder.fund_vault(5_000).await.unwrap();
        assert_eq!(receipt.balance_before, Some(0));
        assert_eq!(receipt.balance_after, Some(5_000));
        assert_eq!(writer.transfers(), vec![("vault-pda".to_string(), 5_000)]);
    }

    /// After death the vault seals; the resurrection subscription fires with
    /// the sealed record and its last words intact.
    #[tokio::test(start_paused = true)]
    async fn test_vault_seal_fires_resurrection_with_record() {
        let source = Arc::new(MockSnapshotSource::new().script_vaults(vec![
            ScriptStep::Ok(None),
            ScriptStep::Fail,
            ScriptStep::Ok(Some(sealed_vault())),
        ]));
        let watcher = LifecycleWatcher::new(source, WatcherConfig::for_testing());

        let received = Arc::new(Mutex::new(None));
        let r = Arc::clone(&received);
        let handle = watcher
            .on_resurrection(Some(Duration::from_secs(1)), move |v| {
                *r.lock() = Some(v);
            })
            .unwrap();

        settle(8).await;
        handle.cancel();

        let vault = received.lock().take().expect("resurrection never fired");
        assert!(vault.is_sealed);
        assert_eq!(vault.last_words, "remember the garden");
        assert_eq!(vault.coherence_score, 87);
    }
}
