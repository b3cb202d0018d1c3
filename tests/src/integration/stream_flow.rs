//! # Stream Flow Integration
//!
//! Drives the streaming transport with scripted connections and verifies
//! that pushed events reach handlers, survive reconnects, and can trigger
//! the funding dispatcher.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use vigil_client::{MockLedgerWriter, MockSnapshotSource, ScriptStep, VaultFunder};
    use vigil_stream::{
        ConnectionState, MockChannel, MockScript, StreamConfig, StreamingTransport, EVENT_DEATH,
        WILDCARD,
    };

    fn frame(event_type: &str) -> String {
        serde_json::json!({ "type": event_type }).to_string()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
    }

    /// A pushed death event, received over the transport, drives a vault
    /// funding transfer. Handlers are synchronous, so the handler signals a
    /// channel and the async side funds.
    #[tokio::test(start_paused = true)]
    async fn test_pushed_death_event_drives_funding() {
        let channel = Arc::new(MockChannel::new(vec![MockScript::holding(vec![
            frame("status"),
            frame("heartbeat"),
            frame("death"),
        ])]));
        let mut config = StreamConfig::for_testing();
        config.auto_reconnect = false;
        let transport = StreamingTransport::new(channel, config);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        transport.on(EVENT_DEATH, move |_| {
            let _ = tx.send(());
        });

        transport.connect();
        tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("death event never arrived")
            .expect("channel closed");
        transport.disconnect();

        let writer = Arc::new(MockLedgerWriter::new());
        let source = Arc::new(
            MockSnapshotSource::new()
                .script_balances(vec![ScriptStep::Ok(100), ScriptStep::Ok(2_100)]),
        );
        let funder = VaultFunder::new(Arc::clone(&writer) as _, source, "vault-pda");

        let receipt = funder.fund_vault(2_000).await.unwrap();
        assert!(receipt.signature.starts_with("mock-signature"));
        assert_eq!(writer.transfers(), vec![("vault-pda".to_string(), 2_000)]);
    }

    /// Handlers registered before a reconnect keep receiving events after
    /// it; the transport reconnects once and stays connected.
    #[tokio::test(start_paused = true)]
    async fn test_handlers_survive_reconnect() {
        let channel = Arc::new(MockChannel::new(vec![
            MockScript::closing(vec![frame("heartbeat")]),
            MockScript::holding(vec![frame("heartbeat")]),
        ]));
        let transport =
            StreamingTransport::new(Arc::clone(&channel) as _, StreamConfig::for_testing());

        let beats = Arc::new(AtomicUsize::new(0));
        let b = Arc::clone(&beats);
        transport.on("heartbeat", move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        });

        transport.connect();
        settle().await;

        assert_eq!(beats.load(Ordering::SeqCst), 2);
        assert_eq!(channel.open_count(), 2);
        assert_eq!(transport.state(), ConnectionState::Connected);

        transport.disconnect();
        settle().await;
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }

    /// Malformed frames interleaved with real ones are dropped without
    /// disturbing dispatch, and wildcard handlers see synthetic transport
    /// events alongside server events.
    #[tokio::test(start_paused = true)]
    async fn test_wildcard_sees_synthetic_and_server_events_only() {
        let channel = Arc::new(MockChannel::new(vec![MockScript::closing(vec![
            "garbage{{".into(),
            frame("status"),
            r#"{"type":42}"#.into(),
        ])]));
        let mut config = StreamConfig::for_testing();
        config.auto_reconnect = false;
        let transport = StreamingTransport::new(channel, config);

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        transport.on(WILDCARD, move |e| s.lock().push(e.event_type.clone()));

        transport.connect();
        settle().await;

        assert_eq!(*seen.lock(), vec!["connected", "status", "disconnected"]);
    }
}
