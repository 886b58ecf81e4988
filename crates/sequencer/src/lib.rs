//! Tracker for the trusted sequencer identity registered on L1.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy_primitives::Address;
use da_node_l1::{L1Client, L1ClientError};
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

/// Configuration for the sequencer tracker subscriptions.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// The lifetime of a single subscription before it is re-established.
    pub timeout: Duration,
    /// The pause between failed subscription attempts.
    pub retry: Duration,
}

/// Tracks the trusted sequencer address and URL by following the rollup
/// contract's setter events.
///
/// The tracked state is only written by the two watcher loops spawned from
/// [`SequencerTracker::start`]; readers take the mutex for the duration of a
/// copy.
pub struct SequencerTracker {
    client: Arc<dyn L1Client>,
    state: Mutex<(Address, String)>,
    config: TrackerConfig,
}

impl SequencerTracker {
    /// Creates a new tracker, populating the initial sequencer identity from
    /// the rollup contract.
    pub async fn new(
        config: TrackerConfig,
        client: Arc<dyn L1Client>,
    ) -> Result<Self, L1ClientError> {
        tracing::info!(target: "danode::sequencer_tracker", "starting sequencer tracker");

        let addr = client.trusted_sequencer().await?;
        tracing::info!(target: "danode::sequencer_tracker", %addr, "current sequencer address");

        let url = client.trusted_sequencer_url().await?;
        tracing::info!(target: "danode::sequencer_tracker", %url, "current sequencer url");

        Ok(Self { client, state: Mutex::new((addr, url)), config })
    }

    /// Returns the last known address of the trusted sequencer.
    pub fn addr(&self) -> Address {
        self.state.lock().expect("tracker lock poisoned").0
    }

    /// Returns the last known URL of the trusted sequencer.
    pub fn url(&self) -> String {
        self.state.lock().expect("tracker lock poisoned").1.clone()
    }

    fn set_addr(&self, addr: Address) {
        self.state.lock().expect("tracker lock poisoned").0 = addr;
    }

    fn set_url(&self, url: String) {
        self.state.lock().expect("tracker lock poisoned").1 = url;
    }

    /// Spawns the address and URL watcher loops. Both run until `cancel`
    /// fires.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        vec![
            tokio::spawn(Arc::clone(self).watch_addr_changes(cancel.clone())),
            tokio::spawn(Arc::clone(self).watch_url_changes(cancel)),
        ]
    }

    async fn watch_addr_changes(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            // acquire a subscription, backing off until one is established.
            let mut sub = loop {
                if cancel.is_cancelled() {
                    return;
                }
                match self.client.watch_set_trusted_sequencer().await {
                    Ok(sub) => break sub,
                    Err(err) => {
                        tracing::error!(
                            target: "danode::sequencer_tracker",
                            ?err,
                            "error subscribing to trusted sequencer event, retrying"
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = time::sleep(self.config.retry) => {}
                        }
                    }
                }
            };

            // subscriptions have a finite lifetime; once the deadline fires
            // the subscription is dropped and re-established.
            let deadline = time::sleep(self.config.timeout);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    event = sub.events.recv() => match event {
                        Some(addr) => {
                            tracing::info!(target: "danode::sequencer_tracker", %addr, "new trusted sequencer address");
                            self.set_addr(addr);
                        }
                        None => break,
                    },
                    err = sub.errors.recv() => {
                        tracing::warn!(target: "danode::sequencer_tracker", ?err, "subscription error, resubscribing");
                        break;
                    }
                    _ = &mut deadline => break,
                    // dropping the subscription stops the poller.
                    _ = cancel.cancelled() => return,
                }
            }

            // tear the expired subscription down before re-establishing.
            sub.unsubscribe();
        }
    }

    async fn watch_url_changes(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            let mut sub = loop {
                if cancel.is_cancelled() {
                    return;
                }
                match self.client.watch_set_trusted_sequencer_url().await {
                    Ok(sub) => break sub,
                    Err(err) => {
                        tracing::error!(
                            target: "danode::sequencer_tracker",
                            ?err,
                            "error subscribing to trusted sequencer url event, retrying"
                        );
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = time::sleep(self.config.retry) => {}
                        }
                    }
                }
            };

            let deadline = time::sleep(self.config.timeout);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    event = sub.events.recv() => match event {
                        Some(url) => {
                            tracing::info!(target: "danode::sequencer_tracker", %url, "new trusted sequencer url");
                            self.set_url(url);
                        }
                        None => break,
                    },
                    err = sub.errors.recv() => {
                        tracing::warn!(target: "danode::sequencer_tracker", ?err, "subscription error, resubscribing");
                        break;
                    }
                    _ = &mut deadline => break,
                    // dropping the subscription stops the poller.
                    _ = cancel.cancelled() => return,
                }
            }

            // tear the expired subscription down before re-establishing.
            sub.unsubscribe();
        }
    }
}

impl fmt::Debug for SequencerTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencerTracker")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use da_node_l1::{EventSubscription, MockL1Client};
    use std::sync::Mutex as StdMutex;

    const SEQUENCER_URL: &str = "http://sequencer.example";

    fn tracker_config() -> TrackerConfig {
        TrackerConfig { timeout: Duration::from_secs(60), retry: Duration::from_millis(10) }
    }

    fn mock_with_identity(addr: Address, url: &str) -> MockL1Client {
        let url = url.to_owned();
        let mut client = MockL1Client::new();
        client.expect_trusted_sequencer().times(1).returning(move || Ok(addr));
        client.expect_trusted_sequencer_url().times(1).returning(move || Ok(url.clone()));
        client
    }

    async fn wait_until(mut predicate: impl FnMut() -> bool) {
        for _ in 0..100 {
            if predicate() {
                return;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_tracker_populates_initial_identity() -> eyre::Result<()> {
        let addr = Address::repeat_byte(0xaa);
        let client = mock_with_identity(addr, SEQUENCER_URL);

        let tracker = SequencerTracker::new(tracker_config(), Arc::new(client)).await?;
        assert_eq!(tracker.addr(), addr);
        assert_eq!(tracker.url(), SEQUENCER_URL);

        Ok(())
    }

    #[tokio::test]
    async fn test_tracker_follows_address_and_url_events() -> eyre::Result<()> {
        let initial_addr = Address::repeat_byte(0xaa);
        let new_addr = Address::repeat_byte(0xbb);
        let new_url = "http://next-sequencer.example";

        let mut client = mock_with_identity(initial_addr, SEQUENCER_URL);

        // keep the channel senders alive for the duration of the test.
        let addr_senders = Arc::new(StdMutex::new(Vec::new()));
        let senders = Arc::clone(&addr_senders);
        client.expect_watch_set_trusted_sequencer().returning(move || {
            let (event_tx, error_tx, sub) = EventSubscription::channel();
            event_tx.try_send(new_addr).expect("channel has capacity");
            senders.lock().unwrap().push((event_tx, error_tx));
            Ok(sub)
        });

        let url_senders = Arc::new(StdMutex::new(Vec::new()));
        let senders = Arc::clone(&url_senders);
        client.expect_watch_set_trusted_sequencer_url().returning(move || {
            let (event_tx, error_tx, sub) = EventSubscription::channel();
            event_tx.try_send(new_url.to_owned()).expect("channel has capacity");
            senders.lock().unwrap().push((event_tx, error_tx));
            Ok(sub)
        });

        let tracker = Arc::new(SequencerTracker::new(tracker_config(), Arc::new(client)).await?);
        let cancel = CancellationToken::new();
        let handles = tracker.start(cancel.clone());

        wait_until(|| tracker.addr() == new_addr && tracker.url() == new_url).await;

        cancel.cancel();
        for handle in handles {
            handle.await?;
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_tracker_retries_failed_subscriptions() -> eyre::Result<()> {
        let addr = Address::repeat_byte(0xaa);
        let mut client = mock_with_identity(addr, SEQUENCER_URL);

        // fail the first attempt, then hand out a quiet subscription.
        let attempts = Arc::new(StdMutex::new(0u32));
        let senders = Arc::new(StdMutex::new(Vec::new()));
        let (attempts_in_mock, senders_in_mock) = (Arc::clone(&attempts), Arc::clone(&senders));
        client.expect_watch_set_trusted_sequencer().returning(move || {
            let mut attempts = attempts_in_mock.lock().unwrap();
            *attempts += 1;
            if *attempts == 1 {
                return Err(da_node_l1::L1ClientError::MissingBlock(0));
            }
            let (event_tx, error_tx, sub) = EventSubscription::channel();
            senders_in_mock.lock().unwrap().push((event_tx, error_tx));
            Ok(sub)
        });

        let url_senders = Arc::new(StdMutex::new(Vec::new()));
        let senders_in_mock = Arc::clone(&url_senders);
        client.expect_watch_set_trusted_sequencer_url().returning(move || {
            let (event_tx, error_tx, sub) = EventSubscription::channel();
            senders_in_mock.lock().unwrap().push((event_tx, error_tx));
            Ok(sub)
        });

        let tracker = Arc::new(SequencerTracker::new(tracker_config(), Arc::new(client)).await?);
        let cancel = CancellationToken::new();
        let handles = tracker.start(cancel.clone());

        wait_until(|| *attempts.lock().unwrap() >= 2).await;

        cancel.cancel();
        for handle in handles {
            handle.await?;
        }

        Ok(())
    }
}
