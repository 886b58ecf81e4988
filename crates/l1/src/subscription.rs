use crate::L1ClientError;

use alloy_rpc_types_eth::Log;
use futures::{Stream, StreamExt};
use tokio::{sync::mpsc, task::AbortHandle};

/// Channel capacity for buffered events and errors.
const CHANNEL_CAPACITY: usize = 64;

/// A live contract event subscription.
///
/// Decoded events arrive on [`EventSubscription::events`], transport errors on
/// [`EventSubscription::errors`]. Dropping the subscription stops the
/// underlying poller.
#[derive(Debug)]
pub struct EventSubscription<T> {
    /// Decoded events.
    pub events: mpsc::Receiver<T>,
    /// Errors raised by the underlying poller.
    pub errors: mpsc::Receiver<L1ClientError>,
    abort: Option<AbortHandle>,
}

impl<T: Send + 'static> EventSubscription<T> {
    /// Spawns a task draining the event stream into the subscription channels.
    pub fn spawn<S, E, F>(stream: S, map: F) -> Self
    where
        S: Stream<Item = Result<(E, Log), L1ClientError>> + Send + 'static,
        E: Send + 'static,
        F: Fn(E) -> T + Send + 'static,
    {
        let (event_tx, events) = mpsc::channel(CHANNEL_CAPACITY);
        let (error_tx, errors) = mpsc::channel(CHANNEL_CAPACITY);

        let handle = tokio::spawn(async move {
            futures::pin_mut!(stream);
            while let Some(item) = stream.next().await {
                let delivered = match item {
                    Ok((event, _)) => event_tx.send(map(event)).await.is_ok(),
                    Err(err) => error_tx.send(err.into()).await.is_ok(),
                };
                // the receiving side is gone, stop polling.
                if !delivered {
                    break;
                }
            }
        });

        Self { events, errors, abort: Some(handle.abort_handle()) }
    }

    /// Creates a subscription fed manually through the returned senders.
    pub fn channel() -> (mpsc::Sender<T>, mpsc::Sender<L1ClientError>, Self) {
        let (event_tx, events) = mpsc::channel(CHANNEL_CAPACITY);
        let (error_tx, errors) = mpsc::channel(CHANNEL_CAPACITY);
        (event_tx, error_tx, Self { events, errors, abort: None })
    }

    /// Tears the subscription down, stopping the underlying poller.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for EventSubscription<T> {
    fn drop(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_forwards_events_and_errors() {
        let stream = futures::stream::iter(vec![
            Ok((7u64, Log::default())),
            Err(L1ClientError::Contract(alloy_contract::Error::UnknownFunction("f".to_string()))),
            Ok((9u64, Log::default())),
        ]);

        let mut sub = EventSubscription::spawn(stream, |n| n * 2);
        assert_eq!(sub.events.recv().await, Some(14));
        assert!(sub.errors.recv().await.is_some());
        assert_eq!(sub.events.recv().await, Some(18));
    }

    #[tokio::test]
    async fn test_manual_channel_subscription() {
        let (event_tx, _error_tx, mut sub) = EventSubscription::<u64>::channel();
        event_tx.send(1).await.unwrap();
        assert_eq!(sub.events.recv().await, Some(1));
    }
}
