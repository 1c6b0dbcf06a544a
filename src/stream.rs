//! Broadcast stream of estimated levels

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

/// Shared handle to an estimator's level output.
///
/// Clones refer to the same channel; every subscriber sees every level sent
/// after it subscribed, unless it falls behind by more than the channel
/// capacity.
#[derive(Debug, Clone)]
pub struct LevelStream {
    sender: Arc<broadcast::Sender<f64>>,
}

impl LevelStream {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Start receiving levels emitted from now on
    pub fn subscribe(&self) -> LevelReceiver {
        LevelReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// True when both handles point at the same channel
    pub fn same_stream(&self, other: &LevelStream) -> bool {
        Arc::ptr_eq(&self.sender, &other.sender)
    }

    /// Publish a level without waiting. Returns false when nobody received it.
    pub(crate) fn publish(&self, level: f64) -> bool {
        self.sender.send(level).is_ok()
    }
}

/// One consumer's view of a [`LevelStream`]
#[derive(Debug)]
pub struct LevelReceiver {
    receiver: broadcast::Receiver<f64>,
}

impl LevelReceiver {
    /// Wait for the next level.
    ///
    /// Skips over levels lost to lag. Returns `None` once every sender is gone
    /// and the backlog is drained.
    pub async fn recv(&mut self) -> Option<f64> {
        loop {
            match self.receiver.recv().await {
                Ok(level) => return Some(level),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "level receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next buffered level, if any, without waiting
    pub fn try_recv(&mut self) -> Option<f64> {
        loop {
            match self.receiver.try_recv() {
                Ok(level) => return Some(level),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "level receiver lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_channel() {
        let stream = LevelStream::new(8);
        let other = stream.clone();
        assert!(stream.same_stream(&other));
        assert!(!stream.same_stream(&LevelStream::new(8)));
    }

    #[test]
    fn test_publish_without_receivers_is_dropped() {
        let stream = LevelStream::new(8);
        assert_eq!(stream.receiver_count(), 0);
        assert!(!stream.publish(0.5));
    }

    #[test]
    fn test_every_subscriber_sees_levels_in_order() {
        let stream = LevelStream::new(8);
        let mut first = stream.subscribe();
        let mut second = stream.clone().subscribe();

        assert!(stream.publish(0.1));
        assert!(stream.publish(0.2));

        assert_eq!(first.try_recv(), Some(0.1));
        assert_eq!(first.try_recv(), Some(0.2));
        assert_eq!(first.try_recv(), None);
        assert_eq!(second.try_recv(), Some(0.1));
        assert_eq!(second.try_recv(), Some(0.2));
    }

    #[test]
    fn test_lagging_receiver_keeps_newest_levels() {
        let stream = LevelStream::new(2);
        let mut receiver = stream.subscribe();
        for level in [0.1, 0.2, 0.3, 0.4] {
            stream.publish(level);
        }

        assert_eq!(receiver.try_recv(), Some(0.3));
        assert_eq!(receiver.try_recv(), Some(0.4));
        assert_eq!(receiver.try_recv(), None);
    }

    #[tokio::test]
    async fn test_recv_ends_when_stream_dropped() {
        let stream = LevelStream::new(4);
        let mut receiver = stream.subscribe();
        stream.publish(0.7);
        drop(stream);

        assert_eq!(receiver.recv().await, Some(0.7));
        assert_eq!(receiver.recv().await, None);
    }
}
