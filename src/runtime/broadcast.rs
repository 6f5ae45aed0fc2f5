/// Step notification fan-out using a tokio broadcast channel
///
/// The runner publishes one `LogEntry` per executed step; every subscriber
/// gets every entry. Publishing never blocks and never fails the run: no
/// subscribers means the entry is simply dropped, and a subscriber that
/// falls behind the channel capacity lags on its own receiver without
/// affecting anyone else.

use crate::workflow::types::LogEntry;
use tokio::sync::broadcast;

pub struct StepBroadcaster {
    tx: broadcast::Sender<LogEntry>,
}

impl StepBroadcaster {
    /// Channel capacity bounds how far a slow subscriber may fall behind
    /// before it starts missing entries.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a step notification, fire-and-forget
    pub fn publish(&self, entry: LogEntry) {
        // Send only errors when there are no receivers; that is fine here
        let _ = self.tx.send(entry);
    }

    /// Subscribe to all step notifications from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StepBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
