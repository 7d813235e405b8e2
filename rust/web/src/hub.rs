use gang_engine::player::ConnectionId;
use gang_engine::protocol::ServerMessage;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

pub type Outbox = mpsc::UnboundedSender<ServerMessage>;
pub type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

/// Outbound queues for every open socket, keyed by connection.
///
/// Queues are unbounded; each socket's writer task drains its own queue so
/// a slow client never holds up the table.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    inner: Arc<RwLock<HashMap<ConnectionId, Outbox>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a queue for `connection`, replacing any previous one.
    pub fn register(&self, connection: ConnectionId) -> Inbox {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(connection.clone(), tx);

        tracing::debug!(
            connection_id = %connection,
            connection_count = guard.len(),
            "outbox registered"
        );
        rx
    }

    /// Forgets the queue for `connection`. Returns whether one was open.
    pub fn unregister(&self, connection: &ConnectionId) -> bool {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(connection).is_some()
    }

    /// Queues `message` for one connection and reports whether it was
    /// queued. A queue whose receiver is gone is dropped on the first failed
    /// send; later sends to it find no queue and are only traced.
    pub fn send(&self, connection: &ConnectionId, message: ServerMessage) -> bool {
        let queued = {
            let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            guard.get(connection).map(|outbox| outbox.send(message).is_ok())
        };

        match queued {
            Some(true) => true,
            Some(false) => {
                if self.unregister(connection) {
                    tracing::warn!(
                        connection_id = %connection,
                        "dropping message for closed connection"
                    );
                }
                false
            }
            None => {
                tracing::debug!(connection_id = %connection, "no outbox for connection");
                false
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use gang_engine::errors::ActionError;
    use tracing::Level;

    fn ping() -> ServerMessage {
        ServerMessage::from(&ActionError::NotInGame)
    }

    #[test]
    fn send_reaches_only_the_addressed_connection() {
        let hub = Hub::new();
        let a = ConnectionId::from("a");
        let b = ConnectionId::from("b");
        let mut rx_a = hub.register(a.clone());
        let mut rx_b = hub.register(b);

        assert!(hub.send(&a, ping()));
        assert!(matches!(rx_a.try_recv(), Ok(ServerMessage::Error { .. })));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_pruned() {
        let hub = Hub::new();
        let a = ConnectionId::from("a");
        let rx = hub.register(a.clone());
        drop(rx);

        assert!(!hub.send(&a, ping()));
        assert_eq!(hub.connection_count(), 0);
        assert!(!hub.unregister(&a));
    }

    #[test]
    fn closed_connection_is_warned_about_once() {
        let logs = TestLogSubscriber::new();
        let hub = Hub::new();
        let a = ConnectionId::from("a");
        drop(hub.register(a.clone()));

        logs.capture(|| {
            for _ in 0..3 {
                assert!(!hub.send(&a, ping()));
            }
        });

        let warnings = logs.find(Level::WARN, "dropping message for closed connection");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field("connection_id"), Some("a"));
        assert_eq!(logs.find(Level::DEBUG, "no outbox for connection").len(), 2);
    }

    #[test]
    fn unregister_reports_whether_a_queue_was_open() {
        let hub = Hub::new();
        let a = ConnectionId::from("a");
        let _rx = hub.register(a.clone());

        assert!(hub.unregister(&a));
        assert!(!hub.unregister(&a));
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn unknown_connection_is_not_delivered() {
        let hub = Hub::new();
        assert!(!hub.send(&ConnectionId::from("ghost"), ping()));
    }
}
