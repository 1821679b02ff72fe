//! WebSocket Connection Hub
//!
//! Manages all WebSocket connections and fans hardware events out to them.
//! Events are queued on an unbounded channel drained by a single worker, so
//! every client sees them in publish order and none are dropped. A lossy
//! broadcast tap is kept for in-process observers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::messages::ServerMessage;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Manages all WebSocket connections
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// Event queue drained by the broadcast worker
    queue_tx: mpsc::UnboundedSender<ServerMessage>,
    /// Receiving end, taken when the worker starts
    queue_rx: Mutex<Option<mpsc::UnboundedReceiver<ServerMessage>>>,
    /// Copies of published events for observers
    observers_tx: broadcast::Sender<ServerMessage>,
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Capacity of the observer channel behind [`ConnectionHub::subscribe_broadcast`].
    /// Observers that fall further behind miss events; clients never do.
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 32,
            broadcast_capacity: 256,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (observers_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            connections: RwLock::new(HashMap::new()),
            queue_tx,
            queue_rx: Mutex::new(Some(queue_rx)),
            observers_tx,
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(id.clone(), ConnectionHandle { sender });

        tracing::info!(
            connection_id = %id,
            total_clients = connections.len(),
            "Client connected"
        );
        Ok(id)
    }

    /// Unregister a connection
    pub async fn unregister(&self, id: &str) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            tracing::info!(
                connection_id = %id,
                remaining_clients = connections.len(),
                "Client removed"
            );
        }
    }

    /// Deliver a message to every connection, dropping the ones that are gone
    ///
    /// Returns the number of connections the message was handed to.
    pub async fn broadcast(&self, message: &ServerMessage) -> usize {
        let mut disconnected = Vec::new();
        let mut sent_count = 0;
        {
            let connections = self.connections.read().await;
            for (id, handle) in connections.iter() {
                if handle.sender.send(message.clone()).is_ok() {
                    sent_count += 1;
                } else {
                    disconnected.push(id.clone());
                }
            }
        }

        if !disconnected.is_empty() {
            let mut connections = self.connections.write().await;
            for id in disconnected {
                connections.remove(&id);
                tracing::debug!(connection_id = %id, "Dropped closed connection");
            }
        }

        tracing::trace!(event = message.kind(), clients = sent_count, "Broadcast event");
        sent_count
    }

    /// Queue an event for the broadcast worker
    pub fn publish(&self, message: ServerMessage) {
        let _ = self.observers_tx.send(message.clone());
        if self.queue_tx.send(message).is_err() {
            tracing::debug!("Broadcast worker stopped, event dropped");
        }
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Get a receiver for published events
    ///
    /// Bounded by [`HubConfig::broadcast_capacity`]; a receiver that lags
    /// further behind skips events.
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<ServerMessage> {
        self.observers_tx.subscribe()
    }

    /// Forward queued events to all connections until shutdown
    ///
    /// Events published before the worker starts are delivered once it runs.
    /// Returns `None` if a worker was already started.
    pub fn start_broadcast_worker(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        let taken = self.queue_rx.lock().ok().and_then(|mut rx| rx.take());
        let Some(mut events) = taken else {
            tracing::warn!("Broadcast worker already running");
            return None;
        };

        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Some(message) => {
                            self.broadcast(&message).await;
                        }
                        None => break,
                    },
                    _ = shutdown.changed() => break,
                }
            }
            tracing::debug!("Broadcast worker stopped");
        }))
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 32);
        assert_eq!(config.broadcast_capacity, 256);
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let config = HubConfig {
            max_connections: 2,
            broadcast_capacity: 16,
        };
        let hub = ConnectionHub::new(config);

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let (tx3, _rx3) = mpsc::unbounded_channel();

        let id1 = hub.register(tx1).await.unwrap();
        let id2 = hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));

        hub.unregister(&id1).await;
        hub.unregister(&id2).await;
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_client() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();

        let sent = hub.broadcast(&ServerMessage::LikeButton).await;
        assert_eq!(sent, 2);
        assert_eq!(rx1.try_recv().unwrap(), ServerMessage::LikeButton);
        assert_eq!(rx2.try_recv().unwrap(), ServerMessage::LikeButton);
    }

    #[tokio::test]
    async fn test_broadcast_drops_closed_connections() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        drop(rx1);

        let sent = hub.broadcast(&ServerMessage::MessageButton).await;
        assert_eq!(sent, 1);
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection() {
        let hub = ConnectionHub::new(HubConfig::default());
        let result = hub.send_to("missing", ServerMessage::LikeButton).await;
        assert!(matches!(result, Err(HubError::ConnectionNotFound)));
    }

    #[tokio::test]
    async fn test_worker_preserves_publish_order() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Arc::clone(&hub).start_broadcast_worker(shutdown_rx).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        for i in 0..10 {
            hub.publish(ServerMessage::ZoomDial {
                value: i as f64 / 10.0,
            });
        }

        for i in 0..10 {
            let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                msg,
                ServerMessage::ZoomDial {
                    value: i as f64 / 10.0
                }
            );
        }

        shutdown_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_burst_beyond_capacity_is_not_dropped() {
        let hub = Arc::new(ConnectionHub::new(HubConfig {
            max_connections: 4,
            broadcast_capacity: 16,
        }));
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(tx).await.unwrap();

        // Queue far more than the observer capacity before the worker runs
        for i in 0..1000 {
            hub.publish(ServerMessage::ZoomDial {
                value: f64::from(i) / 1000.0,
            });
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Arc::clone(&hub).start_broadcast_worker(shutdown_rx).unwrap();

        for i in 0..1000 {
            let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(
                msg,
                ServerMessage::ZoomDial {
                    value: f64::from(i) / 1000.0
                }
            );
        }

        shutdown_tx.send(true).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_starts_once() {
        let hub = Arc::new(ConnectionHub::new(HubConfig::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = Arc::clone(&hub).start_broadcast_worker(shutdown_rx.clone());
        assert!(worker.is_some());
        assert!(Arc::clone(&hub).start_broadcast_worker(shutdown_rx).is_none());

        shutdown_tx.send(true).unwrap();
        worker.unwrap().await.unwrap();
    }
}
