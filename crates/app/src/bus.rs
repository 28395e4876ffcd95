//! In-process bus backed by tokio [`mpsc`] channels.
//!
//! Used when the bridge runs without an external broker and as the bus
//! for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use telebridge_domain::error::BusError;
use telebridge_domain::payload::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::ports::Bus;

/// In-process bus with exact-match URI subscriptions.
///
/// Publishing never waits: with no active subscriber the message is
/// dropped, and a subscriber whose buffer is full misses it.
pub struct InProcessBus {
    capacity: usize,
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<Message>>>>,
    metadata: Mutex<HashMap<(String, String), String>>,
}

impl InProcessBus {
    /// Create a bus whose subscriptions buffer up to `capacity` messages.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Mutex::new(HashMap::new()),
            metadata: Mutex::new(HashMap::new()),
        }
    }

    /// Metadata value previously attached to `uri` under `key`.
    #[must_use]
    pub fn metadata(&self, uri: &str, key: &str) -> Option<String> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(uri.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of live subscriptions on `uri`.
    #[must_use]
    pub fn subscriber_count(&self, uri: &str) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Bus for InProcessBus {
    async fn publish(&self, uri: &str, message: Message) -> Result<(), BusError> {
        let senders = {
            let subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.get(uri).cloned().unwrap_or_default()
        };

        for sender in &senders {
            match sender.try_send(message.clone()) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(uri, "subscriber lagging, message dropped");
                }
            }
        }

        if senders.iter().any(mpsc::Sender::is_closed) {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(list) = subscribers.get_mut(uri) {
                list.retain(|tx| !tx.is_closed());
            }
        }
        Ok(())
    }

    async fn subscribe(&self, uri: &str) -> Result<mpsc::Receiver<Message>, BusError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(uri.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }

    async fn set_metadata(&self, uri: &str, key: &str, value: &str) -> Result<(), BusError> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((uri.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}
