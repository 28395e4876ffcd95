//! Topic to subscriber routing for incoming MQTT publishes.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use telebridge_domain::payload::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Subscriber channels keyed by exact topic.
pub(crate) struct Subscriptions {
    capacity: usize,
    senders: Mutex<HashMap<String, Vec<mpsc::Sender<Message>>>>,
}

impl Subscriptions {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Add a subscriber on `topic`.
    pub(crate) fn register(&self, topic: &str) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Topics with at least one live subscriber.
    pub(crate) fn topics(&self) -> Vec<String> {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, list)| list.iter().any(|tx| !tx.is_closed()))
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Decode `frame` and hand it to every subscriber on `topic`.
    ///
    /// Never waits on a subscriber, so the event loop keeps running when one
    /// stops reading. Returns the number of subscribers the message was
    /// delivered to.
    pub(crate) fn dispatch(&self, topic: &str, frame: &[u8]) -> usize {
        let senders = {
            let map = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
            match map.get(topic) {
                Some(list) => list.clone(),
                None => return 0,
            }
        };

        let message = match Message::from_bytes(frame) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(topic, error = %err, "dropping undecodable frame");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut closed = false;
        for sender in &senders {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(topic, "subscriber lagging, message dropped");
                }
                Err(TrySendError::Closed(_)) => closed = true,
            }
        }

        if closed {
            let mut map = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(list) = map.get_mut(topic) {
                list.retain(|tx| !tx.is_closed());
                if list.is_empty() {
                    map.remove(topic);
                }
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telebridge_domain::payload::{LIGHT_STATE, PayloadObject};

    fn frame(byte: u8) -> (Message, Vec<u8>) {
        let message = Message::single(PayloadObject::new(LIGHT_STATE, vec![byte]));
        let bytes = message.to_bytes().unwrap();
        (message, bytes)
    }

    #[tokio::test]
    async fn should_route_frame_to_matching_topic() {
        let subscriptions = Subscriptions::new(4);
        let mut rx = subscriptions.register("a/slot/state");
        let mut other = subscriptions.register("b/slot/state");
        let (message, bytes) = frame(1);

        assert_eq!(subscriptions.dispatch("a/slot/state", &bytes), 1);

        assert_eq!(rx.recv().await.unwrap(), message);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_skip_full_subscriber_and_serve_the_rest() {
        let subscriptions = Subscriptions::new(1);
        let _idle = subscriptions.register("a/slot/state");
        let mut active = subscriptions.register("a/slot/state");

        for byte in 0..3 {
            let (message, bytes) = frame(byte);
            let delivered = subscriptions.dispatch("a/slot/state", &bytes);
            assert_eq!(delivered, if byte == 0 { 2 } else { 1 });
            assert_eq!(active.recv().await.unwrap(), message);
        }
        assert_eq!(subscriptions.topics(), vec!["a/slot/state".to_string()]);
    }

    #[tokio::test]
    async fn should_drop_undecodable_frame() {
        let subscriptions = Subscriptions::new(4);
        let mut rx = subscriptions.register("a/slot/state");

        assert_eq!(subscriptions.dispatch("a/slot/state", &[0xff, 0x00]), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_ignore_topics_without_subscribers() {
        let subscriptions = Subscriptions::new(4);
        let (_, bytes) = frame(2);

        assert_eq!(subscriptions.dispatch("nobody/listens", &bytes), 0);
    }

    #[tokio::test]
    async fn should_forget_topic_once_all_receivers_dropped() {
        let subscriptions = Subscriptions::new(4);
        let rx = subscriptions.register("a/slot/state");
        assert_eq!(subscriptions.topics(), vec!["a/slot/state".to_string()]);

        drop(rx);
        let (_, bytes) = frame(3);
        assert_eq!(subscriptions.dispatch("a/slot/state", &bytes), 0);

        assert!(subscriptions.topics().is_empty());
    }
}
