//! Bus port — the shared messaging bus readings are published on.

use std::future::Future;
use std::sync::Arc;

use telebridge_domain::error::BusError;
use telebridge_domain::payload::Message;
use tokio::sync::mpsc;

/// Publish/subscribe access to the messaging bus.
///
/// URIs are slash-separated paths built by [`Interface`](crate::interface::Interface).
pub trait Bus: Send + Sync {
    /// Emit `message` on `uri`.
    fn publish(
        &self,
        uri: &str,
        message: Message,
    ) -> impl Future<Output = Result<(), BusError>> + Send;

    /// Receive every message published on `uri` from now on.
    ///
    /// The receiver yields `None` once the subscription is closed.
    fn subscribe(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<Message>, BusError>> + Send;

    /// Attach a static metadata pair to `uri`.
    fn set_metadata(
        &self,
        uri: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BusError>> + Send;
}

impl<T: Bus> Bus for Arc<T> {
    fn publish(
        &self,
        uri: &str,
        message: Message,
    ) -> impl Future<Output = Result<(), BusError>> + Send {
        (**self).publish(uri, message)
    }

    fn subscribe(
        &self,
        uri: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<Message>, BusError>> + Send {
        (**self).subscribe(uri)
    }

    fn set_metadata(
        &self,
        uri: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), BusError>> + Send {
        (**self).set_metadata(uri, key, value)
    }
}
