//! Outbound push transport boundary.
//!
//! The dispatcher only ever sees the three-way [`DeliveryOutcome`]
//! classification; how a concrete transport maps its protocol errors onto it
//! is its own business. `webpush` is the production adapter, `mock` is the
//! scripted test double.

mod mock;
mod webpush;

pub use mock::MockPushTransport;
pub use webpush::WebPushTransport;

use async_trait::async_trait;

use super::PushSubscription;

/// Result of one delivery attempt to one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The push service accepted the message.
    Delivered,
    /// The push service reported the endpoint as permanently invalid
    /// (HTTP 410 Gone or equivalent). The subscription must be pruned.
    Gone,
    /// Any other delivery error, including timeouts. The subscription is
    /// retained; a later dispatch may still reach it.
    TransientFailure,
}

/// The transport as a whole cannot be invoked, e.g. the VAPID signing key is
/// missing or malformed. Fatal to the entire dispatch, unlike a
/// per-subscriber [`DeliveryOutcome`].
#[derive(Debug, thiserror::Error)]
#[error("push transport unavailable: {0}")]
pub struct TransportUnavailable(pub String);

#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Attempt delivery of `payload` to a single subscriber.
    ///
    /// Per-subscriber failures are data, not errors: they come back as a
    /// [`DeliveryOutcome`]. An `Err` means the transport itself is unusable
    /// and the whole dispatch should be aborted.
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<DeliveryOutcome, TransportUnavailable>;
}
