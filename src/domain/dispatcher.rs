use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use serde::Serialize;

use crate::repositories::SubscriptionStore;

use super::transport::{DeliveryOutcome, PushTransport, TransportUnavailable};
use super::PushNotification;

/// Aggregate outcome of one fan-out. `attempted` equals the snapshot size at
/// dispatch start, and `delivered + pruned + failed == attempted` always
/// holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub pruned: usize,
    pub failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    TransportUnavailable(#[from] TransportUnavailable),
}

/// Fans one payload out to every stored subscription and self-heals the store
/// by pruning subscriptions the transport reports as permanently gone.
pub struct NotificationDispatcher {
    store: Arc<dyn SubscriptionStore>,
    transport: Arc<dyn PushTransport>,
    delivery_timeout: Duration,
    max_concurrent_deliveries: usize,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        transport: Arc<dyn PushTransport>,
        delivery_timeout: Duration,
        max_concurrent_deliveries: usize,
    ) -> Self {
        Self {
            store,
            transport,
            delivery_timeout,
            max_concurrent_deliveries: max_concurrent_deliveries.max(1),
        }
    }

    /// Deliver `notification` to every subscription in a point-in-time
    /// snapshot of the store.
    ///
    /// Deliveries run concurrently (bounded) and independently: one
    /// subscriber's failure never prevents attempts to the others. Each
    /// snapshot member is attempted exactly once and shows up in exactly one
    /// report bucket. A delivery that exceeds the timeout counts as a
    /// transient failure, never as gone.
    pub async fn dispatch(
        &self,
        notification: &PushNotification,
    ) -> Result<DispatchReport, DispatchError> {
        let snapshot = self.store.snapshot().await;
        let payload: Vec<u8> = notification.into();

        tracing::info!("Sending notification to {} subscribers", snapshot.len());

        let payload = &payload;
        let outcomes: Vec<(String, Result<DeliveryOutcome, TransportUnavailable>)> =
            stream::iter(snapshot)
                .map(|subscription| async move {
                    let attempt = tokio::time::timeout(
                        self.delivery_timeout,
                        self.transport.send(&subscription, payload),
                    )
                    .await;

                    let outcome = match attempt {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::error!(
                                "Delivery to {} timed out after {:?}",
                                subscription.endpoint,
                                self.delivery_timeout
                            );
                            Ok(DeliveryOutcome::TransientFailure)
                        }
                    };

                    (subscription.endpoint, outcome)
                })
                .buffer_unordered(self.max_concurrent_deliveries)
                .collect()
                .await;

        let mut report = DispatchReport {
            attempted: outcomes.len(),
            ..DispatchReport::default()
        };
        let mut gone = Vec::new();

        for (endpoint, outcome) in outcomes {
            match outcome {
                Ok(DeliveryOutcome::Delivered) => report.delivered += 1,
                Ok(DeliveryOutcome::Gone) => {
                    report.pruned += 1;
                    gone.push(endpoint);
                }
                Ok(DeliveryOutcome::TransientFailure) => report.failed += 1,
                Err(err) => return Err(err.into()),
            }
        }

        // Prune only after every outcome is in, so the removed set is exactly
        // the set classified gone in this dispatch.
        for endpoint in &gone {
            self.store.remove_by_endpoint(endpoint).await;
        }

        tracing::info!(
            "Dispatch complete: {} delivered, {} pruned, {} failed",
            report.delivered,
            report.pruned,
            report.failed
        );

        Ok(report)
    }
}
