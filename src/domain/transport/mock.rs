//! Mock push transport for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::PushSubscription;

use super::{DeliveryOutcome, PushTransport, TransportUnavailable};

/// Mock transport that returns scripted outcomes per endpoint and records
/// every payload it was asked to deliver.
///
/// Endpoints without a scripted outcome report `Delivered`.
#[derive(Clone, Default)]
pub struct MockPushTransport {
    outcomes: Arc<Mutex<HashMap<String, DeliveryOutcome>>>,
    sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    unavailable: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
}

impl MockPushTransport {
    /// Create a mock that delivers everything successfully.
    pub fn delivering() -> Self {
        Self::default()
    }

    /// Script the outcome for one endpoint.
    pub fn with_outcome(self, endpoint: &str, outcome: DeliveryOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), outcome);
        self
    }

    /// Make every `send` fail with [`TransportUnavailable`].
    pub fn unavailable(reason: &str) -> Self {
        Self {
            unavailable: Arc::new(Mutex::new(Some(reason.to_string()))),
            ..Self::default()
        }
    }

    /// Sleep this long before answering, to exercise delivery timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every `(endpoint, payload)` pair passed to `send`, in completion order.
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PushTransport for MockPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<DeliveryOutcome, TransportUnavailable> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = self.unavailable.lock().unwrap().clone() {
            return Err(TransportUnavailable(reason));
        }

        self.sent
            .lock()
            .unwrap()
            .push((subscription.endpoint.clone(), payload.to_vec()));

        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .get(&subscription.endpoint)
            .copied()
            .unwrap_or(DeliveryOutcome::Delivered))
    }
}
