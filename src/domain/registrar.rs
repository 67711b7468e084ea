use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::repositories::SubscriptionStore;

use super::PushSubscription;

/// Subscription descriptor as submitted by a browser client: the JSON shape
/// of `PushSubscription.toJSON()`. Fields are lenient here so validation can
/// produce a proper error instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionDescriptor {
    #[serde(default)]
    pub endpoint: String,
    pub keys: Option<SubscriptionKeys>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub already_registered: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("subscription endpoint must be a non-empty string")]
    MissingEndpoint,
    #[error("subscription keys (p256dh, auth) are required")]
    MissingKeys,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Validates and registers subscription descriptors. Registration is
/// idempotent: the endpoint is the identity key, so re-registering an already
/// known subscription leaves the store unchanged.
pub struct SubscriptionRegistrar {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionRegistrar {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn register(
        &self,
        descriptor: SubscriptionDescriptor,
    ) -> Result<RegistrationResult, ValidationError> {
        let keys = descriptor.keys.ok_or(ValidationError::MissingKeys)?;
        if descriptor.endpoint.trim().is_empty() {
            return Err(ValidationError::MissingEndpoint);
        }

        let subscription = PushSubscription {
            endpoint: descriptor.endpoint,
            auth: keys.auth,
            p256dh: keys.p256dh,
        };

        let inserted = self.store.add(subscription).await;
        Ok(RegistrationResult {
            already_registered: !inserted,
        })
    }

    /// Explicit unregistration; a no-op for unknown endpoints.
    pub async fn unregister(&self, endpoint: &str) -> bool {
        self.store.remove_by_endpoint(endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemorySubscriptionStore;

    fn descriptor(endpoint: &str) -> SubscriptionDescriptor {
        SubscriptionDescriptor {
            endpoint: endpoint.to_string(),
            keys: Some(SubscriptionKeys {
                p256dh: "p256dh-key".to_string(),
                auth: "auth-secret".to_string(),
            }),
        }
    }

    fn registrar() -> (SubscriptionRegistrar, Arc<InMemorySubscriptionStore>) {
        let store = Arc::new(InMemorySubscriptionStore::new());
        (SubscriptionRegistrar::new(store.clone()), store)
    }

    #[tokio::test]
    async fn registering_twice_keeps_one_entry_and_reports_it() {
        let (registrar, store) = registrar();

        let first = registrar
            .register(descriptor("https://push.example/a"))
            .await
            .unwrap();
        assert!(!first.already_registered);

        let second = registrar
            .register(descriptor("https://push.example/a"))
            .await
            .unwrap();
        assert!(second.already_registered);

        assert_eq!(store.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_endpoint_is_rejected_and_store_untouched() {
        let (registrar, store) = registrar();

        let err = registrar
            .register(descriptor(""))
            .await
            .expect_err("empty endpoint must not register");
        assert!(matches!(err, ValidationError::MissingEndpoint));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn missing_keys_are_rejected() {
        let (registrar, store) = registrar();

        let err = registrar
            .register(SubscriptionDescriptor {
                endpoint: "https://push.example/a".to_string(),
                keys: None,
            })
            .await
            .expect_err("missing keys must not register");
        assert!(matches!(err, ValidationError::MissingKeys));
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn unregister_removes_only_the_named_endpoint() {
        let (registrar, store) = registrar();
        registrar
            .register(descriptor("https://push.example/a"))
            .await
            .unwrap();
        registrar
            .register(descriptor("https://push.example/b"))
            .await
            .unwrap();

        assert!(registrar.unregister("https://push.example/a").await);
        assert!(!registrar.unregister("https://push.example/a").await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].endpoint, "https://push.example/b");
    }
}
