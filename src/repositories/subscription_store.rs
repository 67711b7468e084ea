use std::collections::{hash_map::Entry, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::PushSubscription;

/// Authoritative set of active subscriptions, keyed by endpoint.
///
/// Async and object-safe so the in-memory implementation can be swapped for a
/// durable one without touching the registrar or dispatcher.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert the subscription unless one with the same endpoint already
    /// exists. Returns whether an insert occurred.
    async fn add(&self, subscription: PushSubscription) -> bool;

    /// Remove the subscription with this endpoint. A no-op (returning false)
    /// when the endpoint is unknown.
    async fn remove_by_endpoint(&self, endpoint: &str) -> bool;

    /// Point-in-time copy of all current subscriptions, in no particular
    /// order. Mutations after the call do not affect the returned sequence.
    async fn snapshot(&self) -> Vec<PushSubscription>;
}

/// Process-lifetime store; subscriptions do not survive a restart.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<HashMap<String, PushSubscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn add(&self, subscription: PushSubscription) -> bool {
        let mut subscriptions = self.subscriptions.write().await;
        match subscriptions.entry(subscription.endpoint.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(subscription);
                true
            }
        }
    }

    async fn remove_by_endpoint(&self, endpoint: &str) -> bool {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(endpoint).is_some()
    }

    async fn snapshot(&self) -> Vec<PushSubscription> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(endpoint: &str) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.to_string(),
            auth: "auth-secret".to_string(),
            p256dh: "p256dh-key".to_string(),
        }
    }

    #[tokio::test]
    async fn add_is_idempotent_per_endpoint() {
        let store = InMemorySubscriptionStore::new();

        assert!(store.add(subscription("https://push.example/a")).await);
        assert!(!store.add(subscription("https://push.example/a")).await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].endpoint, "https://push.example/a");
    }

    #[tokio::test]
    async fn remove_missing_endpoint_is_a_noop() {
        let store = InMemorySubscriptionStore::new();
        store.add(subscription("https://push.example/a")).await;

        assert!(!store.remove_by_endpoint("https://push.example/b").await);
        assert_eq!(store.snapshot().await.len(), 1);

        assert!(store.remove_by_endpoint("https://push.example/a").await);
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_unaffected_by_later_mutations() {
        let store = InMemorySubscriptionStore::new();
        store.add(subscription("https://push.example/a")).await;

        let snapshot = store.snapshot().await;
        store.add(subscription("https://push.example/b")).await;
        store.remove_by_endpoint("https://push.example/a").await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].endpoint, "https://push.example/a");
    }

    #[tokio::test]
    async fn concurrent_mutations_never_lose_or_duplicate_entries() {
        let store = std::sync::Arc::new(InMemorySubscriptionStore::new());

        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let endpoint = format!("https://push.example/{}", i % 10);
                store.add(subscription(&endpoint)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 10);

        let mut endpoints: Vec<_> = snapshot.into_iter().map(|s| s.endpoint).collect();
        endpoints.sort();
        endpoints.dedup();
        assert_eq!(endpoints.len(), 10);
    }
}
