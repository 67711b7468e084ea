use serde::{Deserialize, Serialize};

/// One client's push delivery capability. The `endpoint` is the identity key:
/// the store never holds two subscriptions with the same endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PushSubscription {
    pub endpoint: String,
    pub auth: String,
    pub p256dh: String,
}

impl PushSubscription {
    pub fn as_subscription_info(&self) -> web_push::SubscriptionInfo {
        web_push::SubscriptionInfo {
            endpoint: self.endpoint.clone(),
            keys: web_push::SubscriptionKeys {
                auth: self.auth.clone(),
                p256dh: self.p256dh.clone(),
            },
        }
    }
}
