use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::PushSettings,
    domain::{transport::PushTransport, NotificationDispatcher, SubscriptionRegistrar},
    repositories::SubscriptionStore,
};

#[derive(Clone)]
pub struct AppState {
    pub registrar: Arc<SubscriptionRegistrar>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub push: Arc<PushSettings>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        transport: Arc<dyn PushTransport>,
        push: PushSettings,
    ) -> Self {
        let registrar = Arc::new(SubscriptionRegistrar::new(store.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            store,
            transport,
            Duration::from_secs(push.delivery_timeout_secs),
            push.max_concurrent_deliveries,
        ));

        Self {
            registrar,
            dispatcher,
            push: Arc::new(push),
        }
    }
}
