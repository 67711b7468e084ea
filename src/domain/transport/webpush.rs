use async_trait::async_trait;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignature, VapidSignatureBuilder,
    WebPushClient, WebPushError, WebPushMessage, WebPushMessageBuilder, URL_SAFE,
};

use crate::config::PushSettings;
use crate::domain::PushSubscription;

use super::{DeliveryOutcome, PushTransport, TransportUnavailable};

/// Production transport: VAPID-signed, AES-128-GCM-encrypted web push via the
/// browser vendors' push services.
pub struct WebPushTransport {
    client: IsahcWebPushClient,
    vapid_private_key: String,
    vapid_subject: String,
}

impl WebPushTransport {
    /// Validates the signing key up front so a misconfigured deployment fails
    /// at startup instead of on the first dispatch.
    pub fn new(settings: &PushSettings) -> Result<Self, WebPushError> {
        VapidSignatureBuilder::from_base64_no_sub(&settings.vapid_private_key, URL_SAFE)?;

        Ok(Self {
            client: IsahcWebPushClient::new()?,
            vapid_private_key: settings.vapid_private_key.clone(),
            vapid_subject: settings.vapid_subject.clone(),
        })
    }

    fn vapid_signature(&self, sub_info: &SubscriptionInfo) -> Result<VapidSignature, WebPushError> {
        let mut sig_builder =
            VapidSignatureBuilder::from_base64(&self.vapid_private_key, URL_SAFE, sub_info)?;
        sig_builder.add_claim("sub", self.vapid_subject.as_str());
        sig_builder.build()
    }

    fn build_message(
        &self,
        sub_info: &SubscriptionInfo,
        signature: VapidSignature,
        payload: &[u8],
    ) -> Result<WebPushMessage, WebPushError> {
        let mut builder = WebPushMessageBuilder::new(sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(signature);
        builder.build()
    }
}

/// Map a protocol error onto the three-way outcome. Only an explicit
/// "endpoint is permanently invalid" signal counts as `Gone`; everything
/// ambiguous (timeouts, 5xx, rate limiting) is transient and must never
/// trigger pruning.
fn classify(endpoint: &str, err: WebPushError) -> DeliveryOutcome {
    match err {
        WebPushError::EndpointNotValid | WebPushError::EndpointNotFound => {
            tracing::info!("Subscription {} is gone, pruning", endpoint);
            DeliveryOutcome::Gone
        }
        other => {
            tracing::error!("Failed to send notification to {}: {}", endpoint, other);
            DeliveryOutcome::TransientFailure
        }
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<DeliveryOutcome, TransportUnavailable> {
        let sub_info = subscription.as_subscription_info();

        let signature = match self.vapid_signature(&sub_info) {
            Ok(signature) => signature,
            // The endpoint URL feeds the `aud` claim, so a malformed endpoint
            // surfaces here; that is a per-subscriber problem, not a signing
            // configuration one.
            Err(err @ WebPushError::InvalidUri) => {
                return Ok(classify(&subscription.endpoint, err))
            }
            Err(err) => return Err(TransportUnavailable(err.to_string())),
        };

        let message = match self.build_message(&sub_info, signature, payload) {
            Ok(message) => message,
            Err(err) => return Ok(classify(&subscription.endpoint, err)),
        };

        match self.client.send(message).await {
            Ok(()) => Ok(DeliveryOutcome::Delivered),
            Err(err) => Ok(classify(&subscription.endpoint, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_endpoint_invalidity_is_gone() {
        let endpoint = "https://push.example/a";

        assert_eq!(
            classify(endpoint, WebPushError::EndpointNotValid),
            DeliveryOutcome::Gone
        );
        assert_eq!(
            classify(endpoint, WebPushError::EndpointNotFound),
            DeliveryOutcome::Gone
        );
    }

    #[test]
    fn ambiguous_errors_are_transient() {
        let endpoint = "https://push.example/a";

        assert_eq!(
            classify(endpoint, WebPushError::Unspecified),
            DeliveryOutcome::TransientFailure
        );
        assert_eq!(
            classify(endpoint, WebPushError::InvalidUri),
            DeliveryOutcome::TransientFailure
        );
        assert_eq!(
            classify(endpoint, WebPushError::InvalidResponse),
            DeliveryOutcome::TransientFailure
        );
    }
}
