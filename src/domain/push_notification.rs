use serde::Serialize;

/// The message delivered to every subscriber of one dispatch. Serialized
/// identically for all of them; the service worker on the client side reads
/// `title` and `body` to show the notification.
#[derive(Debug, Serialize)]
pub struct PushNotification {
    title: String,
    body: String,
}

impl From<&PushNotification> for Vec<u8> {
    fn from(notification: &PushNotification) -> Self {
        serde_json::to_vec(notification).expect("Could not serialize notification")
    }
}

impl PushNotification {
    pub fn new(title: &str, body: &str) -> Self {
        PushNotification {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}
