mod dispatcher;
mod push_notification;
mod push_subscription;
mod registrar;
pub mod transport;

pub use dispatcher::*;
pub use push_notification::*;
pub use push_subscription::*;
pub use registrar::*;
