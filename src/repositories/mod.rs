mod subscription_store;

pub use subscription_store::*;
