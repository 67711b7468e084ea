pub mod app_state;
pub mod config;
pub mod domain;
pub mod repositories;
pub mod router;
pub(crate) mod routes;
