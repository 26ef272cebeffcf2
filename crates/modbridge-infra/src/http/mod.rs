//! HTTP clients: the data-plane's view of a worker's control surface, a
//! worker's view of the data-plane and the upstream admin API, and the
//! Discord webhook notifier.

pub mod admin_api;
pub mod dataplane_client;
pub mod discord_webhook;
pub mod oauth;
pub mod worker_control;
