//! Repository trait definitions ("ports") implemented by `modbridge-infra`.
//!
//! Uses native async fn in traits (edition 2024, no `async_trait` macro).

pub mod bot;
pub mod entity;
pub mod manager_relation;
pub mod preset;
pub mod profanity;
pub mod relation;
