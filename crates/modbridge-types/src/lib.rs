//! Shared domain types for the chat moderation fleet.
//!
//! This crate contains the core domain types used across the data-plane
//! service, the worker, and the manager: bots, entities (rooms), relations,
//! profanity configuration, presets, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod bot;
pub mod command_timer;
pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod profanity;
pub mod relation;
