//! Concrete implementations of `modbridge-core`'s repository ports, plus the
//! HTTP clients and upstream chat transport the worker and manager binaries
//! drive.

pub mod config;
pub mod http;
pub mod sqlite;
pub mod upstream;
