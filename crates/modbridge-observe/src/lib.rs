//! Tracing subscriber setup shared by the data-plane, worker, and manager
//! binaries.

pub mod tracing_setup;
