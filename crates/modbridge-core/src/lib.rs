//! Pure, I/O-free domain logic shared by the data-plane, worker, and
//! manager binaries: repository ports, the moderation pipeline, and the
//! worker/manager state machines.

pub mod manager;
pub mod moderation;
pub mod repository;
pub mod worker;
