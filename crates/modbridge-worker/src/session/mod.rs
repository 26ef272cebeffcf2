//! The single-actor session layer: commands, JID resolution, moderation
//! state caching, and the driver that ties them together (§4.1, §5).

pub mod commands;
pub mod driver;
pub mod jid_index;
pub mod moderation;
