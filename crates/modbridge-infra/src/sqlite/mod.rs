//! SQLite-backed implementations of the `modbridge-core` repository ports.

pub mod bot;
pub mod entity;
pub mod manager_relation;
pub mod pool;
pub mod preset;
pub mod profanity;
pub mod relation;

pub use bot::SqliteBotRepository;
pub use entity::SqliteEntityRepository;
pub use manager_relation::SqliteManagerRelationRepository;
pub use pool::DatabasePool;
pub use preset::SqlitePresetRepository;
pub use profanity::SqliteProfanityConfigRepository;
pub use relation::SqliteBotEntityRelationRepository;
