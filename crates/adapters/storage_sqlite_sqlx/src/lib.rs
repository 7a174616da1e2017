//! # zonelight-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `ZoneStateStore` and `NamedSnapshotStore` from `zonelight-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Store zone states and snapshots as JSON documents
//!
//! ## Dependency rule
//! Depends on `zonelight-app` (for port traits) and `zonelight-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
pub mod pool;
mod snapshot_store;
mod zone_state_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use snapshot_store::SqliteNamedSnapshotStore;
pub use zone_state_store::SqliteZoneStateStore;
