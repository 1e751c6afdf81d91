//! `SqliteStore`, the SQL instantiation of the indexed-backend kernel (spec
//! §4.2's "SQL (both row-store and document KV)" backend family), built on
//! `rusqlite` the way `vfs-indexed::MemoryStore` is built on in-process
//! maps: same [`vfs_indexed::IndexStore`] contract, durable storage.

mod schema;
mod store;

pub use store::SqliteStore;

/// Construction parameters for a SQL-backed mount point (spec §3 "Config").
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub path: std::path::PathBuf,
    pub max_object_size: u64,
}

impl SqliteConfig {
    pub fn new(path: impl Into<std::path::PathBuf>, max_object_size: u64) -> Self {
        Self {
            path: path.into(),
            max_object_size,
        }
    }
}
