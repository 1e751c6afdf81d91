//! `SledStore`, the KV instantiation of the indexed-backend kernel (spec
//! §4.2), built on `sled` the same way `vfs-sql::SqliteStore` is built on
//! `rusqlite`: same [`vfs_indexed::IndexStore`] contract, a different
//! durable substrate.

mod store;

pub use store::SledStore;

/// Construction parameters for a KV-backed mount point (spec §3 "Config").
#[derive(Debug, Clone)]
pub struct SledConfig {
    pub path: std::path::PathBuf,
    pub max_object_size: u64,
}

impl SledConfig {
    pub fn new(path: impl Into<std::path::PathBuf>, max_object_size: u64) -> Self {
        Self {
            path: path.into(),
            max_object_size,
        }
    }
}
