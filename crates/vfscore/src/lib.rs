//! `vfscore`: a pluggable virtual filesystem. A mount router dispatches
//! object and metadata operations to backends mounted at distinct prefixes;
//! every non-trivial backend (in-memory, SQL, KV) shares the same
//! three-layer indexed-backend kernel, and a passthrough backend maps
//! directly onto a host directory.
//!
//! This crate is the facade: it re-exports every component crate and wires
//! the default backend set together, the way the reference workspace's top
//! `libkrun` crate binds `arch`/`devices`/`kernel`/`vmm` into one consumable
//! library.

pub use vfs_backend::{Backend, Capabilities};
pub use vfs_handle::{Handle, OpenFlags};
pub use vfs_indexed::{IndexedBackend, IndexStore, MemoryStore};
pub use vfs_kv::{SledConfig, SledStore};
pub use vfs_mount::{MountTable, Vfs};
pub use vfs_passthrough::{PassthroughBackend, PassthroughConfig};
pub use vfs_query::{MetadataQuery, QueryResult, SortBy, SortOrder};
pub use vfs_sql::{SqliteConfig, SqliteStore};
pub use vfs_types::{
    now_unix, CancellationToken, Capability, ContentType, Error, FileMode, FileStat, FileType, Metadata,
    MetadataField, MetadataUpdate, Result,
};

/// Convenience re-export bundle for `use vfscore::prelude::*;`.
pub mod prelude {
    pub use crate::{
        Backend, CancellationToken, Capabilities, Capability, Error, FileMode, FileStat, FileType, Handle,
        IndexedBackend, MemoryStore, MetadataQuery, OpenFlags, Result, Vfs,
    };
}

/// Initialize `env_logger` from the `RUST_LOG` environment variable. Safe to
/// call more than once; subsequent calls are no-ops (mirrors the init-guard
/// pattern the reference workspace's binaries use around `env_logger::init`).
pub fn init_logging() {
    let _ = env_logger::try_init();
}
