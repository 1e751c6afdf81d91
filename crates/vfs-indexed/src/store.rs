use vfs_types::{Metadata, Result};

/// The storage primitive the indexed-backend kernel (spec §4.2, C4) is built
/// on. An `IndexStore` owns the path index, the inode table, and the
/// content store; [`crate::IndexedBackend`] wraps one in a single
/// reader-writer lock and implements `Backend` generically on top.
///
/// Implementations differ (`MemoryStore` here, `SqliteStore` in `vfs-sql`,
/// `SledStore` in `vfs-kv`) but must all satisfy the same ordering and
/// hard-link semantics described on each method.
pub trait IndexStore: Send {
    /// Produce a fresh, backend-unique inode id. In-memory uses a monotonic
    /// counter; SQL/KV stores use a UUID generator (spec §4.2 "ID
    /// generation").
    fn generate_id(&mut self) -> String;

    /// Look up the inode id a composite key resolves to.
    fn path_get(&self, composite_key: &str) -> Result<Option<String>>;

    /// Insert a path-index entry. Overwrites silently if the key already
    /// mapped to a different id (callers check existence beforehand).
    fn path_insert(&mut self, composite_key: &str, id: &str) -> Result<()>;

    /// Remove a path-index entry. A no-op if the key is already absent.
    fn path_remove(&mut self, composite_key: &str) -> Result<()>;

    /// Ordered `(composite_key, id)` pairs whose composite key starts with
    /// `raw_prefix`, in ascending key order. The path index must be ordered
    /// (B-tree-like) so this is a contiguous range scan, not a full scan
    /// (spec §3 "Ordered iteration is mandatory").
    fn path_scan_prefix(&self, raw_prefix: &str) -> Result<Vec<(String, String)>>;

    /// Number of path-index entries that currently resolve to `id` (the
    /// hard-link refcount, spec P6). In-memory scans the path index;
    /// SQL/KV stores may track this with an explicit counter column.
    fn path_refcount(&self, id: &str) -> Result<u64>;

    fn meta_get(&self, id: &str) -> Result<Option<Metadata>>;
    fn meta_put(&mut self, id: &str, meta: Metadata) -> Result<()>;
    fn meta_remove(&mut self, id: &str) -> Result<()>;
    /// Every stored inode record, for query push-down (spec §4.4).
    fn meta_scan_all(&self) -> Result<Vec<Metadata>>;

    /// Copy up to `buf.len()` bytes starting at `offset` into `buf`. A
    /// missing content entry (zero-byte file) yields `0` regardless of
    /// `offset`. Returns the number of bytes copied.
    fn content_read(&self, id: &str, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Extend the stored content to `max(current_len, offset + data.len())`,
    /// zero-filling the implicit gap, then write `data` at `offset`.
    fn content_write(&mut self, id: &str, offset: u64, data: &[u8]) -> Result<()>;

    /// Resize stored content to exactly `size`, truncating or zero-filling.
    fn content_truncate(&mut self, id: &str, size: u64) -> Result<()>;

    fn content_remove(&mut self, id: &str) -> Result<()>;
}
