//! The backend contract (spec §4.1, C3): lifecycle, capability declaration,
//! object-storage operations, and optional metadata operations. Every
//! concrete store — `vfs-indexed`'s in-memory kernel, `vfs-sql`, `vfs-kv`,
//! `vfs-passthrough` — implements [`Backend`].
//!
//! Modeled as one trait with data-valued capabilities rather than a type per
//! capability, per the design note in spec §9 ("Capability queries are
//! data, not types").

mod capabilities;

pub use capabilities::Capabilities;

use std::path::PathBuf;

use vfs_query::MetadataQuery;
use vfs_types::{CancellationToken, Capability, Error, FileMode, FileStat, Metadata, MetadataUpdate, Result};

/// Returned by [`Backend::read_object`]: `0` means EOF (spec §4.1), matching
/// the `std::io::Read` convention rather than inventing a distinct
/// end-of-file error variant.
pub type BytesRead = usize;

pub trait Backend: Send + Sync {
    /// A stable identifier for logging and diagnostics.
    fn name(&self) -> &str;

    /// Idempotent initialization: verify connectivity, load indices. Safe to
    /// call more than once.
    fn open(&self, ctx: &CancellationToken) -> Result<()>;

    /// Release resources. Safe to call without a prior `open`.
    fn close(&self, ctx: &CancellationToken) -> Result<()>;

    fn capabilities(&self) -> &Capabilities;

    fn create_object(
        &self,
        ctx: &CancellationToken,
        ns: &str,
        key: &str,
        mode: FileMode,
    ) -> Result<FileStat>;

    fn read_object(
        &self,
        ctx: &CancellationToken,
        ns: &str,
        key: &str,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<BytesRead>;

    fn write_object(
        &self,
        ctx: &CancellationToken,
        ns: &str,
        key: &str,
        offset: u64,
        data: &[u8],
    ) -> Result<usize>;

    fn delete_object(&self, ctx: &CancellationToken, ns: &str, key: &str, force: bool) -> Result<()>;

    fn list_objects(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<Vec<FileStat>>;

    fn head_object(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<FileStat>;

    fn truncate_object(&self, ctx: &CancellationToken, ns: &str, key: &str, size: u64) -> Result<()>;

    // -- Optional metadata operations (spec §4.1). Backends that do not
    // advertise `Capability::Metadata` keep the default, which fails fast
    // (P9) rather than silently no-op'ing.

    fn create_meta(&self, _ctx: &CancellationToken, _ns: &str, _meta: Metadata) -> Result<Metadata> {
        Err(self.capability_error(Capability::Metadata))
    }

    fn read_meta(&self, _ctx: &CancellationToken, _ns: &str, _key: &str) -> Result<Metadata> {
        Err(self.capability_error(Capability::Metadata))
    }

    fn update_meta(&self, _ctx: &CancellationToken, _ns: &str, _update: MetadataUpdate) -> Result<Metadata> {
        Err(self.capability_error(Capability::Metadata))
    }

    fn delete_meta(&self, _ctx: &CancellationToken, _ns: &str, _key: &str) -> Result<()> {
        Err(self.capability_error(Capability::Metadata))
    }

    fn exists_meta(&self, _ctx: &CancellationToken, _ns: &str, _key: &str) -> Result<bool> {
        Err(self.capability_error(Capability::Metadata))
    }

    fn query_meta(
        &self,
        _ctx: &CancellationToken,
        _ns: &str,
        _query: &MetadataQuery,
    ) -> Result<vfs_query::QueryResult> {
        Err(self.capability_error(Capability::Metadata))
    }

    /// Check a capability before invoking an optional operation (P9); the
    /// supplemented helper named in `SPEC_FULL.md` §4.
    fn require(&self, cap: Capability) -> Result<()> {
        if self.capabilities().set.contains(&cap) {
            Ok(())
        } else {
            Err(self.capability_error(cap))
        }
    }

    fn capability_error(&self, _cap: Capability) -> Error {
        Error::Permission(PathBuf::new())
    }
}
