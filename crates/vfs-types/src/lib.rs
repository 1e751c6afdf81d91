//! Canonical error taxonomy and value types shared by every `vfscore` backend.
//!
//! Nothing in this crate talks to storage. It exists so that `vfs-backend`,
//! `vfs-indexed`, `vfs-sql`, `vfs-kv`, `vfs-passthrough`, `vfs-query`, and
//! `vfs-mount` agree on one `Error`, one `FileMode`, and one `Metadata` shape
//! without depending on each other.

mod cancel;
mod error;
mod mode;
mod stat;
mod time;

pub use cancel::CancellationToken;
pub use error::{Error, Result};
pub use time::now_unix;
pub use mode::{FileMode, FileType};
pub use stat::{ContentType, FileStat, Metadata, MetadataField, MetadataUpdate};

/// A capability a backend may declare at `open` time.
///
/// Closed set per spec: callers must not invoke operations requiring a
/// capability the backend did not declare (P9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Metadata,
    ObjectStorage,
    Acl,
    Cache,
    Encrypt,
    Snapshot,
    Streaming,
    Multipart,
    Versioning,
    Rubbish,
    Namespace,
}
