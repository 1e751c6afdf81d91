//! The handle-layer contract (spec §4.6, C8): outside the indexed-backend
//! core, but its translation rules from access-mode flags into
//! offset-addressed backend calls are fixed by the spec, so they are
//! implemented here as the collaborator boundary the public handle API
//! consumes.

use std::sync::Arc;

use bitflags::bitflags;
use vfs_backend::Backend;
use vfs_types::{CancellationToken, Error, FileMode, Result};

bitflags! {
    /// Access-mode flags a handle is opened with (spec §4.6). `EXCL` is not
    /// named in the enumerated flag list but is required by the Create
    /// translation rule ("if exists and Create-without-Excl, proceed"),
    /// which presupposes an Excl bit to test against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const READ   = 1 << 0;
        const WRITE  = 1 << 1;
        const CREATE = 1 << 2;
        const APPEND = 1 << 3;
        const TRUNC  = 1 << 4;
        const EXCL   = 1 << 5;
    }
}

/// A handle: a backend reference, namespace, key, mode flags, and a current
/// offset (spec §4.6). Not `Clone` — a handle owns its offset cursor.
pub struct Handle {
    backend: Arc<dyn Backend>,
    ns: String,
    key: String,
    flags: OpenFlags,
    offset: u64,
}

impl Handle {
    /// Apply the Create/Trunc/Append translation rules and return a handle
    /// positioned at the correct initial offset (spec §4.6).
    pub fn open(
        ctx: &CancellationToken,
        backend: Arc<dyn Backend>,
        ns: &str,
        key: &str,
        flags: OpenFlags,
        mode: FileMode,
    ) -> Result<Self> {
        ctx.check()?;
        let exists = backend.head_object(ctx, ns, key).is_ok();

        if flags.contains(OpenFlags::CREATE) {
            if !exists {
                backend.create_object(ctx, ns, key, mode)?;
            } else if flags.contains(OpenFlags::EXCL) {
                return Err(Error::Exist(key.into()));
            }
        } else if !exists {
            return Err(Error::NotExist(key.into()));
        }

        if flags.contains(OpenFlags::TRUNC) {
            backend.truncate_object(ctx, ns, key, 0)?;
        }

        let offset = if flags.contains(OpenFlags::APPEND) {
            backend.head_object(ctx, ns, key)?.size
        } else {
            0
        };

        Ok(Self {
            backend,
            ns: ns.to_string(),
            key: key.to_string(),
            flags,
            offset,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read into `buf` at the current offset, advancing it by the number of
    /// bytes transferred. A zero-length result is the EOF sentinel (spec
    /// §4.6), not an error.
    pub fn read(&mut self, ctx: &CancellationToken, buf: &mut [u8]) -> Result<usize> {
        self.require(OpenFlags::READ)?;
        let n = self.backend.read_object(ctx, &self.ns, &self.key, self.offset, buf)?;
        self.offset += n as u64;
        Ok(n)
    }

    /// Write `data` at the current offset, advancing it by the number of
    /// bytes transferred.
    pub fn write(&mut self, ctx: &CancellationToken, data: &[u8]) -> Result<usize> {
        self.require(OpenFlags::WRITE)?;
        let n = self.backend.write_object(ctx, &self.ns, &self.key, self.offset, data)?;
        self.offset += n as u64;
        Ok(n)
    }

    pub fn close(&self, ctx: &CancellationToken) -> Result<()> {
        ctx.check()
    }

    fn require(&self, flag: OpenFlags) -> Result<()> {
        if self.flags.contains(flag) {
            Ok(())
        } else {
            Err(Error::Permission(self.key.clone().into()))
        }
    }
}
