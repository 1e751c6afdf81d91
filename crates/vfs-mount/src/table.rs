use std::sync::{Arc, RwLock};

use vfs_backend::Backend;
use vfs_path as path;
use vfs_types::{CancellationToken, Error, Result};

struct Mount {
    prefix: String,
    backend: Arc<dyn Backend>,
}

/// The router-level mount table (spec §4.5). Mounts are kept in insertion
/// order so `close` can unwind them in reverse, and resolution scans for the
/// longest segment-boundary-matching prefix — a linear scan is fine here:
/// mount tables are small (a handful of entries), unlike the path indices
/// `vfs-indexed` backends maintain.
pub struct MountTable {
    mounts: RwLock<Vec<Mount>>,
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MountTable {
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(Vec::new()),
        }
    }

    /// Mount `backend` at `prefix` (spec §4.5). Opens the backend before
    /// inserting; a failed `open` leaves the table unmodified (spec §7).
    pub fn mount(&self, ctx: &CancellationToken, prefix: &str, backend: Arc<dyn Backend>) -> Result<()> {
        ctx.check()?;
        let prefix = path::normalize_mount_prefix(prefix);
        let mut mounts = self.mounts.write().unwrap();
        if mounts.iter().any(|m| m.prefix == prefix) {
            return Err(Error::Exist(prefix.into()));
        }
        backend.open(ctx)?;
        log::debug!("mounted '{}' at {prefix}", backend.name());
        mounts.push(Mount { prefix, backend });
        Ok(())
    }

    /// Unmount the backend at `prefix` (spec §4.5). `force` is accepted for
    /// API symmetry with the spec's optional busy-check; this router has no
    /// busy-state notion, so the backend is always closed and removed.
    pub fn unmount(&self, ctx: &CancellationToken, prefix: &str, _force: bool) -> Result<()> {
        ctx.check()?;
        let prefix = path::normalize_mount_prefix(prefix);
        let mut mounts = self.mounts.write().unwrap();
        let idx = mounts
            .iter()
            .position(|m| m.prefix == prefix)
            .ok_or_else(|| Error::NotExist(prefix.clone().into()))?;
        let mount = mounts.remove(idx);
        mount.backend.close(ctx)?;
        log::debug!("unmounted '{}' from {prefix}", mount.backend.name());
        Ok(())
    }

    /// Resolve `query_path` to its owning mount (longest segment-boundary
    /// prefix, spec P8) and the backend-relative key within it.
    pub fn resolve(&self, query_path: &str) -> Result<(Arc<dyn Backend>, String)> {
        let normalized_query = path::normalize_mount_prefix(query_path);
        let mounts = self.mounts.read().unwrap();
        let best = mounts
            .iter()
            .filter(|m| is_mount_prefix(&m.prefix, &normalized_query))
            .max_by_key(|m| m.prefix.len())
            .ok_or_else(|| Error::NotExist(query_path.into()))?;
        let relative = if best.prefix == "/" {
            normalized_query.trim_start_matches('/').to_string()
        } else {
            normalized_query[best.prefix.len()..].trim_start_matches('/').to_string()
        };
        Ok((best.backend.clone(), path::normalize(&relative)))
    }

    /// Close every mount in reverse insertion order (spec §4.5), aggregating
    /// per-mount failures.
    pub fn close(&self, ctx: &CancellationToken) -> Result<()> {
        let mut mounts = self.mounts.write().unwrap();
        let mut results = Vec::new();
        while let Some(mount) = mounts.pop() {
            results.push(mount.backend.close(ctx));
        }
        Error::aggregate(results)
    }

    /// Direct child mount-prefix segments below `query_path` (spec scenario
    /// 5: `list("/")` must surface `"data"` even though nothing was ever
    /// created directly in the root backend). Listing a directory has to
    /// merge the owning backend's own entries with these synthetic ones, or
    /// a deeper mount would be invisible from its parent's directory view.
    pub fn child_mount_segments(&self, query_path: &str) -> Vec<String> {
        let normalized_query = path::normalize_mount_prefix(query_path);
        let query_key = normalized_query.trim_start_matches('/');
        let mounts = self.mounts.read().unwrap();
        let mut segments: Vec<String> = mounts
            .iter()
            .filter_map(|m| {
                let mount_key = m.prefix.trim_start_matches('/');
                if mount_key == query_key {
                    return None;
                }
                if !path::is_prefix(query_key, mount_key) {
                    return None;
                }
                path::first_segment_below(query_key, mount_key).map(str::to_string)
            })
            .collect();
        segments.sort();
        segments.dedup();
        segments
    }

    /// Diagnostic introspection (supplemented feature): every mounted
    /// prefix and its backend's name, in mount order.
    pub fn list_mounts(&self) -> Vec<(String, String)> {
        self.mounts
            .read()
            .unwrap()
            .iter()
            .map(|m| (m.prefix.clone(), m.backend.name().to_string()))
            .collect()
    }
}

fn is_mount_prefix(prefix: &str, query: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    query == prefix || query.starts_with(&format!("{prefix}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use vfs_backend::Capabilities;
    use vfs_types::{FileMode, FileStat};

    struct StubBackend {
        name: &'static str,
        caps: Capabilities,
        closed: Mutex<bool>,
    }

    impl StubBackend {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                caps: Capabilities::new([], 0, u64::MAX),
                closed: Mutex::new(false),
            }
        }
    }

    impl Backend for StubBackend {
        fn name(&self) -> &str {
            self.name
        }
        fn open(&self, _ctx: &CancellationToken) -> Result<()> {
            Ok(())
        }
        fn close(&self, _ctx: &CancellationToken) -> Result<()> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }
        fn capabilities(&self) -> &Capabilities {
            &self.caps
        }
        fn create_object(&self, _: &CancellationToken, _: &str, key: &str, _: FileMode) -> Result<FileStat> {
            Err(Error::NotExist(key.into()))
        }
        fn read_object(&self, _: &CancellationToken, _: &str, key: &str, _: u64, _: &mut [u8]) -> Result<usize> {
            Err(Error::NotExist(key.into()))
        }
        fn write_object(&self, _: &CancellationToken, _: &str, key: &str, _: u64, _: &[u8]) -> Result<usize> {
            Err(Error::NotExist(key.into()))
        }
        fn delete_object(&self, _: &CancellationToken, _: &str, key: &str, _: bool) -> Result<()> {
            Err(Error::NotExist(key.into()))
        }
        fn list_objects(&self, _: &CancellationToken, _: &str, key: &str) -> Result<Vec<FileStat>> {
            Err(Error::NotExist(key.into()))
        }
        fn head_object(&self, _: &CancellationToken, _: &str, key: &str) -> Result<FileStat> {
            Err(Error::NotExist(key.into()))
        }
        fn truncate_object(&self, _: &CancellationToken, _: &str, key: &str, _: u64) -> Result<()> {
            Err(Error::NotExist(key.into()))
        }
    }

    fn ctx() -> CancellationToken {
        CancellationToken::new()
    }

    #[test]
    fn duplicate_mount_prefix_fails_exist() {
        let table = MountTable::new();
        table.mount(&ctx(), "/a", Arc::new(StubBackend::new("one"))).unwrap();
        let err = table.mount(&ctx(), "/a", Arc::new(StubBackend::new("two"))).unwrap_err();
        assert!(err.is_exist());
    }

    #[test]
    fn nested_mounts_resolve_to_longest_prefix() {
        let table = MountTable::new();
        table.mount(&ctx(), "/", Arc::new(StubBackend::new("root"))).unwrap();
        table.mount(&ctx(), "/a", Arc::new(StubBackend::new("a"))).unwrap();
        table.mount(&ctx(), "/a/b", Arc::new(StubBackend::new("ab"))).unwrap();

        let (backend, key) = table.resolve("/a/b/x").unwrap();
        assert_eq!(backend.name(), "ab");
        assert_eq!(key, "x");

        let (backend, key) = table.resolve("/a/other").unwrap();
        assert_eq!(backend.name(), "a");
        assert_eq!(key, "other");

        let (backend, key) = table.resolve("/unrelated").unwrap();
        assert_eq!(backend.name(), "root");
        assert_eq!(key, "unrelated");
    }

    #[test]
    fn unmount_removes_entry_and_closes_backend() {
        let table = MountTable::new();
        table.mount(&ctx(), "/a", Arc::new(StubBackend::new("a"))).unwrap();
        table.unmount(&ctx(), "/a", false).unwrap();
        assert!(table.resolve("/a/x").is_err());
    }

    #[test]
    fn list_mounts_reports_every_prefix() {
        let table = MountTable::new();
        table.mount(&ctx(), "/", Arc::new(StubBackend::new("root"))).unwrap();
        table.mount(&ctx(), "/data", Arc::new(StubBackend::new("data"))).unwrap();
        let mounts = table.list_mounts();
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[0].0, "/");
        assert_eq!(mounts[1].0, "/data");
    }
}
