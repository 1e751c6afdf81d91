use std::sync::RwLock;

use vfs_backend::{Backend, Capabilities};
use vfs_path as path;
use vfs_query::{MetadataQuery, QueryResult};
use vfs_types::{CancellationToken, Error, FileMode, FileStat, FileType, Metadata, MetadataUpdate, Result};

use crate::store::IndexStore;

/// The three-layer indexed-backend kernel (spec §4.2, C4), generic over any
/// [`IndexStore`]. A single `RwLock` guards the whole store — path index,
/// inode table, and content store mutate together under one critical
/// section per top-level operation (spec §5 "Concurrency primitive"),
/// mirroring `OverlayFs`'s single `RwLock<MultikeyBTreeMap<..>>` in the
/// reference filesystem rather than per-table or per-key locks.
pub struct IndexedBackend<S: IndexStore> {
    name: String,
    store: RwLock<S>,
    capabilities: Capabilities,
}

impl<S: IndexStore> IndexedBackend<S> {
    pub fn new(name: impl Into<String>, store: S, capabilities: Capabilities) -> Self {
        Self {
            name: name.into(),
            store: RwLock::new(store),
            capabilities,
        }
    }

    /// Composite key for `(ns, key)`, and the strict-descendant scan prefix
    /// for it — `C + "/"` for a non-root key, or `C` itself for the root,
    /// whose children sit directly under the namespace prefix with no `/`
    /// separator (spec §3 invariant 5: root is implicit, never stored).
    fn keys(ns: &str, key: &str) -> (String, String) {
        let composite = path::composite_key(ns, key);
        let descendant_prefix = if key.is_empty() { composite.clone() } else { format!("{composite}/") };
        (composite, descendant_prefix)
    }

    fn root_stat() -> FileStat {
        FileStat {
            key: String::new(),
            mode: FileMode::new(0o755, FileType::Dir),
            size: 0,
            create_time: 0,
            modify_time: 0,
            content_type: None,
            uid: None,
            gid: None,
        }
    }
}

impl<S: IndexStore> Backend for IndexedBackend<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, ctx: &CancellationToken) -> Result<()> {
        ctx.check()?;
        log::debug!("backend '{}' opened", self.name);
        Ok(())
    }

    fn close(&self, ctx: &CancellationToken) -> Result<()> {
        ctx.check()?;
        log::debug!("backend '{}' closed", self.name);
        Ok(())
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_object(&self, ctx: &CancellationToken, ns: &str, key: &str, mode: FileMode) -> Result<FileStat> {
        ctx.check()?;
        let key = path::normalize(key);
        if key.is_empty() {
            return Err(Error::Exist("/".into()));
        }
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();

        if store.path_get(&composite)?.is_some() {
            return Err(Error::Exist(key.into()));
        }

        if let Some(parent_key) = path::parent(&key) {
            if !parent_key.is_empty() {
                let parent_composite = path::composite_key(ns, &parent_key);
                let parent_id = store
                    .path_get(&parent_composite)?
                    .ok_or_else(|| Error::NotExist(parent_key.clone().into()))?;
                let parent_meta = store
                    .meta_get(&parent_id)?
                    .ok_or_else(|| Error::NotExist(parent_key.clone().into()))?;
                if !parent_meta.mode.is_dir() {
                    return Err(Error::NotDirectory(parent_key.into()));
                }
            }
        }

        let id = store.generate_id();
        let now = vfs_types::now_unix();
        let meta = Metadata {
            id: id.clone(),
            key: key.clone(),
            mode,
            size: 0,
            uid: None,
            gid: None,
            create_time: now,
            modify_time: now,
            access_time: now,
            content_type: None,
            etag: None,
            attributes: Default::default(),
        };
        store.meta_put(&id, meta.clone())?;
        store.path_insert(&composite, &id)?;
        log::debug!("backend '{}' created {}", self.name, key);
        Ok(meta.to_stat())
    }

    fn read_object(&self, ctx: &CancellationToken, ns: &str, key: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let store = self.store.read().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        if meta.mode.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        if offset >= meta.size {
            return Ok(0);
        }
        let n = store.content_read(&id, offset, buf)?;
        drop(store);
        self.bump_access_time(&id);
        Ok(n)
    }

    fn write_object(&self, ctx: &CancellationToken, ns: &str, key: &str, offset: u64, data: &[u8]) -> Result<usize> {
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let mut meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        if meta.mode.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        let new_size = meta.size.max(offset + data.len() as u64);
        if new_size > self.capabilities.max_object_size {
            return Err(Error::TooLarge(key.into()));
        }
        store.content_write(&id, offset, data)?;
        meta.size = new_size;
        meta.modify_time = vfs_types::now_unix();
        store.meta_put(&id, meta)?;
        Ok(data.len())
    }

    fn delete_object(&self, ctx: &CancellationToken, ns: &str, key: &str, force: bool) -> Result<()> {
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, descendant_prefix) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;

        if !meta.mode.is_dir() {
            return delete_single(&mut *store, &composite, &id);
        }
        if !force {
            return Err(Error::IsDirectory(key.into()));
        }

        let mut subtree = vec![(composite.clone(), id.clone())];
        subtree.extend(store.path_scan_prefix(&descendant_prefix)?);

        let mut results = Vec::with_capacity(subtree.len());
        for (idx, (child_composite, child_id)) in subtree.into_iter().enumerate() {
            if idx % 64 == 0 {
                if let Err(e) = ctx.check() {
                    results.push(Err(e));
                    break;
                }
            }
            results.push(delete_single(&mut *store, &child_composite, &child_id));
        }
        Error::aggregate(results)
    }

    fn list_objects(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<Vec<FileStat>> {
        ctx.check()?;
        let key = path::normalize(key);
        let store = self.store.read().unwrap();

        if !key.is_empty() {
            let (composite, _) = Self::keys(ns, &key);
            let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
            let meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
            if !meta.mode.is_dir() {
                return Ok(vec![meta.to_stat()]);
            }
        }

        let (_, descendant_prefix) = Self::keys(ns, &key);
        let scanned = store.path_scan_prefix(&descendant_prefix)?;
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for (composite, id) in scanned {
            let relative = &composite[descendant_prefix.len()..];
            let first_segment = match relative.find('/') {
                Some(idx) => &relative[..idx],
                None => relative,
            };
            if !seen.insert(first_segment.to_string()) {
                continue;
            }
            if first_segment == relative {
                // Direct leaf: use its own stored metadata.
                if let Some(meta) = store.meta_get(&id)? {
                    out.push(meta.to_stat());
                }
            } else {
                // Implicit intermediate directory: no inode stores it
                // directly (it is only reachable through deeper children).
                out.push(FileStat {
                    key: path::join(&key, first_segment),
                    mode: FileMode::new(0o755, FileType::Dir),
                    size: 0,
                    create_time: 0,
                    modify_time: 0,
                    content_type: None,
                    uid: None,
                    gid: None,
                });
            }
        }
        Ok(out)
    }

    fn head_object(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<FileStat> {
        ctx.check()?;
        let key = path::normalize(key);
        if key.is_empty() {
            return Ok(Self::root_stat());
        }
        let (composite, _) = Self::keys(ns, &key);
        let store = self.store.read().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.into()))?;
        Ok(meta.to_stat())
    }

    fn truncate_object(&self, ctx: &CancellationToken, ns: &str, key: &str, size: u64) -> Result<()> {
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let mut meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        if meta.mode.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        if size > self.capabilities.max_object_size {
            return Err(Error::TooLarge(key.into()));
        }
        if meta.size == size {
            return Ok(());
        }
        store.content_truncate(&id, size)?;
        meta.size = size;
        meta.modify_time = vfs_types::now_unix();
        store.meta_put(&id, meta)?;
        Ok(())
    }

    fn create_meta(&self, ctx: &CancellationToken, ns: &str, meta: Metadata) -> Result<Metadata> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let key = path::normalize(&meta.key);
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        if store.path_get(&composite)?.is_some() {
            return Err(Error::Exist(key.into()));
        }
        store.meta_put(&meta.id, meta.clone())?;
        store.path_insert(&composite, &meta.id)?;
        Ok(meta)
    }

    fn read_meta(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<Metadata> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let store = self.store.read().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.into()))
    }

    fn update_meta(&self, ctx: &CancellationToken, ns: &str, update: MetadataUpdate) -> Result<Metadata> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let key = path::normalize(&update.metadata.key);
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.clone().into()))?;
        let mut meta = store.meta_get(&id)?.ok_or_else(|| Error::NotExist(key.into()))?;
        meta.apply(&update);
        store.meta_put(&id, meta.clone())?;
        Ok(meta)
    }

    fn delete_meta(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<()> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let mut store = self.store.write().unwrap();
        let id = store.path_get(&composite)?.ok_or_else(|| Error::NotExist(key.into()))?;
        delete_single(&mut *store, &composite, &id)
    }

    fn exists_meta(&self, ctx: &CancellationToken, ns: &str, key: &str) -> Result<bool> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let key = path::normalize(key);
        let (composite, _) = Self::keys(ns, &key);
        let store = self.store.read().unwrap();
        Ok(store.path_get(&composite)?.is_some())
    }

    fn query_meta(&self, ctx: &CancellationToken, ns: &str, query: &MetadataQuery) -> Result<QueryResult> {
        self.require(vfs_types::Capability::Metadata)?;
        ctx.check()?;
        let store = self.store.read().unwrap();
        let all = store.meta_scan_all()?;
        // Scope to rows whose composite key in this namespace still resolves
        // to them, the same existence check every sibling method performs
        // via `Self::keys` — a row created under another namespace (or
        // under no namespace) won't round-trip here and is excluded.
        let scoped: Vec<Metadata> = all
            .into_iter()
            .filter(|meta| {
                let (composite, _) = Self::keys(ns, &meta.key);
                store.path_get(&composite).ok().flatten().as_deref() == Some(meta.id.as_str())
            })
            .collect();
        let selected: Vec<Metadata> = vfs_query::select_candidates(scoped.iter(), query).into_iter().cloned().collect();
        Ok(vfs_query::filter_sort_paginate(selected, query))
    }
}

impl<S: IndexStore> IndexedBackend<S> {
    /// Best-effort access-time bump (spec §5: "performed without upgrading
    /// to a write lock; ... a benign race is accepted"). Implemented here
    /// as a short, independent write-lock acquisition after the read lock
    /// has already been released, so readers never block on it; if the
    /// write lock happens to be busy the update is simply skipped.
    fn bump_access_time(&self, id: &str) {
        if let Ok(mut store) = self.store.try_write() {
            if let Ok(Some(mut meta)) = store.meta_get(id) {
                meta.access_time = vfs_types::now_unix();
                let _ = store.meta_put(id, meta);
            }
        }
    }
}

/// Shared file-deletion semantics (spec §4.2 Delete): drop the path entry,
/// then reclaim the inode and its content only if no other composite key
/// still references it (hard-link refcount, P6).
fn delete_single<S: IndexStore>(store: &mut S, composite: &str, id: &str) -> Result<()> {
    store.path_remove(composite)?;
    if store.path_refcount(id)? == 0 {
        store.meta_remove(id)?;
        store.content_remove(id)?;
    }
    Ok(())
}
