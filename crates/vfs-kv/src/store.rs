use std::path::PathBuf;

use sled::Db;
use vfs_indexed::IndexStore;
use vfs_types::{Error, Metadata, Result};

/// `IndexStore` over `sled` (spec §4.2's KV instantiation).
///
/// Directory policy (spec §9 open question): **implicit**. Unlike a raw
/// flat key-value mount, this store always carries a canonical `Metadata`
/// row per inode with an explicit `FileMode` type bit, so there is no
/// ambiguity a sentinel value would resolve — and writing one into the
/// content tree for directory inodes would violate the invariant that
/// content entries exist only for non-directory inodes. A flat, non-indexed
/// KV mount (outside this crate's scope) is the case that genuinely needs
/// the sentinel-vs-prefix-scan choice.
pub struct SledStore {
    paths: sled::Tree,
    inodes: sled::Tree,
    content: sled::Tree,
    _db: Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = sled::open(path).map_err(sled_err)?;
        Self::from_db(db)
    }

    pub fn open_temporary() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().map_err(sled_err)?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self> {
        let paths = db.open_tree(b"vfs_paths").map_err(sled_err)?;
        let inodes = db.open_tree(b"vfs_inodes").map_err(sled_err)?;
        let content = db.open_tree(b"vfs_content").map_err(sled_err)?;
        Ok(Self {
            paths,
            inodes,
            content,
            _db: db,
        })
    }
}

fn sled_err(e: sled::Error) -> Error {
    Error::Permission(PathBuf::from(format!("sled: {e}")))
}

impl IndexStore for SledStore {
    fn generate_id(&mut self) -> String {
        uuid::Uuid::now_v7().to_string()
    }

    fn path_get(&self, composite_key: &str) -> Result<Option<String>> {
        Ok(self
            .paths
            .get(composite_key)
            .map_err(sled_err)?
            .map(|v| String::from_utf8_lossy(&v).into_owned()))
    }

    fn path_insert(&mut self, composite_key: &str, id: &str) -> Result<()> {
        self.paths.insert(composite_key, id.as_bytes()).map_err(sled_err)?;
        Ok(())
    }

    fn path_remove(&mut self, composite_key: &str) -> Result<()> {
        self.paths.remove(composite_key).map_err(sled_err)?;
        Ok(())
    }

    fn path_scan_prefix(&self, raw_prefix: &str) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for entry in self.paths.scan_prefix(raw_prefix) {
            let (k, v) = entry.map_err(sled_err)?;
            out.push((String::from_utf8_lossy(&k).into_owned(), String::from_utf8_lossy(&v).into_owned()));
        }
        Ok(out)
    }

    fn path_refcount(&self, id: &str) -> Result<u64> {
        let mut count = 0u64;
        for entry in self.paths.iter() {
            let (_, v) = entry.map_err(sled_err)?;
            if v.as_ref() == id.as_bytes() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn meta_get(&self, id: &str) -> Result<Option<Metadata>> {
        match self.inodes.get(id).map_err(sled_err)? {
            Some(bytes) => {
                let meta: Metadata = serde_json::from_slice(&bytes).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    fn meta_put(&mut self, id: &str, meta: Metadata) -> Result<()> {
        let bytes = serde_json::to_vec(&meta).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        self.inodes.insert(id, bytes).map_err(sled_err)?;
        Ok(())
    }

    fn meta_remove(&mut self, id: &str) -> Result<()> {
        self.inodes.remove(id).map_err(sled_err)?;
        Ok(())
    }

    fn meta_scan_all(&self) -> Result<Vec<Metadata>> {
        let mut out = Vec::new();
        for entry in self.inodes.iter() {
            let (_, bytes) = entry.map_err(sled_err)?;
            let meta: Metadata = serde_json::from_slice(&bytes).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
            out.push(meta);
        }
        Ok(out)
    }

    fn content_read(&self, id: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Some(bytes) = self.content.get(id).map_err(sled_err)? else {
            return Ok(0);
        };
        let offset = offset as usize;
        if offset >= bytes.len() {
            return Ok(0);
        }
        let n = buf.len().min(bytes.len() - offset);
        buf[..n].copy_from_slice(&bytes[offset..offset + n]);
        Ok(n)
    }

    fn content_write(&mut self, id: &str, offset: u64, data: &[u8]) -> Result<()> {
        let offset = offset as usize;
        let mut bytes = self.content.get(id).map_err(sled_err)?.map(|v| v.to_vec()).unwrap_or_default();
        let new_len = bytes.len().max(offset + data.len());
        if bytes.len() < new_len {
            bytes.resize(new_len, 0);
        }
        bytes[offset..offset + data.len()].copy_from_slice(data);
        self.content.insert(id, bytes).map_err(sled_err)?;
        Ok(())
    }

    fn content_truncate(&mut self, id: &str, size: u64) -> Result<()> {
        let mut bytes = self.content.get(id).map_err(sled_err)?.map(|v| v.to_vec()).unwrap_or_default();
        bytes.resize(size as usize, 0);
        self.content.insert(id, bytes).map_err(sled_err)?;
        Ok(())
    }

    fn content_remove(&mut self, id: &str) -> Result<()> {
        self.content.remove(id).map_err(sled_err)?;
        Ok(())
    }
}
