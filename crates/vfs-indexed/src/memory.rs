use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use vfs_types::{Metadata, Result};

use crate::store::IndexStore;

/// The in-memory instantiation of the indexed-backend kernel (spec §4.2).
///
/// Uses a `BTreeMap` for the path index because listing relies on
/// contiguous prefix scans over an ordered key space (spec §3 invariant on
/// ordered iteration), plain `HashMap`s for the inode table and content
/// store, and a directory-children index (spec §9, optional optimization)
/// kept in sync alongside the path index under the same lock.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    path_index: BTreeMap<String, String>,
    children: BTreeMap<String, BTreeSet<String>>,
    inodes: HashMap<String, Metadata>,
    content: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn parent_composite(composite_key: &str) -> Option<String> {
        composite_key.rfind('/').map(|idx| composite_key[..idx].to_string())
    }
}

impl IndexStore for MemoryStore {
    fn generate_id(&mut self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("mem-{n:016x}")
    }

    fn path_get(&self, composite_key: &str) -> Result<Option<String>> {
        Ok(self.path_index.get(composite_key).cloned())
    }

    fn path_insert(&mut self, composite_key: &str, id: &str) -> Result<()> {
        self.path_index.insert(composite_key.to_string(), id.to_string());
        if let Some(parent) = Self::parent_composite(composite_key) {
            self.children.entry(parent).or_default().insert(composite_key.to_string());
        }
        Ok(())
    }

    fn path_remove(&mut self, composite_key: &str) -> Result<()> {
        self.path_index.remove(composite_key);
        if let Some(parent) = Self::parent_composite(composite_key) {
            if let Some(set) = self.children.get_mut(&parent) {
                set.remove(composite_key);
                if set.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        Ok(())
    }

    fn path_scan_prefix(&self, raw_prefix: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .path_index
            .range(raw_prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(raw_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn path_refcount(&self, id: &str) -> Result<u64> {
        Ok(self.path_index.values().filter(|v| v.as_str() == id).count() as u64)
    }

    fn meta_get(&self, id: &str) -> Result<Option<Metadata>> {
        Ok(self.inodes.get(id).cloned())
    }

    fn meta_put(&mut self, id: &str, meta: Metadata) -> Result<()> {
        self.inodes.insert(id.to_string(), meta);
        Ok(())
    }

    fn meta_remove(&mut self, id: &str) -> Result<()> {
        self.inodes.remove(id);
        Ok(())
    }

    fn meta_scan_all(&self) -> Result<Vec<Metadata>> {
        Ok(self.inodes.values().cloned().collect())
    }

    fn content_read(&self, id: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let Some(bytes) = self.content.get(id) else {
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
        let bytes = self.content.entry(id.to_string()).or_default();
        let new_len = bytes.len().max(offset + data.len());
        if bytes.len() < new_len {
            bytes.resize(new_len, 0);
        }
        bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn content_truncate(&mut self, id: &str, size: u64) -> Result<()> {
        let bytes = self.content.entry(id.to_string()).or_default();
        bytes.resize(size as usize, 0);
        Ok(())
    }

    fn content_remove(&mut self, id: &str) -> Result<()> {
        self.content.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_is_monotonic_and_unique() {
        let mut store = MemoryStore::new();
        let a = store.generate_id();
        let b = store.generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn content_write_zero_fills_sparse_gap() {
        let mut store = MemoryStore::new();
        store.content_write("id", 10, b"xyz").unwrap();
        let mut buf = [0u8; 13];
        let n = store.content_read("id", 0, &mut buf).unwrap();
        assert_eq!(n, 13);
        assert_eq!(&buf[0..10], &[0u8; 10]);
        assert_eq!(&buf[10..13], b"xyz");
    }

    #[test]
    fn path_scan_prefix_is_ordered_and_bounded() {
        let mut store = MemoryStore::new();
        store.path_insert("a", "1").unwrap();
        store.path_insert("a/b", "2").unwrap();
        store.path_insert("a/c", "3").unwrap();
        store.path_insert("ab", "4").unwrap();
        let found = store.path_scan_prefix("a/").unwrap();
        assert_eq!(found, vec![("a/b".to_string(), "2".to_string()), ("a/c".to_string(), "3".to_string())]);
    }

    #[test]
    fn refcount_counts_all_aliasing_paths() {
        let mut store = MemoryStore::new();
        store.path_insert("a", "shared").unwrap();
        store.path_insert("b", "shared").unwrap();
        assert_eq!(store.path_refcount("shared").unwrap(), 2);
        store.path_remove("a").unwrap();
        assert_eq!(store.path_refcount("shared").unwrap(), 1);
    }
}
