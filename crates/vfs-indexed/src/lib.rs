//! The three-layer indexed-backend kernel (spec §4.2, C4): a path index, an
//! inode table, and a content store behind one [`vfs_backend::Backend`]
//! implementation, generic over any [`IndexStore`]. [`memory::MemoryStore`]
//! is the in-memory instantiation; `vfs-sql` and `vfs-kv` provide
//! durable ones over the same [`IndexStore`] contract.

mod kernel;
mod memory;
mod store;

pub use kernel::IndexedBackend;
pub use memory::MemoryStore;
pub use store::IndexStore;

#[cfg(test)]
mod tests {
    use super::*;
    use vfs_backend::{Backend, Capabilities};
    use vfs_types::{Capability, CancellationToken, Error, FileMode, FileType, Metadata, MetadataField, MetadataUpdate};

    fn backend() -> IndexedBackend<MemoryStore> {
        let caps = Capabilities::new([Capability::Metadata], 0, 1024 * 1024);
        IndexedBackend::new("mem", MemoryStore::new(), caps)
    }

    fn ctx() -> CancellationToken {
        CancellationToken::new()
    }

    #[test]
    fn create_then_head_round_trips() {
        let b = backend();
        let stat = b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        assert_eq!(stat.key, "a");
        let head = b.head_object(&ctx(), "", "a").unwrap();
        assert_eq!(head.key, "a");
        assert_eq!(head.size, 0);
    }

    #[test]
    fn create_duplicate_fails_exist() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        let err = b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap_err();
        assert!(err.is_exist());
    }

    #[test]
    fn create_under_missing_parent_fails_not_exist() {
        let b = backend();
        let err = b
            .create_object(&ctx(), "", "missing/child", FileMode::new(0o644, FileType::Regular))
            .unwrap_err();
        assert!(err.is_not_exist());
    }

    #[test]
    fn create_under_file_parent_fails_not_directory() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        let err = b
            .create_object(&ctx(), "", "a/child", FileMode::new(0o644, FileType::Regular))
            .unwrap_err();
        assert!(matches!(err, Error::NotDirectory(_)));
    }

    #[test]
    fn root_create_rejected_as_exist() {
        let b = backend();
        let err = b.create_object(&ctx(), "", "", FileMode::new(0o755, FileType::Dir)).unwrap_err();
        assert!(err.is_exist());
    }

    #[test]
    fn read_past_eof_returns_zero() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        let mut buf = [0u8; 8];
        let n = b.read_object(&ctx(), "", "a", 100, &mut buf).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn write_extends_size_and_read_round_trips() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.write_object(&ctx(), "", "a", 0, b"hello").unwrap();
        let stat = b.head_object(&ctx(), "", "a").unwrap();
        assert_eq!(stat.size, 5);
        let mut buf = [0u8; 5];
        b.read_object(&ctx(), "", "a", 0, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn write_over_capacity_fails_too_large() {
        let caps = Capabilities::new([Capability::Metadata], 0, 4);
        let b = IndexedBackend::new("mem", MemoryStore::new(), caps);
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        let err = b.write_object(&ctx(), "", "a", 0, b"hello").unwrap_err();
        assert!(matches!(err, Error::TooLarge(_)));
    }

    #[test]
    fn write_to_directory_fails_is_directory() {
        let b = backend();
        b.create_object(&ctx(), "", "d", FileMode::new(0o755, FileType::Dir)).unwrap();
        let err = b.write_object(&ctx(), "", "d", 0, b"x").unwrap_err();
        assert!(matches!(err, Error::IsDirectory(_)));
    }

    #[test]
    fn truncate_shrinks_and_extends() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.write_object(&ctx(), "", "a", 0, b"hello world").unwrap();
        b.truncate_object(&ctx(), "", "a", 5).unwrap();
        assert_eq!(b.head_object(&ctx(), "", "a").unwrap().size, 5);
        b.truncate_object(&ctx(), "", "a", 8).unwrap();
        assert_eq!(b.head_object(&ctx(), "", "a").unwrap().size, 8);
    }

    #[test]
    fn delete_file_removes_it() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.delete_object(&ctx(), "", "a", false).unwrap();
        assert!(b.head_object(&ctx(), "", "a").unwrap_err().is_not_exist());
    }

    #[test]
    fn delete_non_empty_directory_requires_force() {
        let b = backend();
        b.create_object(&ctx(), "", "d", FileMode::new(0o755, FileType::Dir)).unwrap();
        b.create_object(&ctx(), "", "d/child", FileMode::new(0o644, FileType::Regular)).unwrap();
        let err = b.delete_object(&ctx(), "", "d", false).unwrap_err();
        assert!(matches!(err, Error::IsDirectory(_)));
        b.delete_object(&ctx(), "", "d", true).unwrap();
        assert!(b.head_object(&ctx(), "", "d").unwrap_err().is_not_exist());
        assert!(b.head_object(&ctx(), "", "d/child").unwrap_err().is_not_exist());
    }

    #[test]
    fn list_objects_merges_leaves_and_implicit_directories() {
        let b = backend();
        b.create_object(&ctx(), "", "d", FileMode::new(0o755, FileType::Dir)).unwrap();
        b.create_object(&ctx(), "", "d/a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.create_object(&ctx(), "", "d/sub", FileMode::new(0o755, FileType::Dir)).unwrap();
        b.create_object(&ctx(), "", "d/sub/b", FileMode::new(0o644, FileType::Regular)).unwrap();

        let listing = b.list_objects(&ctx(), "", "d").unwrap();
        let mut keys: Vec<&str> = listing.iter().map(|s| s.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["d/a", "d/sub"]);
    }

    #[test]
    fn list_root_returns_top_level_entries() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.create_object(&ctx(), "", "b", FileMode::new(0o755, FileType::Dir)).unwrap();
        let listing = b.list_objects(&ctx(), "", "").unwrap();
        let mut keys: Vec<&str> = listing.iter().map(|s| s.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn head_root_without_any_entries_still_succeeds() {
        let b = backend();
        let stat = b.head_object(&ctx(), "", "").unwrap();
        assert!(stat.mode.is_dir());
    }

    #[test]
    fn namespaces_are_isolated() {
        let b = backend();
        b.create_object(&ctx(), "tenant-a", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        assert!(b.head_object(&ctx(), "tenant-b", "a").unwrap_err().is_not_exist());
        assert!(b.head_object(&ctx(), "tenant-a", "a").is_ok());
    }

    #[test]
    fn hard_linked_entries_survive_until_last_unlink() {
        let b = backend();
        let meta_a = Metadata {
            id: "shared-id".into(),
            key: "a".into(),
            mode: FileMode::new(0o644, FileType::Regular),
            size: 0,
            uid: None,
            gid: None,
            create_time: 0,
            modify_time: 0,
            access_time: 0,
            content_type: None,
            etag: None,
            attributes: Default::default(),
        };
        let mut meta_b = meta_a.clone();
        meta_b.key = "b".into();

        b.create_meta(&ctx(), "", meta_a).unwrap();
        b.create_meta(&ctx(), "", meta_b).unwrap();

        b.delete_object(&ctx(), "", "a", false).unwrap();
        // Still reachable through its other link.
        assert!(b.read_meta(&ctx(), "", "b").is_ok());

        b.delete_object(&ctx(), "", "b", false).unwrap();
        assert!(b.read_meta(&ctx(), "", "b").unwrap_err().is_not_exist());
    }

    #[test]
    fn metadata_update_respects_mask() {
        let b = backend();
        b.create_object(&ctx(), "", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        let mut patched = b.read_meta(&ctx(), "", "a").unwrap();
        patched.content_type = Some("text/plain".into());
        patched.size = 999;
        let update = MetadataUpdate {
            mask: MetadataField::CONTENT_TYPE,
            metadata: patched,
        };
        let result = b.update_meta(&ctx(), "", update).unwrap();
        assert_eq!(result.content_type.as_deref(), Some("text/plain"));
        assert_eq!(result.size, 0);
    }

    #[test]
    fn metadata_ops_require_capability() {
        let caps = Capabilities::new([], 0, u64::MAX);
        let b = IndexedBackend::new("mem", MemoryStore::new(), caps);
        let err = b.exists_meta(&ctx(), "", "a").unwrap_err();
        assert!(matches!(err, Error::Permission(_)));
    }

    #[test]
    fn cancelled_token_short_circuits_operations() {
        let b = backend();
        let ctx = ctx();
        ctx.cancel();
        let err = b.create_object(&ctx, "", "a", FileMode::new(0o644, FileType::Regular)).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn query_meta_does_not_leak_across_namespaces() {
        let b = backend();
        b.create_object(&ctx(), "tenant-a", "a", FileMode::new(0o644, FileType::Regular)).unwrap();
        b.create_object(&ctx(), "tenant-b", "b", FileMode::new(0o644, FileType::Regular)).unwrap();

        let query = vfs_query::MetadataQuery {
            prefix: String::new(),
            delimiter: String::new(),
            ..Default::default()
        };
        let result = b.query_meta(&ctx(), "tenant-a", &query).unwrap();
        let keys: Vec<&str> = result.candidates.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["a"]);
    }

    #[test]
    fn truncate_missing_key_fails_not_exist_even_when_oversized() {
        let b = backend();
        let err = b.truncate_object(&ctx(), "", "missing", u64::MAX).unwrap_err();
        assert!(err.is_not_exist());
    }
}
