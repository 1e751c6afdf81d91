use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::mode::FileMode;

/// An opaque MIME-ish string, e.g. `"text/plain"`. No validation is
/// performed here; `vfs-query`'s wildcard matcher is the only consumer that
/// parses it into `type/subtype`.
pub type ContentType = String;

/// The externally visible subset of an inode's metadata (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStat {
    pub key: String,
    pub mode: FileMode,
    pub size: u64,
    pub create_time: i64,
    pub modify_time: i64,
    pub content_type: Option<ContentType>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

/// The internal inode record (spec §3). `id` is the single cross-layer
/// handle: the path index maps composite keys to `id`, the inode table maps
/// `id` to a `Metadata`, and the content store maps `id` to bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub key: String,
    pub mode: FileMode,
    pub size: u64,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub create_time: i64,
    pub modify_time: i64,
    pub access_time: i64,
    pub content_type: Option<ContentType>,
    pub etag: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Metadata {
    /// Project this inode record down to the externally visible [`FileStat`].
    pub fn to_stat(&self) -> FileStat {
        FileStat {
            key: self.key.clone(),
            mode: self.mode,
            size: self.size,
            create_time: self.create_time,
            modify_time: self.modify_time,
            content_type: self.content_type.clone(),
            uid: self.uid,
            gid: self.gid,
        }
    }

    /// Apply an update under its mask, leaving unmasked fields untouched.
    pub fn apply(&mut self, update: &MetadataUpdate) {
        let MetadataUpdate { mask, metadata } = update;
        if mask.contains(MetadataField::SIZE) {
            self.size = metadata.size;
        }
        if mask.contains(MetadataField::MODE) {
            self.mode = metadata.mode;
        }
        if mask.contains(MetadataField::TIMES) {
            self.create_time = metadata.create_time;
            self.modify_time = metadata.modify_time;
            self.access_time = metadata.access_time;
        }
        if mask.contains(MetadataField::CONTENT_TYPE) {
            self.content_type = metadata.content_type.clone();
        }
        if mask.contains(MetadataField::ETAG) {
            self.etag = metadata.etag.clone();
        }
        if mask.contains(MetadataField::ATTRIBUTES) {
            self.attributes = metadata.attributes.clone();
        }
    }
}

bitflags! {
    /// Which fields of a [`MetadataUpdate::metadata`] should be copied onto
    /// the target inode. Mirrors `SetattrValid` in the reference FUSE
    /// filesystem contract (`overlayfs/fs.rs`'s `setattr`), generalized from
    /// attribute bits to the wider `Metadata` shape this spec uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct MetadataField: u32 {
        const SIZE         = 1 << 0;
        const MODE         = 1 << 1;
        const TIMES        = 1 << 2;
        const CONTENT_TYPE = 1 << 3;
        const ETAG         = 1 << 4;
        const ATTRIBUTES   = 1 << 5;
    }
}

/// A partial update to a [`Metadata`] record (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub mask: MetadataField,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::FileType;

    fn sample_metadata(id: &str, key: &str) -> Metadata {
        Metadata {
            id: id.to_string(),
            key: key.to_string(),
            mode: FileMode::new(0o644, FileType::Regular),
            size: 0,
            uid: None,
            gid: None,
            create_time: 0,
            modify_time: 0,
            access_time: 0,
            content_type: None,
            etag: None,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn apply_only_touches_masked_fields() {
        let mut original = sample_metadata("id-1", "/a");
        original.size = 5;
        original.etag = Some("etag-old".into());

        let mut patch = sample_metadata("id-1", "/a");
        patch.size = 42;
        patch.etag = Some("etag-new".into());

        let update = MetadataUpdate {
            mask: MetadataField::SIZE,
            metadata: patch,
        };
        original.apply(&update);

        assert_eq!(original.size, 42);
        assert_eq!(original.etag.as_deref(), Some("etag-old"));
    }

    #[test]
    fn to_stat_projects_externally_visible_fields() {
        let meta = sample_metadata("id-2", "/b");
        let stat = meta.to_stat();
        assert_eq!(stat.key, "/b");
        assert_eq!(stat.size, 0);
    }
}
