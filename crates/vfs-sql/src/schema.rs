/// Three tables rather than the two literal ones in spec §6: `vfs_paths` is
/// split out as the actual ordered path index, because `vfs_metadata` is
/// canonical *per inode id* (one row per id, mirroring `MemoryStore`'s
/// `HashMap<id, Metadata>`) and cannot also enforce `key UNIQUE` while
/// supporting hard links, where several composite keys legitimately
/// reference the same id. See `DESIGN.md` for the full rationale.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS vfs_paths (
    composite_key TEXT PRIMARY KEY,
    id            TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS vfs_paths_id_idx ON vfs_paths(id);

CREATE TABLE IF NOT EXISTS vfs_metadata (
    id            TEXT PRIMARY KEY,
    key           TEXT NOT NULL,
    mode          BIGINT NOT NULL,
    size          BIGINT NOT NULL,
    uid           BIGINT,
    gid           BIGINT,
    modify_time   BIGINT NOT NULL,
    access_time   BIGINT NOT NULL,
    create_time   BIGINT NOT NULL,
    content_type  TEXT,
    etag          TEXT,
    attributes    TEXT
);
CREATE INDEX IF NOT EXISTS vfs_metadata_content_type_idx ON vfs_metadata(content_type);
CREATE INDEX IF NOT EXISTS vfs_metadata_size_idx ON vfs_metadata(size);
CREATE INDEX IF NOT EXISTS vfs_metadata_modify_time_idx ON vfs_metadata(modify_time);

CREATE TABLE IF NOT EXISTS vfs_data (
    id            TEXT PRIMARY KEY,
    content       BLOB NOT NULL,
    size          BIGINT NOT NULL CHECK (size >= 0),
    ref_count     INTEGER NOT NULL DEFAULT 0,
    created_at    BIGINT NOT NULL,
    last_accessed BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS vfs_data_ref_count_idx ON vfs_data(ref_count);
"#;
