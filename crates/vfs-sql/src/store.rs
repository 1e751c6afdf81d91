use std::collections::BTreeMap;
use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use vfs_indexed::IndexStore;
use vfs_types::{now_unix, Error, FileMode, Metadata, Result};

use crate::schema::DDL;

/// `IndexStore` over a SQLite database (spec §4.2's SQL instantiation).
///
/// `path_refcount` always recomputes via `COUNT(*)` against `vfs_paths`
/// rather than trusting `vfs_data.ref_count`; the column is maintained
/// alongside as the diagnostic/cache value the schema names, but the kernel
/// never reads it directly, so a missed increment there cannot corrupt
/// hard-link accounting.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(sql_err)?;
        conn.execute_batch(DDL).map_err(sql_err)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        conn.execute_batch(DDL).map_err(sql_err)?;
        Ok(Self { conn })
    }

    fn row_to_metadata(row: &rusqlite::Row) -> rusqlite::Result<Metadata> {
        let mode_bits: i64 = row.get("mode")?;
        let attrs_json: Option<String> = row.get("attributes")?;
        let attributes: BTreeMap<String, String> = attrs_json
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Ok(Metadata {
            id: row.get("id")?,
            key: row.get("key")?,
            mode: FileMode::from_bits_truncate(mode_bits as u32),
            size: row.get::<_, i64>("size")? as u64,
            uid: row.get::<_, Option<i64>>("uid")?.map(|v| v as u32),
            gid: row.get::<_, Option<i64>>("gid")?.map(|v| v as u32),
            create_time: row.get("create_time")?,
            modify_time: row.get("modify_time")?,
            access_time: row.get("access_time")?,
            content_type: row.get("content_type")?,
            etag: row.get("etag")?,
            attributes,
        })
    }
}

fn sql_err(e: rusqlite::Error) -> Error {
    Error::Permission(PathBuf::from(format!("sqlite: {e}")))
}

impl IndexStore for SqliteStore {
    fn generate_id(&mut self) -> String {
        uuid::Uuid::now_v7().to_string()
    }

    fn path_get(&self, composite_key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT id FROM vfs_paths WHERE composite_key = ?1",
                params![composite_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql_err)
    }

    fn path_insert(&mut self, composite_key: &str, id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO vfs_paths(composite_key, id) VALUES (?1, ?2)
                 ON CONFLICT(composite_key) DO UPDATE SET id = excluded.id",
                params![composite_key, id],
            )
            .map_err(sql_err)?;
        self.conn
            .execute(
                "UPDATE vfs_data SET ref_count = (SELECT COUNT(*) FROM vfs_paths WHERE id = ?1) WHERE id = ?1",
                params![id],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    fn path_remove(&mut self, composite_key: &str) -> Result<()> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM vfs_paths WHERE composite_key = ?1",
                params![composite_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(sql_err)?;
        self.conn
            .execute("DELETE FROM vfs_paths WHERE composite_key = ?1", params![composite_key])
            .map_err(sql_err)?;
        if let Some(id) = id {
            self.conn
                .execute(
                    "UPDATE vfs_data SET ref_count = (SELECT COUNT(*) FROM vfs_paths WHERE id = ?1) WHERE id = ?1",
                    params![id],
                )
                .map_err(sql_err)?;
        }
        Ok(())
    }

    fn path_scan_prefix(&self, raw_prefix: &str) -> Result<Vec<(String, String)>> {
        // `LIKE` with an escaped prefix and a trailing wildcard, bounded by
        // an index range on composite_key for the non-wildcard part.
        let upper_bound = format!("{raw_prefix}\u{10FFFF}");
        let mut stmt = self
            .conn
            .prepare(
                "SELECT composite_key, id FROM vfs_paths
                 WHERE composite_key >= ?1 AND composite_key < ?2
                 ORDER BY composite_key ASC",
            )
            .map_err(sql_err)?;
        let rows = stmt
            .query_map(params![raw_prefix, upper_bound], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(sql_err)?;
        let mut out = Vec::new();
        for row in rows {
            let (key, id): (String, String) = row.map_err(sql_err)?;
            if key.starts_with(raw_prefix) {
                out.push((key, id));
            }
        }
        Ok(out)
    }

    fn path_refcount(&self, id: &str) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM vfs_paths WHERE id = ?1", params![id], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(sql_err)
    }

    fn meta_get(&self, id: &str) -> Result<Option<Metadata>> {
        self.conn
            .query_row("SELECT * FROM vfs_metadata WHERE id = ?1", params![id], Self::row_to_metadata)
            .optional()
            .map_err(sql_err)
    }

    fn meta_put(&mut self, id: &str, meta: Metadata) -> Result<()> {
        let attrs_json = serde_json::to_string(&meta.attributes).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        self.conn
            .execute(
                "INSERT INTO vfs_metadata
                    (id, key, mode, size, uid, gid, modify_time, access_time, create_time, content_type, etag, attributes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(id) DO UPDATE SET
                    key = excluded.key, mode = excluded.mode, size = excluded.size,
                    uid = excluded.uid, gid = excluded.gid, modify_time = excluded.modify_time,
                    access_time = excluded.access_time, create_time = excluded.create_time,
                    content_type = excluded.content_type, etag = excluded.etag, attributes = excluded.attributes",
                params![
                    id,
                    meta.key,
                    meta.mode.bits() as i64,
                    meta.size as i64,
                    meta.uid.map(|v| v as i64),
                    meta.gid.map(|v| v as i64),
                    meta.modify_time,
                    meta.access_time,
                    meta.create_time,
                    meta.content_type,
                    meta.etag,
                    attrs_json,
                ],
            )
            .map_err(sql_err)?;
        Ok(())
    }

    fn meta_remove(&mut self, id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM vfs_metadata WHERE id = ?1", params![id]).map_err(sql_err)?;
        Ok(())
    }

    fn meta_scan_all(&self) -> Result<Vec<Metadata>> {
        let mut stmt = self.conn.prepare("SELECT * FROM vfs_metadata").map_err(sql_err)?;
        let rows = stmt.query_map([], Self::row_to_metadata).map_err(sql_err)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(sql_err)
    }

    fn content_read(&self, id: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let content: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT content FROM vfs_data WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(sql_err)?;
        let Some(content) = content else {
            return Ok(0);
        };
        let offset = offset as usize;
        if offset >= content.len() {
            return Ok(0);
        }
        let n = buf.len().min(content.len() - offset);
        buf[..n].copy_from_slice(&content[offset..offset + n]);
        let _ = self.conn.execute(
            "UPDATE vfs_data SET last_accessed = ?2 WHERE id = ?1",
            params![id, now_unix()],
        );
        Ok(n)
    }

    fn content_write(&mut self, id: &str, offset: u64, data: &[u8]) -> Result<()> {
        let offset = offset as usize;
        let tx = self.conn.transaction().map_err(sql_err)?;
        let mut content: Vec<u8> = tx
            .query_row("SELECT content FROM vfs_data WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(sql_err)?
            .unwrap_or_default();
        let new_len = content.len().max(offset + data.len());
        if content.len() < new_len {
            content.resize(new_len, 0);
        }
        content[offset..offset + data.len()].copy_from_slice(data);
        let size = content.len() as i64;
        let now = now_unix();
        tx.execute(
            "INSERT INTO vfs_data(id, content, size, ref_count, created_at, last_accessed)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             ON CONFLICT(id) DO UPDATE SET content = excluded.content, size = excluded.size, last_accessed = excluded.last_accessed",
            params![id, content, size, now],
        )
        .map_err(sql_err)?;
        tx.commit().map_err(sql_err)?;
        Ok(())
    }

    fn content_truncate(&mut self, id: &str, size: u64) -> Result<()> {
        let tx = self.conn.transaction().map_err(sql_err)?;
        let mut content: Vec<u8> = tx
            .query_row("SELECT content FROM vfs_data WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(sql_err)?
            .unwrap_or_default();
        content.resize(size as usize, 0);
        let now = now_unix();
        tx.execute(
            "INSERT INTO vfs_data(id, content, size, ref_count, created_at, last_accessed)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             ON CONFLICT(id) DO UPDATE SET content = excluded.content, size = excluded.size, last_accessed = excluded.last_accessed",
            params![id, content, size as i64, now],
        )
        .map_err(sql_err)?;
        tx.commit().map_err(sql_err)?;
        Ok(())
    }

    fn content_remove(&mut self, id: &str) -> Result<()> {
        self.conn.execute("DELETE FROM vfs_data WHERE id = ?1", params![id]).map_err(sql_err)?;
        Ok(())
    }
}
