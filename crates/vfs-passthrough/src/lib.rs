//! Host-filesystem-backed [`Backend`] (spec §4.3, C5). Unlike `vfs-indexed`,
//! there is no inode layer: the host filesystem under a configured root
//! directory is the single source of truth, and every operation is a direct
//! `std::fs`/`std::io` call.

mod content_type;

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use vfs_backend::{Backend, Capabilities};
use vfs_path as path;
use vfs_types::{CancellationToken, Error, FileMode, FileStat, FileType, Result};

/// Construction parameters for a passthrough mount (spec §3 "Config").
#[derive(Debug, Clone)]
pub struct PassthroughConfig {
    pub root: PathBuf,
    pub max_object_size: u64,
}

impl PassthroughConfig {
    pub fn new(root: impl Into<PathBuf>, max_object_size: u64) -> Self {
        Self {
            root: root.into(),
            max_object_size,
        }
    }
}

pub struct PassthroughBackend {
    name: String,
    root: PathBuf,
    capabilities: Capabilities,
}

impl PassthroughBackend {
    pub fn new(name: impl Into<String>, config: PassthroughConfig) -> Self {
        let capabilities = Capabilities::new(std::iter::empty(), 0, config.max_object_size);
        Self {
            name: name.into(),
            root: config.root,
            capabilities,
        }
    }

    fn host_path(&self, key: &str) -> PathBuf {
        if key.is_empty() {
            self.root.clone()
        } else {
            self.root.join(key)
        }
    }

    fn stat_of(&self, key: &str, meta: &fs::Metadata) -> FileStat {
        let file_type = if meta.is_dir() {
            FileType::Dir
        } else if meta.file_type().is_symlink() {
            FileType::Symlink
        } else if meta.file_type().is_fifo() {
            FileType::NamedPipe
        } else if meta.file_type().is_socket() {
            FileType::Socket
        } else if meta.file_type().is_block_device() || meta.file_type().is_char_device() {
            FileType::Device
        } else {
            FileType::Regular
        };
        let mode = FileMode::new(meta.permissions().mode() & 0o7777, file_type);
        FileStat {
            key: key.to_string(),
            mode,
            size: meta.len(),
            create_time: meta.ctime(),
            modify_time: meta.mtime(),
            content_type: if file_type == FileType::Regular {
                content_type::infer(path::basename(key))
            } else {
                None
            },
            uid: Some(meta.uid()),
            gid: Some(meta.gid()),
        }
    }

    fn lookup(&self, key: &str) -> Result<(PathBuf, fs::Metadata)> {
        let host_path = self.host_path(key);
        let meta = fs::symlink_metadata(&host_path).map_err(|_| Error::NotExist(key.into()))?;
        Ok((host_path, meta))
    }

    fn check_parent(&self, key: &str) -> Result<()> {
        let Some(parent_key) = path::parent(key) else {
            return Ok(());
        };
        if parent_key.is_empty() {
            return Ok(());
        }
        let parent_path = self.host_path(&parent_key);
        let meta = fs::metadata(&parent_path).map_err(|_| Error::NotExist(parent_key.clone().into()))?;
        if !meta.is_dir() {
            return Err(Error::NotDirectory(parent_key.into()));
        }
        Ok(())
    }
}

impl Backend for PassthroughBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, ctx: &CancellationToken) -> Result<()> {
        ctx.check()?;
        let meta = fs::metadata(&self.root).map_err(|e| Error::MountFailed(e.to_string()))?;
        if !meta.is_dir() {
            return Err(Error::MountFailed(format!("{} is not a directory", self.root.display())));
        }
        log::debug!("passthrough backend '{}' opened at {}", self.name, self.root.display());
        Ok(())
    }

    fn close(&self, ctx: &CancellationToken) -> Result<()> {
        ctx.check()?;
        log::debug!("passthrough backend '{}' closed", self.name);
        Ok(())
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_object(&self, ctx: &CancellationToken, _ns: &str, key: &str, mode: FileMode) -> Result<FileStat> {
        ctx.check()?;
        let key = path::normalize(key);
        if key.is_empty() {
            return Err(Error::Exist("/".into()));
        }
        self.check_parent(&key)?;
        let host_path = self.host_path(&key);

        if mode.is_dir() {
            fs::create_dir(&host_path).map_err(|e| map_create_err(&key, e))?;
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&host_path)
                .map_err(|e| map_create_err(&key, e))?;
        }
        let meta = fs::symlink_metadata(&host_path).map_err(|_| Error::NotExist(key.clone().into()))?;
        Ok(self.stat_of(&key, &meta))
    }

    fn read_object(&self, ctx: &CancellationToken, _ns: &str, key: &str, offset: u64, buf: &mut [u8]) -> Result<usize> {
        ctx.check()?;
        let key = path::normalize(key);
        let (host_path, meta) = self.lookup(&key)?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        if offset >= meta.len() {
            return Ok(0);
        }
        let mut file = File::open(&host_path).map_err(|_| Error::NotExist(key.into()))?;
        file.seek(SeekFrom::Start(offset)).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        let n = file.read(buf).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        Ok(n)
    }

    fn write_object(&self, ctx: &CancellationToken, _ns: &str, key: &str, offset: u64, data: &[u8]) -> Result<usize> {
        ctx.check()?;
        let key = path::normalize(key);
        let (host_path, meta) = self.lookup(&key)?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        let new_size = meta.len().max(offset + data.len() as u64);
        if new_size > self.capabilities.max_object_size {
            return Err(Error::TooLarge(key.into()));
        }
        let mut file = OpenOptions::new().write(true).open(&host_path).map_err(|_| Error::NotExist(key.into()))?;
        if offset > meta.len() {
            file.set_len(offset).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        }
        file.seek(SeekFrom::Start(offset)).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        file.write_all(data).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        Ok(data.len())
    }

    fn delete_object(&self, ctx: &CancellationToken, _ns: &str, key: &str, force: bool) -> Result<()> {
        ctx.check()?;
        let key = path::normalize(key);
        let (host_path, meta) = self.lookup(&key)?;
        if meta.is_dir() {
            if force {
                fs::remove_dir_all(&host_path).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))
            } else {
                Err(Error::IsDirectory(key.into()))
            }
        } else {
            fs::remove_file(&host_path).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))
        }
    }

    fn list_objects(&self, ctx: &CancellationToken, _ns: &str, key: &str) -> Result<Vec<FileStat>> {
        ctx.check()?;
        let key = path::normalize(key);
        let (host_path, meta) = self.lookup(&key)?;
        if !meta.is_dir() {
            return Ok(vec![self.stat_of(&key, &meta)]);
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&host_path).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))? {
            let entry = entry.map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
            let child_meta = entry.metadata().map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_key = path::join(&key, &name);
            out.push(self.stat_of(&child_key, &child_meta));
        }
        Ok(out)
    }

    fn head_object(&self, ctx: &CancellationToken, _ns: &str, key: &str) -> Result<FileStat> {
        ctx.check()?;
        let key = path::normalize(key);
        let (_, meta) = self.lookup(&key)?;
        Ok(self.stat_of(&key, &meta))
    }

    fn truncate_object(&self, ctx: &CancellationToken, _ns: &str, key: &str, size: u64) -> Result<()> {
        ctx.check()?;
        let key = path::normalize(key);
        if size > self.capabilities.max_object_size {
            return Err(Error::TooLarge(key.into()));
        }
        let (host_path, meta) = self.lookup(&key)?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(key.into()));
        }
        let file = OpenOptions::new().write(true).open(&host_path).map_err(|_| Error::NotExist(key.into()))?;
        file.set_len(size).map_err(|e| Error::Permission(PathBuf::from(e.to_string())))?;
        Ok(())
    }
}

fn map_create_err(key: &str, e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::AlreadyExists => Error::Exist(key.into()),
        std::io::ErrorKind::NotFound => Error::NotExist(key.into()),
        _ => Error::Permission(PathBuf::from(format!("{key}: {e}"))),
    }
}
