// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

pub mod mock;

/// Abstract filesystem interface used by the file-backed entry store.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    /// Writes a uniquely named temp file next to `path`, then renames it over
    /// `path`. A failed write drops (and deletes) the temp file.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("creating temp file in {:?}", parent))?;
        tmp.write_all(contents)
            .with_context(|| format!("writing temp file for {:?}", path))?;
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("syncing temp file for {:?}", path))?;
        tmp.persist(path)
            .with_context(|| format!("replacing {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
