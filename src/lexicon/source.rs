//! Filesystem capability used by the parser.
//!
//! Kept behind a trait so tests (and embedded corpora) can feed the parser
//! without touching the disk.

use std::io;
use std::path::Path;

use async_trait::async_trait;

/// A directory entry as seen by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub is_dir: bool,
}

impl SourceFile {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: false }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: true }
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }
}

#[async_trait]
pub trait SourceFs: Send + Sync {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceFile>>;
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl SourceFs for LocalFs {
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceFile>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            files.push(SourceFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(files)
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
