//! Durable queue of fragments that failed parse and repair.
//!
//! Items are plain Turtle files so a human can fix them in place; the next
//! review run retries whatever is there.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{ensure_flat_name, FragmentKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub key: FragmentKey,
    pub turtle: String,
}

/// Storage for review items.
///
/// Entries are addressed by name (for the directory queue, the file name).
/// `list` returns every entry, including ones this program did not write;
/// callers decide what to skip.
pub trait ReviewQueue {
    fn enqueue(&self, item: &ReviewItem) -> Result<()>;
    fn list(&self) -> Result<Vec<String>>;
    fn read(&self, name: &str) -> Result<String>;
    fn remove(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct DirReviewQueue {
    dir: PathBuf,
}

impl DirReviewQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf> {
        ensure_flat_name(name)?;
        Ok(self.dir.join(name))
    }
}

impl ReviewQueue for DirReviewQueue {
    fn enqueue(&self, item: &ReviewItem) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create review dir `{}`", self.dir.display()))?;
        let path = self.entry_path(&item.key.file_name())?;
        fs::write(&path, &item.turtle)
            .with_context(|| format!("failed to write review item `{}`", path.display()))?;
        tracing::info!(path = %path.display(), "fragment queued for review");
        Ok(())
    }

    /// Regular files in name order. A missing directory is an empty queue.
    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to list review dir `{}`", self.dir.display()))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "skipping review entry with non-UTF-8 name"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.entry_path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read review item `{}`", path.display()))
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.entry_path(name)?;
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove review item `{}`", path.display()))
    }
}
