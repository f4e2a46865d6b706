//! Every generated fragment, kept as-is for auditing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::FragmentKey;

#[derive(Debug, Clone)]
pub struct FragmentArchive {
    dir: PathBuf,
}

impl FragmentArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &FragmentKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Write (or overwrite) the fragment for `key`.
    pub fn store(&self, key: &FragmentKey, turtle: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create fragment dir `{}`", self.dir.display()))?;
        let path = self.path_for(key);
        fs::write(&path, turtle)
            .with_context(|| format!("failed to archive fragment `{}`", path.display()))?;
        tracing::debug!(path = %path.display(), "fragment archived");
        Ok(path)
    }
}
