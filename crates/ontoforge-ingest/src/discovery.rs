//! Non-recursive input discovery.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Pdf,
    Image,
    Text,
    Unsupported,
}

/// Classify by extension, case-insensitively.
pub fn classify(path: &Path) -> InputKind {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return InputKind::Unsupported,
    };
    match ext.as_str() {
        "pdf" => InputKind::Pdf,
        "png" | "jpg" | "jpeg" => InputKind::Image,
        "txt" => InputKind::Text,
        _ => InputKind::Unsupported,
    }
}

/// Regular files directly inside `dir`, in file-name order. A missing
/// directory yields no files.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "input directory does not exist");
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to list `{}`", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// The file name as UTF-8 (lossy), used as the document name in fragment keys.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_by_extension_ignoring_case() {
        assert_eq!(classify(Path::new("a/Report.PDF")), InputKind::Pdf);
        assert_eq!(classify(Path::new("scan.JpEg")), InputKind::Image);
        assert_eq!(classify(Path::new("x.png")), InputKind::Image);
        assert_eq!(classify(Path::new("notes.txt")), InputKind::Text);
        assert_eq!(classify(Path::new("slides.pptx")), InputKind::Unsupported);
        assert_eq!(classify(Path::new("README")), InputKind::Unsupported);
    }

    #[test]
    fn lists_regular_files_sorted_and_non_recursive() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.txt"), "b").expect("write");
        fs::write(dir.path().join("a.pdf"), "a").expect("write");
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested/c.txt"), "c").expect("write");

        let files = list_files(dir.path()).expect("list");
        let names: Vec<_> = files.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(list_files(&dir.path().join("raw")).expect("list").is_empty());
    }
}
