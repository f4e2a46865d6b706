//! Staging raw inputs into image and text directories, and OCR of staged images.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::{classify, file_name, list_files, InputKind};
use crate::ocr::OcrEngine;
use crate::pdf::PdfRasterizer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDirs {
    pub raw: PathBuf,
    pub images: PathBuf,
    pub processed: PathBuf,
}

impl StagingDirs {
    /// `{data_dir}/raw`, `{data_dir}/images`, `{data_dir}/processed`.
    pub fn under(data_dir: &Path) -> Self {
        Self {
            raw: data_dir.join("raw"),
            images: data_dir.join("images"),
            processed: data_dir.join("processed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StagingReport {
    pub pdfs: usize,
    pub pages: usize,
    pub images: usize,
    pub texts: usize,
    pub unsupported: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OcrReport {
    pub extracted: usize,
    pub empty: usize,
    pub failed: usize,
    pub unsupported: usize,
}

/// Rasterize PDFs and copy images and text files out of `dirs.raw`.
///
/// A PDF that fails to rasterize is logged and skipped. Copy failures are
/// filesystem errors and abort staging.
pub fn stage_raw(dirs: &StagingDirs, rasterizer: &dyn PdfRasterizer) -> Result<StagingReport> {
    let mut report = StagingReport::default();

    for path in list_files(&dirs.raw)? {
        match classify(&path) {
            InputKind::Pdf => {
                report.pdfs += 1;
                match rasterizer.rasterize(&path, &dirs.images) {
                    Ok(pages) => report.pages += pages.len(),
                    Err(e) => {
                        report.failed += 1;
                        tracing::error!(path = %path.display(), error = %e, "pdf rasterization failed; skipping");
                    }
                }
            }
            InputKind::Image => {
                copy_into(&path, &dirs.images)?;
                report.images += 1;
            }
            InputKind::Text => {
                copy_into(&path, &dirs.processed)?;
                report.texts += 1;
            }
            InputKind::Unsupported => {
                report.unsupported += 1;
                tracing::info!(path = %path.display(), "unsupported file type; skipping");
            }
        }
    }
    Ok(report)
}

/// OCR every image in `dirs.images` into `dirs.processed/{stem}.txt`.
///
/// OCR errors and empty results are logged and skipped.
pub fn ocr_images(dirs: &StagingDirs, ocr: &dyn OcrEngine) -> Result<OcrReport> {
    let mut report = OcrReport::default();

    for path in list_files(&dirs.images)? {
        if classify(&path) != InputKind::Image {
            report.unsupported += 1;
            tracing::info!(path = %path.display(), "not an image; skipping OCR");
            continue;
        }

        let text = match ocr.extract_text(&path) {
            Ok(text) => text,
            Err(e) => {
                report.failed += 1;
                tracing::error!(path = %path.display(), error = %e, "OCR failed; skipping");
                continue;
            }
        };
        if text.trim().is_empty() {
            report.empty += 1;
            tracing::info!(path = %path.display(), "no text extracted; skipping");
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name(&path));
        fs::create_dir_all(&dirs.processed)
            .with_context(|| format!("failed to create `{}`", dirs.processed.display()))?;
        let dest = dirs.processed.join(format!("{stem}.txt"));
        fs::write(&dest, text).with_context(|| format!("failed to write `{}`", dest.display()))?;
        report.extracted += 1;
        tracing::info!(image = %path.display(), text = %dest.display(), "text extracted");
    }
    Ok(report)
}

fn copy_into(path: &Path, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create `{}`", dir.display()))?;
    let dest = dir.join(file_name(path));
    fs::copy(path, &dest).with_context(|| {
        format!("failed to copy `{}` to `{}`", path.display(), dest.display())
    })?;
    tracing::info!(from = %path.display(), to = %dest.display(), "staged");
    Ok(dest)
}
