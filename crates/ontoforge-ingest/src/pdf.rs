//! PDF → per-page JPEG rasterization.
//!
//! The default implementation shells out to poppler's `pdftoppm`. Pages are
//! rendered into a scratch directory next to the destination, then renamed to
//! `{pdf file name}page_{n}.jpg` (1-based).

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::discovery::file_name;

pub const DEFAULT_PDFTOPPM: &str = "pdftoppm";
pub const DEFAULT_DPI: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("failed to run `{binary}` (is poppler installed?): {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{binary}` exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: String,
        stderr: String,
    },
    #[error("no pages were rendered from `{0}`")]
    NoPages(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait PdfRasterizer {
    /// Render every page of `pdf` into `out_dir`; returns the image paths in
    /// page order.
    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PdfError>;
}

#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: String,
    dpi: u32,
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self {
            binary: DEFAULT_PDFTOPPM.to_string(),
            dpi: DEFAULT_DPI,
        }
    }
}

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

impl PdfRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
        std::fs::create_dir_all(out_dir)?;
        let scratch = tempfile::Builder::new()
            .prefix(".pdftoppm-")
            .tempdir_in(out_dir)?;
        let prefix = scratch.path().join("page");

        let output = Command::new(&self.binary)
            .arg("-jpeg")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|source| PdfError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Failed {
                binary: self.binary.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut pages: Vec<(usize, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(scratch.path())? {
            let path = entry?.path();
            if let Some(n) = page_number(&path) {
                pages.push((n, path));
            }
        }
        if pages.is_empty() {
            return Err(PdfError::NoPages(pdf.to_path_buf()));
        }
        pages.sort();

        let base = file_name(pdf);
        let mut images = Vec::with_capacity(pages.len());
        for (i, (_, rendered)) in pages.into_iter().enumerate() {
            let dest = out_dir.join(page_image_name(&base, i + 1));
            std::fs::rename(&rendered, &dest)?;
            images.push(dest);
        }
        tracing::info!(pdf = %pdf.display(), pages = images.len(), "pdf rasterized");
        Ok(images)
    }
}

/// `report.pdf`, 3 → `report.pdfpage_3.jpg`
pub fn page_image_name(pdf_file_name: &str, page: usize) -> String {
    format!("{pdf_file_name}page_{page}.jpg")
}

/// `page-7.jpg` / `page-07.jpg` → 7. pdftoppm zero-pads by page count.
fn page_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let (_, digits) = stem.rsplit_once('-')?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_pages_after_the_pdf() {
        assert_eq!(page_image_name("report.pdf", 1), "report.pdfpage_1.jpg");
    }

    #[test]
    fn parses_padded_page_numbers() {
        assert_eq!(page_number(Path::new("/tmp/x/page-07.jpg")), Some(7));
        assert_eq!(page_number(Path::new("/tmp/x/page-12.jpg")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/notes.jpg")), None);
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rasterizer = PdftoppmRasterizer::new().with_binary("ontoforge-no-such-pdftoppm");
        let err = rasterizer
            .rasterize(&dir.path().join("a.pdf"), &dir.path().join("images"))
            .unwrap_err();
        assert!(matches!(err, PdfError::Spawn { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn renames_rendered_pages_in_page_order() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        // Stand-in for pdftoppm: `$5` is the output prefix.
        let script = dir.path().join("fake-pdftoppm");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor n in 01 02 10; do printf \"$n\" > \"$5-$n.jpg\"; done\n",
        )
        .expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let out = dir.path().join("images");
        let rasterizer = PdftoppmRasterizer::new().with_binary(script.to_string_lossy());
        let pages = rasterizer
            .rasterize(Path::new("scans/manual.pdf"), &out)
            .expect("rasterize");

        let names: Vec<_> = pages.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec!["manual.pdfpage_1.jpg", "manual.pdfpage_2.jpg", "manual.pdfpage_3.jpg"]
        );
        assert_eq!(std::fs::read_to_string(&pages[2]).expect("read"), "10");
        // Scratch directory is cleaned up.
        assert_eq!(std::fs::read_dir(&out).expect("read_dir").count(), 3);
    }
}
