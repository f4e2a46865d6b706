//! Document ingestion for ontoforge.
//!
//! Turns a directory of raw inputs into plain-text files ready for chunking:
//!
//! ```text
//! raw/*.pdf  ── PdfRasterizer ──► images/{name}page_{n}.jpg ─┐
//! raw/*.png|jpg|jpeg ───────────► images/                    ├─ OcrEngine ─► processed/{stem}.txt
//! raw/*.txt  ───────────────────► processed/                 ┘
//! ```
//!
//! Everything here is thin I/O or delegation to external tools. The text and
//! images are **untrusted**; nothing is interpreted beyond file extensions.

pub mod chunk;
pub mod discovery;
pub mod ocr;
pub mod pdf;
pub mod stage;

pub use chunk::split_chars;
pub use discovery::{classify, file_name, list_files, InputKind};
pub use ocr::{LlmOcr, OcrEngine};
pub use pdf::{PdfError, PdfRasterizer, PdftoppmRasterizer};
pub use stage::{ocr_images, stage_raw, OcrReport, StagingDirs, StagingReport};
