//! Pipeline stages for PDF-to-CBZ conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ render ──▶ encode ──▶ archive
//! (*.pdf)     (pdfium)    (JPEG)     (CBZ zip)
//! ```
//!
//! 1. [`discover`] — find convertible PDFs under a directory, sorted
//! 2. [`render`]   — rasterise every page at the configured DPI and write
//!    the JPEG sequence to a scratch directory
//! 3. [`encode`]   — JPEG-encode one rendered page (called by `render`)
//! 4. [`archive`]  — bundle the ordered image sequence into one
//!    deflate-compressed zip

pub mod archive;
pub mod discover;
pub mod encode;
pub mod render;
