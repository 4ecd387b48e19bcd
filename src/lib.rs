//! # novelgrab
//!
//! Scrape a web-novel catalog into a chapter record set, download the
//! chapter PDFs through the host's token-exchange endpoint, and repack
//! downloaded PDFs as CBZ comic archives.
//!
//! ## Why this crate?
//!
//! Novel hosts that offer per-chapter PDF downloads guard them behind
//! short-lived signed URLs and aggressive rate limiting. Grabbing a few
//! hundred chapters by hand is hopeless, and naive scripts trip the
//! limiter and collect corrupt HTML-as-PDF bodies. This crate does the
//! whole run politely and resiliently: fixed pacing between chapters,
//! increasing backoff on HTTP 429, fresh token per attempt, and a size
//! check that throws away the host's tiny error bodies.
//!
//! ## Pipeline Overview
//!
//! ```text
//! catalog page
//!  │
//!  ├─ 1. Extract   parse chapter entries → links_capitulos.csv
//!  ├─ 2. Download  resolve post_id → token exchange → signed URL → PDF
//!  │               (skip existing, retry 429, delete corrupt)
//!  └─ 3. Convert   PDF → JPEG pages via pdfium → zero-padded CBZ
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use novelgrab::{download, extract, ChapterSelection, FetchConfig};
//!
//! fn main() -> Result<(), novelgrab::Error> {
//!     let config = FetchConfig::default();
//!     let client = download::build_client(&config)?;
//!
//!     let records = extract::extract_catalog(&client, &config)?;
//!     novelgrab::records::save_records(&config.records_path, &records)?;
//!
//!     let report = download::download_batch(&client, &config, &records, ChapterSelection::All)?;
//!     println!("{} downloaded, {} skipped, {} failed",
//!         report.downloaded, report.skipped, report.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `novelgrab` and `pdf2cbz` binaries (anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! novelgrab = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod download;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod records;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ChapterSelection, ConfirmPrompt, ConvertConfig, ConvertConfigBuilder, FetchConfig,
    FetchConfigBuilder, OverwritePolicy, PromptHandle,
};
pub use convert::{convert_dir, convert_pdf, CbzOutput, ConvertReport};
pub use download::{download_batch, download_chapter, BatchReport, DownloadOutcome};
pub use error::Error;
pub use extract::extract_catalog;
pub use progress::{ConvertProgress, FetchProgress, NoopProgress};
pub use records::ChapterRecord;
