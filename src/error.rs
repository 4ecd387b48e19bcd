//! Error types for the novelgrab library.
//!
//! One enum covers both pipelines. The batch drivers treat every variant as
//! non-fatal for the batch: a failed chapter or PDF is logged, counted, and
//! the loop moves on. Variants only become process-fatal when a precondition
//! for the whole batch is missing (no record set, no discoverable PDFs) or
//! when the caller declines a confirmation prompt.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the novelgrab library.
#[derive(Debug, Error)]
pub enum Error {
    // ── Network errors ────────────────────────────────────────────────────
    /// The request could not be sent or the transport failed mid-flight.
    #[error("Request to '{url}' failed: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status we do not retry.
    #[error("HTTP {status} from '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// HTTP 429 persisted through every allowed attempt.
    #[error("Rate limited by '{url}' after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    // ── Parse errors ──────────────────────────────────────────────────────
    /// Neither post-id pattern matched the chapter page body.
    #[error("No post id found in chapter page '{url}'")]
    PostIdNotFound { url: String },

    /// The token-exchange endpoint refused the request or returned an
    /// unusable body.
    #[error("Token exchange failed for post id {post_id}: {detail}")]
    TokenExchange { post_id: String, detail: String },

    // ── Record-set errors ─────────────────────────────────────────────────
    /// The persisted record set does not exist yet; run the extractor first.
    #[error("Record set not found: '{path}'\nRun the link extraction step first.")]
    RecordSetMissing { path: PathBuf },

    /// Reading or writing the CSV record set failed.
    #[error("Record set '{path}' could not be processed: {source}")]
    RecordSet {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The requested chapter number is not in the record set.
    #[error("Chapter {chapter} not found in the record set")]
    ChapterNotFound { chapter: u32 },

    /// No record falls inside the requested chapter range.
    #[error("No chapters in range {start}-{end}")]
    EmptyRange { start: u32, end: u32 },

    // ── Download output errors ────────────────────────────────────────────
    /// The downloaded file was below the minimum plausible size and was
    /// deleted.
    #[error("Downloaded file '{path}' is only {size} bytes; deleted as corrupt")]
    CorruptDownload { path: PathBuf, size: u64 },

    // ── Converter input errors ────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists but does not carry the PDF magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// pdfium could not parse the document at all.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium failed on one page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// JPEG encoding of a rendered page failed.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The document opened but produced no pages to archive.
    #[error("PDF '{path}' produced no pages")]
    EmptyDocument { path: PathBuf },

    /// The directory holds no convertible PDFs.
    #[error("No PDF files found under '{dir}'")]
    NoPdfsFound { dir: PathBuf },

    /// The target archive exists and the overwrite policy declined it.
    #[error("Archive already exists: '{path}'")]
    OutputExists { path: PathBuf },

    /// Writing the archive failed.
    #[error("Failed to write archive '{path}': {detail}")]
    ArchiveWrite { path: PathBuf, detail: String },

    // ── I/O and config ────────────────────────────────────────────────────
    /// A filesystem operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to the pdfium library: {0}\n\
Install pdfium or point PDFIUM_DYNAMIC_LIB_PATH at an existing copy."
    )]
    PdfiumBindingFailed(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
