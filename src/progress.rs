//! Progress-callback traits for batch downloads and conversions.
//!
//! Inject an `Arc<dyn FetchProgress>` or `Arc<dyn ConvertProgress>` via the
//! config builders to receive events as the batch drivers work through
//! their units. Callbacks are the least-invasive integration point: the
//! interactive binaries forward them to plain println lines or an indicatif
//! bar, and tests count them with atomics, without the library knowing
//! anything about terminals.
//!
//! All methods have default no-op implementations so callers only override
//! what they care about. The traits are `Send + Sync` for symmetry with the
//! config structs; the pipelines themselves are strictly sequential.

use std::path::Path;

/// Events emitted by [`crate::download::download_batch`] per chapter.
pub trait FetchProgress: Send + Sync {
    /// Called once before the first chapter is attempted.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a chapter's download begins.
    ///
    /// `index` is 1-based within the filtered batch.
    fn on_chapter_start(&self, index: usize, total: usize, volume: u32, chapter: u32, title: &str) {
        let _ = (index, total, volume, chapter, title);
    }

    /// Called when a chapter's file was freshly written to disk.
    fn on_chapter_downloaded(&self, index: usize, total: usize, bytes: u64) {
        let _ = (index, total, bytes);
    }

    /// Called when the destination already existed and no network I/O ran.
    fn on_chapter_skipped(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a chapter failed after any allowed retries.
    fn on_chapter_failed(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every chapter has been attempted.
    fn on_batch_complete(&self, downloaded: usize, skipped: usize, failed: usize) {
        let _ = (downloaded, skipped, failed);
    }
}

/// Events emitted while one PDF is rendered and archived.
pub trait ConvertProgress: Send + Sync {
    /// Called once per document after the page count is known.
    fn on_document_start(&self, pdf: &Path, total_pages: usize) {
        let _ = (pdf, total_pages);
    }

    /// Called after each page has been rendered and encoded.
    fn on_page_done(&self, done: usize, total_pages: usize) {
        let _ = (done, total_pages);
    }

    /// Called once the archive has been written and sized.
    fn on_archive_written(&self, archive: &Path, bytes: u64) {
        let _ = (archive, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl FetchProgress for NoopProgress {}
impl ConvertProgress for NoopProgress {}
