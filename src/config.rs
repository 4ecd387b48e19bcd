//! Configuration types for the fetch and convert pipelines.
//!
//! The original tools kept their knobs (delays, retry count, DPI, JPEG
//! quality) as process-wide constants. Here every tunable lives in an
//! explicit config struct passed to the components that need it, built via
//! a builder with clamped setters. That makes short-delay test configs
//! trivial and keeps two concurrent conversions from fighting over globals.

use crate::error::Error;
use crate::progress::{ConvertProgress, FetchProgress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Answers yes/no confirmation questions on behalf of the user.
///
/// The interactive binaries back this with a stdin prompt; batch callers
/// inject a canned answer (or rely on [`OverwritePolicy::Always`] /
/// [`OverwritePolicy::Never`] and never get asked).
pub trait ConfirmPrompt: Send + Sync {
    /// Return `true` to proceed with the action described by `message`.
    fn confirm(&self, message: &str) -> bool;
}

/// Convenience alias matching the type stored in the config structs.
pub type PromptHandle = Arc<dyn ConfirmPrompt>;

/// What to do when the target archive already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverwritePolicy {
    /// Replace the existing archive without asking.
    Always,
    /// Leave the existing archive alone and report the conversion as refused.
    Never,
    /// Consult the configured [`ConfirmPrompt`]; with no prompt configured
    /// this behaves as `Never` so headless callers cannot hang on stdin.
    #[default]
    Ask,
}

/// Which chapters of the record set a batch download covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterSelection {
    /// Every persisted chapter.
    All,
    /// One chapter by number.
    Single(u32),
    /// A contiguous chapter range, inclusive on both ends.
    Range(u32, u32),
}

impl ChapterSelection {
    /// Whether a chapter number falls inside this selection.
    pub fn contains(&self, chapter: u32) -> bool {
        match *self {
            ChapterSelection::All => true,
            ChapterSelection::Single(n) => chapter == n,
            ChapterSelection::Range(start, end) => chapter >= start && chapter <= end,
        }
    }
}

// ── Fetch side ───────────────────────────────────────────────────────────

/// Configuration for the link extractor and the resilient downloader.
///
/// Built via [`FetchConfig::builder()`] or [`FetchConfig::default()`].
///
/// # Example
/// ```rust
/// use novelgrab::FetchConfig;
///
/// let config = FetchConfig::builder()
///     .library_dir("downloads")
///     .download_delay_ms(1000)
///     .max_retries(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct FetchConfig {
    /// Catalog page listing every chapter entry.
    pub catalog_url: String,

    /// Admin-ajax style endpoint performing the token exchange.
    pub ajax_url: String,

    /// Value of the `action` form field sent to the ajax endpoint.
    pub action: String,

    /// User-Agent header sent on every request. Some novel hosts reject the
    /// default reqwest agent outright.
    pub user_agent: String,

    /// Referer sent on catalog requests; chapter requests override it with
    /// the chapter page URL, which the token endpoint checks.
    pub referer: String,

    /// Where the CSV record set is persisted. Default: `links_capitulos.csv`.
    pub records_path: PathBuf,

    /// Root directory receiving one folder per volume. Default: `.`.
    pub library_dir: PathBuf,

    /// Series slug used as the volume folder prefix
    /// (`<slug>-<volume:02>/`). Default: `lord-of-mysteries`.
    pub series_slug: String,

    /// Fixed pause between successive chapters in a batch, and the base of
    /// the 429 backoff schedule. Default: 3000 ms.
    ///
    /// The backoff after a rate-limited attempt `n` is
    /// `download_delay_ms * n * 2`, so the waits strictly increase.
    pub download_delay_ms: u64,

    /// Pause between obtaining a signed URL and fetching it. Default: 500 ms.
    ///
    /// The host invalidates tokens that are redeemed faster than a browser
    /// plausibly could.
    pub token_settle_ms: u64,

    /// Total attempts allowed per chapter when the file GET keeps answering
    /// HTTP 429. Default: 3. Every other failure is terminal on the first
    /// occurrence.
    pub max_retries: u32,

    /// Files smaller than this are deleted and reported corrupt.
    /// Default: 1000 bytes — the host serves tiny HTML error bodies with a
    /// 200 status when a token has gone stale.
    pub min_pdf_bytes: u64,

    /// Timeout for catalog/chapter-page/token requests. Default: 30 s.
    pub page_timeout_secs: u64,

    /// Timeout for the file download itself. Default: 60 s.
    pub download_timeout_secs: u64,

    /// Per-chapter progress events for batch downloads.
    pub progress: Option<Arc<dyn FetchProgress>>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            catalog_url: "https://centralnovel.com/series/lord-of-mysteries-20240505/".into(),
            ajax_url: "https://centralnovel.com/wp-admin/admin-ajax.php".into(),
            action: "ts_ln_dl_url".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            referer: "https://centralnovel.com/".into(),
            records_path: PathBuf::from("links_capitulos.csv"),
            library_dir: PathBuf::from("."),
            series_slug: "lord-of-mysteries".into(),
            download_delay_ms: 3000,
            token_settle_ms: 500,
            max_retries: 3,
            min_pdf_bytes: 1000,
            page_timeout_secs: 30,
            download_timeout_secs: 60,
            progress: None,
        }
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("catalog_url", &self.catalog_url)
            .field("ajax_url", &self.ajax_url)
            .field("action", &self.action)
            .field("records_path", &self.records_path)
            .field("library_dir", &self.library_dir)
            .field("series_slug", &self.series_slug)
            .field("download_delay_ms", &self.download_delay_ms)
            .field("token_settle_ms", &self.token_settle_ms)
            .field("max_retries", &self.max_retries)
            .field("min_pdf_bytes", &self.min_pdf_bytes)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn FetchProgress>"))
            .finish()
    }
}

impl FetchConfig {
    /// Create a new builder for `FetchConfig`.
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog_url = url.into();
        self
    }

    pub fn ajax_url(mut self, url: impl Into<String>) -> Self {
        self.config.ajax_url = url.into();
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.config.action = action.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.config.referer = referer.into();
        self
    }

    pub fn records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.records_path = path.into();
        self
    }

    pub fn library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.library_dir = dir.into();
        self
    }

    pub fn series_slug(mut self, slug: impl Into<String>) -> Self {
        self.config.series_slug = slug.into();
        self
    }

    pub fn download_delay_ms(mut self, ms: u64) -> Self {
        self.config.download_delay_ms = ms;
        self
    }

    pub fn token_settle_ms(mut self, ms: u64) -> Self {
        self.config.token_settle_ms = ms;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn min_pdf_bytes(mut self, bytes: u64) -> Self {
        self.config.min_pdf_bytes = bytes;
        self
    }

    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn FetchProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FetchConfig, Error> {
        let c = &self.config;
        if c.catalog_url.is_empty() {
            return Err(Error::InvalidConfig("catalog_url must not be empty".into()));
        }
        if c.max_retries == 0 {
            return Err(Error::InvalidConfig("max_retries must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Convert side ─────────────────────────────────────────────────────────

/// Configuration for PDF-to-CBZ conversion.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
#[derive(Clone)]
pub struct ConvertConfig {
    /// Rendering DPI used when rasterising each page. Range: 72–400.
    /// Default: 150 — sharp enough for comic readers while keeping archives
    /// a fraction of the source PDF size.
    pub dpi: u32,

    /// JPEG quality for encoded pages, 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Cap on either rendered dimension in pixels. Default: 4000.
    ///
    /// Page sizes vary wildly; a poster-sized page at 150 DPI could exhaust
    /// memory. This caps the longest edge regardless of physical size.
    pub max_rendered_pixels: u32,

    /// Keep the scratch directory of rendered JPEGs instead of deleting it
    /// after archival. Default: false.
    pub keep_images: bool,

    /// Directory receiving the archives. `None` colocates each archive with
    /// its source PDF.
    pub output_dir: Option<PathBuf>,

    /// What to do when the target archive already exists.
    pub overwrite: OverwritePolicy,

    /// Prompt consulted by [`OverwritePolicy::Ask`].
    pub prompt: Option<PromptHandle>,

    /// Per-page progress events.
    pub progress: Option<Arc<dyn ConvertProgress>>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            jpeg_quality: 95,
            max_rendered_pixels: 4000,
            keep_images: false,
            output_dir: None,
            overwrite: OverwritePolicy::default(),
            prompt: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertConfig")
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("keep_images", &self.keep_images)
            .field("output_dir", &self.output_dir)
            .field("overwrite", &self.overwrite)
            .field("prompt", &self.prompt.as_ref().map(|_| "<dyn ConfirmPrompt>"))
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ConvertProgress>"))
            .finish()
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        // pdfium takes the cap as an i32; values past that would wrap negative.
        self.config.max_rendered_pixels = px.clamp(100, i32::MAX as u32);
        self
    }

    pub fn keep_images(mut self, keep: bool) -> Self {
        self.config.keep_images = keep;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.config.overwrite = policy;
        self
    }

    pub fn prompt(mut self, prompt: PromptHandle) -> Self {
        self.config.prompt = Some(prompt);
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ConvertProgress>) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, Error> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Error::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(Error::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_contains() {
        assert!(ChapterSelection::All.contains(7));
        assert!(ChapterSelection::Single(7).contains(7));
        assert!(!ChapterSelection::Single(7).contains(8));
        assert!(ChapterSelection::Range(5, 10).contains(5));
        assert!(ChapterSelection::Range(5, 10).contains(10));
        assert!(!ChapterSelection::Range(5, 10).contains(11));
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ConvertConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
        let c = ConvertConfig::builder().dpi(9000).build().unwrap();
        assert_eq!(c.dpi, 400);
    }

    #[test]
    fn builder_clamps_pixel_cap_to_i32_range() {
        let c = ConvertConfig::builder()
            .max_rendered_pixels(u32::MAX)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, i32::MAX as u32);
        let c = ConvertConfig::builder().max_rendered_pixels(10).build().unwrap();
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn builder_clamps_quality() {
        let c = ConvertConfig::builder().jpeg_quality(0).build().unwrap();
        assert_eq!(c.jpeg_quality, 1);
    }

    #[test]
    fn fetch_builder_keeps_at_least_one_attempt() {
        let c = FetchConfig::builder().max_retries(0).build().unwrap();
        assert_eq!(c.max_retries, 1);
    }

    #[test]
    fn fetch_defaults() {
        let c = FetchConfig::default();
        assert_eq!(c.download_delay_ms, 3000);
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.min_pdf_bytes, 1000);
        assert_eq!(c.records_path, PathBuf::from("links_capitulos.csv"));
    }
}
