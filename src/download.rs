//! The resilient chapter downloader.
//!
//! Each chapter goes through a two-step token exchange: its stable
//! `post_id` is traded at the ajax endpoint for a one-time signed URL,
//! which is then streamed to disk. A missing `post_id` is recovered by
//! pattern-matching the chapter page body. The only retryable failure is
//! HTTP 429 on the file fetch, handled by a bounded attempt loop with a
//! `base * attempt * 2` backoff; everything else fails the chapter on the
//! first occurrence and the batch driver moves on.

use crate::config::{ChapterSelection, FetchConfig};
use crate::error::Error;
use crate::records::ChapterRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Chunk size for streaming the file body to disk.
const CHUNK_SIZE: usize = 8192;

static POST_ID_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""post_id":\s*(\d+)"#).expect("valid regex"));
static POST_ID_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-id["\s]*[:=]["\s]*(\d+)"#).expect("valid regex"));

/// Body of the token-exchange response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    error: i64,
    url: Option<String>,
}

/// How one chapter's download ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written to its destination.
    Downloaded { bytes: u64 },
    /// The destination already existed; no network I/O was performed.
    AlreadyExists,
}

/// Accumulated outcomes of a batch run. Failures never abort the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Chapters freshly written to disk.
    pub downloaded: usize,
    /// Chapters whose destination already existed.
    pub skipped: usize,
    /// Chapters that failed after any allowed retries.
    pub failed: usize,
}

/// Build the blocking HTTP client both pipelines share.
pub fn build_client(config: &FetchConfig) -> Result<Client, Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .build()
        .map_err(|e| Error::Network {
            url: config.catalog_url.clone(),
            reason: e.to_string(),
        })
}

/// Backoff before retrying attempt `attempt` (1-based) after a 429.
///
/// Strictly increasing in the attempt number so repeated rate-limiting
/// backs the client off further each time.
pub fn backoff_delay(config: &FetchConfig, attempt: u32) -> Duration {
    Duration::from_millis(config.download_delay_ms * u64::from(attempt) * 2)
}

/// Extract a post id from a chapter page body, trying the embedded JSON
/// pattern first and the `data-id` attribute pattern second.
fn find_post_id(body: &str) -> Option<String> {
    POST_ID_JSON_RE
        .captures(body)
        .or_else(|| POST_ID_DATA_RE.captures(body))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Fetch the chapter page and pattern-match its post id.
fn resolve_post_id(client: &Client, config: &FetchConfig, page_url: &str) -> Result<String, Error> {
    debug!("Resolving post id from {}", page_url);
    let response = client
        .get(page_url)
        .header(USER_AGENT, &config.user_agent)
        .header(REFERER, &config.referer)
        .timeout(Duration::from_secs(config.page_timeout_secs))
        .send()
        .map_err(|e| Error::Network {
            url: page_url.to_string(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(Error::HttpStatus {
            url: page_url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response.text().map_err(|e| Error::Network {
        url: page_url.to_string(),
        reason: e.to_string(),
    })?;

    find_post_id(&body).ok_or_else(|| Error::PostIdNotFound {
        url: page_url.to_string(),
    })
}

/// Parse the ajax response body into the signed URL.
fn parse_token(post_id: &str, body: &str) -> Result<String, Error> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| Error::TokenExchange {
            post_id: post_id.to_string(),
            detail: format!("unparseable response: {e}"),
        })?;
    if parsed.error != 0 {
        return Err(Error::TokenExchange {
            post_id: post_id.to_string(),
            detail: format!("server reported error {}", parsed.error),
        });
    }
    parsed.url.filter(|u| !u.is_empty()).ok_or_else(|| Error::TokenExchange {
        post_id: post_id.to_string(),
        detail: "response carried no url".to_string(),
    })
}

/// Exchange a post id for a one-time signed download URL.
///
/// The token is valid for a single fetch and is never persisted.
fn exchange_token(
    client: &Client,
    config: &FetchConfig,
    post_id: &str,
    page_url: &str,
) -> Result<String, Error> {
    let form = [("action", config.action.as_str()), ("post_id", post_id)];
    let response = client
        .post(&config.ajax_url)
        .header(USER_AGENT, &config.user_agent)
        .header(REFERER, page_url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .form(&form)
        .timeout(Duration::from_secs(config.page_timeout_secs))
        .send()
        .map_err(|e| Error::Network {
            url: config.ajax_url.clone(),
            reason: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(Error::TokenExchange {
            post_id: post_id.to_string(),
            detail: format!("HTTP {}", response.status().as_u16()),
        });
    }

    let body = response.text().map_err(|e| Error::Network {
        url: config.ajax_url.clone(),
        reason: e.to_string(),
    })?;
    parse_token(post_id, &body)
}

/// Stream a response body to `dest` in fixed-size chunks, returning the
/// byte count. Any mid-stream failure, whether reading the body or writing
/// the file, removes the partial file: a leftover would pass the
/// skip-if-present check on the next run and mask the failure for good.
fn stream_to_file(mut response: impl Read, dest: &Path) -> Result<u64, Error> {
    let mut file = File::create(dest).map_err(|e| Error::io(dest, e))?;
    match copy_chunks(&mut response, &mut file) {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(dest);
            Err(Error::io(dest, e))
        }
    }
}

fn copy_chunks(response: &mut impl Read, file: &mut File) -> io::Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    loop {
        let n = match response.read(&mut buf)? {
            0 => break,
            n => n,
        };
        file.write_all(&buf[..n])?;
        written += n as u64;
    }
    file.flush()?;
    Ok(written)
}

/// Download one chapter to its deterministic destination path.
///
/// Idempotent by presence: an existing destination short-circuits before
/// any network call. Only HTTP 429 on the file fetch is retried, up to
/// `config.max_retries` total attempts.
pub fn download_chapter(
    client: &Client,
    config: &FetchConfig,
    record: &ChapterRecord,
) -> Result<DownloadOutcome, Error> {
    let dest = record.dest_path(config);
    if dest.exists() {
        info!("Already present: {}", dest.display());
        return Ok(DownloadOutcome::AlreadyExists);
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    for attempt in 1..=config.max_retries {
        // Tokens are single-use, so every attempt redoes the exchange.
        let post_id = match record.post_id.clone() {
            Some(id) if !id.is_empty() => id,
            _ => resolve_post_id(client, config, &record.source_url)?,
        };
        let signed_url = exchange_token(client, config, &post_id, &record.source_url)?;

        thread::sleep(Duration::from_millis(config.token_settle_ms));

        let response = client
            .get(&signed_url)
            .header(USER_AGENT, &config.user_agent)
            .header(REFERER, &record.source_url)
            .send()
            .map_err(|e| Error::Network {
                url: signed_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if attempt < config.max_retries {
                let delay = backoff_delay(config, attempt);
                warn!(
                    "HTTP 429 for chapter {} (attempt {}/{}), backing off {:?}",
                    record.chapter, attempt, config.max_retries, delay
                );
                thread::sleep(delay);
                continue;
            }
            return Err(Error::RateLimited {
                url: record.source_url.clone(),
                attempts: config.max_retries,
            });
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: signed_url,
                status: status.as_u16(),
            });
        }

        let bytes = stream_to_file(response, &dest)?;
        if bytes < config.min_pdf_bytes {
            let _ = fs::remove_file(&dest);
            return Err(Error::CorruptDownload { path: dest, size: bytes });
        }

        info!("Downloaded {} ({} bytes)", dest.display(), bytes);
        return Ok(DownloadOutcome::Downloaded { bytes });
    }

    // The loop always returns; max_retries is clamped to ≥ 1.
    Err(Error::RateLimited {
        url: record.source_url.clone(),
        attempts: config.max_retries,
    })
}

/// Run the download contract over a selection of the record set.
///
/// Chapters are processed strictly sequentially with a fixed pause between
/// successive requests. A chapter's failure is counted and logged, never
/// escalated. `Single` and `Range` selections that match nothing are
/// batch-level errors; `All` over an empty record set yields an empty
/// report.
pub fn download_batch(
    client: &Client,
    config: &FetchConfig,
    records: &[ChapterRecord],
    selection: ChapterSelection,
) -> Result<BatchReport, Error> {
    let selected: Vec<&ChapterRecord> = records
        .iter()
        .filter(|r| selection.contains(r.chapter))
        .collect();

    if selected.is_empty() {
        match selection {
            ChapterSelection::Single(chapter) => return Err(Error::ChapterNotFound { chapter }),
            ChapterSelection::Range(start, end) => return Err(Error::EmptyRange { start, end }),
            ChapterSelection::All => return Ok(BatchReport::default()),
        }
    }

    let total = selected.len();
    let mut report = BatchReport::default();
    if let Some(ref progress) = config.progress {
        progress.on_batch_start(total);
    }

    for (i, record) in selected.iter().enumerate() {
        let index = i + 1;
        if let Some(ref progress) = config.progress {
            progress.on_chapter_start(index, total, record.volume, record.chapter, &record.title);
        }

        match download_chapter(client, config, record) {
            Ok(DownloadOutcome::Downloaded { bytes }) => {
                report.downloaded += 1;
                if let Some(ref progress) = config.progress {
                    progress.on_chapter_downloaded(index, total, bytes);
                }
            }
            Ok(DownloadOutcome::AlreadyExists) => {
                report.skipped += 1;
                if let Some(ref progress) = config.progress {
                    progress.on_chapter_skipped(index, total);
                }
            }
            Err(e) => {
                warn!("Chapter {} failed: {}", record.chapter, e);
                report.failed += 1;
                if let Some(ref progress) = config.progress {
                    progress.on_chapter_failed(index, total, &e.to_string());
                }
            }
        }

        if index < total {
            thread::sleep(Duration::from_millis(config.download_delay_ms));
        }
    }

    if let Some(ref progress) = config.progress {
        progress.on_batch_complete(report.downloaded, report.skipped, report.failed);
    }
    Ok(report)
}
