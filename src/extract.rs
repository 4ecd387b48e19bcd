//! Catalog scraping: one GET of the series page, parsed into chapter records.
//!
//! Every chapter sits in an `li[data-id]` element; the volume/chapter marker
//! lives in a `div.epl-num` as `Vol. N Cap. M`. Entries missing the marker,
//! the number pattern, or the PDF link are skipped silently — the catalog
//! page mixes announcement entries into the same list and those are not
//! download failures. A single network error aborts extraction for the run;
//! there is deliberately no retry here.

use crate::config::FetchConfig;
use crate::error::Error;
use crate::records::{sort_records, ChapterRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

static VOL_CAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Vol\.\s*(\d+)\s*Cap\.\s*(\d+)").expect("valid regex"));

static ENTRY_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li[data-id]").expect("valid selector"));
static NUM_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.epl-num").expect("valid selector"));
static TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.epl-title").expect("valid selector"));
static DATE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.epl-date").expect("valid selector"));
static PDF_LINK_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.epl-pdf a.dlpdf").expect("valid selector"));

/// Fetch the configured catalog page and return its chapter records,
/// sorted numerically by `(volume, chapter)`.
pub fn extract_catalog(client: &Client, config: &FetchConfig) -> Result<Vec<ChapterRecord>, Error> {
    info!("Fetching catalog: {}", config.catalog_url);
    let response = client
        .get(&config.catalog_url)
        .header(reqwest::header::REFERER, &config.referer)
        .send()
        .map_err(|e| Error::Network {
            url: config.catalog_url.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: config.catalog_url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.text().map_err(|e| Error::Network {
        url: config.catalog_url.clone(),
        reason: e.to_string(),
    })?;

    let records = parse_catalog(&body);
    info!("Catalog yielded {} chapter records", records.len());
    Ok(records)
}

/// Parse a catalog page body into sorted chapter records.
///
/// Pure function; the fixture tests below exercise it without a network.
pub fn parse_catalog(html: &str) -> Vec<ChapterRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for entry in document.select(&ENTRY_SEL) {
        match parse_entry(&entry) {
            Some(record) => records.push(record),
            None => debug!("Skipping catalog entry without chapter markers"),
        }
    }

    sort_records(&mut records);
    records
}

/// Parse one `li[data-id]` element, or `None` when a required structural
/// marker is missing.
fn parse_entry(entry: &ElementRef<'_>) -> Option<ChapterRecord> {
    let post_id = entry.value().attr("data-id")?.trim();
    if post_id.is_empty() {
        return None;
    }

    let num_text = collect_text(entry.select(&NUM_SEL).next()?);
    let captures = VOL_CAP_RE.captures(&num_text)?;
    let volume: u32 = captures.get(1)?.as_str().parse().ok()?;
    let chapter: u32 = captures.get(2)?.as_str().parse().ok()?;

    let title = entry
        .select(&TITLE_SEL)
        .next()
        .map(collect_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Sem_Titulo".to_string());

    let publish_date = entry
        .select(&DATE_SEL)
        .next()
        .map(collect_text)
        .unwrap_or_default();

    let source_url = entry
        .select(&PDF_LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)?;

    Some(ChapterRecord {
        volume,
        chapter,
        title,
        source_url,
        publish_date,
        post_id: Some(post_id.to_string()),
    })
}

/// Concatenate an element's text nodes, normalising internal whitespace.
fn collect_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_html(post_id: &str, num: &str, title: &str, href: &str) -> String {
        format!(
            r#"<li data-id="{post_id}">
                 <div class="epl-num">{num}</div>
                 <div class="epl-title">{title}</div>
                 <div class="epl-date">Janeiro 5, 2025</div>
                 <div class="epl-pdf"><a class="dlpdf" href="{href}">PDF</a></div>
               </li>"#
        )
    }

    fn page(entries: &[String]) -> String {
        format!("<html><body><ul>{}</ul></body></html>", entries.join("\n"))
    }

    #[test]
    fn parses_complete_entries() {
        let html = page(&[entry_html(
            "4821",
            "Vol. 1 Cap. 3",
            "O Palhaço",
            "https://example.com/cap-3/",
        )]);
        let records = parse_catalog(&html);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!((r.volume, r.chapter), (1, 3));
        assert_eq!(r.title, "O Palhaço");
        assert_eq!(r.source_url, "https://example.com/cap-3/");
        assert_eq!(r.publish_date, "Janeiro 5, 2025");
        assert_eq!(r.post_id.as_deref(), Some("4821"));
    }

    #[test]
    fn skips_entries_missing_the_number_marker() {
        let good = entry_html("1", "Vol. 1 Cap. 1", "Ok", "https://example.com/1/");
        let no_marker = r#"<li data-id="2"><div class="epl-title">Anúncio</div></li>"#.to_string();
        let bad_pattern = entry_html("3", "Capítulo Extra", "Extra", "https://example.com/3/");
        let records = parse_catalog(&page(&[good, no_marker, bad_pattern]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chapter, 1);
    }

    #[test]
    fn skips_entries_without_a_pdf_link() {
        let html = page(&[format!(
            r#"<li data-id="9"><div class="epl-num">Vol. 1 Cap. 9</div>
               <div class="epl-title">Sem PDF</div></li>"#
        )]);
        assert!(parse_catalog(&html).is_empty());
    }

    #[test]
    fn missing_title_falls_back() {
        let html = page(&[format!(
            r#"<li data-id="9"><div class="epl-num">Vol. 2 Cap. 4</div>
               <div class="epl-pdf"><a class="dlpdf" href="https://example.com/4/">PDF</a></div></li>"#
        )]);
        let records = parse_catalog(&html);
        assert_eq!(records[0].title, "Sem_Titulo");
        assert_eq!(records[0].publish_date, "");
    }

    #[test]
    fn output_is_sorted_numerically() {
        let entries = vec![
            entry_html("a1", "Vol. 1 Cap. 10", "dez", "https://example.com/10/"),
            entry_html("a2", "Vol. 1 Cap. 9", "nove", "https://example.com/9/"),
            entry_html("a3", "Vol. 2 Cap. 1", "um", "https://example.com/v2-1/"),
        ];
        let records = parse_catalog(&page(&entries));
        let keys: Vec<(u32, u32)> = records.iter().map(|r| (r.volume, r.chapter)).collect();
        assert_eq!(keys, vec![(1, 9), (1, 10), (2, 1)]);
    }

    #[test]
    fn duplicate_pairs_are_preserved() {
        let entries = vec![
            entry_html("a1", "Vol. 1 Cap. 5", "first", "https://example.com/a/"),
            entry_html("a2", "Vol. 1 Cap. 5", "second", "https://example.com/b/"),
        ];
        let records = parse_catalog(&page(&entries));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "first");
        assert_eq!(records[1].title, "second");
    }
}
