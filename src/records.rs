//! The persisted chapter record set.
//!
//! One CSV row per discoverable chapter, fixed header
//! `volume,capitulo,titulo,url,data,post_id` (the column names are part of
//! the on-disk interface and stay as the original tool wrote them). The
//! extractor is the single writer and overwrites the file wholesale;
//! the downloader only ever reads it.

use crate::config::FetchConfig;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// One downloadable chapter as discovered on the catalog page.
///
/// `(volume, chapter)` pairs should be unique within a snapshot but are not
/// enforced to be: a catalog page that repeats an entry yields duplicate
/// rows, which resolve to the same destination path anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Volume number, used for the per-volume folder.
    pub volume: u32,
    /// Chapter number within the series.
    #[serde(rename = "capitulo")]
    pub chapter: u32,
    /// Chapter title as shown on the catalog page.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Chapter page URL (not the file itself; that needs a token exchange).
    #[serde(rename = "url")]
    pub source_url: String,
    /// Publication date string, verbatim from the page.
    #[serde(rename = "data")]
    pub publish_date: String,
    /// Stable content identifier, when the catalog entry carried one.
    pub post_id: Option<String>,
}

impl ChapterRecord {
    /// Folder name for this chapter's volume: `<slug>-<volume:02>`.
    pub fn volume_dir_name(&self, config: &FetchConfig) -> String {
        format!("{}-{:02}", config.series_slug, self.volume)
    }

    /// File name for this chapter:
    /// `Capitulo_<chapter:03>_<sanitized title>.pdf`.
    pub fn file_name(&self) -> String {
        format!(
            "Capitulo_{:03}_{}.pdf",
            self.chapter,
            sanitize_title(&self.title)
        )
    }

    /// Deterministic destination path under the configured library dir.
    pub fn dest_path(&self, config: &FetchConfig) -> PathBuf {
        config
            .library_dir
            .join(self.volume_dir_name(config))
            .join(self.file_name())
    }
}

/// Strip filesystem-illegal characters and collapse whitespace runs to
/// single underscores. Idempotent: sanitizing a sanitized name is a no-op.
pub fn sanitize_title(title: &str) -> String {
    let stripped: String = title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Sort records by `(volume, chapter)` as integers, preserving the
/// relative order of duplicates.
pub fn sort_records(records: &mut [ChapterRecord]) {
    records.sort_by_key(|r| (r.volume, r.chapter));
}

/// Persist the record set, overwriting any previous snapshot wholesale.
pub fn save_records(path: &Path, records: &[ChapterRecord]) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record).map_err(|e| Error::RecordSet {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    info!("Saved {} chapter records to {}", records.len(), path.display());
    Ok(())
}

/// Load the record set written by a previous extraction run.
///
/// A missing file is a batch-level precondition failure, not an empty set.
pub fn load_records(path: &Path) -> Result<Vec<ChapterRecord>, Error> {
    if !path.exists() {
        return Err(Error::RecordSetMissing {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: ChapterRecord = row.map_err(|e| Error::RecordSet {
            path: path.to_path_buf(),
            source: e,
        })?;
        records.push(record);
    }
    info!("Loaded {} chapter records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(volume: u32, chapter: u32, title: &str) -> ChapterRecord {
        ChapterRecord {
            volume,
            chapter,
            title: title.to_string(),
            source_url: format!("https://example.com/cap-{chapter}/"),
            publish_date: "Janeiro 1, 2025".to_string(),
            post_id: Some(format!("{}", 1000 + chapter)),
        }
    }

    #[test]
    fn sanitize_removes_illegal_characters() {
        assert_eq!(sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn sanitize_collapses_whitespace_to_underscores() {
        assert_eq!(sanitize_title("The  Fool's\t Path "), "The_Fool's_Path");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_title("Cap: 9 — a/b  teste?");
        assert_eq!(sanitize_title(&once), once);
    }

    #[test]
    fn dest_path_is_zero_padded() {
        let config = FetchConfig::default();
        let r = record(3, 7, "O Louco");
        assert_eq!(r.volume_dir_name(&config), "lord-of-mysteries-03");
        assert_eq!(r.file_name(), "Capitulo_007_O_Louco.pdf");
        let dest = r.dest_path(&config);
        assert!(dest.ends_with("lord-of-mysteries-03/Capitulo_007_O_Louco.pdf"));
    }

    #[test]
    fn sort_is_numeric_not_lexicographic() {
        let mut records = vec![record(1, 10, "dez"), record(1, 9, "nove"), record(1, 2, "dois")];
        sort_records(&mut records);
        let chapters: Vec<u32> = records.iter().map(|r| r.chapter).collect();
        assert_eq!(chapters, vec![2, 9, 10]);
    }

    #[test]
    fn sort_orders_by_volume_first() {
        let mut records = vec![record(2, 1, "a"), record(1, 50, "b")];
        sort_records(&mut records);
        assert_eq!(records[0].volume, 1);
    }

    #[test]
    fn csv_round_trip_preserves_header_and_optional_post_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");

        let mut no_id = record(1, 2, "Sem Id");
        no_id.post_id = None;
        let records = vec![record(1, 1, "Com Id"), no_id];
        save_records(&path, &records).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(header, "volume,capitulo,titulo,url,data,post_id");

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, records);
        assert_eq!(loaded[1].post_id, None);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        save_records(&path, &[record(1, 1, "a"), record(1, 2, "b")]).unwrap();
        save_records(&path, &[record(1, 3, "c")]).unwrap();
        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].chapter, 3);
    }

    #[test]
    fn load_missing_file_is_a_precondition_failure() {
        let err = load_records(Path::new("/definitely/not/links.csv")).unwrap_err();
        assert!(matches!(err, Error::RecordSetMissing { .. }));
    }
}
