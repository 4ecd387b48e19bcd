//! Interactive catalog scraper and chapter downloader.
//!
//! A thin shim over the library crate: a numbered menu on stdin drives
//! `extract_catalog` and `download_batch`, with per-chapter progress
//! printed to the terminal.

use anyhow::{Context, Result};
use novelgrab::{
    download, extract, records, ChapterSelection, FetchConfig, FetchProgress,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal progress ────────────────────────────────────────────────────────

/// Prints one line per chapter as the batch advances.
struct TerminalProgress;

impl FetchProgress for TerminalProgress {
    fn on_batch_start(&self, total: usize) {
        println!("{} {}", cyan("◆"), bold(&format!("Downloading {total} chapters…")));
    }

    fn on_chapter_start(&self, index: usize, total: usize, volume: u32, chapter: u32, title: &str) {
        println!(
            "  [{index:>3}/{total}] Vol. {volume} Cap. {chapter}  {}",
            dim(title)
        );
    }

    fn on_chapter_downloaded(&self, _index: usize, _total: usize, bytes: u64) {
        println!("        {} {}", green("✓"), dim(&format!("{bytes} bytes")));
    }

    fn on_chapter_skipped(&self, _index: usize, _total: usize) {
        println!("        {} already present", dim("→"));
    }

    fn on_chapter_failed(&self, _index: usize, _total: usize, error: &str) {
        println!("        {} {}", red("✗"), red(error));
    }

    fn on_batch_complete(&self, downloaded: usize, skipped: usize, failed: usize) {
        println!(
            "{} {} downloaded, {} skipped, {} failed",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&downloaded.to_string()),
            skipped,
            if failed == 0 {
                failed.to_string()
            } else {
                red(&failed.to_string())
            },
        );
    }
}

// ── Menu plumbing ────────────────────────────────────────────────────────────

/// Read one trimmed line from stdin. `None` means EOF, which the menu
/// treats as "exit".
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

fn read_number(prompt: &str) -> Option<u32> {
    loop {
        let line = read_line(prompt)?;
        match line.parse() {
            Ok(n) => return Some(n),
            Err(_) => println!("{}", red("Enter a chapter number.")),
        }
    }
}

fn confirm(prompt: &str) -> bool {
    matches!(
        read_line(prompt).as_deref(),
        Some("s") | Some("S") | Some("y") | Some("Y") | Some("sim") | Some("yes")
    )
}

fn load_records_or_hint(config: &FetchConfig) -> Option<Vec<novelgrab::ChapterRecord>> {
    match records::load_records(&config.records_path) {
        Ok(records) => Some(records),
        Err(e) => {
            println!("{} {}", red("✗"), e);
            println!("{}", dim("Run option 1 first to extract the chapter links."));
            None
        }
    }
}

fn run_extract(config: &FetchConfig) -> Result<()> {
    let client = download::build_client(config)?;
    println!("{} Fetching catalog {}", cyan("◆"), dim(&config.catalog_url));
    let records = extract::extract_catalog(&client, config).context("Catalog extraction failed")?;
    records::save_records(&config.records_path, &records).context("Could not write record set")?;
    println!(
        "{} {} chapters saved to {}",
        green("✔"),
        bold(&records.len().to_string()),
        config.records_path.display()
    );
    Ok(())
}

fn run_download(config: &FetchConfig, selection: ChapterSelection) -> Result<()> {
    let Some(records) = load_records_or_hint(config) else {
        return Ok(());
    };
    let client = download::build_client(config)?;
    download::download_batch(&client, config, &records, selection)
        .context("Download batch failed")?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = FetchConfig::builder()
        .progress(Arc::new(TerminalProgress))
        .build()
        .context("Invalid configuration")?;

    loop {
        println!();
        println!("{}", bold("=== novelgrab ==="));
        println!("1. Extract chapter links");
        println!("2. Download all chapters");
        println!("3. Download one chapter");
        println!("4. Download a chapter range");
        println!("5. Exit");

        let Some(choice) = read_line("> ") else {
            // EOF on stdin ends the session cleanly.
            println!();
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => run_extract(&config),
            "2" => {
                if confirm("Download every chapter? This can take hours. [s/N] ") {
                    run_download(&config, ChapterSelection::All)
                } else {
                    println!("{}", dim("Cancelled."));
                    Ok(())
                }
            }
            "3" => {
                let Some(chapter) = read_number("Chapter number: ") else {
                    return Ok(());
                };
                run_download(&config, ChapterSelection::Single(chapter))
            }
            "4" => {
                let Some(start) = read_number("First chapter: ") else {
                    return Ok(());
                };
                let Some(end) = read_number("Last chapter: ") else {
                    return Ok(());
                };
                if start > end {
                    println!("{}", red("The range start must not exceed its end."));
                    continue;
                }
                run_download(&config, ChapterSelection::Range(start, end))
            }
            "5" | "q" => return Ok(()),
            other => {
                println!("{}", red(&format!("Unknown option: {other}")));
                Ok(())
            }
        };

        // A failed action returns to the menu; only setup errors are fatal.
        if let Err(e) = outcome {
            println!("{} {e:#}", red("✗"));
        }
    }
}
