//! Interactive PDF-to-CBZ converter.
//!
//! Maps a numbered stdin menu to `convert_pdf` / `convert_dir` and renders
//! per-page progress with an indicatif bar.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use novelgrab::pipeline::discover::discover_pdfs;
use novelgrab::{
    convert_dir, convert_pdf, ConfirmPrompt, ConvertConfig, ConvertProgress, OverwritePolicy,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
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

// ── Progress bar ─────────────────────────────────────────────────────────────

/// Terminal progress: one bar per document, reset as each PDF starts.
struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }
}

impl ConvertProgress for BarProgress {
    fn on_document_start(&self, pdf: &Path, total_pages: usize) {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix(
            pdf.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| pdf.display().to_string()),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn on_page_done(&self, done: usize, _total: usize) {
        if let Some(ref bar) = *self.bar.lock().unwrap() {
            bar.set_position(done as u64);
        }
    }

    fn on_archive_written(&self, archive: &Path, bytes: u64) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        println!(
            "{} {}  {}",
            green("✔"),
            bold(&archive.display().to_string()),
            dim(&format!("{} KiB", bytes / 1024))
        );
    }
}

// ── Stdin prompt ─────────────────────────────────────────────────────────────

struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        matches!(
            read_line(&format!("{message} [s/N] ")).as_deref(),
            Some("s") | Some("S") | Some("y") | Some("Y") | Some("sim") | Some("yes")
        )
    }
}

// ── Menu plumbing ────────────────────────────────────────────────────────────

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

fn read_path(prompt: &str) -> Option<PathBuf> {
    let line = read_line(prompt)?;
    if line.is_empty() {
        None
    } else {
        Some(PathBuf::from(line))
    }
}

fn show_settings(config: &ConvertConfig) {
    println!("{}", bold("Current settings"));
    println!("  DPI:            {}", config.dpi);
    println!("  JPEG quality:   {}", config.jpeg_quality);
    println!("  Pixel cap:      {}", config.max_rendered_pixels);
    println!("  Keep images:    {}", config.keep_images);
    println!(
        "  Output dir:     {}",
        config
            .output_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(next to each PDF)".into())
    );
    println!("  Overwrite:      {:?}", config.overwrite);
}

/// Per-run output folder. Enter keeps the default: next to each source PDF.
fn with_output_dir(mut config: ConvertConfig) -> ConvertConfig {
    if let Some(line) = read_line("Output folder (Enter = same folder): ") {
        if !line.is_empty() {
            config.output_dir = Some(PathBuf::from(line));
        }
    }
    config
}

fn run_file(config: &ConvertConfig) -> Result<()> {
    let Some(path) = read_path("PDF file: ") else {
        return Ok(());
    };
    let config = with_output_dir(config.clone());
    let output = convert_pdf(&path, &config).context("Conversion failed")?;
    if let Some(ref kept) = output.kept_images {
        println!("{} page images kept in {}", dim("→"), kept.display());
    }
    Ok(())
}

fn run_dir(config: &ConvertConfig, recursive: bool) -> Result<()> {
    let Some(dir) = read_path("Folder: ") else {
        return Ok(());
    };
    let pdfs = discover_pdfs(&dir, recursive).context("Could not scan the folder")?;
    if pdfs.is_empty() {
        println!("{}", red(&format!("No PDF files found under {}", dir.display())));
        return Ok(());
    }
    println!("{} {} found", cyan("◆"), bold(&format!("{} PDFs", pdfs.len())));
    if !StdinPrompt.confirm(&format!("Convert {} PDFs?", pdfs.len())) {
        println!("{}", dim("Cancelled."));
        return Ok(());
    }
    let config = with_output_dir(config.clone());
    let report = convert_dir(&dir, recursive, &config).context("Batch conversion failed")?;
    println!(
        "{} {} converted, {}",
        if report.failed == 0 { green("✔") } else { cyan("⚠") },
        bold(&report.succeeded.to_string()),
        if report.failed == 0 {
            "0 failed".to_string()
        } else {
            red(&format!("{} failed", report.failed))
        },
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = ConvertConfig::builder()
        .overwrite(OverwritePolicy::Ask)
        .prompt(Arc::new(StdinPrompt))
        .progress(BarProgress::new())
        .build()
        .context("Invalid configuration")?;

    loop {
        println!();
        println!("{}", bold("=== pdf2cbz ==="));
        println!("1. Convert one PDF");
        println!("2. Convert a folder");
        println!("3. Convert a folder recursively");
        println!("4. Show settings");
        println!("5. Exit");

        let Some(choice) = read_line("> ") else {
            println!();
            return Ok(());
        };

        let outcome = match choice.as_str() {
            "1" => run_file(&config),
            "2" => run_dir(&config, false),
            "3" => run_dir(&config, true),
            "4" => {
                show_settings(&config);
                Ok(())
            }
            "5" | "q" => return Ok(()),
            other => {
                println!("{}", red(&format!("Unknown option: {other}")));
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("{} {e:#}", red("✗"));
        }
    }
}
