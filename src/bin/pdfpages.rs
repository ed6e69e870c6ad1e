//! CLI binary for pdf-pagesource.
//!
//! A thin shim over the library crate: `info` prints a document summary,
//! `dump` renders pages to PNG files with a progress bar.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_pagesource::{PageLoader, PageRenderer, PageSelection, SourceConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pdfpages",
    version,
    about = "Render PDF pages to PNG images",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print page count and per-page pixel dimensions.
    Info {
        /// Path to the PDF file.
        file: PathBuf,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "PDFPAGES_PASSWORD")]
        password: Option<String>,

        /// Emit machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Render pages to PNG files.
    Dump {
        /// Path to the PDF file.
        file: PathBuf,

        /// Output directory for page-NNN.png files.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Pages to render: "all", "3", "2-7", or "1,4,9" (1-indexed).
        #[arg(short, long, default_value = "all")]
        pages: String,

        /// PDF user password for encrypted documents.
        #[arg(long, env = "PDFPAGES_PASSWORD")]
        password: Option<String>,

        /// Cap the longest rendered edge to this many pixels.
        #[arg(long)]
        max_pixels: Option<u32>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Info {
            file,
            password,
            json,
        } => info(&file, password, json),
        Command::Dump {
            file,
            out_dir,
            pages,
            password,
            max_pixels,
        } => dump(&file, &out_dir, &pages, password, max_pixels),
    }
}

fn build_config(password: Option<String>, max_pixels: Option<u32>) -> Result<SourceConfig> {
    let mut builder = SourceConfig::builder();
    if let Some(pwd) = password {
        builder = builder.password(pwd);
    }
    if let Some(px) = max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    builder.build().context("invalid configuration")
}

fn info(file: &PathBuf, password: Option<String>, json: bool) -> Result<()> {
    let config = build_config(password, None)?;
    let renderer = PageRenderer::open(file, &config)
        .with_context(|| format!("failed to open '{}'", file.display()))?;

    let info = renderer.document_info()?;
    renderer.close();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", bold(&format!("{}", file.display())));
    println!("  pages: {}", info.page_count);
    for page in &info.pages {
        println!(
            "  {}  {}",
            dim(&format!("#{:03}", page.index)),
            format_args!("{} × {} px", page.width, page.height)
        );
    }
    Ok(())
}

fn dump(
    file: &PathBuf,
    out_dir: &PathBuf,
    pages_spec: &str,
    password: Option<String>,
    max_pixels: Option<u32>,
) -> Result<()> {
    let selection = parse_selection(pages_spec)?;
    let config = build_config(password, max_pixels)?;

    let loader = PageLoader::open(file, &config)
        .with_context(|| format!("failed to open '{}'", file.display()))?;
    let descriptors = loader.pages()?;
    let indices = selection.to_indices(descriptors.len());
    anyhow::ensure!(
        !indices.is_empty(),
        "page selection '{}' matches none of the {} pages",
        pages_spec,
        descriptors.len()
    );

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    let bar = ProgressBar::new(indices.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar.enable_steady_tick(Duration::from_millis(80));

    let mut failed = 0usize;
    for &index in &indices {
        let page = &descriptors[index];
        match page.bytes() {
            Ok(png) => {
                let path = out_dir.join(format!("page-{:03}.png", index));
                std::fs::write(&path, png)
                    .with_context(|| format!("failed to write '{}'", path.display()))?;
            }
            Err(e) => {
                // Per-page render failures are isolated: report and continue.
                failed += 1;
                bar.println(format!("page {index}: {e}"));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    loader.recycle();

    let ok = indices.len() - failed;
    println!(
        "{} {} of {} pages → {}",
        green("✓"),
        ok,
        indices.len(),
        out_dir.display()
    );
    anyhow::ensure!(failed == 0, "{failed} pages failed to render");
    Ok(())
}

/// Parse a 1-indexed page spec: "all", "3", "2-7", or "1,4,9".
fn parse_selection(spec: &str) -> Result<PageSelection> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("all") {
        return Ok(PageSelection::All);
    }
    if let Some((start, end)) = spec.split_once('-') {
        let start: usize = start.trim().parse().context("invalid range start")?;
        let end: usize = end.trim().parse().context("invalid range end")?;
        anyhow::ensure!(start >= 1 && start <= end, "invalid page range '{spec}'");
        return Ok(PageSelection::Range(start, end));
    }
    if spec.contains(',') {
        let pages = spec
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("invalid page list '{spec}'"))?;
        return Ok(PageSelection::Set(pages));
    }
    let page: usize = spec
        .parse()
        .with_context(|| format!("invalid page spec '{spec}'"))?;
    Ok(PageSelection::Single(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selection_variants() {
        assert!(matches!(parse_selection("all").unwrap(), PageSelection::All));
        assert!(matches!(parse_selection("ALL").unwrap(), PageSelection::All));
        assert!(matches!(
            parse_selection("7").unwrap(),
            PageSelection::Single(7)
        ));
        assert!(matches!(
            parse_selection("2-9").unwrap(),
            PageSelection::Range(2, 9)
        ));
        match parse_selection("1, 4, 9").unwrap() {
            PageSelection::Set(v) => assert_eq!(v, vec![1, 4, 9]),
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn parse_selection_rejects_garbage() {
        assert!(parse_selection("").is_err());
        assert!(parse_selection("x-y").is_err());
        assert!(parse_selection("9-2").is_err());
        assert!(parse_selection("1,two,3").is_err());
    }
}
