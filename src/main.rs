mod csv;
mod error;
mod locator;
mod page;
mod parser;
mod presenter;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::csv::CsvOptions;
use crate::locator::Languages;
use crate::page::{HtmlPage, ItemSource, PageSelectors};
use crate::parser::ParsedPage;
use crate::presenter::{Download, DownloadControl, Scope};
use crate::settings::{SelectorSettings, Settings};

const ALL_SECTIONS: &str = "*";

#[derive(Parser)]
#[command(name = "vocab_csv", about = "Export vocabulary word lists from saved pages to CSV")]
struct Cli {
    /// Settings file (default: ./vocab_csv.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page path or URL to read languages from (default: canonical link, then file path)
    #[arg(long)]
    page_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write CSV files for whole pages and/or individual sections
    Export {
        /// Saved HTML pages
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output directory (overrides settings)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Section to export on its own; repeatable, "*" for every section
        #[arg(short, long = "section")]
        sections: Vec<String>,
        /// Also write the whole-page file when sections are requested
        #[arg(long)]
        all: bool,
        #[arg(long)]
        with_section: bool,
        #[arg(long)]
        with_type: bool,
        /// Add a 1-based ID column (whole-page file only)
        #[arg(long)]
        with_id: bool,
        #[command(flatten)]
        page: PageArgs,
    },
    /// List sections with their word counts
    Sections {
        file: PathBuf,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Print extracted records as JSON
    Inspect {
        file: PathBuf,
        /// Only records from this section
        #[arg(short, long)]
        section: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let selectors = PageSelectors::compile(&settings.selectors)?;

    let result = match cli.command {
        Commands::Export {
            files,
            out_dir,
            sections,
            all,
            with_section,
            with_type,
            with_id,
            page,
        } => {
            let request = ExportRequest {
                sections,
                include_all: all,
                options: CsvOptions {
                    include_section: with_section,
                    include_type: with_type,
                    include_id: with_id,
                },
            };
            let out_dir = out_dir.unwrap_or_else(|| settings.output_dir.clone());
            export_pages(&files, &settings.selectors, page.page_path.as_deref(), &request, &out_dir)
        }
        Commands::Sections { file, page } => {
            let loaded = load_page(&file, &selectors, page.page_path.as_deref())?;
            print_sections(&loaded);
            Ok(())
        }
        Commands::Inspect { file, section, page } => {
            let loaded = load_page(&file, &selectors, page.page_path.as_deref())?;
            let records = match section.as_deref() {
                Some(name) => presenter::find_section(&loaded.parsed.sections, name)
                    .map(|g| g.records.clone())
                    .with_context(|| format!("No section named {:?}", name))?,
                None => loaded.parsed.records,
            };
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// A page read from disk: where it came from, its languages and what was extracted.
struct LoadedPage {
    path: PathBuf,
    languages: Languages,
    parsed: ParsedPage,
}

fn load_page(path: &Path, selectors: &PageSelectors, page_path: Option<&str>) -> anyhow::Result<LoadedPage> {
    let html = std::fs::read_to_string(path).map_err(|source| error::VocabError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let page = HtmlPage::parse(&html, selectors);

    let canonical = page.canonical_url();
    let file_path = path.to_string_lossy();
    let candidates = page_path
        .into_iter()
        .chain(canonical.as_deref())
        .chain(std::iter::once(&*file_path));
    let languages = locator::locate_first(candidates);
    if languages.is_unknown() {
        warn!(file = %path.display(), "no languages found in page path; using null");
    }

    let parsed = parser::process_items(&page.list_items());
    info!(
        file = %path.display(),
        languages = %languages,
        records = parsed.records.len(),
        sections = parsed.sections.len(),
        "page extracted"
    );

    Ok(LoadedPage {
        path: path.to_path_buf(),
        languages,
        parsed,
    })
}

struct ExportRequest {
    sections: Vec<String>,
    include_all: bool,
    options: CsvOptions,
}

impl ExportRequest {
    fn wants(&self, control: &DownloadControl) -> bool {
        match &control.scope {
            Scope::All => self.include_all || self.sections.is_empty(),
            Scope::Section(name) => self
                .sections
                .iter()
                .any(|s| s == ALL_SECTIONS || presenter::section_matches(name, s)),
        }
    }

    /// Requested section names the page does not have.
    fn missing<'a>(&'a self, page: &ParsedPage) -> Vec<&'a str> {
        self.sections
            .iter()
            .filter(|s| *s != ALL_SECTIONS && presenter::find_section(&page.sections, s).is_none())
            .map(String::as_str)
            .collect()
    }
}

fn render_downloads(loaded: &LoadedPage, request: &ExportRequest) -> Vec<Download> {
    for name in request.missing(&loaded.parsed) {
        warn!(file = %loaded.path.display(), section = name, "section not found; skipping");
    }

    presenter::controls(&loaded.parsed.sections, &loaded.parsed.records)
        .iter()
        .filter(|c| request.wants(c))
        .map(|c| c.download(request.options, &loaded.languages))
        .collect()
}

fn export_pages(
    files: &[PathBuf],
    selectors: &SelectorSettings,
    page_path: Option<&str>,
    request: &ExportRequest,
    out_dir: &Path,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    // Each worker compiles its own selectors and parses its own document;
    // only rendered downloads come back.
    let rendered: Vec<anyhow::Result<Vec<Download>>> = files
        .par_iter()
        .map(|file| -> anyhow::Result<Vec<Download>> {
            let selectors = PageSelectors::compile(selectors)?;
            let loaded = load_page(file, &selectors, page_path)?;
            let downloads = render_downloads(&loaded, request);
            pb.inc(1);
            Ok(downloads)
        })
        .collect();
    pb.finish_and_clear();

    let mut downloads = Vec::new();
    for (file, result) in files.iter().zip(rendered) {
        downloads.extend(result.with_context(|| format!("Failed to export {}", file.display()))?);
    }
    presenter::dedupe_file_names(&mut downloads);

    for download in &downloads {
        let path = download.save(out_dir)?;
        println!("{}", path.display());
    }

    println!(
        "Wrote {} file(s) from {} page(s) to {}",
        downloads.len(),
        files.len(),
        out_dir.display()
    );
    Ok(())
}

fn print_sections(loaded: &LoadedPage) {
    println!("{} ({})", loaded.path.display(), loaded.languages);
    println!("{:>3} | {:<32} | {:>5} | {:>5}", "#", "Section", "Item", "Words");
    println!("{}", "-".repeat(54));

    for (i, group) in loaded.parsed.sections.groups().iter().enumerate() {
        let item = group
            .marker_index
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>3} | {:<32} | {:>5} | {:>5}",
            i + 1,
            truncate(presenter::section_label(&group.name), 32),
            item,
            group.records.len()
        );
    }

    println!(
        "\n{} sections | {} words",
        loaded.parsed.sections.len(),
        loaded.parsed.records.len()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
