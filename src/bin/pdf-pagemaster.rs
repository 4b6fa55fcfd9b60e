//! PDF PageMaster CLI tool
//!
//! A command-line tool for merging PDFs and stamping source labels and page numbers.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;

use pdf_pagemaster::layout::Corner;
use pdf_pagemaster::pdf::extract_metadata;
use pdf_pagemaster::process::{process_pdfs, ProcessOptions, ProcessRequest};

/// PDF PageMaster - Merge PDFs, label each source and number every page
#[derive(Parser)]
#[command(name = "pdf-pagemaster")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs with default labels (\"DOCUMENTO 1\", \"DOCUMENTO 2\", ...)
    pdf-pagemaster build intro.pdf annex.pdf

    # Custom label, page numbers top-right, gray background boxes
    pdf-pagemaster build -o bundle.pdf --prefix DOC --page-number-corner tr --background *.pdf

    # Show page counts
    pdf-pagemaster info intro.pdf annex.pdf")]
struct Cli {
    /// Show per-page progress (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDFs, label the first page of each one and number every page
    Build {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long, default_value = "processed_documents.pdf")]
        output: PathBuf,

        /// Text placed before the document number on each source's first page
        #[arg(long, default_value = "DOCUMENTO")]
        prefix: String,

        /// Corner for the document label: top-left|tl, top-right|tr, bottom-left|bl, bottom-right|br, or 0-3
        #[arg(long, default_value = "top-left")]
        title_corner: String,

        /// Corner for page numbers (same values as --title-corner)
        #[arg(long, default_value = "bottom-right")]
        page_number_corner: String,

        /// Draw a light gray box behind labels and page numbers
        #[arg(long)]
        background: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about PDF files
    Info {
        /// PDF files to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Build {
            inputs, output, prefix, title_corner, page_number_corner, background, open,
        } => {
            let options = process_options(prefix, &title_corner, &page_number_corner, background);
            cmd_build(inputs, output, options, open)
        }
        Commands::Info { inputs } => cmd_info(&inputs),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Build label options from the command line
///
/// Corners are resolved here rather than by clap so that the fallback
/// warning reaches the logger.
fn process_options(
    prefix: String,
    title_corner: &str,
    page_number_corner: &str,
    background: bool,
) -> ProcessOptions {
    ProcessOptions {
        text_prefix: prefix,
        title_corner: Corner::parse_lenient(title_corner),
        page_number_corner: Corner::parse_lenient(page_number_corner),
        with_background: background,
    }
}

/// Whether a path names a PDF file (by extension, any case)
fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; the order of the patterns themselves is
/// kept. Anything that is not a `.pdf` file is skipped with a warning.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    let (pdfs, skipped): (Vec<PathBuf>, Vec<PathBuf>) = paths.into_iter().partition(|p| is_pdf(p));
    for path in &skipped {
        log::warn!("Skipping {}: not a .pdf file", path.display());
    }

    Ok(pdfs)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Merge PDFs and stamp labels and page numbers in one pass
fn cmd_build(inputs: Vec<String>, output: PathBuf, options: ProcessOptions, open: bool) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    if inputs.is_empty() {
        bail!("No PDF files to process");
    }

    let request = ProcessRequest {
        input_paths: inputs,
        output_path: output,
        options,
    };

    let summary = process_pdfs(&request).context("Error processing PDFs")?;

    log::info!(
        "Merged {} files into {} pages: {}",
        summary.sources.len(),
        summary.page_count,
        summary.output_path.display()
    );

    if open {
        open_file(&summary.output_path)?;
    }

    Ok(())
}

/// Show information about PDFs
fn cmd_info(inputs: &[PathBuf]) -> Result<()> {
    for input in inputs {
        let metadata = extract_metadata(input)?;

        println!("File: {}", input.display());
        println!("Pages: {}", metadata.page_count);

        if let Some(size) = metadata.first_page_size {
            println!("Page size: {} x {} pt", size.width, size.height);
        }
        if let Some(title) = metadata.title {
            println!("Title: {}", title);
        }
        if let Some(author) = metadata.author {
            println!("Author: {}", author);
        }
    }

    Ok(())
}
