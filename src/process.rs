//! The processing pass: merge, annotate and save in one forward scan

use std::path::PathBuf;

use crate::attribution::{Attributor, SourceFile};
use crate::error::{Error, Result};
use crate::layout::{place, Corner, OverlaySpec, PageSize};
use crate::pdf;

/// Label and page-number options
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOptions {
    /// Text before the source ordinal in the label, e.g. "DOCUMENTO" gives "DOCUMENTO 1"
    pub text_prefix: String,
    /// Corner for the source label on first pages
    pub title_corner: Corner,
    /// Corner for the running page number
    pub page_number_corner: Corner,
    /// Draw a light gray box behind labels and page numbers
    pub with_background: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            text_prefix: "DOCUMENTO".to_string(),
            title_corner: Corner::TopLeft,
            page_number_corner: Corner::BottomRight,
            with_background: false,
        }
    }
}

/// A finalized request: what to merge, where to write it, and how to label it
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
    pub options: ProcessOptions,
}

/// Outcome of a successful pass
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub sources: Vec<SourceFile>,
    /// Pages in the output document
    pub page_count: usize,
    pub output_path: PathBuf,
}

/// Label drawn on the first page of a source
pub fn source_label(prefix: &str, ordinal: usize) -> String {
    let prefix = prefix.trim_end();
    if prefix.is_empty() {
        ordinal.to_string()
    } else {
        format!("{} {}", prefix, ordinal)
    }
}

/// Lay out the overlay of every merged page
///
/// `page_sizes` holds the size of each merged page in order; its length must
/// equal the total page count of `sources`.
pub fn plan_overlays(
    sources: &[SourceFile],
    page_sizes: &[PageSize],
    options: &ProcessOptions,
) -> Result<Vec<OverlaySpec>> {
    let mut attributor = Attributor::new(sources)?;

    let expected = attributor.total_pages();
    if page_sizes.len() != expected {
        return Err(Error::PageCountMismatch {
            expected,
            actual: page_sizes.len(),
        });
    }

    let mut specs = Vec::with_capacity(expected);
    for (index, &page_size) in page_sizes.iter().enumerate() {
        let page = attributor.attribute(index)?;

        let title = page.is_first_page_of_source.then(|| {
            let label = source_label(&options.text_prefix, page.ordinal);
            place(page_size, &label, options.title_corner, true, options.with_background)
        });

        let page_number = place(
            page_size,
            &page.page_number.to_string(),
            options.page_number_corner,
            false,
            options.with_background,
        );

        log::debug!(
            "Page {}: source {} page {}{}",
            page.page_number,
            page.ordinal,
            page.page_in_source,
            if title.is_some() { " (labelled)" } else { "" }
        );

        specs.push(OverlaySpec {
            page_index: index,
            page_size,
            title,
            page_number,
        });
    }

    Ok(specs)
}

/// Merge the inputs, stamp every page, and write the output
///
/// Any failure aborts the pass and leaves no output file behind.
///
/// # Example
///
/// ```no_run
/// use pdf_pagemaster::process::{process_pdfs, ProcessOptions, ProcessRequest};
/// use std::path::PathBuf;
///
/// let request = ProcessRequest {
///     input_paths: vec![PathBuf::from("intro.pdf"), PathBuf::from("annex.pdf")],
///     output_path: PathBuf::from("processed_documents.pdf"),
///     options: ProcessOptions::default(),
/// };
///
/// process_pdfs(&request).expect("Failed to process PDFs");
/// ```
pub fn process_pdfs(request: &ProcessRequest) -> Result<ProcessSummary> {
    if request.input_paths.is_empty() {
        return Err(Error::NoInputs);
    }

    log::info!("Loading {} PDF files", request.input_paths.len());
    let mut sources = Vec::with_capacity(request.input_paths.len());
    let mut documents = Vec::with_capacity(request.input_paths.len());
    for path in &request.input_paths {
        let doc = pdf::load_source(path)?;
        let page_count = doc.get_pages().len();
        if page_count == 0 {
            log::warn!("{} has no pages", path.display());
        }
        log::debug!("{}: {} pages", path.display(), page_count);

        sources.push(SourceFile::new(path.clone(), page_count));
        documents.push(doc);
    }

    log::info!("Merging");
    let mut merged = pdf::merge_documents(documents)?;
    let page_sizes = pdf::page_sizes(&merged);

    log::info!("Laying out {} pages", page_sizes.len());
    let specs = plan_overlays(&sources, &page_sizes, &request.options)?;

    let overlay = pdf::build_overlay_document(&specs);
    pdf::composite_overlay(&mut merged, &overlay)?;

    pdf::stamp_document_info(&mut merged);
    merged.compress();

    log::info!("Writing {}", request.output_path.display());
    pdf::save_atomically(&mut merged, &request.output_path)?;

    Ok(ProcessSummary {
        sources,
        page_count: specs.len(),
        output_path: request.output_path.clone(),
    })
}
