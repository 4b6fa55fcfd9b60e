//! PDF metadata and page geometry

use std::path::Path;
use lopdf::{Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::layout::PageSize;

/// Page tree nodes followed when looking up inherited attributes
const MAX_TREE_DEPTH: usize = 32;

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Size of the first page (if the document has one)
    pub first_page_size: Option<PageSize>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Load a source PDF, classifying failures as source read errors
pub fn load_source(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    Document::load(path).map_err(|source| Error::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let doc = load_source(path)?;

    let pages = doc.get_pages();
    let first_page_size = pages.values().next().map(|&id| page_size(&doc, id));

    Ok(PdfMetadata {
        page_count: pages.len(),
        first_page_size,
        title: info_string(&doc, b"Title"),
        author: info_string(&doc, b"Author"),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    let doc = load_source(path)?;
    Ok(doc.get_pages().len())
}

/// Sizes of every page of a document, in page order
pub fn page_sizes(doc: &Document) -> Vec<PageSize> {
    doc.get_pages()
        .values()
        .map(|&id| page_size(doc, id))
        .collect()
}

/// Size of a page from its (possibly inherited) MediaBox
///
/// A missing or malformed MediaBox falls back to US Letter.
pub fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| {
            let nums: Vec<f32> = arr
                .iter()
                .filter_map(|o| doc.dereference(o).ok())
                .filter_map(|(_, o)| o.as_float().ok())
                .collect();
            (nums.len() == 4).then(|| PageSize::from_media_box(nums[0], nums[1], nums[2], nums[3]))
        });

    media_box.unwrap_or_else(|| {
        log::warn!("Page {:?} has no usable MediaBox, assuming US Letter", page_id);
        PageSize::letter()
    })
}

/// Look up a page attribute, walking up the page tree for inherited values
///
/// References are resolved, so the returned object is never a `Reference`.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return doc.dereference(value).ok().map(|(_, obj)| obj);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Read a text entry from the document Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let (_, info) = doc.dereference(info).ok()?;
    let value = info.as_dict().ok()?.get(key).ok()?;

    match value {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, or PDFDocEncoding treated as Latin-1)
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
