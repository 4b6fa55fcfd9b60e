//! PDF engine: loading, merging, overlay creation and compositing

pub mod merge;
pub mod metadata;
pub mod overlay;
pub mod output;

// Re-export commonly used items
pub use merge::{composite_overlay, merge_documents};
pub use metadata::{count_pages, extract_metadata, load_source, page_size, page_sizes, PdfMetadata};
pub use overlay::{build_overlay_document, page_operations};
pub use output::{save_atomically, stamp_document_info};
