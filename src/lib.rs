//! PDF PageMaster Library
//!
//! Merges PDF files and stamps the result. This library provides functionality to:
//! - Merge multiple PDF files in input order
//! - Work out which source each merged page came from
//! - Label the first page of every source and number every page
//! - Draw optional background boxes behind the labels
//!
//! # Example
//!
//! ```no_run
//! use pdf_pagemaster::layout::Corner;
//! use pdf_pagemaster::process::{process_pdfs, ProcessOptions, ProcessRequest};
//! use std::path::PathBuf;
//!
//! let request = ProcessRequest {
//!     input_paths: vec![
//!         PathBuf::from("1. intro.pdf"),
//!         PathBuf::from("2. advanced.pdf"),
//!     ],
//!     output_path: PathBuf::from("processed_documents.pdf"),
//!     options: ProcessOptions {
//!         text_prefix: "DOC".to_string(),
//!         title_corner: Corner::TopLeft,
//!         page_number_corner: Corner::BottomRight,
//!         with_background: true,
//!     },
//! };
//!
//! process_pdfs(&request).expect("Failed to process PDFs");
//! ```

pub mod attribution;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod process;

// Re-export commonly used items
pub use error::{Error, Result};
pub use layout::Corner;
pub use process::{process_pdfs, ProcessOptions, ProcessRequest, ProcessSummary};
