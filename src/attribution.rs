//! Page attribution: which source file does each merged page come from?
//!
//! The merged document is a concatenation of the sources in input order, so a
//! single forward scan with a small cursor is enough to recover, for every
//! merged page, the source it belongs to and whether it starts that source.

use std::path::PathBuf;
use crate::error::{Error, Result};

/// One input PDF as seen by the attributor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path the source was loaded from
    pub path: PathBuf,
    /// Number of pages the source contributes to the merged document
    pub page_count: usize,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, page_count: usize) -> Self {
        Self {
            path: path.into(),
            page_count,
        }
    }
}

/// Attribution of a single merged page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAttribution {
    /// 0-based index into the merged document
    pub merged_index: usize,
    /// 0-based index into the source list
    pub source_index: usize,
    /// 1-based position of the source in the input list (used in labels)
    pub ordinal: usize,
    /// 1-based page position within the source
    pub page_in_source: usize,
    /// True on the first page contributed by the source
    pub is_first_page_of_source: bool,
    /// 1-based running page number across the merged document
    pub page_number: usize,
}

/// Mutable scan state carried from one merged page to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionCursor {
    /// Source currently being walked; `None` until the first page is attributed
    pub current_source: Option<usize>,
    /// Page count of the current source
    pub pages_in_current: usize,
    /// Pages already attributed to the current source
    pub consumed_in_current: usize,
    /// Page number the next merged page will receive
    pub running_page_number: usize,
}

impl Default for AttributionCursor {
    fn default() -> Self {
        Self {
            current_source: None,
            pages_in_current: 0,
            consumed_in_current: 0,
            running_page_number: 1,
        }
    }
}

/// Walks the merged document one page at a time
///
/// # Example
///
/// ```
/// use pdf_pagemaster::attribution::{Attributor, SourceFile};
///
/// let sources = vec![SourceFile::new("a.pdf", 2), SourceFile::new("b.pdf", 1)];
/// let firsts: Vec<bool> = Attributor::new(&sources)
///     .unwrap()
///     .map(|page| page.is_first_page_of_source)
///     .collect();
///
/// assert_eq!(firsts, vec![true, false, true]);
/// ```
#[derive(Debug)]
pub struct Attributor<'a> {
    sources: &'a [SourceFile],
    cursor: AttributionCursor,
    next_index: usize,
}

impl<'a> Attributor<'a> {
    /// Create an attributor over the given sources
    ///
    /// An empty source list has nothing to attribute and is rejected.
    pub fn new(sources: &'a [SourceFile]) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoInputs);
        }

        Ok(Self {
            sources,
            cursor: AttributionCursor::default(),
            next_index: 0,
        })
    }

    /// Total number of merged pages (sum of all source page counts)
    pub fn total_pages(&self) -> usize {
        self.sources.iter().map(|s| s.page_count).sum()
    }

    /// Current scan state
    pub fn cursor(&self) -> &AttributionCursor {
        &self.cursor
    }

    /// Attribute the merged page at `merged_index`
    ///
    /// Indices must be supplied in strictly increasing order starting at 0.
    pub fn attribute(&mut self, merged_index: usize) -> Result<PageAttribution> {
        if merged_index != self.next_index {
            return Err(Error::Attribution(format!(
                "expected merged page {}, got {}",
                self.next_index, merged_index
            )));
        }

        self.step().ok_or_else(|| {
            Error::Attribution(format!(
                "merged page {} is beyond the {} pages of the sources",
                merged_index,
                self.total_pages()
            ))
        })
    }

    /// Attribute the next merged page
    ///
    /// The scan runs on a copy of the cursor that is committed only when a
    /// page is found, so running past the end leaves the cursor as it was.
    fn step(&mut self) -> Option<PageAttribution> {
        let mut cursor = self.cursor.clone();

        // Enter the next non-empty source when nothing is entered yet or the
        // current one is used up. Zero-page sources are passed over here.
        while cursor.current_source.is_none()
            || cursor.consumed_in_current >= cursor.pages_in_current
        {
            let next = cursor.current_source.map_or(0, |i| i + 1);
            let source = self.sources.get(next)?;

            cursor.current_source = Some(next);
            cursor.pages_in_current = source.page_count;
            cursor.consumed_in_current = 0;
        }

        let source_index = cursor.current_source?;
        let attribution = PageAttribution {
            merged_index: self.next_index,
            source_index,
            ordinal: source_index + 1,
            page_in_source: cursor.consumed_in_current + 1,
            is_first_page_of_source: cursor.consumed_in_current == 0,
            page_number: cursor.running_page_number,
        };

        cursor.consumed_in_current += 1;
        cursor.running_page_number += 1;
        self.cursor = cursor;
        self.next_index += 1;

        Some(attribution)
    }
}

impl Iterator for Attributor<'_> {
    type Item = PageAttribution;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
