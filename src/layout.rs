//! Overlay layout: where labels and page numbers go on a page
//!
//! All coordinates are PDF user-space points with the origin at the
//! bottom-left corner of the page.

use std::fmt;
use std::str::FromStr;

use crate::fonts;

/// Distance from every page edge to the text origin
pub const MARGIN: f32 = 50.0;

/// Font size of the source label drawn on first pages
pub const TITLE_FONT_SIZE: f32 = 12.0;

/// Font size of the running page number
pub const PAGE_NUMBER_FONT_SIZE: f32 = 10.0;

/// Padding between the text and the edge of its background box
pub const BACKGROUND_PADDING: f32 = 5.0;

/// Light gray used for background boxes (200/255 on every channel)
pub const BACKGROUND_GRAY: f32 = 200.0 / 255.0;

/// Placement anchor for a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Decode the 0-3 corner selector; anything else means top-left
    pub fn from_index(index: i64) -> Self {
        match index {
            0 => Corner::TopLeft,
            1 => Corner::TopRight,
            2 => Corner::BottomLeft,
            3 => Corner::BottomRight,
            _ => Corner::TopLeft,
        }
    }

    /// The 0-3 selector for this corner
    pub fn index(self) -> i64 {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }

    /// Parse a corner name or index, falling back to top-left
    ///
    /// Accepts `0`-`3`, `top-left`/`tl`, `top-right`/`tr`, `bottom-left`/`bl`
    /// and `bottom-right`/`br` in any case. Anything else, including numbers
    /// outside 0-3, logs a warning.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            log::warn!("Unrecognized corner {:?}, using top-left", s);
            Corner::TopLeft
        })
    }
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();

        if let Ok(index) = s.parse::<i64>() {
            return match index {
                0..=3 => Ok(Corner::from_index(index)),
                _ => Err(format!("corner index out of range: {}", index)),
            };
        }

        match s.replace('_', "-").as_str() {
            "top-left" | "tl" => Ok(Corner::TopLeft),
            "top-right" | "tr" => Ok(Corner::TopRight),
            "bottom-left" | "bl" => Ok(Corner::BottomLeft),
            "bottom-right" | "br" => Ok(Corner::BottomRight),
            other => Err(format!("unknown corner: {}", other)),
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Page geometry taken from the MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Lower-left x of the MediaBox
    pub x0: f32,
    /// Lower-left y of the MediaBox
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { x0: 0.0, y0: 0.0, width, height }
    }

    /// US Letter (612pt × 792pt)
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// A4 (595pt × 842pt)
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Build from a MediaBox `[llx lly urx ury]`, normalizing swapped corners
    pub fn from_media_box(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self {
            x0: llx.min(urx),
            y0: lly.min(ury),
            width: (urx - llx).abs(),
            height: (ury - lly).abs(),
        }
    }

    /// The MediaBox `[llx lly urx ury]` describing this page
    pub fn media_box(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x0 + self.width, self.y0 + self.height]
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One drawing call issued against an overlay page
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Set the non-stroking (fill) color, channels in 0-1
    SetFillRgb(f32, f32, f32),
    /// Fill a rectangle with the current fill color
    FillRect(Rect),
    /// Draw text in Helvetica-Bold with its baseline origin at (x, y)
    Text {
        x: f32,
        y: f32,
        font_size: f32,
        text: String,
    },
}

/// Where a string lands on a page, and what to draw for it
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub corner: Corner,
    pub is_title: bool,
    pub font_size: f32,
    pub text_width: f32,
    pub text_height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Gray box behind the text, when requested
    pub background: Option<Rect>,
}

impl TextPlacement {
    /// Draw calls for this placement, in order
    pub fn draw_ops(&self) -> Vec<DrawOp> {
        let mut ops = Vec::with_capacity(4);

        if let Some(rect) = self.background {
            ops.push(DrawOp::SetFillRgb(BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY));
            ops.push(DrawOp::FillRect(rect));
            ops.push(DrawOp::SetFillRgb(0.0, 0.0, 0.0));
        }

        ops.push(DrawOp::Text {
            x: self.origin_x,
            y: self.origin_y,
            font_size: self.font_size,
            text: self.text.clone(),
        });

        ops
    }
}

/// Compute the placement of `text` in `corner` of a page
///
/// Titles use 12pt, page numbers 10pt. Text height is taken to be the font
/// size. The background box extends 5pt left of and below the origin and 5pt
/// past the right end of the text.
pub fn place(
    page: PageSize,
    text: &str,
    corner: Corner,
    is_title: bool,
    with_background: bool,
) -> TextPlacement {
    let font_size = if is_title { TITLE_FONT_SIZE } else { PAGE_NUMBER_FONT_SIZE };
    let text_width = fonts::string_width(text, font_size);
    let text_height = font_size;

    let (origin_x, origin_y) = match corner {
        Corner::TopLeft => (MARGIN, page.height - MARGIN),
        Corner::TopRight => (page.width - MARGIN - text_width, page.height - MARGIN),
        Corner::BottomLeft => (MARGIN, MARGIN),
        Corner::BottomRight => (page.width - MARGIN - text_width, MARGIN),
    };

    let background = with_background.then(|| Rect {
        x: origin_x - BACKGROUND_PADDING,
        y: origin_y - BACKGROUND_PADDING,
        width: text_width + 2.0 * BACKGROUND_PADDING,
        height: text_height + BACKGROUND_PADDING,
    });

    TextPlacement {
        text: text.to_string(),
        corner,
        is_title,
        font_size,
        text_width,
        text_height,
        origin_x,
        origin_y,
        background,
    }
}

/// Everything drawn on one overlay page
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    /// 0-based index of the merged page this overlay covers
    pub page_index: usize,
    pub page_size: PageSize,
    /// Source label, present only on the first page of a source
    pub title: Option<TextPlacement>,
    pub page_number: TextPlacement,
}

impl OverlaySpec {
    /// Draw calls for the whole page: title first, then the page number
    pub fn draw_ops(&self) -> Vec<DrawOp> {
        self.title
            .iter()
            .chain(std::iter::once(&self.page_number))
            .flat_map(TextPlacement::draw_ops)
            .collect()
    }
}
