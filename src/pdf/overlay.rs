//! Overlay document creation
//!
//! Builds a PDF holding only the labels, page numbers and background boxes,
//! one page per merged page with the same MediaBox. It is composited onto the
//! merged document afterwards.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::fonts;
use crate::layout::{DrawOp, OverlaySpec};

/// Font resource name used in overlay content streams
const FONT_RESOURCE: &str = "F1";

/// Build the overlay document for the given per-page specs
///
/// A page whose content cannot be encoded is logged and left blank rather
/// than failing the whole document.
pub fn build_overlay_document(specs: &[OverlaySpec]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(helvetica_bold_font());
    let mut fonts = Dictionary::new();
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids = Vec::with_capacity(specs.len());
    for spec in specs {
        let content = Content {
            operations: page_operations(spec),
        };
        let bytes = content.encode().unwrap_or_else(|e| {
            log::warn!("Skipping overlay for page {}: {}", spec.page_index + 1, e);
            Vec::new()
        });
        let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));

        let page_id = add_page(&mut doc, pages_id, spec, content_id, resources_id);
        kids.push(Object::Reference(page_id));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    doc
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    spec: &OverlaySpec,
    content_id: ObjectId,
    resources_id: ObjectId,
) -> ObjectId {
    let media_box = spec
        .page_size
        .media_box()
        .iter()
        .map(|&v| Object::Real(v))
        .collect();

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("MediaBox", Object::Array(media_box));
    page.set("Contents", Object::Reference(content_id));
    page.set("Resources", Object::Reference(resources_id));

    doc.add_object(Object::Dictionary(page))
}

/// Helvetica-Bold, one of the 14 standard PDF fonts, with WinAnsiEncoding
fn helvetica_bold_font() -> Dictionary {
    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(fonts::BASE_FONT.as_bytes().to_vec()));
    font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    font
}

/// Content stream operations for one overlay page
///
/// Layout coordinates are relative to the MediaBox origin, so pages whose
/// MediaBox does not start at (0, 0) get a translation first.
pub fn page_operations(spec: &OverlaySpec) -> Vec<Operation> {
    let mut ops = Vec::new();

    let (x0, y0) = (spec.page_size.x0, spec.page_size.y0);
    if x0 != 0.0 || y0 != 0.0 {
        ops.push(Operation::new("cm", vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(x0),
            Object::Real(y0),
        ]));
    }

    for op in spec.draw_ops() {
        match op {
            DrawOp::SetFillRgb(r, g, b) => {
                ops.push(Operation::new("rg", vec![
                    Object::Real(r),
                    Object::Real(g),
                    Object::Real(b),
                ]));
            }
            DrawOp::FillRect(rect) => {
                ops.push(Operation::new("re", vec![
                    Object::Real(rect.x),
                    Object::Real(rect.y),
                    Object::Real(rect.width),
                    Object::Real(rect.height),
                ]));
                ops.push(Operation::new("f", vec![]));
            }
            DrawOp::Text { x, y, font_size, text } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![
                    Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                    Object::Real(font_size),
                ]));
                ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
                ops.push(Operation::new("Tj", vec![Object::String(
                    fonts::encode_win_ansi(&text),
                    StringFormat::Literal,
                )]));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops
}
