//! Integration tests for the pagemaster library

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_pagemaster::layout::{Corner, PageSize};
use pdf_pagemaster::pdf::{count_pages, extract_metadata, page_sizes};
use pdf_pagemaster::{process_pdfs, Error, ProcessOptions, ProcessRequest};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test helper: write a PDF with `pages` pages of the given size
///
/// Every page shows "<name> page <n>" in Helvetica under the resource name F1.
fn write_fixture(dir: &Path, name: &str, pages: usize, size: (i64, i64)) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font = Dictionary::new();
    font.set("Type", Object::Name(b"Font".to_vec()));
    font.set("Subtype", Object::Name(b"Type1".to_vec()));
    font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    let font_id = doc.add_object(Object::Dictionary(font));

    let mut fonts = Dictionary::new();
    fonts.set("F1", Object::Reference(font_id));
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    let resources_id = doc.add_object(Object::Dictionary(resources));

    let mut kids = Vec::new();
    for i in 0..pages {
        let content = format!("BT /F1 18 Tf 100 400 Td ({} page {}) Tj ET", name, i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(pages as i64));
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Resources", Object::Reference(resources_id));
    pages_dict.set("MediaBox", Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(size.0),
        Object::Integer(size.1),
    ]));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let path = dir.join(name);
    doc.save(&path).expect("Failed to write fixture");
    path
}

const LETTER: (i64, i64) = (612, 792);
const A4: (i64, i64) = (595, 842);

fn request(inputs: Vec<PathBuf>, output: PathBuf, with_background: bool) -> ProcessRequest {
    ProcessRequest {
        input_paths: inputs,
        output_path: output,
        options: ProcessOptions {
            text_prefix: "DOC".to_string(),
            title_corner: Corner::TopLeft,
            page_number_corner: Corner::BottomRight,
            with_background,
        },
    }
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Decoded operations of the overlay form attached to a page
fn overlay_operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = resolve(doc, page.get(b"Resources").unwrap()).as_dict().unwrap();
    let xobjects = resolve(doc, resources.get(b"XObject").unwrap()).as_dict().unwrap();
    let form_id = xobjects.get(b"PgmOverlay").unwrap().as_reference().unwrap();
    let stream = doc.get_object(form_id).unwrap().as_stream().unwrap();
    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    Content::decode(&content).unwrap().operations
}

fn shown_text(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .map(|op| String::from_utf8_lossy(op.operands[0].as_str().unwrap()).into_owned())
        .collect()
}

fn text_origin(ops: &[Operation], text: &str) -> (f32, f32) {
    let tj = ops
        .iter()
        .position(|op| op.operator == "Tj" && op.operands[0].as_str().unwrap() == text.as_bytes())
        .expect("text not drawn");
    let td = &ops[tj - 1];
    assert_eq!(td.operator, "Td");
    (td.operands[0].as_float().unwrap(), td.operands[1].as_float().unwrap())
}

fn has_operator(ops: &[Operation], operator: &str) -> bool {
    ops.iter().any(|op| op.operator == operator)
}

#[test]
fn test_two_sources_with_background() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let first = write_fixture(temp_dir.path(), "first.pdf", 2, LETTER);
    let second = write_fixture(temp_dir.path(), "second.pdf", 3, LETTER);
    let output = temp_dir.path().join("out.pdf");

    let summary = process_pdfs(&request(vec![first, second], output.clone(), true))
        .expect("Failed to process PDFs");

    assert_eq!(summary.page_count, 5);
    assert_eq!(summary.sources.len(), 2);
    assert_eq!(summary.sources[0].page_count, 2);
    assert_eq!(summary.sources[1].page_count, 3);
    assert_eq!(count_pages(&output).unwrap(), 5);

    let doc = Document::load(&output).unwrap();
    let pages = page_ids(&doc);
    let expected_titles = [Some("DOC 1"), None, Some("DOC 2"), None, None];

    for (i, &page_id) in pages.iter().enumerate() {
        let ops = overlay_operations(&doc, page_id);
        let texts = shown_text(&ops);
        let number = (i + 1).to_string();

        match expected_titles[i] {
            Some(title) => assert_eq!(texts, vec![title.to_string(), number.clone()]),
            None => assert_eq!(texts, vec![number.clone()]),
        }

        // Page numbers sit bottom-right, ending at the right margin
        let (x, y) = text_origin(&ops, &number);
        assert_eq!(y, 50.0);
        assert!(x > 500.0 && x < 562.0);

        assert!(has_operator(&ops, "re"));
        assert!(has_operator(&ops, "f"));
    }

    let ops = overlay_operations(&doc, pages[0]);
    assert_eq!(text_origin(&ops, "DOC 1"), (50.0, 742.0));
}

#[test]
fn test_single_page_without_background() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_fixture(temp_dir.path(), "only.pdf", 1, LETTER);
    let output = temp_dir.path().join("out.pdf");

    process_pdfs(&request(vec![input], output.clone(), false)).expect("Failed to process PDFs");

    let doc = Document::load(&output).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(pages.len(), 1);

    let ops = overlay_operations(&doc, pages[0]);
    assert_eq!(shown_text(&ops), vec!["DOC 1".to_string(), "1".to_string()]);
    assert!(!has_operator(&ops, "re"));
    assert!(!has_operator(&ops, "f"));
    assert!(!has_operator(&ops, "rg"));
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap(),
        other => other,
    }
}

/// Page content streams concatenated in drawing order
fn page_content(doc: &Document, page_id: ObjectId) -> String {
    let page = doc.get_dictionary(page_id).unwrap();
    let refs = resolve(doc, page.get(b"Contents").unwrap()).as_array().unwrap();

    let mut content = Vec::new();
    for obj in refs {
        let stream = resolve(doc, obj).as_stream().unwrap();
        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        content.extend_from_slice(&bytes);
        content.push(b'\n');
    }
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn test_original_content_and_resources_survive() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_fixture(temp_dir.path(), "orig.pdf", 2, LETTER);
    let output = temp_dir.path().join("out.pdf");

    process_pdfs(&request(vec![input], output.clone(), true)).expect("Failed to process PDFs");

    let doc = Document::load(&output).unwrap();
    for (i, page_id) in page_ids(&doc).into_iter().enumerate() {
        let text = page_content(&doc, page_id);
        let original = text.find(&format!("(orig.pdf page {})", i + 1)).expect("original text lost");
        let overlay = text.find("/PgmOverlay Do").expect("overlay not invoked");
        assert!(original < overlay);

        // The page's own F1 is still plain Helvetica
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = resolve(&doc, page.get(b"Resources").unwrap()).as_dict().unwrap();
        let fonts = resolve(&doc, resources.get(b"Font").unwrap()).as_dict().unwrap();
        let f1 = resolve(&doc, fonts.get(b"F1").unwrap()).as_dict().unwrap();
        assert_eq!(f1.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    }
}

#[test]
fn test_mixed_page_sizes() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let letter = write_fixture(temp_dir.path(), "letter.pdf", 1, LETTER);
    let a4 = write_fixture(temp_dir.path(), "a4.pdf", 1, A4);
    let output = temp_dir.path().join("out.pdf");

    process_pdfs(&request(vec![letter, a4], output.clone(), false)).expect("Failed to process PDFs");

    let doc = Document::load(&output).unwrap();
    assert_eq!(page_sizes(&doc), vec![PageSize::letter(), PageSize::a4()]);

    let pages = page_ids(&doc);
    let ops = overlay_operations(&doc, pages[1]);
    assert_eq!(text_origin(&ops, "DOC 2"), (50.0, 792.0));
}

#[test]
fn test_empty_source_is_skipped_but_keeps_its_number() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let empty = write_fixture(temp_dir.path(), "empty.pdf", 0, LETTER);
    let full = write_fixture(temp_dir.path(), "full.pdf", 2, LETTER);
    let output = temp_dir.path().join("out.pdf");

    let summary = process_pdfs(&request(vec![empty, full], output.clone(), false))
        .expect("Failed to process PDFs");
    assert_eq!(summary.page_count, 2);

    let doc = Document::load(&output).unwrap();
    let pages = page_ids(&doc);
    assert_eq!(shown_text(&overlay_operations(&doc, pages[0])), vec!["DOC 2", "1"]);
    assert_eq!(shown_text(&overlay_operations(&doc, pages[1])), vec!["2"]);
}

#[test]
fn test_unknown_corner_index_places_top_left() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_fixture(temp_dir.path(), "one.pdf", 1, LETTER);
    let output = temp_dir.path().join("out.pdf");

    let mut req = request(vec![input], output.clone(), false);
    req.options.page_number_corner = Corner::from_index(99);
    process_pdfs(&req).expect("Failed to process PDFs");

    let doc = Document::load(&output).unwrap();
    let ops = overlay_operations(&doc, page_ids(&doc)[0]);
    assert_eq!(text_origin(&ops, "1"), (50.0, 742.0));
}

#[test]
fn test_corrupt_input_leaves_no_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let good = write_fixture(temp_dir.path(), "good.pdf", 1, LETTER);
    let bad = temp_dir.path().join("bad.pdf");
    std::fs::write(&bad, b"this is not a pdf").unwrap();
    let output = temp_dir.path().join("out.pdf");

    let err = process_pdfs(&request(vec![good, bad.clone()], output.clone(), false)).unwrap_err();

    match err {
        Error::SourceRead { path, .. } => assert_eq!(path, bad),
        other => panic!("expected SourceRead, got {}", other),
    }
    assert!(!output.exists());

    let mut names: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["bad.pdf", "good.pdf"]);
}

#[test]
fn test_nonexistent_input() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("out.pdf");

    let err = process_pdfs(&request(vec![PathBuf::from("nonexistent.pdf")], output.clone(), false))
        .unwrap_err();

    assert!(matches!(err, Error::FileNotFound(_)));
    assert!(err.to_string().contains("nonexistent.pdf"));
    assert!(!output.exists());
}

#[test]
fn test_output_carries_producer() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_fixture(temp_dir.path(), "in.pdf", 1, LETTER);
    let output = temp_dir.path().join("out.pdf");

    process_pdfs(&request(vec![input], output.clone(), false)).expect("Failed to process PDFs");

    let doc = Document::load(&output).unwrap();
    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let producer = doc.get_dictionary(info_id).unwrap().get(b"Producer").unwrap().as_str().unwrap();
    assert!(producer.starts_with(b"pdf-pagemaster"));
}

#[test]
fn test_metadata_of_fixture() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_fixture(temp_dir.path(), "meta.pdf", 3, A4);

    let metadata = extract_metadata(&input).unwrap();
    assert_eq!(metadata.page_count, 3);
    assert_eq!(metadata.first_page_size, Some(PageSize::a4()));
    assert_eq!(metadata.title, None);
}
