//! PDF merging and overlay compositing using lopdf

use std::collections::{BTreeMap, HashMap};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use crate::error::{Error, Result};
use super::metadata::inherited_attribute;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Resource name prefix for composited overlay forms
const OVERLAY_XOBJECT_NAME: &str = "PgmOverlay";

/// Merge loaded documents into a single document, pages in input order
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// Inherited page attributes are copied onto each page before it is moved
/// under the new page tree, so pages keep their size and resources.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    if documents.is_empty() {
        return Err(Error::NoInputs);
    }

    // Define a starting max_id for merged document
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for &page_id in &pages {
            flatten_inherited_attributes(&mut doc, page_id)?;
        }
        page_ids.extend(pages);

        objects.extend(doc.objects);
    }

    let mut merged_doc = Document::with_version("1.5");
    merged_doc.objects.extend(objects);

    // new_object_id() must hand out IDs above everything just added
    merged_doc.max_id = max_id - 1;

    let pages_id = merged_doc.new_object_id();

    let kids: Vec<Object> = page_ids
        .iter()
        .map(|&id| Object::Reference(id))
        .collect();

    let mut pages_object = Dictionary::new();
    pages_object.set("Type", Object::Name(b"Pages".to_vec()));
    pages_object.set("Count", Object::Integer(page_ids.len() as i64));
    pages_object.set("Kids", Object::Array(kids));

    let catalog_id = merged_doc.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
    merged_doc.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        match merged_doc.get_object_mut(page_id) {
            Ok(Object::Dictionary(dict)) => dict.set("Parent", Object::Reference(pages_id)),
            _ => {
                return Err(Error::Merge(format!(
                    "page object {:?} is not a dictionary",
                    page_id
                )))
            }
        }
    }

    // Old catalogs and page tree nodes are no longer reachable
    merged_doc.prune_objects();

    let actual = merged_doc.get_pages().len();
    if actual != page_ids.len() {
        return Err(Error::Merge(format!(
            "merged page tree has {} pages, expected {}",
            actual,
            page_ids.len()
        )));
    }

    Ok(merged_doc)
}

/// Copy inheritable attributes from ancestors onto the page itself
fn flatten_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = doc.get_dictionary(page_id)?;

    let inherited: Vec<(&[u8], Object)> = INHERITABLE_KEYS
        .iter()
        .filter(|&&key| page.get(key).is_err())
        .filter_map(|&key| inherited_attribute(doc, page_id, key).map(|value| (key, value.clone())))
        .collect();

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }

    Ok(())
}

/// Composite each overlay page on top of the matching base page
///
/// Every overlay page becomes a Form XObject drawn after the base page's
/// content. The base content is wrapped in `q`/`Q` so any transformation it
/// leaves behind does not affect the overlay.
pub fn composite_overlay(base: &mut Document, overlay: &Document) -> Result<()> {
    let base_pages: Vec<ObjectId> = base.get_pages().into_values().collect();
    let overlay_pages: Vec<ObjectId> = overlay.get_pages().into_values().collect();

    if base_pages.len() != overlay_pages.len() {
        return Err(Error::PageCountMismatch {
            expected: base_pages.len(),
            actual: overlay_pages.len(),
        });
    }

    let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();

    for (&base_page, &overlay_page) in base_pages.iter().zip(&overlay_pages) {
        let content = page_content(overlay, overlay_page)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let bbox = inherited_attribute(overlay, overlay_page, b"MediaBox")
            .cloned()
            .unwrap_or_else(letter_media_box);

        let resources = match inherited_attribute(overlay, overlay_page, b"Resources") {
            Some(res) => copy_object_deep(base, overlay, res, &mut cache)?,
            None => Object::Dictionary(Dictionary::new()),
        };

        let mut xobject_dict = Dictionary::new();
        xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
        xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
        xobject_dict.set("FormType", Object::Integer(1));
        xobject_dict.set("BBox", bbox);
        xobject_dict.set("Matrix", Object::Array(vec![
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Integer(0),
            Object::Integer(0),
        ]));
        xobject_dict.set("Resources", resources);

        let xobject_id = base.add_object(Stream::new(xobject_dict, content));
        let name = add_xobject_to_page_resources(base, base_page, xobject_id)?;

        let invoke = format!("q\n/{} Do\nQ\n", name);
        let invoke_id = base.add_object(Stream::new(Dictionary::new(), invoke.into_bytes()));
        wrap_page_content(base, base_page, invoke_id)?;
    }

    Ok(())
}

fn letter_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

/// Content stream references of a page, with an indirect Contents array resolved
fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;

    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(arr)) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };

    Ok(refs)
}

/// Decoded content of a page, all content streams concatenated
fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in content_refs(doc, page_id)? {
        if let Object::Reference(id) = obj {
            if let Ok(stream) = doc.get_object(id).and_then(Object::as_stream) {
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                result.extend_from_slice(&content);
                result.push(b'\n');
            }
        }
    }

    Ok(result)
}

/// Wrap the page's existing content in q/Q and append `appended_id` after it
fn wrap_page_content(doc: &mut Document, page_id: ObjectId, appended_id: ObjectId) -> Result<()> {
    let existing = content_refs(doc, page_id)?;

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if !existing.is_empty() {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(restore_id));
    }
    contents.push(Object::Reference(appended_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));

    Ok(())
}

/// Register a Form XObject in the page's Resources under an unused name
///
/// The page gets its own Resources dictionary so resources shared with other
/// pages are left untouched. Returns the name chosen.
fn add_xobject_to_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    xobject_id: ObjectId,
) -> Result<String> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => match doc.dereference(obj) {
            Ok((_, Object::Dictionary(dict))) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };

    let name = (0..)
        .map(|i| match i {
            0 => OVERLAY_XOBJECT_NAME.to_string(),
            n => format!("{}{}", OVERLAY_XOBJECT_NAME, n),
        })
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .unwrap_or_else(|| OVERLAY_XOBJECT_NAME.to_string());

    xobjects.set(name.as_bytes().to_vec(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Deep copy an object from `source` into `target`, following references
///
/// `cache` maps source object IDs to the IDs already copied into `target`.
fn copy_object_deep(
    target: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID first so reference cycles terminate
            let new_id = target.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(target, source, referenced, cache)?;
            target.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(target, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(target, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(target, source, value, cache)?);
            }
            let mut new_stream = Stream::new(new_dict, stream.content.clone());
            new_stream.allows_compression = stream.allows_compression;
            Ok(Object::Stream(new_stream))
        }
        _ => Ok(obj.clone()),
    }
}
