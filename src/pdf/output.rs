//! Writing the finished document

use std::io::Write;
use std::path::Path;

use chrono::Local;
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::error::{Error, Result};

/// Producer string written into the document Info dictionary
pub const PRODUCER: &str = concat!("pdf-pagemaster ", env!("CARGO_PKG_VERSION"));

/// Set Producer, CreationDate and ModDate in a fresh Info dictionary
pub fn stamp_document_info(doc: &mut Document) {
    let now = Local::now().format("D:%Y%m%d%H%M%S").to_string();

    let mut info = Dictionary::new();
    info.set("Producer", Object::String(PRODUCER.as_bytes().to_vec(), StringFormat::Literal));
    info.set("CreationDate", Object::String(now.clone().into_bytes(), StringFormat::Literal));
    info.set("ModDate", Object::String(now.into_bytes(), StringFormat::Literal));

    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));
}

/// Save `doc` to `output` without ever leaving a partial file behind
///
/// The document is written to a temporary file next to `output` and renamed
/// into place once fully written. On failure the temporary file is removed.
pub fn save_atomically(doc: &mut Document, output: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| Error::Write {
        path: output.to_path_buf(),
        source,
    };

    let mut buffer = Vec::new();
    write_document(doc, &mut buffer, output)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".pdf-pagemaster-")
        .suffix(".pdf")
        .tempfile_in(dir)
        .map_err(write_error)?;

    staged.write_all(&buffer).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(output).map_err(|e| write_error(e.error))?;

    log::debug!("Wrote {} bytes to {}", buffer.len(), output.display());
    Ok(())
}

/// Serialize `doc` into `target`, reporting failures against `output`
fn write_document<W: Write>(doc: &mut Document, target: &mut W, output: &Path) -> Result<()> {
    doc.save_to(target).map_err(|e| Error::Write {
        path: output.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    })
}
