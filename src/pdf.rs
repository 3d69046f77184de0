use crate::error::{Result, StampError};
use crate::stamp_image::deflate;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

const XOBJECT_PREFIX: &str = "PdfStamp";
const MAX_TREE_DEPTH: usize = 32;

/// Looks up a 1-based page number. Zero and negative pages are out of range.
pub fn page_id(doc: &Document, page: i64) -> Result<ObjectId> {
    let pages = doc.get_pages();
    u32::try_from(page)
        .ok()
        .and_then(|n| pages.get(&n).copied())
        .ok_or(StampError::PageOutOfRange {
            page,
            total: pages.len(),
        })
}

fn resolve(doc: &Document, obj: &Object) -> Result<Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?.clone()),
        other => Ok(other.clone()),
    }
}

fn resolve_to_dict(doc: &Document, obj: &Object) -> Result<Dictionary> {
    match resolve(doc, obj)? {
        Object::Stream(s) => Ok(s.dict),
        other => Ok(other.as_dict()?.clone()),
    }
}

/// Resources a page inherits from its ancestors in the page tree.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        let Ok(parent) = node.get(b"Parent").and_then(Object::as_reference) else {
            break;
        };
        node = doc.get_dictionary(parent)?;
        if let Ok(res) = node.get(b"Resources") {
            return resolve_to_dict(doc, res);
        }
    }
    Ok(Dictionary::new())
}

/// Gives the page its own /Resources entry, copying inherited ones, so
/// that new entries never leak into sibling pages.
fn ensure_own_resources(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    if doc.get_dictionary(page_id)?.has(b"Resources") {
        return Ok(());
    }
    let inherited = inherited_resources(doc, page_id)?;
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(inherited));
    Ok(())
}

fn unused_name(dict: &Dictionary) -> String {
    let mut n = 0u32;
    loop {
        let name = format!("{XOBJECT_PREFIX}{n}");
        if !dict.has(name.as_bytes()) {
            return name;
        }
        n += 1;
    }
}

/// Registers `xobject_id` in the page's /XObject resources under a fresh
/// name and returns that name.
pub fn add_xobject(doc: &mut Document, page_id: ObjectId, xobject_id: ObjectId) -> Result<String> {
    ensure_own_resources(doc, page_id)?;

    let resources_ref = doc
        .get_dictionary(page_id)?
        .get(b"Resources")?
        .as_reference()
        .ok();

    let xobjects_ref = {
        let resources = match resources_ref {
            Some(id) => doc.get_dictionary(id)?,
            None => doc.get_dictionary(page_id)?.get(b"Resources")?.as_dict()?,
        };
        resources
            .get(b"XObject")
            .ok()
            .and_then(|o| o.as_reference().ok())
    };

    let xobjects = match xobjects_ref {
        Some(id) => doc.get_dictionary_mut(id)?,
        None => {
            let resources = match resources_ref {
                Some(id) => doc.get_dictionary_mut(id)?,
                None => doc
                    .get_dictionary_mut(page_id)?
                    .get_mut(b"Resources")?
                    .as_dict_mut()?,
            };
            if !resources.has(b"XObject") {
                resources.set("XObject", Dictionary::new());
            }
            resources.get_mut(b"XObject")?.as_dict_mut()?
        }
    };

    let name = unused_name(xobjects);
    xobjects.set(name.as_str(), Object::Reference(xobject_id));
    Ok(name)
}

/// Current /Contents of a page as a flat list of stream references.
fn content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let page = doc.get_dictionary(page_id)?;
    let refs = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };
    Ok(refs)
}

fn compressed_stream(content: &[u8]) -> Result<Stream> {
    Ok(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        deflate(content)?,
    ))
}

/// Draws `ops` on top of the page. The existing content is enclosed in
/// q/Q so its graphics state cannot leak into the overlay.
pub fn add_overlay(doc: &mut Document, page_id: ObjectId, ops: &[u8]) -> Result<()> {
    let existing = content_refs(doc, page_id)?;

    let mut overlay = b"\nQ\n".to_vec();
    overlay.extend_from_slice(ops);

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(doc.add_object(compressed_stream(b"q\n")?)));
    contents.extend(existing);
    contents.push(Object::Reference(doc.add_object(compressed_stream(&overlay)?)));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Adds a borderless /Link annotation over `rect` (llx, lly, urx, ury)
/// that opens `url`.
pub fn add_link(doc: &mut Document, page_id: ObjectId, rect: [f32; 4], url: &str) -> Result<ObjectId> {
    let action = dictionary! {
        "Type" => "Action",
        "S" => "URI",
        "URI" => Object::String(url.as_bytes().to_vec(), StringFormat::Literal),
    };
    let annot = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => rect.iter().map(|v| Object::from(*v)).collect::<Vec<_>>(),
        "Border" => vec![Object::Integer(0); 3],
        "F" => 4_i64,
        "P" => Object::Reference(page_id),
        "A" => action,
    };
    let annot_id = doc.add_object(annot);

    let annots_ref = doc
        .get_dictionary(page_id)?
        .get(b"Annots")
        .ok()
        .and_then(|o| o.as_reference().ok());

    match annots_ref {
        Some(id) => doc
            .get_object_mut(id)?
            .as_array_mut()?
            .push(Object::Reference(annot_id)),
        None => {
            let page = doc.get_dictionary_mut(page_id)?;
            if let Ok(Object::Array(arr)) = page.get_mut(b"Annots") {
                arr.push(Object::Reference(annot_id));
            } else {
                page.set("Annots", vec![Object::Reference(annot_id)]);
            }
        }
    }
    Ok(annot_id)
}
