use crate::error::{Result, StampError};
use crate::location::StampLocation;
use crate::pdf;
use crate::stamp_image::StampImage;
use lopdf::{Document, ObjectId};
use std::path::Path;
use tracing::debug;

struct PageOverlay {
    page_id: ObjectId,
    xobject: String,
    ops: String,
}

/// Draws `image` at every location, each covered by a link to `url`.
/// Fails on the first location whose page does not exist.
pub fn stamp_document(
    doc: &mut Document,
    image: &StampImage,
    url: &str,
    locations: &[StampLocation],
) -> Result<()> {
    let (w, h) = image.size();
    let mut embedded = None;
    let mut overlays: Vec<PageOverlay> = Vec::new();

    for loc in locations {
        let page_id = pdf::page_id(doc, loc.page)?;
        let image_id = *embedded.get_or_insert_with(|| image.embed(doc));

        let idx = match overlays.iter().position(|o| o.page_id == page_id) {
            Some(idx) => idx,
            None => {
                let xobject = pdf::add_xobject(doc, page_id, image_id)?;
                overlays.push(PageOverlay {
                    page_id,
                    xobject,
                    ops: String::new(),
                });
                overlays.len() - 1
            }
        };

        let overlay = &mut overlays[idx];
        overlay.ops.push_str(&format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            w, h, loc.x, loc.y, overlay.xobject
        ));

        pdf::add_link(doc, page_id, [loc.x, loc.y, loc.x + w, loc.y + h], url)?;
        debug!(location = %loc, "placed stamp");
    }

    for overlay in overlays {
        pdf::add_overlay(doc, overlay.page_id, overlay.ops.as_bytes())?;
    }
    Ok(())
}

/// Stamps `input` into `output`. Nothing is written unless every location
/// was applied; a failure during the final write can leave a partial file.
pub fn stamp_file(
    input: &Path,
    output: &Path,
    image: &StampImage,
    url: &str,
    locations: &[StampLocation],
) -> Result<()> {
    let mut doc = Document::load(input).map_err(|source| StampError::Load {
        path: input.to_path_buf(),
        source,
    })?;

    stamp_document(&mut doc, image, url, locations)?;

    doc.save(output).map_err(|source| StampError::Save {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}
