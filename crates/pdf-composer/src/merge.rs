use crate::copy::ObjectCopier;
use crate::error::ComposerError;
use crate::page::{INHERITABLE_ATTRIBUTES, inherited_attribute, new_document};
use lopdf::{Document, Object, ObjectId};

/// Merges the pages from a source document into a target document.
///
/// Each page is copied together with everything it references. Attributes
/// the page inherited from the source page tree (`MediaBox`, `Resources`,
/// `CropBox`, `Rotate`) are written onto the copy, and the source tree
/// itself is never copied.
///
/// # Arguments
/// * `target` - The document to merge into.
/// * `source` - The document to take pages from.
/// * `prepend` - If `true`, pages from `source` are added to the beginning.
///   If `false`, they are appended.
pub fn merge_documents(
    target: &mut Document,
    source: &Document,
    prepend: bool,
) -> Result<(), ComposerError> {
    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    if source_pages.is_empty() {
        return Ok(());
    }

    let mut copier = ObjectCopier::new(source, target);

    // Reserve every page first so cross-page references (link annotations,
    // destinations) resolve to the copied page rather than a duplicate.
    let new_page_ids: Vec<ObjectId> = source_pages.iter().map(|id| copier.reserve(*id)).collect();

    for (source_id, new_id) in source_pages.iter().zip(&new_page_ids) {
        let mut page = source.get_object(*source_id)?.as_dict()?.clone();
        for key in INHERITABLE_ATTRIBUTES {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(source, *source_id, key)? {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");
        let page = copier.remap_references(Object::Dictionary(page))?;
        copier.fill(*new_id, page)?;
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_object(root_id)?.as_dict()?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;

    let existing = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    let added: Vec<Object> = new_page_ids.iter().map(|id| Object::Reference(*id)).collect();

    let kids = if prepend {
        added.into_iter().chain(existing).collect()
    } else {
        existing.into_iter().chain(added).collect()
    };
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + new_page_ids.len() as i64);

    for page_id in new_page_ids {
        target
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Parent", Object::Reference(pages_id));
    }

    Ok(())
}

/// Joins documents into one, in order, preserving every page.
pub fn concatenate<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
) -> Result<Document, ComposerError> {
    let mut combined = new_document();
    for document in documents {
        merge_documents(&mut combined, document, false)?;
    }
    Ok(combined)
}
