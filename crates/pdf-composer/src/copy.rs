//! Deep copying of objects between documents.

use crate::error::ComposerError;
use crate::page::{PageBox, inherited_attribute, media_box};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::HashMap;

/// Copies objects from `source` into `target`, allocating fresh ids.
///
/// Every source object is copied at most once per copier; references to an
/// object already copied (or reserved) are rewritten to the same target id.
pub(crate) struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub(crate) fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            id_map: HashMap::new(),
        }
    }

    pub(crate) fn target(&self) -> &Document {
        &*self.target
    }

    pub(crate) fn target_mut(&mut self) -> &mut Document {
        &mut *self.target
    }

    /// Allocates the target id for `source_id` without copying it yet.
    ///
    /// Later references to `source_id` resolve to the reserved id, so objects
    /// that point back at it (annotations pointing at their page) are not
    /// duplicated.
    pub(crate) fn reserve(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return *target_id;
        }
        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);
        new_id
    }

    /// Stores `object` under an id obtained from [`reserve`](Self::reserve).
    pub(crate) fn fill(
        &mut self,
        target_id: ObjectId,
        object: Object,
    ) -> Result<(), ComposerError> {
        let slot = self
            .target
            .objects
            .get_mut(&target_id)
            .ok_or(lopdf::Error::ObjectNotFound(target_id))?;
        *slot = object;
        Ok(())
    }

    /// Deep copies `source_id` and everything it references.
    pub(crate) fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, ComposerError> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve before recursing so reference cycles terminate.
        let new_id = self.reserve(source_id);
        let object = self.source.get_object(source_id)?.clone();
        let remapped = self.remap_references(object)?;
        self.fill(new_id, remapped)?;
        Ok(new_id)
    }

    /// Rewrites every reference inside `obj` to its copy in the target.
    pub(crate) fn remap_references(&mut self, obj: Object) -> Result<Object, ComposerError> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.remap_references(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(items))
            }
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.remap_dictionary(dict)?)),
            Object::Stream(mut stream) => {
                stream.dict = self.remap_dictionary(stream.dict)?;
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }

    fn remap_dictionary(&mut self, mut dict: Dictionary) -> Result<Dictionary, ComposerError> {
        for (_, value) in dict.iter_mut() {
            let taken = std::mem::replace(value, Object::Null);
            *value = self.remap_references(taken)?;
        }
        Ok(dict)
    }

    /// Wraps a source page into a form XObject living in the target.
    ///
    /// The form carries the page's drawing operations, its (possibly
    /// inherited) resources and its media box as `BBox`. Returns the form id
    /// and the media box so callers can place it.
    pub(crate) fn embed_page_as_form(
        &mut self,
        source_page: ObjectId,
    ) -> Result<(ObjectId, PageBox), ComposerError> {
        let page_box = media_box(self.source, source_page)?;
        let content = self.source.get_page_content(source_page)?;
        let resources = match inherited_attribute(self.source, source_page, b"Resources")? {
            Some(resources) => self.remap_references(resources)?,
            None => Object::Dictionary(Dictionary::new()),
        };

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "FormType" => 1,
                "BBox" => page_box.to_array(),
                "Resources" => resources,
            },
            content,
        );
        Ok((self.target.add_object(form), page_box))
    }
}
