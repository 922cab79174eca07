//! Page-level primitives over `lopdf` documents.

use crate::error::ComposerError;
use folio_types::{PageStream, Pt};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_ATTRIBUTES: [&[u8]; 4] =
    [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// A page rectangle in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
}

impl PageBox {
    pub fn new(x: Pt, y: Pt, width: Pt, height: Pt) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> Pt {
        self.y + self.height
    }

    pub(crate) fn to_array(self) -> Vec<Object> {
        vec![
            real(self.x),
            real(self.y),
            real(self.x + self.width),
            real(self.y + self.height),
        ]
    }
}

pub(crate) fn real(value: Pt) -> Object {
    Object::Real(value.value() as f32)
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Parses serialized PDF bytes.
pub fn load_document(stream: &PageStream) -> Result<Document, ComposerError> {
    Ok(Document::load_mem(stream.as_bytes())?)
}

/// Serializes a document, optionally compressing its streams first.
pub fn save_document(doc: &mut Document, compress: bool) -> Result<PageStream, ComposerError> {
    if compress {
        doc.compress();
    }
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(PageStream::new(buffer))
}

/// An empty document with a catalog and a page tree root.
pub fn new_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

/// Page object ids in reading order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Looks up `key` on the page or, failing that, on its nearest ancestor.
///
/// References are resolved, so the returned value is never a bare
/// `Object::Reference`.
pub(crate) fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, ComposerError> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_object(node_id)?.as_dict()?;
        if let Ok(value) = node.get(key) {
            let resolved = match value {
                Object::Reference(id) => doc.get_object(*id)?.clone(),
                other => other.clone(),
            };
            return Ok(Some(resolved));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node_id = parent,
            Err(_) => return Ok(None),
        }
    }
    Err(ComposerError::MalformedPage {
        page: page_id,
        message: "page tree is too deep or cyclic".to_string(),
    })
}

/// The page's media box, normalized so that width and height are positive.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<PageBox, ComposerError> {
    let malformed = |message: &str| ComposerError::MalformedPage {
        page: page_id,
        message: message.to_string(),
    };
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?
        .ok_or_else(|| malformed("missing MediaBox"))?;
    let corners = media_box
        .as_array()
        .map_err(|_| malformed("MediaBox is not an array"))?
        .iter()
        .map(|item| match item {
            Object::Reference(id) => doc.get_object(*id).ok().and_then(number),
            other => number(other),
        })
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| malformed("MediaBox has a non-numeric entry"))?;
    let [x0, y0, x1, y1] = corners[..] else {
        return Err(malformed("MediaBox must have four entries"));
    };
    Ok(PageBox::new(
        Pt(x0.min(x1)),
        Pt(y0.min(y1)),
        Pt((x1 - x0).abs()),
        Pt((y1 - y0).abs()),
    ))
}

/// Geometry of the first page, or `None` for a document without pages.
pub fn first_page_geometry(doc: &Document) -> Result<Option<PageBox>, ComposerError> {
    match doc.get_pages().values().next() {
        Some(page_id) => media_box(doc, *page_id).map(Some),
        None => Ok(None),
    }
}

/// Resources dictionary of a page, copied out of any inherited or indirect
/// location.
pub(crate) fn page_resources(
    doc: &Document,
    page_id: ObjectId,
) -> Result<Dictionary, ComposerError> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => Ok(dict),
        Some(_) => Err(ComposerError::MalformedPage {
            page: page_id,
            message: "Resources is not a dictionary".to_string(),
        }),
        None => Ok(Dictionary::new()),
    }
}

/// Adds named entries to one resource category (`Font`, `XObject`) of a page.
///
/// The page receives its own direct resources dictionary so that pages
/// sharing an inherited or indirect one are unaffected.
pub(crate) fn register_resources(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    entries: impl IntoIterator<Item = (String, ObjectId)>,
) -> Result<(), ComposerError> {
    let mut resources = page_resources(doc, page_id)?;
    let mut named = match resources.get(category) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_dict()?.clone(),
        _ => Dictionary::new(),
    };
    for (name, id) in entries {
        named.set(name, Object::Reference(id));
    }
    resources.set(category.to_vec(), Object::Dictionary(named));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Draws `content` on top of a page.
///
/// The page's existing content is wrapped in `q`/`Q` first, so graphics state
/// it leaves behind (a stray `cm`, a fill color) cannot leak into the new
/// content.
pub fn append_isolated_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
) -> Result<(), ComposerError> {
    let existing = match doc.get_object(page_id)?.as_dict()?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let mut overlay = b"Q\n".to_vec();
    overlay.extend_from_slice(&content);
    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}
