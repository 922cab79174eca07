use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

fn decoded(doc: &LopdfDocument, id: ObjectId) -> Vec<u8> {
    match doc.get_object(id).and_then(Object::as_stream) {
        Ok(stream) => stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone()),
        Err(_) => Vec::new(),
    }
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Strings shown by `Tj` operators in a content stream.
fn shown_strings(bytes: &[u8]) -> Vec<String> {
    let Ok(content) = Content::decode(bytes) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Form XObjects registered on a page, by resource name.
pub fn page_forms(doc: &LopdfDocument, page_number: u32) -> Vec<(String, ObjectId)> {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return Vec::new();
    };
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let Some(resources) = page.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) else {
        return Vec::new();
    };
    let Some(xobjects) = resources.get(b"XObject").ok().and_then(|x| resolve_dict(doc, x)) else {
        return Vec::new();
    };
    xobjects
        .iter()
        .filter_map(|(name, obj)| {
            obj.as_reference()
                .ok()
                .map(|id| (String::from_utf8_lossy(name).into_owned(), id))
        })
        .collect()
}

/// Raw decoded content of a page, without its forms.
pub fn page_content(doc: &LopdfDocument, page_number: u32) -> String {
    let page_id = doc.get_pages()[&page_number];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap_or_default()).into_owned()
}

/// All text shown on a page (1-based), including text inside the forms
/// the page draws.
pub fn page_text(doc: &LopdfDocument, page_number: u32) -> String {
    let Some(page_id) = doc.get_pages().get(&page_number).copied() else {
        return String::new();
    };
    let mut lines = shown_strings(&doc.get_page_content(page_id).unwrap_or_default());
    for (_, form_id) in page_forms(doc, page_number) {
        lines.extend(shown_strings(&decoded(doc, form_id)));
    }
    lines.join("\n")
}

/// MediaBox of a page as `[x, y, width, height]` in points.
pub fn page_media_box(doc: &LopdfDocument, page_number: u32) -> Option<[f64; 4]> {
    let page_id = doc.get_pages().get(&page_number).copied()?;
    let media_box = doc.get_dictionary(page_id).ok()?.get(b"MediaBox").ok()?;
    let values: Vec<f64> = media_box
        .as_array()
        .ok()?
        .iter()
        .filter_map(|v| match v {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(f64::from(*r)),
            _ => None,
        })
        .collect();
    match values.as_slice() {
        [x0, y0, x1, y1] => Some([*x0, *y0, x1 - x0, y1 - y0]),
        _ => None,
    }
}

/// Assert that a page shows specific text
#[macro_export]
macro_rules! assert_page_contains_text {
    ($pdf:expr, $page:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::page_text(&$pdf.doc, $page);
        assert!(
            extracted.contains($text),
            "Page {} should contain '{}', but its text was:\n{}",
            $page,
            $text,
            extracted
        );
    };
}

/// Assert that a page does NOT show specific text
#[macro_export]
macro_rules! assert_page_not_contains_text {
    ($pdf:expr, $page:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::page_text(&$pdf.doc, $page);
        assert!(
            !extracted.contains($text),
            "Page {} should NOT contain '{}', but its text was:\n{}",
            $page,
            $text,
            extracted
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}
