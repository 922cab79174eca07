use folio::{
    DocumentFragment, FontRef, Margin, Mm, PageSize, PdfContent, Slot, StandardFont, TextRun,
    TextSlot,
};
use folio_template::{PAGE_BREAK_CLOSE, PAGE_BREAK_OPEN};

/// Margin used by every fixture fragment.
pub fn fixture_margin() -> Margin {
    Margin::from_mm(10.0, 10.0, 10.0, 10.0)
}

/// Markup that lays out to exactly `pages` pages reading "<label> page N".
pub fn content_with_pages(label: &str, pages: usize) -> String {
    let body: String = (1..=pages)
        .map(|page| format!("{PAGE_BREAK_OPEN}<p>{label} page {page}</p>{PAGE_BREAK_CLOSE}"))
        .collect();
    format!("<html><body>{body}</body></html>")
}

/// An A4 fragment of `pages` pages with no slots.
pub fn fragment(label: &str, pages: usize) -> DocumentFragment {
    DocumentFragment::new(PdfContent::new(
        content_with_pages(label, pages),
        PageSize::a4_portrait(),
        fixture_margin(),
    ))
}

pub fn markup_footer() -> Slot {
    Slot::markup("<html><body><p>Page {page} of {pages}</p></body></html>")
}

pub fn markup_header(label: &str) -> Slot {
    Slot::markup(format!("<html><body><h1>{label} {{page}}</h1></body></html>"))
}

/// A text slot with one right-aligned Helvetica run.
pub fn text_footer(text: &str) -> Slot {
    Slot::Text(TextSlot {
        right: Some(TextRun::new(
            FontRef::Standard(StandardFont::Helvetica),
            text,
            Mm(4.0),
        )),
        ..TextSlot::default()
    })
}
