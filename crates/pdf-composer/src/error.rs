use folio_traits::FontError;
use folio_types::SlotPosition;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Slot document has {slot_pages} pages but the base document has {base_pages}")]
    PageCountMismatch { base_pages: usize, slot_pages: usize },

    #[error("Text slots cannot be placed as a {0}")]
    UnsupportedPlacement(SlotPosition),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Malformed page {page:?}: {message}")]
    MalformedPage {
        page: lopdf::ObjectId,
        message: String,
    },
}
