use crate::geometry::{Margin, PageSize};
use crate::slot::{Slot, SlotPosition};
use serde::{Deserialize, Serialize};

/// Markup plus the page geometry it should be rendered into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    pub markup: String,
    pub margin: Margin,
    pub page_size: PageSize,
}

impl PdfContent {
    pub fn new(markup: impl Into<String>, page_size: PageSize, margin: Margin) -> Self {
        Self {
            markup: markup.into(),
            margin,
            page_size,
        }
    }
}

/// One logical document section with optional header and footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFragment {
    #[serde(flatten)]
    pub content: PdfContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Slot>,
}

impl DocumentFragment {
    pub fn new(content: PdfContent) -> Self {
        Self {
            content,
            header: None,
            footer: None,
        }
    }

    pub fn with_header(mut self, slot: Slot) -> Self {
        self.header = Some(slot);
        self
    }

    pub fn with_footer(mut self, slot: Slot) -> Self {
        self.footer = Some(slot);
        self
    }

    /// The attached slots in compositing order (header first).
    pub fn slots(&self) -> impl Iterator<Item = (SlotPosition, &Slot)> {
        [
            (SlotPosition::Header, self.header.as_ref()),
            (SlotPosition::Footer, self.footer.as_ref()),
        ]
        .into_iter()
        .filter_map(|(position, slot)| slot.map(|slot| (position, slot)))
    }
}

/// Serialized PDF bytes passed between components without inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStream(Vec<u8>);

impl PageStream {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for PageStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
