//! PDF composition for assembled documents.
//!
//! This crate provides the page-level PDF manipulation assembly needs, built
//! on lopdf:
//! - Parsing and serializing rendered output
//! - Deep object copying with cycle detection
//! - Concatenating documents while preserving per-page geometry
//! - Overlaying rendered header/footer pages as form XObjects
//! - Drawing text slots with standard or embedded TrueType fonts

mod canvas;
mod copy;
mod error;
mod fonts;
mod merge;
mod overlay;
mod page;
mod transform;

#[cfg(test)]
mod test_support;

pub use canvas::{PageCanvas, TextDraw};
pub use error::ComposerError;
pub use fonts::{DocumentFonts, EmbeddedFont, FontMetrics, LoadedFont, encode_win_ansi};
pub use merge::{concatenate, merge_documents};
pub use overlay::{PageNumbering, band_transform, overlay_rendered_slot, overlay_text_slot};
pub use page::{
    PageBox, append_isolated_content, first_page_geometry, load_document, media_box, new_document,
    page_count, page_ids, save_document,
};
pub use transform::{Transform, flip_y};

/// Re-exported so callers can hold parsed documents without naming lopdf.
pub use lopdf::Document;
