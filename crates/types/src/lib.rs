//! Shared data model for document assembly.
//!
//! Lengths live in three unit spaces that never mix implicitly:
//! device pixels ([`Px`]), millimeters ([`Mm`]) and PDF points ([`Pt`]).
//! Everything else in this crate (page sizes, margins, slots, fragments)
//! is built on top of those newtypes.

pub mod color;
pub mod document;
pub mod geometry;
pub mod slot;
pub mod units;

pub use color::Rgb;
pub use document::{DocumentFragment, PageStream, PdfContent};
pub use geometry::{BoundingBox, Margin, PageSize, Viewport};
pub use slot::{FontRef, MarkupSlot, Slot, SlotPosition, StandardFont, TextAlign, TextRun, TextSlot};
pub use units::{Mm, Pt, Px, Rounding};
