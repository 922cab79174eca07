//! Multi-document PDF assembly.
//!
//! Fragments of markup are rendered by an external engine, decorated with
//! headers and footers whose page numbers run across the whole set, and
//! joined into one PDF. Assembly runs in two passes: every fragment is laid
//! out first so the total page count is known before any "page X of Y" text
//! is produced.
//!
//! ```ignore
//! let assembler = Assembler::builder(engine)
//!     .with_render_timeout(Duration::from_secs(30))
//!     .build()?;
//! let output = assembler.assemble(&fragments).await?;
//! std::fs::write("out.pdf", output.into_bytes())?;
//! ```

pub mod error;
pub mod pipeline;

pub use error::{AssemblyError, CollaboratorFailure, FaultLocation, Stage};
pub use pipeline::{
    AssembledOutput, Assembler, AssemblerBuilder, AssemblyConfig, DEFAULT_TEXT_SLOT_PADDING,
    PageTotals, text_slot_size,
};

pub use folio_pdf_composer as composer;
pub use folio_template::{
    PageNumberPropagator, RegionMarkers, TemplateError, propagate_page_numbers,
};
pub use folio_traits::{
    FontError, FontProvider, InMemoryFontProvider, RenderEngine, RenderError, RenderSession,
    SharedFontData,
};
pub use folio_types::{
    BoundingBox, DocumentFragment, FontRef, Margin, MarkupSlot, Mm, PageSize, PageStream,
    PdfContent, Pt, Px, Rgb, Rounding, Slot, SlotPosition, StandardFont, TextAlign, TextRun,
    TextSlot, Viewport,
};
