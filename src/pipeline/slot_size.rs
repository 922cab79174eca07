// src/pipeline/slot_size.rs
use super::session::SessionGuard;
use folio_traits::{RenderError, RenderSession};
use folio_types::{Margin, Mm, PageSize, Rounding, Slot, TextSlot, Viewport};
use log::debug;

/// Size of the band a text slot occupies: the content width, and the
/// tallest run plus `padding`. A slot without runs reserves nothing.
pub fn text_slot_size(
    slot: &TextSlot,
    margin: &Margin,
    page_size: &PageSize,
    padding: Mm,
) -> PageSize {
    let width = page_size.content_width(margin);
    let height = slot.tallest_run().map_or(Mm::ZERO, |tallest| tallest + padding);
    PageSize::new(width, height)
}

/// Determines the size a header or footer slot will occupy on the page.
///
/// Markup slots are laid out by the rendering engine at the page's content
/// width and measured; the result is rounded up to whole millimeters so the
/// reserved band is never smaller than the slot. Text slots are sized
/// without a rendering pass.
pub(crate) async fn calculate_slot_size<S: RenderSession>(
    session: &mut SessionGuard<S>,
    slot: &Slot,
    margin: &Margin,
    page_size: &PageSize,
    padding: Mm,
) -> Result<PageSize, RenderError> {
    match slot {
        Slot::Markup(markup) => {
            let content_width = page_size.content_width(margin).max(Mm::ZERO);
            let viewport = Viewport::new(content_width.to_px(), page_size.height.to_px());
            session.set_viewport(viewport).await?;
            let bounds = session.measure(&markup.markup, viewport).await?;
            debug!(
                "Markup slot measured at {} x {} in a {} x {} viewport.",
                bounds.width, bounds.height, viewport.width, viewport.height
            );
            Ok(PageSize::new(
                bounds.width.to_mm(Rounding::Ceil).min(content_width),
                bounds.height.to_mm(Rounding::Ceil),
            ))
        }
        Slot::Text(text) => Ok(text_slot_size(text, margin, page_size, padding)),
    }
}
