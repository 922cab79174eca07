// src/pipeline/content.rs
use super::session::SessionGuard;
use folio_traits::{RenderError, RenderSession};
use folio_types::{Margin, PageSize, PageStream};
use log::debug;

/// Renders `markup` into pages of exactly `page_size`, keeping `margin`
/// free on every page. Engine failures are returned unchanged.
pub(crate) async fn render_content<S: RenderSession>(
    session: &mut SessionGuard<S>,
    markup: &str,
    page_size: &PageSize,
    margin: &Margin,
) -> Result<PageStream, RenderError> {
    let stream = session.render(markup, page_size, margin).await?;
    debug!(
        "Rendered {} bytes of markup into {} bytes of PDF at {} x {}.",
        markup.len(),
        stream.len(),
        page_size.width,
        page_size.height
    );
    Ok(stream)
}
