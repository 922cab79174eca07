use crate::error::TemplateError;
use serde::{Deserialize, Serialize};

pub const PAGE_TOKEN: &str = "{page}";
pub const PAGES_TOKEN: &str = "{pages}";

/// Wrapper that forces a page break after each propagated instance.
pub const PAGE_BREAK_OPEN: &str = r#"<div style="page-break-after: always">"#;
pub const PAGE_BREAK_CLOSE: &str = "</div>";

/// Delimiters of the single content region inside slot markup.
///
/// Matching is ASCII case-insensitive; the delimiters found in the input are
/// written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMarkers {
    pub open: String,
    pub close: String,
}

impl Default for RegionMarkers {
    fn default() -> Self {
        Self {
            open: "<body>".to_string(),
            close: "</body>".to_string(),
        }
    }
}

impl RegionMarkers {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Replaces every `{page}` and `{pages}` token in `text`.
pub fn substitute_page_tokens(text: &str, page: usize, total_pages: usize) -> String {
    text.replace(PAGE_TOKEN, &page.to_string())
        .replace(PAGES_TOKEN, &total_pages.to_string())
}

/// Upper bound for the up-front allocation of propagated markup.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Expected output size for `page_count` instances, capped so huge ranges
/// neither overflow nor allocate eagerly.
fn capacity_hint(markup_len: usize, body_len: usize, page_count: usize) -> usize {
    let per_page = body_len + PAGE_BREAK_OPEN.len() + PAGE_BREAK_CLOSE.len();
    page_count
        .checked_mul(per_page)
        .and_then(|instances| instances.checked_add(markup_len))
        .map_or(MAX_PREALLOCATION, |total| total.min(MAX_PREALLOCATION))
}

/// Markup split around its content region.
struct Region<'a> {
    head: &'a str,
    open: &'a str,
    body: &'a str,
    close: &'a str,
    foot: &'a str,
}

/// Expands one slot template into per-page instances.
#[derive(Debug, Clone, Default)]
pub struct PageNumberPropagator {
    markers: RegionMarkers,
}

impl PageNumberPropagator {
    pub fn new(markers: RegionMarkers) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &RegionMarkers {
        &self.markers
    }

    /// Repeats the content region once for every page in `start..end`.
    ///
    /// Each copy has `{page}` replaced by its page number and `{pages}` by
    /// `total_pages`, and is wrapped in a page-break element. An empty range
    /// yields an empty region that still carries both delimiters.
    ///
    /// # Errors
    ///
    /// Fails if either delimiter is missing, whatever the range.
    pub fn propagate(
        &self,
        markup: &str,
        start: usize,
        end: usize,
        total_pages: usize,
    ) -> Result<String, TemplateError> {
        let region = self.split(markup)?;
        let page_count = end.saturating_sub(start);

        let capacity = capacity_hint(markup.len(), region.body.len(), page_count);
        let mut out = String::with_capacity(capacity);
        out.push_str(region.head);
        out.push_str(region.open);
        for page in start..end {
            out.push_str(PAGE_BREAK_OPEN);
            out.push_str(&substitute_page_tokens(region.body, page, total_pages));
            out.push_str(PAGE_BREAK_CLOSE);
        }
        out.push_str(region.close);
        out.push_str(region.foot);
        Ok(out)
    }

    fn split<'a>(&self, markup: &'a str) -> Result<Region<'a>, TemplateError> {
        // ASCII lowercasing keeps byte offsets aligned with `markup`.
        let lowered = markup.to_ascii_lowercase();
        let open_marker = self.markers.open.to_ascii_lowercase();
        let close_marker = self.markers.close.to_ascii_lowercase();

        let open_start = lowered
            .find(&open_marker)
            .ok_or_else(|| TemplateError::MissingOpen(self.markers.open.clone()))?;
        let open_end = open_start + open_marker.len();

        let close_start = lowered[open_end..]
            .find(&close_marker)
            .map(|offset| open_end + offset)
            .ok_or_else(|| TemplateError::MissingClose(self.markers.close.clone()))?;
        let close_end = close_start + close_marker.len();

        Ok(Region {
            head: &markup[..open_start],
            open: &markup[open_start..open_end],
            body: &markup[open_end..close_start],
            close: &markup[close_start..close_end],
            foot: &markup[close_end..],
        })
    }
}

/// [`PageNumberPropagator::propagate`] with the default `<body>` markers.
pub fn propagate_page_numbers(
    markup: &str,
    start: usize,
    end: usize,
    total_pages: usize,
) -> Result<String, TemplateError> {
    PageNumberPropagator::default().propagate(markup, start, end, total_pages)
}
