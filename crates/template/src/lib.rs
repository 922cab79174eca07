//! Page-number propagation for slot markup.
//!
//! A header or footer written once as markup has to appear on every page of
//! its fragment with the right page number. This crate expands one template
//! into `N` concrete page instances, each separated by a page break, so that
//! rendering the result yields exactly one slot page per content page.
//!
//! ## Key Abstractions
//!
//! - **`PageNumberPropagator`**: splits markup at its content region and
//!   repeats the region once per page
//! - **`RegionMarkers`**: the begin/end delimiters of the content region
//! - **`substitute_page_tokens`**: the `{page}` / `{pages}` replacement shared
//!   with plain-text slots

mod error;
mod propagate;

pub use error::TemplateError;
pub use propagate::{
    PAGES_TOKEN, PAGE_BREAK_CLOSE, PAGE_BREAK_OPEN, PAGE_TOKEN, PageNumberPropagator, RegionMarkers,
    propagate_page_numbers, substitute_page_tokens,
};
