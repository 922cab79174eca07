//! The rendering-engine seam.
//!
//! Turning markup into page-accurate PDF output is the job of an external
//! engine (typically a headless browser). Assembly only needs a handful of
//! operations from it, all of which suspend on a process or network round
//! trip and may fail.
//!
//! One [`RenderSession`] is opened per assembly request. Sessions are not
//! shared between concurrent requests.

use folio_types::{BoundingBox, Margin, PageSize, PageStream, Viewport};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Error type for rendering-engine operations. Surfaced to callers unchanged.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("Failed to launch rendering engine: {0}")]
    Launch(String),

    #[error("Rendering session error: {0}")]
    Session(String),

    #[error("Failed to render content: {0}")]
    Content(String),

    #[error("Rendering engine timed out during {operation} after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Rendering session is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err.to_string())
    }
}

/// A rendering engine capable of opening independent sessions.
pub trait RenderEngine: Send + Sync {
    type Session: RenderSession;

    /// Acquire a fresh session. The caller must `close` it when done.
    fn open(&self) -> impl Future<Output = Result<Self::Session, RenderError>> + Send;
}

/// A single live connection to the rendering engine.
///
/// Calls are issued strictly one at a time; implementations may keep mutable
/// state (active content, viewport) between them.
pub trait RenderSession: Send {
    /// Resize the viewport used for subsequent layout.
    fn set_viewport(
        &mut self,
        viewport: Viewport,
    ) -> impl Future<Output = Result<(), RenderError>> + Send;

    /// Lay out `markup` in `viewport` and report the content's natural size.
    fn measure(
        &mut self,
        markup: &str,
        viewport: Viewport,
    ) -> impl Future<Output = Result<BoundingBox, RenderError>> + Send;

    /// Render `markup` into pages of exactly `page_size`, with `margin` kept
    /// free of content on every page.
    fn render(
        &mut self,
        markup: &str,
        page_size: &PageSize,
        margin: &Margin,
    ) -> impl Future<Output = Result<PageStream, RenderError>> + Send;

    /// Release the session. No other call follows a successful close.
    fn close(&mut self) -> impl Future<Output = Result<(), RenderError>> + Send;

    /// Best-effort synchronous release, called when a session is dropped
    /// without an orderly `close` (for example when the caller cancels).
    fn abandon(&mut self) {}
}
