// src/pipeline/session.rs
use folio_traits::{RenderEngine, RenderError, RenderSession};
use folio_types::{BoundingBox, Margin, PageSize, PageStream, Viewport};
use log::debug;
use std::future::Future;
use std::time::Duration;

/// Runs `operation`, failing with [`RenderError::Timeout`] once `timeout`
/// elapses. `None` waits indefinitely.
pub(crate) async fn with_timeout<T, F>(
    timeout: Option<Duration>,
    operation: &'static str,
    future: F,
) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    match timeout {
        Some(after) => tokio::time::timeout(after, future)
            .await
            .map_err(|_| RenderError::Timeout { operation, after })?,
        None => future.await,
    }
}

/// Scoped ownership of one rendering session.
///
/// Every call is bounded by the configured timeout. [`close`](Self::close)
/// releases the session in an orderly way; a guard dropped without closing
/// (the caller cancelled the assembly future) abandons it instead.
pub(crate) struct SessionGuard<S: RenderSession> {
    session: Option<S>,
    timeout: Option<Duration>,
}

impl<S: RenderSession> SessionGuard<S> {
    pub(crate) async fn open<E>(engine: &E, timeout: Option<Duration>) -> Result<Self, RenderError>
    where
        E: RenderEngine<Session = S>,
    {
        let session = with_timeout(timeout, "open", engine.open()).await?;
        debug!("Rendering session opened.");
        Ok(Self {
            session: Some(session),
            timeout,
        })
    }

    fn session(&mut self) -> Result<&mut S, RenderError> {
        self.session.as_mut().ok_or(RenderError::Closed)
    }

    pub(crate) async fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        let timeout = self.timeout;
        let session = self.session()?;
        with_timeout(timeout, "set_viewport", session.set_viewport(viewport)).await
    }

    pub(crate) async fn measure(
        &mut self,
        markup: &str,
        viewport: Viewport,
    ) -> Result<BoundingBox, RenderError> {
        let timeout = self.timeout;
        let session = self.session()?;
        with_timeout(timeout, "measure", session.measure(markup, viewport)).await
    }

    pub(crate) async fn render(
        &mut self,
        markup: &str,
        page_size: &PageSize,
        margin: &Margin,
    ) -> Result<PageStream, RenderError> {
        let timeout = self.timeout;
        let session = self.session()?;
        with_timeout(timeout, "render", session.render(markup, page_size, margin)).await
    }

    /// Closes the session. If the close times out the session is still
    /// held, so dropping the guard abandons it.
    pub(crate) async fn close(mut self) -> Result<(), RenderError> {
        let timeout = self.timeout;
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let result = with_timeout(timeout, "close", session.close()).await;
        if let Err(RenderError::Timeout { .. }) = result {
            debug!("Closing the rendering session timed out.");
        } else {
            self.session = None;
            debug!("Rendering session closed.");
        }
        result
    }
}

impl<S: RenderSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!("Rendering session dropped without close; abandoning it.");
            session.abandon();
        }
    }
}
