use thiserror::Error;

/// Errors that can occur while expanding slot markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Malformed content: missing opening '{0}' delimiter")]
    MissingOpen(String),

    #[error("Malformed content: missing closing '{0}' delimiter")]
    MissingClose(String),
}
