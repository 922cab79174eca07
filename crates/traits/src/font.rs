//! FontProvider trait for resolving custom fonts by name.
//!
//! Text slots reference custom fonts by name; the provider supplies the
//! TrueType bytes without tying the composer to filesystem access.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for font lookup operations.
#[derive(Error, Debug, Clone)]
pub enum FontError {
    #[error("Font not found: {0}")]
    NotFound(String),

    #[error("Failed to load font '{name}': {message}")]
    LoadFailed { name: String, message: String },

    #[error("Invalid font data for '{name}': {message}")]
    InvalidFormat { name: String, message: String },
}

/// Shared font data type (reference-counted bytes).
pub type SharedFontData = Arc<Vec<u8>>;

/// A source of TrueType font programs.
///
/// # Example
///
/// ```ignore
/// let provider = InMemoryFontProvider::new();
/// provider.add("Roboto", std::fs::read("fonts/roboto.ttf")?)?;
/// let data = provider.load("Roboto")?;
/// ```
pub trait FontProvider: Send + Sync + Debug {
    /// Load the font program registered under `name`.
    fn load(&self, name: &str) -> Result<SharedFontData, FontError>;

    /// Check if a font is registered under `name`.
    fn contains(&self, name: &str) -> bool;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory font provider.
///
/// Fonts must be registered before assembly starts.
#[derive(Debug, Default)]
pub struct InMemoryFontProvider {
    fonts: RwLock<HashMap<String, SharedFontData>>,
}

impl InMemoryFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font program under `name`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `FontError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, name: impl Into<String>, data: Vec<u8>) -> Result<(), FontError> {
        self.add_shared(name, Arc::new(data))
    }

    /// Register already shared font data.
    ///
    /// # Errors
    ///
    /// Returns `FontError::LoadFailed` if the internal lock is poisoned.
    pub fn add_shared(
        &self,
        name: impl Into<String>,
        data: SharedFontData,
    ) -> Result<(), FontError> {
        let name = name.into();
        let mut fonts = self.fonts.write().map_err(|_| FontError::LoadFailed {
            name: name.clone(),
            message: "font store lock poisoned".to_string(),
        })?;
        fonts.insert(name, data);
        Ok(())
    }

    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.fonts.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FontProvider for InMemoryFontProvider {
    fn load(&self, name: &str) -> Result<SharedFontData, FontError> {
        let fonts = self.fonts.read().map_err(|_| FontError::LoadFailed {
            name: name.to_string(),
            message: "font store lock poisoned".to_string(),
        })?;
        fonts
            .get(name)
            .cloned()
            .ok_or_else(|| FontError::NotFound(name.to_string()))
    }

    fn contains(&self, name: &str) -> bool {
        self.fonts
            .read()
            .map(|f| f.contains_key(name))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryFontProvider"
    }
}
