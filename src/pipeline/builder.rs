// src/pipeline/builder.rs
use super::assembler::Assembler;
use super::config::AssemblyConfig;
use crate::error::AssemblyError;
use folio_template::RegionMarkers;
use folio_traits::{FontProvider, InMemoryFontProvider, RenderEngine};
use folio_types::Mm;
use std::sync::Arc;
use std::time::Duration;

/// A builder for creating an [`Assembler`].
pub struct AssemblerBuilder<E: RenderEngine> {
    engine: E,
    config: AssemblyConfig,
    fonts: Option<Arc<dyn FontProvider>>,
}

impl<E: RenderEngine> AssemblerBuilder<E> {
    /// Creates a builder around `engine` with the default configuration and
    /// an empty font provider (standard fonts only).
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: AssemblyConfig::default(),
            fonts: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    /// Bounds every rendering-engine call by `timeout`.
    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.config.render_timeout = Some(timeout);
        self
    }

    pub fn with_text_slot_padding(mut self, padding: Mm) -> Self {
        self.config.text_slot_padding = padding;
        self
    }

    /// Sets the delimiters of the repeated region inside markup slots.
    pub fn with_region_markers(mut self, markers: RegionMarkers) -> Self {
        self.config.markers = markers;
        self
    }

    /// Supplies TrueType programs for text runs using custom fonts.
    pub fn with_font_provider(mut self, fonts: Arc<dyn FontProvider>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.config.compress_output = compress;
        self
    }

    /// Consumes the builder and creates the `Assembler`.
    /// Fails if the configuration is invalid.
    pub fn build(self) -> Result<Assembler<E>, AssemblyError> {
        self.config.validate()?;
        let fonts = self
            .fonts
            .unwrap_or_else(|| Arc::new(InMemoryFontProvider::new()));
        log::debug!(
            "Building assembler (timeout: {:?}, fonts: {}).",
            self.config.render_timeout,
            fonts.name()
        );
        Ok(Assembler::new(self.engine, self.config, fonts))
    }
}

impl<E: RenderEngine> Assembler<E> {
    pub fn builder(engine: E) -> AssemblerBuilder<E> {
        AssemblerBuilder::new(engine)
    }
}
