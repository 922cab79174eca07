// src/error.rs
use folio_pdf_composer::ComposerError;
use folio_template::TemplateError;
use folio_traits::{FontError, RenderError};
use folio_types::SlotPosition;
use std::fmt;
use thiserror::Error;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening or closing the rendering session.
    Session,
    Measuring,
    Compositing,
    Concatenating,
    /// Single-document pass-through rendering.
    Rendering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Session => "session",
            Stage::Measuring => "measuring",
            Stage::Compositing => "compositing",
            Stage::Concatenating => "concatenating",
            Stage::Rendering => "rendering",
        };
        f.write_str(name)
    }
}

/// Where in a request a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultLocation {
    pub stage: Stage,
    /// Zero-based index into the fragments passed to `assemble`.
    pub fragment: Option<usize>,
    pub slot: Option<SlotPosition>,
}

impl FaultLocation {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage,
            fragment: None,
            slot: None,
        }
    }

    pub fn fragment(stage: Stage, fragment: usize) -> Self {
        Self {
            stage,
            fragment: Some(fragment),
            slot: None,
        }
    }

    pub fn slot(stage: Stage, fragment: usize, slot: SlotPosition) -> Self {
        Self {
            stage,
            fragment: Some(fragment),
            slot: Some(slot),
        }
    }
}

impl fmt::Display for FaultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "while {}", self.stage)?;
        if let Some(fragment) = self.fragment {
            write!(f, " fragment #{fragment}")?;
        }
        if let Some(slot) = self.slot {
            write!(f, " ({slot})")?;
        }
        Ok(())
    }
}

/// A failure reported by one of the collaborators assembly builds on.
#[derive(Error, Debug)]
pub enum CollaboratorFailure {
    #[error("rendering engine: {0}")]
    Render(#[from] RenderError),

    #[error("PDF layer: {0}")]
    Document(ComposerError),

    #[error("font layer: {0}")]
    Font(#[from] FontError),
}

impl From<ComposerError> for CollaboratorFailure {
    fn from(err: ComposerError) -> Self {
        match err {
            ComposerError::Font(font) => CollaboratorFailure::Font(font),
            other => CollaboratorFailure::Document(other),
        }
    }
}

/// A comprehensive error type for document assembly.
///
/// Assembly is all-or-nothing: any of these aborts the whole request and no
/// partial output is returned.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Malformed slot markup {location}: {source}")]
    MalformedContent {
        location: FaultLocation,
        source: TemplateError,
    },

    #[error("Text slots can only be placed as a footer, found one as a header {location}")]
    UnsupportedSlotPlacement { location: FaultLocation },

    #[error(
        "Slot rendered {slot_pages} pages for {base_pages} content pages {location}"
    )]
    PageCountMismatch {
        location: FaultLocation,
        base_pages: usize,
        slot_pages: usize,
    },

    #[error("Collaborator failed {location}: {source}")]
    Collaborator {
        location: FaultLocation,
        source: CollaboratorFailure,
    },

    #[error("No fragments to assemble")]
    NoFragments,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AssemblyError {
    pub(crate) fn collaborator(
        location: FaultLocation,
        source: impl Into<CollaboratorFailure>,
    ) -> Self {
        AssemblyError::Collaborator {
            location,
            source: source.into(),
        }
    }

    /// Lifts a PDF-layer error, keeping the overlay preconditions distinct
    /// from plain collaborator failures.
    pub(crate) fn from_composer(location: FaultLocation, err: ComposerError) -> Self {
        match err {
            ComposerError::PageCountMismatch {
                base_pages,
                slot_pages,
            } => AssemblyError::PageCountMismatch {
                location,
                base_pages,
                slot_pages,
            },
            ComposerError::UnsupportedPlacement(_) => {
                AssemblyError::UnsupportedSlotPlacement { location }
            }
            other => AssemblyError::collaborator(location, other),
        }
    }

    pub fn location(&self) -> Option<&FaultLocation> {
        match self {
            AssemblyError::MalformedContent { location, .. }
            | AssemblyError::UnsupportedSlotPlacement { location }
            | AssemblyError::PageCountMismatch { location, .. }
            | AssemblyError::Collaborator { location, .. } => Some(location),
            AssemblyError::NoFragments | AssemblyError::Config(_) => None,
        }
    }

    /// Index of the fragment the failure belongs to, if any.
    pub fn fragment_index(&self) -> Option<usize> {
        self.location().and_then(|location| location.fragment)
    }
}
