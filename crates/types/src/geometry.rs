use crate::units::{Mm, Px};
use serde::{Deserialize, Serialize};

/// Physical size of a page (or of a slot rendered as its own page).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: Mm,
    pub height: Mm,
}

impl PageSize {
    pub fn new(width: Mm, height: Mm) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn a4_portrait() -> Self {
        Self::new(Mm(210.0), Mm(297.0))
    }

    pub fn a4_landscape() -> Self {
        Self::new(Mm(297.0), Mm(210.0))
    }

    /// Width left for content once the horizontal margins are taken out.
    pub fn content_width(&self, margin: &Margin) -> Mm {
        self.width - margin.left - margin.right
    }

    /// Height that keeps this size's aspect ratio at the given width.
    pub fn relative_height(&self, width: Mm) -> Mm {
        if self.width.is_zero() {
            return Mm::ZERO;
        }
        Mm(width.value() * self.height.value() / self.width.value())
    }

    /// Width that keeps this size's aspect ratio at the given height.
    pub fn relative_width(&self, height: Mm) -> Mm {
        if self.height.is_zero() {
            return Mm::ZERO;
        }
        Mm(height.value() * self.width.value() / self.height.value())
    }
}

/// Non-printable border around page content.
///
/// Margins only ever grow during assembly: the band reserved for a header or
/// footer is added on top of the caller's margin before content is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: Mm,
    pub right: Mm,
    pub bottom: Mm,
    pub left: Mm,
}

impl Margin {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_mm(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: Mm(top),
            right: Mm(right),
            bottom: Mm(bottom),
            left: Mm(left),
        }
    }

    pub fn grow_top(self, by: Mm) -> Self {
        Self {
            top: self.top + by,
            ..self
        }
    }

    pub fn grow_bottom(self, by: Mm) -> Self {
        Self {
            bottom: self.bottom + by,
            ..self
        }
    }
}

/// Rendering-engine viewport, in whole device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: Px,
    pub height: Px,
}

impl Viewport {
    pub fn new(width: Px, height: Px) -> Self {
        Self {
            width: width.floor(),
            height: height.floor(),
        }
    }
}

/// Natural size of rendered content, as measured by the rendering engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: Px,
    pub height: Px,
}

impl BoundingBox {
    pub fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}
