pub mod font;
pub mod render;

pub use font::{FontError, FontProvider, InMemoryFontProvider, SharedFontData};
pub use render::{RenderEngine, RenderError, RenderSession};
