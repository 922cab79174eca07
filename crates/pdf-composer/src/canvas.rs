use crate::error::ComposerError;
use crate::fonts::{EmbeddedFont, encode_win_ansi};
use crate::page::{append_isolated_content, real, register_resources};
use crate::transform::Transform;
use folio_types::{Pt, Rgb};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, StringFormat};

/// Underline geometry as fractions of the font size.
const UNDERLINE_OFFSET: f64 = 0.1;
const UNDERLINE_THICKNESS: f64 = 0.05;

/// One run of text placed at a baseline origin.
#[derive(Debug, Clone)]
pub struct TextDraw<'a> {
    pub text: &'a str,
    pub x: Pt,
    pub y: Pt,
    pub size: Pt,
    pub underline: bool,
    pub color: Rgb,
}

/// Drawing operations collected for a single page.
///
/// Nothing touches the document until [`finish`](Self::finish), which
/// registers the referenced resources and appends the operations as one
/// isolated content stream.
#[derive(Debug)]
pub struct PageCanvas {
    page_id: ObjectId,
    operations: Vec<Operation>,
    fonts: Vec<(String, ObjectId)>,
    xobjects: Vec<(String, ObjectId)>,
}

impl PageCanvas {
    pub fn new(page_id: ObjectId) -> Self {
        Self {
            page_id,
            operations: Vec::new(),
            fonts: Vec::new(),
            xobjects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn draw_text(&mut self, font: &EmbeddedFont, draw: &TextDraw<'_>) {
        let [r, g, b] = draw.color.components();
        let name = font.resource_name.as_bytes().to_vec();

        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        self.operations.push(Operation::new("BT", vec![]));
        self.operations
            .push(Operation::new("Tf", vec![Object::Name(name), real(draw.size)]));
        self.operations
            .push(Operation::new("Td", vec![real(draw.x), real(draw.y)]));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(draw.text), StringFormat::Literal)],
        ));
        self.operations.push(Operation::new("ET", vec![]));

        if draw.underline {
            let width = font.font.text_width(draw.text, draw.size);
            let thickness = draw.size * UNDERLINE_THICKNESS;
            let top = draw.y - draw.size * UNDERLINE_OFFSET;
            self.operations.push(Operation::new(
                "re",
                vec![real(draw.x), real(top - thickness), real(width), real(thickness)],
            ));
            self.operations.push(Operation::new("f", vec![]));
        }
        self.operations.push(Operation::new("Q", vec![]));

        self.use_font(font);
    }

    /// Paints a form XObject under `transform`.
    pub fn draw_object(&mut self, name: &str, form_id: ObjectId, transform: Transform) {
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new("cm", transform.operands()));
        self.operations
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.operations.push(Operation::new("Q", vec![]));
        self.xobjects.push((name.to_string(), form_id));
    }

    /// Writes the collected drawing into the page. An empty canvas leaves
    /// the page untouched.
    pub fn finish(self, doc: &mut Document) -> Result<(), ComposerError> {
        if self.is_empty() {
            return Ok(());
        }
        if !self.fonts.is_empty() {
            register_resources(doc, self.page_id, b"Font", self.fonts)?;
        }
        if !self.xobjects.is_empty() {
            register_resources(doc, self.page_id, b"XObject", self.xobjects)?;
        }
        let content = Content {
            operations: self.operations,
        }
        .encode()?;
        append_isolated_content(doc, self.page_id, content)
    }

    fn use_font(&mut self, font: &EmbeddedFont) {
        if !self.fonts.iter().any(|(name, _)| *name == font.resource_name) {
            self.fonts.push((font.resource_name.clone(), font.id));
        }
    }
}
