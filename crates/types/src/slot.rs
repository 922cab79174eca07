use crate::color::Rgb;
use crate::units::Mm;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a slot is placed on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPosition {
    Header,
    Footer,
}

impl fmt::Display for SlotPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotPosition::Header => f.write_str("header"),
            SlotPosition::Footer => f.write_str("footer"),
        }
    }
}

/// Header or footer content attached to a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Slot {
    /// Markup rendered by the rendering engine, one copy per page.
    Markup(MarkupSlot),
    /// Plain text runs drawn straight into the page content.
    Text(TextSlot),
}

impl Slot {
    pub fn markup(markup: impl Into<String>) -> Self {
        Slot::Markup(MarkupSlot {
            markup: markup.into(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Markup(_) => "markup",
            Slot::Text(_) => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupSlot {
    /// Full markup document; `{page}` and `{pages}` inside its content region
    /// are substituted per page.
    pub markup: String,
}

/// Up to three text runs sharing one baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<TextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<TextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<TextRun>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextSlot {
    /// The runs that are present, tagged with their alignment.
    pub fn runs(&self) -> impl Iterator<Item = (TextAlign, &TextRun)> {
        [
            (TextAlign::Left, self.left.as_ref()),
            (TextAlign::Center, self.center.as_ref()),
            (TextAlign::Right, self.right.as_ref()),
        ]
        .into_iter()
        .filter_map(|(align, run)| run.map(|run| (align, run)))
    }

    /// Size of the tallest run, or `None` if the slot has no runs.
    pub fn tallest_run(&self) -> Option<Mm> {
        self.runs().map(|(_, run)| run.size).reduce(Mm::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub font: FontRef,
    /// May contain `{page}` and `{pages}` placeholders.
    pub text: String,
    pub size: Mm,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub color: Rgb,
}

impl TextRun {
    pub fn new(font: FontRef, text: impl Into<String>, size: Mm) -> Self {
        Self {
            font,
            text: text.into(),
            size,
            underline: false,
            color: Rgb::BLACK,
        }
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Reference to the font a text run is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRef {
    /// One of the PDF base-14 fonts; never embedded.
    Standard(StandardFont),
    /// A TrueType font looked up by name through a font provider.
    Custom(String),
}

impl Default for FontRef {
    fn default() -> Self {
        FontRef::Standard(StandardFont::Helvetica)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    Courier,
}

impl StandardFont {
    /// The PDF `BaseFont` name.
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
        }
    }
}
