//! Fonts for directly drawn text.
//!
//! Text is written as single-byte WinAnsi strings. Standard fonts are
//! referenced by name and measured with their AFM widths; custom fonts are
//! TrueType programs from a [`FontProvider`], embedded whole.

use crate::error::ComposerError;
use folio_traits::{FontError, FontProvider, SharedFontData};
use folio_types::{FontRef, Pt, StandardFont};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

const FIRST_CHAR: u8 = 32;
const GLYPH_SLOTS: usize = 256 - FIRST_CHAR as usize;

/// Printable ASCII widths (32..=126) in thousandths of an em.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, //
    333, 333, 584, 584, 584, 611, 975, //
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, //
    333, 278, 333, 584, 556, 333, //
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, //
    389, 280, 389, 584, //
];

const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, //
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, //
    278, 278, 564, 564, 564, 444, 921, //
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, //
    333, 278, 333, 469, 500, 333, //
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, //
    480, 200, 480, 541, //
];

/// WinAnsi code points that differ from Latin-1.
const WIN_ANSI_EXTRAS: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Encodes `text` as WinAnsi bytes. Characters outside the encoding become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{A0}'..='\u{FF}' => ch as u8,
            _ => WIN_ANSI_EXTRAS
                .iter()
                .find(|(_, extra)| *extra == ch)
                .map_or(b'?', |(byte, _)| *byte),
        })
        .collect()
}

/// The character a WinAnsi byte stands for, if the encoding defines one.
fn win_ansi_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        0x80..=0x9F => WIN_ANSI_EXTRAS
            .iter()
            .find(|(code, _)| *code == byte)
            .map(|(_, ch)| *ch),
        _ => None,
    }
}

/// Glyph widths for WinAnsi bytes 32..=255, in thousandths of an em.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    widths: Vec<u16>,
}

impl FontMetrics {
    fn standard(font: StandardFont) -> Self {
        let (ascii, fallback): (Option<&[u16; 95]>, u16) = match font {
            StandardFont::Helvetica => (Some(&HELVETICA_ASCII), 556),
            StandardFont::HelveticaBold => (Some(&HELVETICA_BOLD_ASCII), 556),
            StandardFont::TimesRoman => (Some(&TIMES_ROMAN_ASCII), 500),
            StandardFont::Courier => (None, 600),
        };
        let mut widths = vec![fallback; GLYPH_SLOTS];
        if let Some(ascii) = ascii {
            widths[..ascii.len()].copy_from_slice(ascii);
            // Non-breaking space shares the space glyph.
            widths[(0xA0 - FIRST_CHAR) as usize] = ascii[0];
        }
        Self { widths }
    }

    fn width_of(&self, byte: u8) -> u16 {
        byte.checked_sub(FIRST_CHAR)
            .and_then(|slot| self.widths.get(slot as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Advance width of `text` when set at `size`.
    pub fn text_width(&self, text: &str, size: Pt) -> Pt {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|byte| u32::from(self.width_of(byte)))
            .sum();
        size * (f64::from(units) / 1000.0)
    }
}

#[derive(Debug, Clone)]
struct TrueTypeProgram {
    postscript_name: String,
    data: SharedFontData,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    bbox: [i64; 4],
}

#[derive(Debug, Clone)]
enum FontProgram {
    Standard(StandardFont),
    TrueType(TrueTypeProgram),
}

/// A font resolved to its metrics and its embeddable program.
#[derive(Debug, Clone)]
pub struct LoadedFont {
    program: FontProgram,
    metrics: FontMetrics,
}

impl LoadedFont {
    pub fn standard(font: StandardFont) -> Self {
        Self {
            program: FontProgram::Standard(font),
            metrics: FontMetrics::standard(font),
        }
    }

    /// Resolves `font`, loading custom fonts through `provider`.
    pub fn resolve(font: &FontRef, provider: &dyn FontProvider) -> Result<Self, ComposerError> {
        match font {
            FontRef::Standard(standard) => Ok(Self::standard(*standard)),
            FontRef::Custom(name) => {
                log::debug!("Loading custom font '{}' from {}", name, provider.name());
                Self::truetype(name, provider.load(name)?)
            }
        }
    }

    /// Parses a TrueType program and derives WinAnsi widths from it.
    pub fn truetype(name: &str, data: SharedFontData) -> Result<Self, ComposerError> {
        let face =
            ttf_parser::Face::parse(data.as_slice(), 0).map_err(|e| FontError::InvalidFormat {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let units_per_em = f64::from(face.units_per_em().max(1));
        let scale = |value: f64| (value * 1000.0 / units_per_em).round();
        let missing = face.glyph_hor_advance(ttf_parser::GlyphId(0)).unwrap_or(0);

        let widths = (FIRST_CHAR..=u8::MAX)
            .map(|byte| {
                let advance = win_ansi_char(byte)
                    .and_then(|ch| face.glyph_index(ch))
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .unwrap_or(missing);
                scale(f64::from(advance)) as u16
            })
            .collect();

        let bbox = face.global_bounding_box();
        let ascent = scale(f64::from(face.ascender())) as i64;
        let program = TrueTypeProgram {
            postscript_name: postscript_name(name),
            ascent,
            descent: scale(f64::from(face.descender())) as i64,
            cap_height: face
                .capital_height()
                .map_or(ascent, |height| scale(f64::from(height)) as i64),
            bbox: [
                scale(f64::from(bbox.x_min)) as i64,
                scale(f64::from(bbox.y_min)) as i64,
                scale(f64::from(bbox.x_max)) as i64,
                scale(f64::from(bbox.y_max)) as i64,
            ],
            data: data.clone(),
        };

        Ok(Self {
            program: FontProgram::TrueType(program),
            metrics: FontMetrics { widths },
        })
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn text_width(&self, text: &str, size: Pt) -> Pt {
        self.metrics.text_width(text, size)
    }

    /// Writes the font dictionary (and any embedded program) into `doc`.
    pub(crate) fn embed(&self, doc: &mut Document) -> ObjectId {
        match &self.program {
            FontProgram::Standard(font) => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            }),
            FontProgram::TrueType(program) => {
                let file_id = doc.add_object(Stream::new(
                    dictionary! { "Length1" => program.data.len() as i64 },
                    program.data.to_vec(),
                ));
                let [x_min, y_min, x_max, y_max] = program.bbox;
                let descriptor_id = doc.add_object(dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => Object::Name(program.postscript_name.clone().into_bytes()),
                    "Flags" => 32,
                    "FontBBox" => Object::Array(vec![
                        Object::Integer(x_min),
                        Object::Integer(y_min),
                        Object::Integer(x_max),
                        Object::Integer(y_max),
                    ]),
                    "ItalicAngle" => 0,
                    "Ascent" => program.ascent,
                    "Descent" => program.descent,
                    "CapHeight" => program.cap_height,
                    "StemV" => 80,
                    "FontFile2" => file_id,
                });
                let widths: Vec<Object> = self
                    .metrics
                    .widths
                    .iter()
                    .map(|width| Object::Integer(i64::from(*width)))
                    .collect();
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "TrueType",
                    "BaseFont" => Object::Name(program.postscript_name.clone().into_bytes()),
                    "FirstChar" => i64::from(FIRST_CHAR),
                    "LastChar" => 255,
                    "Widths" => widths,
                    "Encoding" => "WinAnsiEncoding",
                    "FontDescriptor" => descriptor_id,
                })
            }
        }
    }
}

/// PostScript names may not contain spaces or delimiters.
fn postscript_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
        .collect();
    if cleaned.is_empty() {
        "FolioCustom".to_string()
    } else {
        cleaned
    }
}

/// A font written into one document, with the resource name pages use for it.
#[derive(Debug)]
pub struct EmbeddedFont {
    pub resource_name: String,
    pub id: ObjectId,
    pub font: LoadedFont,
}

/// Per-document font registry.
///
/// Each distinct [`FontRef`] is loaded and written into the document once,
/// however many pages draw with it.
#[derive(Debug)]
pub struct DocumentFonts<'p> {
    provider: &'p dyn FontProvider,
    embedded: HashMap<FontRef, EmbeddedFont>,
}

impl<'p> DocumentFonts<'p> {
    pub fn new(provider: &'p dyn FontProvider) -> Self {
        Self {
            provider,
            embedded: HashMap::new(),
        }
    }

    pub fn get(
        &mut self,
        doc: &mut Document,
        font: &FontRef,
    ) -> Result<&EmbeddedFont, ComposerError> {
        let next_index = self.embedded.len() + 1;
        match self.embedded.entry(font.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let loaded = LoadedFont::resolve(font, self.provider)?;
                let id = loaded.embed(doc);
                Ok(entry.insert(EmbeddedFont {
                    resource_name: format!("FolioF{next_index}"),
                    id,
                    font: loaded,
                }))
            }
        }
    }
}
