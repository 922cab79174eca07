//! Drawing header and footer slots onto rendered pages.

use crate::canvas::{PageCanvas, TextDraw};
use crate::copy::ObjectCopier;
use crate::error::ComposerError;
use crate::fonts::DocumentFonts;
use crate::page::{PageBox, media_box, page_ids};
use crate::transform::{Transform, flip_y};
use folio_template::substitute_page_tokens;
use folio_traits::FontProvider;
use folio_types::{Margin, Pt, SlotPosition, TextAlign, TextSlot};
use lopdf::Document;

/// Page numbers of the pages a slot is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumbering {
    /// Global number of the first page of the document being decorated.
    pub first_page: usize,
    /// Page count of the whole assembled output.
    pub total_pages: usize,
}

fn form_name(position: SlotPosition) -> &'static str {
    match position {
        SlotPosition::Header => "FolioHeader",
        SlotPosition::Footer => "FolioFooter",
    }
}

/// Where a rendered slot page lands on a base page.
///
/// The slot page is aligned to the left margin. A footer sits on the bottom
/// margin; a header hangs from the top margin. Slot pages wider than the
/// band between the side margins are scaled down uniformly.
pub fn band_transform(
    page: &PageBox,
    slot: &PageBox,
    margin: &Margin,
    position: SlotPosition,
) -> Transform {
    let band_width = page.width - margin.left.to_pt() - margin.right.to_pt();
    let scale = if slot.width > band_width && slot.width.value() > 0.0 {
        (band_width.value() / slot.width.value()).max(0.0)
    } else {
        1.0
    };
    let height = slot.height * scale;

    let x = page.x + margin.left.to_pt();
    let y = match position {
        SlotPosition::Footer => page.y + margin.bottom.to_pt(),
        SlotPosition::Header => page.y + flip_y(margin.top.to_pt() + height, page.height),
    };

    Transform::translate(Pt::ZERO - slot.x, Pt::ZERO - slot.y)
        .then(Transform::scale(scale, scale))
        .then(Transform::translate(x, y))
}

/// Overlays page `i` of `slot` onto page `i` of `base`.
///
/// Each slot page becomes a form XObject in `base`, drawn above the existing
/// content. Extra slot pages are ignored.
///
/// # Errors
///
/// [`ComposerError::PageCountMismatch`] if `slot` has fewer pages than
/// `base`; `base` is left unmodified in that case.
pub fn overlay_rendered_slot(
    base: &mut Document,
    slot: &Document,
    margin: &Margin,
    position: SlotPosition,
) -> Result<(), ComposerError> {
    let base_pages = page_ids(base);
    let slot_pages = page_ids(slot);
    if slot_pages.len() < base_pages.len() {
        return Err(ComposerError::PageCountMismatch {
            base_pages: base_pages.len(),
            slot_pages: slot_pages.len(),
        });
    }
    if slot_pages.len() > base_pages.len() {
        log::warn!(
            "{} document has {} pages for {} base pages; ignoring the surplus",
            position,
            slot_pages.len(),
            base_pages.len()
        );
    }

    let name = form_name(position);
    let mut copier = ObjectCopier::new(slot, base);
    for (base_page, slot_page) in base_pages.into_iter().zip(slot_pages) {
        let page_box = media_box(copier.target(), base_page)?;
        let (form_id, slot_box) = copier.embed_page_as_form(slot_page)?;
        let transform = band_transform(&page_box, &slot_box, margin, position);

        let mut canvas = PageCanvas::new(base_page);
        canvas.draw_object(name, form_id, transform);
        canvas.finish(copier.target_mut())?;
    }
    Ok(())
}

/// Draws a text slot on every page of `base`.
///
/// All runs share the baseline at the bottom margin. `{page}` and `{pages}`
/// in each run are substituted with the global page number and total.
///
/// # Errors
///
/// Text slots only support the footer position; a header yields
/// [`ComposerError::UnsupportedPlacement`]. Font lookup failures are
/// propagated.
pub fn overlay_text_slot(
    base: &mut Document,
    slot: &TextSlot,
    margin: &Margin,
    position: SlotPosition,
    numbering: PageNumbering,
    fonts: &dyn FontProvider,
) -> Result<(), ComposerError> {
    if position != SlotPosition::Footer {
        return Err(ComposerError::UnsupportedPlacement(position));
    }
    if slot.runs().next().is_none() {
        return Ok(());
    }

    let mut document_fonts = DocumentFonts::new(fonts);
    for (offset, page_id) in page_ids(base).into_iter().enumerate() {
        let page_box = media_box(base, page_id)?;
        let page_number = numbering.first_page + offset;
        let left = page_box.x + margin.left.to_pt();
        let right = page_box.x + page_box.width - margin.right.to_pt();
        let baseline = page_box.y + margin.bottom.to_pt();

        let mut canvas = PageCanvas::new(page_id);
        for (align, run) in slot.runs() {
            let text = substitute_page_tokens(&run.text, page_number, numbering.total_pages);
            let size = run.size.to_pt();
            let font = document_fonts.get(base, &run.font)?;
            let width = font.font.text_width(&text, size);
            let x = match align {
                TextAlign::Left => left,
                TextAlign::Center => left + ((right - left) - width) / 2.0,
                TextAlign::Right => right - width,
            };
            canvas.draw_text(
                font,
                &TextDraw {
                    text: &text,
                    x,
                    y: baseline,
                    size,
                    underline: run.underline,
                    color: run.color,
                },
            );
        }
        canvas.finish(base)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::page_count;
    use crate::test_support::{create_dummy_pdf, page_operations, page_text};
    use folio_traits::InMemoryFontProvider;
    use folio_types::{FontRef, Mm, Rgb, TextRun};
    use lopdf::Object;

    fn operand(op: &lopdf::content::Operation, index: usize) -> f64 {
        match &op.operands[index] {
            Object::Real(r) => f64::from(*r),
            Object::Integer(i) => *i as f64,
            other => panic!("not a number: {other:?}"),
        }
    }

    fn cm_operands(doc: &Document, page_index: usize) -> Vec<f64> {
        let ops = page_operations(doc, page_index);
        let cm = ops.iter().rev().find(|op| op.operator == "cm").expect("no cm operator");
        (0..6).map(|i| operand(cm, i)).collect()
    }

    fn footer_slot(text: &str) -> TextSlot {
        TextSlot {
            left: None,
            center: None,
            right: Some(TextRun::new(FontRef::default(), text, Mm(4.2))),
        }
    }

    #[test]
    fn rendered_slot_with_too_few_pages_is_rejected() {
        let mut base = create_dummy_pdf(3, "Body", (612, 792));
        let slot = create_dummy_pdf(2, "Footer", (612, 100));
        let before = base.objects.len();

        let err = overlay_rendered_slot(&mut base, &slot, &Margin::zero(), SlotPosition::Footer)
            .unwrap_err();

        assert!(matches!(
            err,
            ComposerError::PageCountMismatch { base_pages: 3, slot_pages: 2 }
        ));
        assert_eq!(base.objects.len(), before);
    }

    #[test]
    fn rendered_footer_is_drawn_on_every_page() {
        let mut base = create_dummy_pdf(3, "Body", (612, 792));
        let slot = create_dummy_pdf(4, "Footer", (612, 100));

        overlay_rendered_slot(&mut base, &slot, &Margin::zero(), SlotPosition::Footer).unwrap();

        assert_eq!(page_count(&base), 3);
        for index in 0..3 {
            let text = page_text(&base, index);
            assert!(text.contains(&format!("Body {}", index + 1)));
            assert!(text.contains("/FolioFooter Do"));
        }
    }

    #[test]
    fn footer_sits_on_the_bottom_margin() {
        let mut base = create_dummy_pdf(1, "Body", (612, 792));
        let slot = create_dummy_pdf(1, "Footer", (540, 72));
        let margin = Margin::from_mm(0.0, 12.7, 25.4, 12.7);

        overlay_rendered_slot(&mut base, &slot, &margin, SlotPosition::Footer).unwrap();

        let cm = cm_operands(&base, 0);
        assert!((cm[0] - 1.0).abs() < 1e-4);
        assert!((cm[4] - 36.0).abs() < 1e-3);
        assert!((cm[5] - 72.0).abs() < 1e-3);
    }

    #[test]
    fn header_hangs_from_the_top_margin() {
        let mut base = create_dummy_pdf(1, "Body", (612, 792));
        let slot = create_dummy_pdf(1, "Header", (612, 72));
        let margin = Margin::from_mm(25.4, 0.0, 0.0, 0.0);

        overlay_rendered_slot(&mut base, &slot, &margin, SlotPosition::Header).unwrap();

        // 792 - 72 (top margin) - 72 (slot height)
        let cm = cm_operands(&base, 0);
        assert!((cm[4] - 0.0).abs() < 1e-3);
        assert!((cm[5] - 648.0).abs() < 1e-3);
        assert!(page_text(&base, 0).contains("/FolioHeader Do"));
    }

    #[test]
    fn wide_slot_pages_are_scaled_into_the_band() {
        let page = PageBox::new(Pt(0.0), Pt(0.0), Pt(600.0), Pt(800.0));
        let slot = PageBox::new(Pt(0.0), Pt(0.0), Pt(1200.0), Pt(100.0));

        let transform = band_transform(&page, &slot, &Margin::zero(), SlotPosition::Header);

        assert_eq!(transform.a, 0.5);
        assert_eq!(transform.d, 0.5);
        assert_eq!(transform.apply(Pt(0.0), Pt(100.0)), (Pt(0.0), Pt(800.0)));
    }

    #[test]
    fn slot_origin_offset_is_cancelled() {
        let page = PageBox::new(Pt(0.0), Pt(0.0), Pt(600.0), Pt(800.0));
        let slot = PageBox::new(Pt(10.0), Pt(20.0), Pt(100.0), Pt(50.0));

        let transform = band_transform(&page, &slot, &Margin::zero(), SlotPosition::Footer);

        assert_eq!(transform.apply(Pt(10.0), Pt(20.0)), (Pt(0.0), Pt(0.0)));
    }

    #[test]
    fn text_slot_rejects_header_placement() {
        let mut base = create_dummy_pdf(2, "Body", (612, 792));
        let fonts = InMemoryFontProvider::new();
        let numbering = PageNumbering { first_page: 1, total_pages: 2 };

        let err = overlay_text_slot(
            &mut base,
            &footer_slot("x"),
            &Margin::zero(),
            SlotPosition::Header,
            numbering,
            &fonts,
        )
        .unwrap_err();

        assert!(matches!(err, ComposerError::UnsupportedPlacement(SlotPosition::Header)));
    }

    #[test]
    fn text_footer_substitutes_global_page_numbers() {
        let mut base = create_dummy_pdf(3, "Body", (612, 792));
        let fonts = InMemoryFontProvider::new();
        let numbering = PageNumbering { first_page: 4, total_pages: 9 };

        overlay_text_slot(
            &mut base,
            &footer_slot("Page {page} of {pages}"),
            &Margin::from_mm(10.0, 10.0, 10.0, 10.0),
            SlotPosition::Footer,
            numbering,
            &fonts,
        )
        .unwrap();

        for (index, page) in (4..=6).enumerate() {
            let text = page_text(&base, index);
            assert!(text.contains(&format!("(Page {page} of 9) Tj")), "{text}");
            assert!(text.contains("/FolioF1"));
        }
    }

    #[test]
    fn right_run_ends_at_the_right_margin() {
        let mut base = create_dummy_pdf(1, "Body", (612, 792));
        let fonts = InMemoryFontProvider::new();
        let margin = Margin::from_mm(0.0, 25.4, 12.7, 0.0);
        let numbering = PageNumbering { first_page: 1, total_pages: 1 };

        overlay_text_slot(
            &mut base,
            &footer_slot("Hello"),
            &margin,
            SlotPosition::Footer,
            numbering,
            &fonts,
        )
        .unwrap();

        let ops = page_operations(&base, 0);
        // The last Td belongs to the footer run, not the body text.
        let td = ops.iter().rev().find(|op| op.operator == "Td").expect("no Td operator");
        let size = Mm(4.2).to_pt().value();
        let width = 2.278 * size;
        assert!((operand(td, 0) - (612.0 - 72.0 - width)).abs() < 1e-2);
        assert!((operand(td, 1) - 36.0).abs() < 1e-3);
    }

    #[test]
    fn underline_and_color_are_drawn() {
        let mut base = create_dummy_pdf(1, "Body", (612, 792));
        let fonts = InMemoryFontProvider::new();
        let slot = TextSlot {
            left: Some(
                TextRun::new(FontRef::default(), "Confidential", Mm(5.0))
                    .underlined()
                    .with_color(Rgb::new(255, 0, 0)),
            ),
            center: None,
            right: None,
        };
        let numbering = PageNumbering { first_page: 1, total_pages: 1 };

        overlay_text_slot(
            &mut base,
            &slot,
            &Margin::zero(),
            SlotPosition::Footer,
            numbering,
            &fonts,
        )
        .unwrap();

        let ops = page_operations(&base, 0);
        let rg = ops.iter().find(|op| op.operator == "rg").expect("no rg operator");
        assert_eq!(operand(rg, 0), 1.0);
        assert_eq!(operand(rg, 1), 0.0);
        assert!(ops.iter().any(|op| op.operator == "re"));
        assert!(ops.iter().any(|op| op.operator == "f"));
    }

    #[test]
    fn empty_text_slot_leaves_pages_untouched() {
        let mut base = create_dummy_pdf(2, "Body", (612, 792));
        let before = base.objects.len();
        let fonts = InMemoryFontProvider::new();
        let numbering = PageNumbering { first_page: 1, total_pages: 2 };

        overlay_text_slot(
            &mut base,
            &TextSlot::default(),
            &Margin::zero(),
            SlotPosition::Footer,
            numbering,
            &fonts,
        )
        .unwrap();

        assert_eq!(base.objects.len(), before);
    }

    #[test]
    fn missing_custom_font_fails_the_overlay() {
        let mut base = create_dummy_pdf(1, "Body", (612, 792));
        let fonts = InMemoryFontProvider::new();
        let slot = TextSlot {
            left: Some(TextRun::new(FontRef::Custom("Inter".to_string()), "x", Mm(4.0))),
            center: None,
            right: None,
        };
        let numbering = PageNumbering { first_page: 1, total_pages: 1 };

        let err = overlay_text_slot(
            &mut base,
            &slot,
            &Margin::zero(),
            SlotPosition::Footer,
            numbering,
            &fonts,
        )
        .unwrap_err();

        assert!(matches!(err, ComposerError::Font(_)));
    }
}
