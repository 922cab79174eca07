// src/pipeline/assembler.rs
use super::config::AssemblyConfig;
use super::content::render_content;
use super::session::SessionGuard;
use super::slot_size::calculate_slot_size;
use crate::error::{AssemblyError, FaultLocation, Stage};
use folio_pdf_composer::{
    Document, PageNumbering, concatenate, load_document, overlay_rendered_slot, overlay_text_slot,
    page_count, save_document,
};
use folio_template::PageNumberPropagator;
use folio_traits::{FontProvider, RenderEngine};
use folio_types::{DocumentFragment, Margin, PageSize, PageStream, PdfContent, Slot, SlotPosition};
use log::{debug, info};
use std::sync::Arc;

/// Global page numbering fixed between the two passes.
///
/// Built once from the measured page counts and only read afterwards, so
/// every slot in the second pass sees the same total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTotals {
    total_pages: usize,
    starts: Vec<usize>,
}

impl PageTotals {
    /// Numbers pages consecutively from 1 across fragments of the given sizes.
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        let mut next = 1;
        let starts = counts
            .into_iter()
            .map(|count| {
                let start = next;
                next += count;
                start
            })
            .collect();
        Self {
            total_pages: next - 1,
            starts,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Global number of the first page of fragment `index`.
    pub fn start_of(&self, index: usize) -> Option<usize> {
        self.starts.get(index).copied()
    }

    /// First page numbers of all fragments, in order.
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }
}

/// The assembled document, handed over to the caller.
#[derive(Debug, Clone)]
pub struct AssembledOutput {
    stream: PageStream,
    page_count: usize,
}

impl AssembledOutput {
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.stream.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.stream.into_bytes()
    }

    pub fn into_stream(self) -> PageStream {
        self.stream
    }
}

/// A slot together with the band it was measured to need.
#[derive(Debug)]
struct SizedSlot<'a> {
    position: SlotPosition,
    slot: &'a Slot,
    size: PageSize,
}

/// Output of the measuring pass for one fragment.
#[derive(Debug)]
struct RenderedFragment<'a> {
    index: usize,
    margin: Margin,
    main: Document,
    page_count: usize,
    slots: Vec<SizedSlot<'a>>,
}

/// Assembles document fragments into one paginated PDF.
///
/// Each call to [`assemble`](Self::assemble) or
/// [`render_single`](Self::render_single) opens its own rendering session,
/// so one assembler may serve concurrent requests.
pub struct Assembler<E: RenderEngine> {
    engine: E,
    config: AssemblyConfig,
    fonts: Arc<dyn FontProvider>,
    propagator: PageNumberPropagator,
}

impl<E: RenderEngine> Assembler<E> {
    pub(crate) fn new(engine: E, config: AssemblyConfig, fonts: Arc<dyn FontProvider>) -> Self {
        let propagator = PageNumberPropagator::new(config.markers.clone());
        Self {
            engine,
            config,
            fonts,
            propagator,
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Assembles `fragments`, in order, into one document.
    ///
    /// Pages are numbered consecutively across fragments, so a footer on the
    /// first page of fragment two continues where fragment one stopped.
    /// The rendering session is closed on every exit path; when both the
    /// pipeline and the close fail, the pipeline error is returned.
    pub async fn assemble(
        &self,
        fragments: &[DocumentFragment],
    ) -> Result<AssembledOutput, AssemblyError> {
        if fragments.is_empty() {
            return Err(AssemblyError::NoFragments);
        }
        reject_text_headers(fragments)?;

        let mut session = SessionGuard::open(&self.engine, self.config.render_timeout)
            .await
            .map_err(|e| AssemblyError::collaborator(FaultLocation::stage(Stage::Session), e))?;
        let result = self.run_pipeline(&mut session, fragments).await;
        let closed = session.close().await;

        let output = result?;
        closed.map_err(|e| AssemblyError::collaborator(FaultLocation::stage(Stage::Session), e))?;
        Ok(output)
    }

    /// Renders one piece of content without slots or assembly.
    ///
    /// The engine's output is returned as is.
    pub async fn render_single(&self, content: &PdfContent) -> Result<PageStream, AssemblyError> {
        let location = FaultLocation::stage(Stage::Rendering);
        let mut session = SessionGuard::open(&self.engine, self.config.render_timeout)
            .await
            .map_err(|e| AssemblyError::collaborator(FaultLocation::stage(Stage::Session), e))?;
        let result =
            render_content(&mut session, &content.markup, &content.page_size, &content.margin)
                .await
                .map_err(|e| AssemblyError::collaborator(location, e));
        let closed = session.close().await;

        let stream = result?;
        closed.map_err(|e| AssemblyError::collaborator(FaultLocation::stage(Stage::Session), e))?;
        Ok(stream)
    }

    async fn run_pipeline(
        &self,
        session: &mut SessionGuard<E::Session>,
        fragments: &[DocumentFragment],
    ) -> Result<AssembledOutput, AssemblyError> {
        info!("[MEASURE] Measuring {} fragment(s).", fragments.len());
        let mut measured = Vec::with_capacity(fragments.len());
        for (index, fragment) in fragments.iter().enumerate() {
            measured.push(self.measure_fragment(session, index, fragment).await?);
        }

        let totals = PageTotals::from_counts(measured.iter().map(|rendered| rendered.page_count));
        info!("[TOTAL] {} page(s) across {} fragment(s).", totals.total_pages(), measured.len());

        info!("[COMPOSE] Overlaying header and footer slots.");
        let mut composited = Vec::with_capacity(measured.len());
        for (rendered, start) in measured.into_iter().zip(totals.starts()) {
            composited.push(
                self.composite_fragment(session, rendered, *start, totals.total_pages())
                    .await?,
            );
        }

        info!("[CONCAT] Joining {} composited fragment(s).", composited.len());
        let location = FaultLocation::stage(Stage::Concatenating);
        let mut combined =
            concatenate(&composited).map_err(|e| AssemblyError::from_composer(location, e))?;
        let page_count = page_count(&combined);
        debug_assert_eq!(page_count, totals.total_pages());

        let stream = save_document(&mut combined, self.config.compress_output)
            .map_err(|e| AssemblyError::from_composer(location, e))?;
        info!("[CONCAT] Assembled {} page(s) into {} bytes.", page_count, stream.len());

        Ok(AssembledOutput { stream, page_count })
    }

    /// First pass: size the slots, reserve their bands and lay out the main
    /// content.
    async fn measure_fragment<'a>(
        &self,
        session: &mut SessionGuard<E::Session>,
        index: usize,
        fragment: &'a DocumentFragment,
    ) -> Result<RenderedFragment<'a>, AssemblyError> {
        let content = &fragment.content;
        let mut slots = Vec::with_capacity(2);
        let mut reserved = content.margin;

        for (position, slot) in fragment.slots() {
            let size = calculate_slot_size(
                session,
                slot,
                &content.margin,
                &content.page_size,
                self.config.text_slot_padding,
            )
            .await
            .map_err(|e| {
                let location = FaultLocation::slot(Stage::Measuring, index, position);
                AssemblyError::collaborator(location, e)
            })?;
            debug!(
                "[MEASURE] Fragment #{} {} {} slot needs {} x {}.",
                index,
                position,
                slot.kind(),
                size.width,
                size.height
            );
            reserved = match position {
                SlotPosition::Header => reserved.grow_top(size.height),
                SlotPosition::Footer => reserved.grow_bottom(size.height),
            };
            slots.push(SizedSlot {
                position,
                slot,
                size,
            });
        }

        let location = FaultLocation::fragment(Stage::Measuring, index);
        let stream = render_content(session, &content.markup, &content.page_size, &reserved)
            .await
            .map_err(|e| AssemblyError::collaborator(location, e))?;
        let main = load_document(&stream).map_err(|e| AssemblyError::from_composer(location, e))?;
        let page_count = page_count(&main);
        debug!("[MEASURE] Fragment #{} laid out on {} page(s).", index, page_count);

        Ok(RenderedFragment {
            index,
            margin: content.margin,
            main,
            page_count,
            slots,
        })
    }

    /// Second pass: draw every slot onto its fragment with global page
    /// numbers.
    async fn composite_fragment(
        &self,
        session: &mut SessionGuard<E::Session>,
        rendered: RenderedFragment<'_>,
        start: usize,
        total_pages: usize,
    ) -> Result<Document, AssemblyError> {
        let RenderedFragment {
            index,
            margin,
            mut main,
            page_count: expected_pages,
            slots,
        } = rendered;
        let end = start + expected_pages;

        for sized in slots {
            let location = FaultLocation::slot(Stage::Compositing, index, sized.position);
            debug!(
                "[COMPOSE] Fragment #{} {} covers pages {}..{} of {}.",
                index,
                sized.position,
                start,
                end,
                total_pages
            );
            match sized.slot {
                Slot::Markup(markup) => {
                    let instances = self
                        .propagator
                        .propagate(&markup.markup, start, end, total_pages)
                        .map_err(|source| AssemblyError::MalformedContent { location, source })?;
                    let stream = render_content(session, &instances, &sized.size, &Margin::zero())
                        .await
                        .map_err(|e| AssemblyError::collaborator(location, e))?;
                    let slot_doc = load_document(&stream)
                        .map_err(|e| AssemblyError::from_composer(location, e))?;
                    overlay_rendered_slot(&mut main, &slot_doc, &margin, sized.position)
                        .map_err(|e| AssemblyError::from_composer(location, e))?;
                }
                Slot::Text(text) => {
                    let numbering = PageNumbering {
                        first_page: start,
                        total_pages,
                    };
                    overlay_text_slot(
                        &mut main,
                        text,
                        &margin,
                        sized.position,
                        numbering,
                        self.fonts.as_ref(),
                    )
                    .map_err(|e| AssemblyError::from_composer(location, e))?;
                }
            }
        }

        debug_assert_eq!(page_count(&main), expected_pages);
        Ok(main)
    }
}

/// Text slots cannot be placed as headers; fail before any rendering work.
fn reject_text_headers(fragments: &[DocumentFragment]) -> Result<(), AssemblyError> {
    match fragments
        .iter()
        .position(|fragment| matches!(fragment.header, Some(Slot::Text(_))))
    {
        Some(index) => Err(AssemblyError::UnsupportedSlotPlacement {
            location: FaultLocation::slot(Stage::Measuring, index, SlotPosition::Header),
        }),
        None => Ok(()),
    }
}
