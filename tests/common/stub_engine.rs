//! A rendering engine double that lays out markup as real PDF pages.
//!
//! Markup is split into pages at every page-break element; markup without
//! one becomes a single page. The text of each page (tags stripped) is
//! written near the top-left corner inside the margin, and every page gets a
//! MediaBox of exactly the requested size.

use folio::composer::Document;
use folio::{
    BoundingBox, Margin, PageSize, PageStream, Px, RenderEngine, RenderError, RenderSession,
    Viewport,
};
use folio_template::{PAGE_BREAK_CLOSE, PAGE_BREAK_OPEN};
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, StringFormat, dictionary};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetViewport(Viewport),
    Measure { markup: String, viewport: Viewport },
    Render { markup: String, page_size: PageSize, margin: Margin },
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub opened: usize,
    pub closed: usize,
    pub abandoned: usize,
    pub calls: Vec<Call>,
}

impl CallLog {
    pub fn renders(&self) -> Vec<(String, PageSize, Margin)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Render { markup, page_size, margin } => {
                    Some((markup.clone(), *page_size, *margin))
                }
                _ => None,
            })
            .collect()
    }

    pub fn viewports(&self) -> Vec<Viewport> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetViewport(viewport) => Some(*viewport),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Behavior {
    measured: BoundingBox,
    fail_when_contains: Option<String>,
    drop_last_page_when_contains: Option<String>,
    render_delay: Option<Duration>,
    close_delay: Option<Duration>,
    fail_close: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            measured: BoundingBox::new(Px(600.0), Px(38.0)),
            fail_when_contains: None,
            drop_last_page_when_contains: None,
            render_delay: None,
            close_delay: None,
            fail_close: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StubEngine {
    log: Arc<Mutex<CallLog>>,
    behavior: Behavior,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size reported by every `measure` call.
    pub fn measuring(mut self, width: f64, height: f64) -> Self {
        self.behavior.measured = BoundingBox::new(Px(width), Px(height));
        self
    }

    /// Fail any render whose markup contains `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.behavior.fail_when_contains = Some(needle.to_string());
        self
    }

    /// Render one page too few for markup containing `needle`.
    pub fn truncating(mut self, needle: &str) -> Self {
        self.behavior.drop_last_page_when_contains = Some(needle.to_string());
        self
    }

    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.behavior.render_delay = Some(delay);
        self
    }

    /// Delays `close`; the session only counts as closed once it returns.
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.behavior.close_delay = Some(delay);
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.behavior.fail_close = true;
        self
    }

    pub fn log(&self) -> MutexGuard<'_, CallLog> {
        self.log.lock().unwrap()
    }

}

impl RenderEngine for StubEngine {
    type Session = StubSession;

    async fn open(&self) -> Result<StubSession, RenderError> {
        self.log.lock().unwrap().opened += 1;
        Ok(StubSession {
            log: Arc::clone(&self.log),
            behavior: self.behavior.clone(),
        })
    }
}

pub struct StubSession {
    log: Arc<Mutex<CallLog>>,
    behavior: Behavior,
}

impl StubSession {
    fn record(&self, call: Call) {
        self.log.lock().unwrap().calls.push(call);
    }
}

impl RenderSession for StubSession {
    async fn set_viewport(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        self.record(Call::SetViewport(viewport));
        Ok(())
    }

    async fn measure(
        &mut self,
        markup: &str,
        viewport: Viewport,
    ) -> Result<BoundingBox, RenderError> {
        self.record(Call::Measure {
            markup: markup.to_string(),
            viewport,
        });
        Ok(self.behavior.measured)
    }

    async fn render(
        &mut self,
        markup: &str,
        page_size: &PageSize,
        margin: &Margin,
    ) -> Result<PageStream, RenderError> {
        self.record(Call::Render {
            markup: markup.to_string(),
            page_size: *page_size,
            margin: *margin,
        });
        if let Some(delay) = self.behavior.render_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(needle) = &self.behavior.fail_when_contains {
            if markup.contains(needle.as_str()) {
                return Err(RenderError::Content(format!("refusing to render '{needle}'")));
            }
        }

        let mut pages = split_pages(markup);
        if let Some(needle) = &self.behavior.drop_last_page_when_contains {
            if markup.contains(needle.as_str()) {
                pages.pop();
            }
        }
        Ok(build_pdf(&pages, page_size, margin))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if let Some(delay) = self.behavior.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.lock().unwrap().closed += 1;
        if self.behavior.fail_close {
            return Err(RenderError::Session("close failed".to_string()));
        }
        Ok(())
    }

    fn abandon(&mut self) {
        self.log.lock().unwrap().abandoned += 1;
    }
}

fn strip_tags(markup: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The text of each page the markup lays out to.
pub fn split_pages(markup: &str) -> Vec<String> {
    if !markup.contains(PAGE_BREAK_OPEN) {
        return vec![strip_tags(markup)];
    }
    markup
        .split(PAGE_BREAK_OPEN)
        .skip(1)
        .map(|piece| {
            let page = piece.split(PAGE_BREAK_CLOSE).next().unwrap_or("");
            strip_tags(page)
        })
        .collect()
}

fn build_pdf(pages: &[String], page_size: &PageSize, margin: &Margin) -> PageStream {
    let width = page_size.width.to_pt().value();
    let height = page_size.height.to_pt().value();
    let x = margin.left.to_pt().value();
    let y = (height - margin.top.to_pt().value() - 10.0).max(0.0);

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![Object::Real(x as f32), Object::Real(y as f32)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(text.clone().into_bytes(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![
                0.into(),
                0.into(),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ]),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    PageStream::new(bytes)
}
