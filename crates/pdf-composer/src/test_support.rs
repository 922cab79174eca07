use crate::page::page_ids;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

/// Creates a simple dummy PDF document with a specified number of pages.
/// Each page has a unique text content "<prefix> X".
pub(crate) fn create_dummy_pdf(num_pages: u32, text_prefix: &str, size: (i64, i64)) -> Document {
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

    let mut page_ids = vec![];
    for i in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![10.into(), 10.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("{} {}", text_prefix, i).into_bytes(),
                        StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), size.0.into(), size.1.into()]),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(Object::Reference(page_id));
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids,
        "Count" => num_pages as i64,
    };
    doc.objects.insert(pages_id, pages_dict.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// The decoded content of the page at `index` (zero based), as text.
pub(crate) fn page_text(doc: &Document, index: usize) -> String {
    let page_id = page_ids(doc)[index];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

pub(crate) fn page_operations(doc: &Document, index: usize) -> Vec<Operation> {
    let page_id = page_ids(doc)[index];
    Content::decode(&doc.get_page_content(page_id).unwrap())
        .unwrap()
        .operations
}
