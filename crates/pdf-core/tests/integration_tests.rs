//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use lopdf::{dictionary, Document, Object, ObjectId};
use pdf_core::{Color, FontData, PageSize, PdfDocument, PdfError, StandardFont};
use pretty_assertions::assert_eq;

/// Create a minimal valid PDF for testing
///
/// One US Letter page whose content already draws with a font named `/F1`.
fn create_test_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let existing_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });

    let contents_id = doc.add_object(lopdf::Stream::new(
        dictionary! {},
        b"BT /F1 9 Tf 1 0 0 1 20 20 Tm (template) Tj ET 0.5 g".to_vec(),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => existing_font_id,
            },
        },
        "Contents" => contents_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Create a PDF whose pages carry no MediaBox at all
fn create_test_pdf_without_media_box() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A TrueType font from the host, if one is installed
fn system_font_path() -> Option<&'static str> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
    ]
    .into_iter()
    .find(|path| std::path::Path::new(path).exists())
}

fn first_page(doc: &Document) -> ObjectId {
    *doc.get_pages().get(&1).unwrap()
}

fn page_text(doc: &Document) -> String {
    let content = doc.get_page_content(first_page(doc)).unwrap();
    String::from_utf8_lossy(&content).into_owned()
}

/// The font dictionary a page resource name points at
fn page_font<'a>(doc: &'a Document, resource_name: &str) -> &'a lopdf::Dictionary {
    let page = doc.get_object(first_page(doc)).unwrap().as_dict().unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    let font_id = fonts
        .get(resource_name.as_bytes())
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_object(font_id).unwrap().as_dict().unwrap()
}

#[test]
fn test_open_save_roundtrip() {
    let pdf_data = create_test_pdf();

    let mut doc = PdfDocument::open_from_bytes(&pdf_data).unwrap();
    assert_eq!(doc.page_count(), 1);

    let saved_data = doc.to_bytes().unwrap();

    let doc2 = PdfDocument::open_from_bytes(&saved_data).unwrap();
    assert_eq!(doc2.page_count(), 1);
}

#[test]
fn test_open_invalid_bytes() {
    let result = PdfDocument::open_from_bytes(b"not a pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_open_missing_file() {
    let result = PdfDocument::open("/definitely/not/here.pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_page_size() {
    let doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    assert_eq!(
        doc.page_size(1).unwrap(),
        PageSize {
            width: 612.0,
            height: 792.0
        }
    );
}

#[test]
fn test_page_size_defaults_to_letter() {
    let doc = PdfDocument::open_from_bytes(&create_test_pdf_without_media_box()).unwrap();
    assert_eq!(
        doc.page_size(1).unwrap(),
        PageSize {
            width: 612.0,
            height: 792.0
        }
    );
}

#[test]
fn test_text_width_standard_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);

    let width = doc.get_text_width("Hello").unwrap();
    assert!((width - 27.336).abs() < 1e-9, "width was {width}");
}

#[test]
fn test_insert_text_standard_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);
    doc.insert_text("Hello", 1, 292.332, 116.116).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    let content = page_text(&saved);

    // Original drawing survives, wrapped in q/Q
    assert!(content.starts_with("q\n"));
    assert!(content.contains("(template) Tj"));
    assert!(content.contains("Q\nBT\n"));
    assert!(content.contains("/F2 12 Tf"));
    assert!(content.contains("292.332 116.116 Td"));
    assert!(content.contains("<48656C6C6F> Tj"));

    let font = page_font(&saved, "F2");
    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    assert_eq!(
        font.get(b"Encoding").unwrap().as_name().unwrap(),
        b"WinAnsiEncoding"
    );
}

#[test]
fn test_existing_font_resource_is_kept() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::CourierBold, 10.0);
    doc.insert_text("Name", 1, 10.0, 10.0).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();

    assert_eq!(
        page_font(&saved, "F1")
            .get(b"BaseFont")
            .unwrap()
            .as_name()
            .unwrap(),
        b"Times-Roman"
    );
    assert_eq!(
        page_font(&saved, "F2")
            .get(b"BaseFont")
            .unwrap()
            .as_name()
            .unwrap(),
        b"Courier-Bold"
    );
}

#[test]
fn test_same_font_shares_resource() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::TimesRoman, 14.0);
    doc.insert_text("First", 1, 10.0, 10.0).unwrap();
    doc.insert_text("Second", 1, 10.0, 30.0).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    let content = page_text(&saved);
    assert_eq!(content.matches("/F2 14 Tf").count(), 2);
    assert!(!content.contains("/F3"));
}

#[test]
fn test_text_color() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);
    doc.set_text_color(Color::red());
    doc.insert_text("Red", 1, 10.0, 10.0).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    assert!(page_text(&saved).contains("1 0 0 rg\n/F2 12 Tf"));
}

#[test]
fn test_empty_text() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);
    doc.insert_text("", 1, 100.0, 100.0).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    assert!(!page_text(&saved).contains("Tj\nET"));
}

#[test]
fn test_invalid_page_number() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);

    match doc.insert_text("Test", 999, 100.0, 100.0) {
        Err(PdfError::InvalidPage(page, total)) => {
            assert_eq!(page, 999);
            assert_eq!(total, 1);
        }
        other => panic!("Expected InvalidPage error, got {other:?}"),
    }

    assert!(matches!(doc.page_size(0), Err(PdfError::InvalidPage(0, 1))));
}

#[test]
fn test_insert_without_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let result = doc.insert_text("Test", 1, 100.0, 100.0);
    assert!(matches!(result, Err(PdfError::FontNotFound(_))));
}

#[test]
fn test_unencodable_text_rejected_early() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::Helvetica, 12.0);

    let result = doc.insert_text("สวัสดี", 1, 100.0, 100.0);
    assert!(matches!(result, Err(PdfError::UnencodableText { .. })));
}

#[test]
fn test_set_unknown_font() {
    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    let result = doc.set_font("missing", 12.0);
    assert!(matches!(result, Err(PdfError::FontNotFound(name)) if name == "missing"));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stamped.pdf");

    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.set_standard_font(StandardFont::HelveticaBold, 24.0);
    doc.insert_text("Jane Doe", 1, 200.0, 400.0).unwrap();
    doc.save(&path).unwrap();

    let reopened = PdfDocument::open(&path).unwrap();
    assert_eq!(reopened.page_count(), 1);
    assert!(page_text(reopened.inner()).contains("200 400 Td"));
}

#[test]
fn test_embedded_truetype_font() {
    let Some(path) = system_font_path() else {
        eprintln!("skipping: no system TrueType font installed");
        return;
    };
    let font_bytes = std::fs::read(path).unwrap();

    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_font("body", &font_bytes).unwrap();
    doc.set_font("body", 18.0).unwrap();

    assert!(doc.get_text_width("Hello").unwrap() > 0.0);
    doc.insert_text("Hello", 1, 50.0, 60.0).unwrap();

    let saved = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
    let font = page_font(&saved, "F2");
    assert_eq!(font.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
    assert_eq!(
        font.get(b"Encoding").unwrap().as_name().unwrap(),
        b"Identity-H"
    );
    assert!(page_text(&saved).contains("/F2 18 Tf"));
}

#[test]
fn test_add_font_twice() {
    let Some(path) = system_font_path() else {
        eprintln!("skipping: no system TrueType font installed");
        return;
    };

    let mut doc = PdfDocument::open_from_bytes(&create_test_pdf()).unwrap();
    doc.add_font_data(FontData::from_file(path).unwrap()).unwrap();

    let result = doc.add_font_data(FontData::from_file(path).unwrap());
    assert!(matches!(result, Err(PdfError::FontAlreadyExists(_))));
}
