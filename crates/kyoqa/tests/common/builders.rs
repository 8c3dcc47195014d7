//! Fixture builders. PDFs are generated with lopdf so no binary fixtures
//! live in the repository.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use lopdf::{dictionary, Document, Object, Stream};

/// One page per entry, each drawn with a standard Courier font.
pub fn text_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = format!("BT /F1 10 Tf 40 700 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    finish(doc, pages_id, kids, path, false);
}

/// A single page with no text layer, as produced by a scanner.
pub fn blank_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    finish(doc, pages_id, vec![page_id.into()], path, false);
}

/// A blank page behind a standard security handler dictionary.
pub fn encrypted_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    finish(doc, pages_id, vec![page_id.into()], path, true);
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, kids: Vec<Object>, path: &Path, encrypted: bool) {
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if encrypted {
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => Object::string_literal(vec![0u8; 32]),
            "U" => Object::string_literal(vec![0u8; 32]),
            "P" => -4,
        });
        doc.trailer.set("Encrypt", encrypt_id);
    }
    doc.save(path).unwrap();
}

/// Template workbook: one header row followed by the given descriptions.
pub fn template_xlsx(path: &Path, header: &[&str], descriptions: &[&str]) {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("KB Import").unwrap();
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (row, description) in descriptions.iter().enumerate() {
        sheet.write_string(row as u32 + 1, 0, *description).unwrap();
    }
    workbook.save(path).unwrap();
}

pub const TEMPLATE_HEADER: &[&str] = &[
    "Short description",
    "Meta",
    "Author",
    "QA Numbers",
    "Processing Status",
    "file_name",
];

/// A small all-white PNG standing in for a rendered page.
pub fn white_png() -> Vec<u8> {
    let img = image::GrayImage::from_pixel(32, 32, image::Luma([255u8]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
