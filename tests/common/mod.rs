//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use docqr::QrEncoder;
use docqr::qr::QrModules;
use image::{DynamicImage, ImageFormat};
use std::fmt::Write as _;
use std::io::Cursor;

/// Letter-size page in PDF points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

const MODULE_PT: usize = 6;

/// Build a PDF with one page per entry. `Some(text)` pages carry a QR code
/// drawn with filled rectangles, `None` pages only carry a grey box.
pub fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
    let encoder = QrEncoder::new();
    let grids: Vec<Option<QrModules>> = pages
        .iter()
        .map(|page| page.map(|text| encoder.modules(text).expect("encode fixture")))
        .collect();
    pdf_with_grids(&grids)
}

/// Same as [`pdf_with_pages`] but with prebuilt module grids.
pub fn pdf_with_grids(pages: &[Option<QrModules>]) -> Vec<u8> {
    let count = pages.len();

    let kids = (0..count)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {count} >>"),
    ];

    for (i, page) in pages.iter().enumerate() {
        let content = match page {
            Some(modules) => qr_content(modules),
            None => "0.6 g\n72 72 200 100 re\nf".to_string(),
        };
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] /Contents {} 0 R >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    assemble(&objects)
}

fn qr_content(modules: &QrModules) -> String {
    let (x0, y0) = (72, 400);
    let mut content = String::from("q\n0 g\n");
    for row in 0..modules.width {
        for col in 0..modules.width {
            if modules.is_dark(col, row) {
                let x = x0 + col * MODULE_PT;
                let y = y0 + (modules.width - 1 - row) * MODULE_PT;
                let _ = writeln!(content, "{x} {y} {MODULE_PT} {MODULE_PT} re");
            }
        }
    }
    content.push_str("f\nQ");
    content
}

fn assemble(objects: &[String]) -> Vec<u8> {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }

    let xref_offset = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    );

    out.into_bytes()
}

/// Version 1, high-ECC grid with every data module flipped. A detector
/// still finds the grid but error correction cannot recover it.
pub fn damaged_grid(text: &str) -> QrModules {
    let modules = QrEncoder::with_ecc_level(qrcode::EcLevel::H)
        .modules(text)
        .expect("encode fixture");
    let w = modules.width;
    assert_eq!(w, 21, "fixture relies on a version 1 symbol");

    let reserved = |x: usize, y: usize| {
        let finder_or_format =
            (x <= 8 && y <= 8) || (x >= w - 8 && y <= 8) || (x <= 8 && y >= w - 8);
        finder_or_format || x == 6 || y == 6
    };
    let mut damaged = modules.clone();
    for y in 0..w {
        for x in 0..w {
            if !reserved(x, y) {
                damaged.dark[y * w + x] = !modules.is_dark(x, y);
            }
        }
    }
    damaged
}

/// Encode an image as PNG bytes
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}
