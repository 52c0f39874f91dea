mod common;

use std::time::Duration;

use common::{PAGE_WIDTH, damaged_grid, pdf_with_grids, pdf_with_pages, png_bytes};
use docqr::{AcceptPolicy, Error, FileKind, InversionMode, QrEncoder, ScanOptions, Scanner};

/// Quarter-size canvas keeps the PDF tests fast; fit scale is 620/612.
fn small_canvas() -> ScanOptions {
    ScanOptions {
        canvas_width: 620,
        canvas_height: 877,
        ..ScanOptions::default()
    }
}

#[tokio::test]
async fn pdf_first_page_on_a4_canvas() {
    let pdf = pdf_with_pages(&[Some("https://example.org/ticket/7781")]);
    let scanner = Scanner::new(ScanOptions::default()).expect("scanner");

    let outcome = scanner.scan_bytes("ticket.pdf", pdf).await.expect("scan");

    assert_eq!(outcome.kind, FileKind::Pdf);
    assert_eq!(outcome.text(), Some("https://example.org/ticket/7781"));
    assert_eq!(outcome.attempts.len(), 1);

    let attempt = outcome.winning_attempt().expect("winning attempt");
    assert_eq!(attempt.page, Some(1));
    assert_eq!((attempt.width, attempt.height), (2480, 3508));
    assert!((attempt.scale - 2480.0 / PAGE_WIDTH).abs() < 1e-3);
}

#[tokio::test]
async fn pdf_pages_scanned_in_order_until_hit() {
    let pdf = pdf_with_pages(&[None, Some("page two"), Some("page three")]);
    let scanner = Scanner::new(small_canvas()).expect("scanner");

    let outcome = scanner.scan_bytes("stack.pdf", pdf).await.expect("scan");

    assert_eq!(outcome.text(), Some("page two"));
    let pages: Vec<_> = outcome.attempts.iter().map(|a| a.page).collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);
    assert!(!outcome.attempts[0].found);
}

#[tokio::test]
async fn undecodable_page_does_not_stop_the_page_loop() {
    let good = QrEncoder::new().modules("second page").expect("encode");
    let pdf = pdf_with_grids(&[Some(damaged_grid("broken")), Some(good)]);
    let scanner = Scanner::new(small_canvas()).expect("scanner");

    let outcome = scanner.scan_bytes("mixed.pdf", pdf).await.expect("scan");

    assert_eq!(outcome.text(), Some("second page"));
    assert_eq!(outcome.attempts.len(), 2);
    assert!(!outcome.attempts[0].found);
    assert_eq!(outcome.winning_attempt().and_then(|a| a.page), Some(2));
}

#[tokio::test]
async fn inverted_image_code_found_by_default() {
    let mut code = QrEncoder::new()
        .encode_string("white on black")
        .expect("encode")
        .to_luma8();
    image::imageops::invert(&mut code);
    let png = png_bytes(&image::DynamicImage::ImageLuma8(code));

    let outcome = Scanner::default()
        .scan_bytes("negative.png", png.clone())
        .await
        .expect("scan");
    assert_eq!(outcome.text(), Some("white on black"));

    let options = ScanOptions {
        inversion: InversionMode::Original,
        ..ScanOptions::default()
    };
    let outcome = Scanner::new(options)
        .expect("scanner")
        .scan_bytes("negative.png", png)
        .await
        .expect("scan");
    assert!(outcome.payload.is_none());
}

#[tokio::test]
async fn oversized_scale_is_reported_as_error() {
    let code = QrEncoder::new().encode_string("huge").expect("encode");
    let options = ScanOptions {
        image_scales: vec![1e9],
        ..ScanOptions::default()
    };
    let scanner = Scanner::new(options).expect("scanner");

    let err = scanner
        .scan_bytes("huge.png", png_bytes(&code))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Canvas(_)));
}

#[tokio::test]
async fn pdf_without_code_exhausts_every_page() {
    let pdf = pdf_with_pages(&[None, None]);
    let scanner = Scanner::new(small_canvas()).expect("scanner");

    let outcome = scanner.scan_bytes("blank.pdf", pdf).await.expect("scan");

    assert!(outcome.payload.is_none());
    assert_eq!(outcome.attempts.len(), 2);
    assert!(outcome.winning_attempt().is_none());
}

#[tokio::test]
async fn max_pages_stops_before_later_pages() {
    let pdf = pdf_with_pages(&[None, Some("too late")]);
    let options = ScanOptions {
        max_pages: Some(1),
        ..small_canvas()
    };
    let scanner = Scanner::new(options).expect("scanner");

    let outcome = scanner.scan_bytes("late.pdf", pdf).await.expect("scan");

    assert!(outcome.payload.is_none());
    assert_eq!(outcome.attempts.len(), 1);
}

#[tokio::test]
async fn image_scanned_at_half_scale_first() {
    let code = QrEncoder::new()
        .encode_string("WIFI:S:office;T:WPA;P:hunter2;;")
        .expect("encode");
    let scanner = Scanner::new(ScanOptions::default()).expect("scanner");

    let outcome = scanner
        .scan_bytes("wifi.png", png_bytes(&code))
        .await
        .expect("scan");

    assert!(matches!(outcome.kind, FileKind::Image(_)));
    assert_eq!(outcome.text(), Some("WIFI:S:office;T:WPA;P:hunter2;;"));
    let attempt = outcome.winning_attempt().expect("winning attempt");
    assert_eq!(attempt.page, None);
    assert_eq!(attempt.scale, 0.5);
    assert_eq!(attempt.width, code.width() / 2);
}

#[tokio::test]
async fn image_code_on_larger_sheet() {
    let sheet = QrEncoder::new()
        .min_size(240)
        .encode_on_sheet("receipt 00912", 1200, 1600, 700, 1100)
        .expect("sheet");
    let scanner = Scanner::new(ScanOptions::default()).expect("scanner");

    let outcome = scanner
        .scan_bytes("receipt.png", png_bytes(&sheet))
        .await
        .expect("scan");

    assert_eq!(outcome.text(), Some("receipt 00912"));
}

#[tokio::test]
async fn pdf_only_policy_rejects_images() {
    let code = QrEncoder::new().encode_string("not allowed").expect("encode");
    let options = ScanOptions {
        accept: AcceptPolicy::PdfOnly,
        ..ScanOptions::default()
    };
    let scanner = Scanner::new(options).expect("scanner");

    let err = scanner
        .scan_bytes("photo.png", png_bytes(&code))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedFile(ref msg) if msg == "File must be a PDF"));
}

#[tokio::test]
async fn unrecognised_and_corrupt_files_are_errors() {
    let scanner = Scanner::default();

    let err = scanner
        .scan_bytes("notes.txt", b"just some text".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFile(_)));

    let mut truncated = png_bytes(&QrEncoder::new().encode_string("cut").expect("encode"));
    truncated.truncate(40);
    let err = scanner
        .scan_bytes("cut.png", truncated)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Image(_)));
}

#[tokio::test]
async fn scan_file_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("docqr-scan-{}.pdf", std::process::id()));
    tokio::fs::write(&path, pdf_with_pages(&[Some("from disk")]))
        .await
        .expect("write fixture");

    let scanner = Scanner::new(small_canvas()).expect("scanner");
    let result = tokio::time::timeout(Duration::from_secs(120), scanner.scan_file(&path)).await;
    let _ = tokio::fs::remove_file(&path).await;

    let outcome = result.expect("scan finished in time").expect("scan");
    assert_eq!(outcome.text(), Some("from disk"));
    assert_eq!(outcome.file, path.display().to_string());
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let scanner = Scanner::default();
    let err = scanner
        .scan_file(std::path::Path::new("/nonexistent/docqr/missing.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
