//! docqr - decode QR codes from PDF documents and images
//!
//! A selected file is read into memory and rasterized onto an off-screen
//! canvas: PDF pages are fitted onto an A4@300dpi surface one at a time,
//! images are drawn at a few fixed scale factors. The canvas pixels are
//! handed to `rqrr` and the first decoded code is returned.
//!
//! # Example
//!
//! ```no_run
//! use docqr::{ScanOptions, Scanner};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scanner = Scanner::new(ScanOptions::default())?;
//!     let outcome = scanner.scan_file(Path::new("boarding-pass.pdf")).await?;
//!
//!     match outcome.text() {
//!         Some(text) => println!("QR: {text}"),
//!         None => println!("No QR code found"),
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod canvas;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod pdf;
pub mod qr;
pub mod scanner;
pub mod source;

// Re-exports for convenience
pub use canvas::Canvas;
pub use config::{DocqrConfig, LogRotation, LoggingOptions, ScanSettings};
pub use error::{Error, Result};
pub use pdf::PdfDocument;
pub use qr::{InversionMode, QrDecoder, QrEncoder, QrPayload};
pub use scanner::{ScanAttempt, ScanOptions, ScanOutcome, Scanner};
pub use source::{AcceptPolicy, FileKind, SourceFile};
