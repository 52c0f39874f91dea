//! Scan pipeline: load a file, rasterize it onto a canvas and look for a QR code
//!
//! PDFs are rendered page by page onto a fixed A4@300dpi canvas, each page
//! scaled to fit. Images are drawn at a short list of scale factors, since the
//! detector sometimes locks on at a smaller size where it misses at full size.
//! Both paths stop at the first decoded code.

use crate::canvas::{Canvas, check_dimensions, scaled_dimensions};
use crate::error::{Error, Result};
use crate::pdf::PdfDocument;
use crate::qr::{InversionMode, QrDecoder, QrPayload};
use crate::source::{AcceptPolicy, FileKind, SourceFile};
use bytes::Bytes;
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A4 at 300 dpi, portrait
pub const DEFAULT_CANVAS_WIDTH: u32 = 2480;
/// A4 at 300 dpi, portrait
pub const DEFAULT_CANVAS_HEIGHT: u32 = 3508;
/// Scale factors tried for images, in order
pub const DEFAULT_IMAGE_SCALES: [f32; 3] = [0.5, 1.0, 0.25];

/// Tunables for a scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Width of the canvas PDF pages are fitted into
    pub canvas_width: u32,
    /// Height of the canvas PDF pages are fitted into
    pub canvas_height: u32,
    /// Scale factors tried for images, in order
    pub image_scales: Vec<f32>,
    /// Polarities handed to the QR decoder
    pub inversion: InversionMode,
    /// Which files are accepted
    pub accept: AcceptPolicy,
    /// Stop after this many PDF pages
    pub max_pages: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            image_scales: DEFAULT_IMAGE_SCALES.to_vec(),
            inversion: InversionMode::AttemptBoth,
            accept: AcceptPolicy::PdfOrImage,
            max_pages: None,
        }
    }
}

impl ScanOptions {
    /// Reject option combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        check_dimensions(self.canvas_width, self.canvas_height)
            .map_err(|e| Error::Config(format!("Invalid PDF canvas: {e}")))?;
        if self.image_scales.is_empty() {
            return Err(Error::Config(
                "At least one image scale is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .image_scales
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(Error::Config(format!(
                "Image scale must be a positive number, got {bad}"
            )));
        }
        if self.max_pages == Some(0) {
            return Err(Error::Config("max_pages must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// One rasterize-and-decode attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanAttempt {
    /// 1-based PDF page, `None` for images
    pub page: Option<usize>,
    /// Scale the source was drawn at
    pub scale: f32,
    /// Canvas width for this attempt
    pub width: u32,
    /// Canvas height for this attempt
    pub height: u32,
    /// Whether this attempt produced the payload
    pub found: bool,
}

/// Result of scanning one file
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// File name as given
    pub file: String,
    /// Detected kind
    pub kind: FileKind,
    /// First decoded payload, if any
    pub payload: Option<QrPayload>,
    /// Every attempt made, in order
    pub attempts: Vec<ScanAttempt>,
    /// Wall time spent rasterizing and decoding
    pub elapsed: Duration,
}

impl ScanOutcome {
    /// Decoded text, if a code was found and it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        self.payload.as_ref().and_then(|p| p.as_str())
    }

    /// The attempt that produced the payload
    pub fn winning_attempt(&self) -> Option<&ScanAttempt> {
        self.attempts.iter().find(|a| a.found)
    }
}

/// Rasterizes files and decodes the first QR code found
#[derive(Debug, Clone)]
pub struct Scanner {
    options: ScanOptions,
    decoder: QrDecoder,
}

impl Scanner {
    /// Create a scanner after validating the options
    pub fn new(options: ScanOptions) -> Result<Self> {
        options.validate()?;
        let decoder = QrDecoder::with_inversion(options.inversion);
        Ok(Self { options, decoder })
    }

    /// Options in effect
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Read a file from disk and scan it.
    pub async fn scan_file(&self, path: &Path) -> Result<ScanOutcome> {
        let source = SourceFile::open(path).await?;
        self.scan_in_background(source).await
    }

    /// Scan an in-memory file. `name` is used for type detection fallback and output.
    pub async fn scan_bytes(
        &self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Result<ScanOutcome> {
        let source = SourceFile::from_bytes(name, bytes)?;
        self.scan_in_background(source).await
    }

    async fn scan_in_background(&self, source: SourceFile) -> Result<ScanOutcome> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan_source(&source)).await?
    }

    /// Scan an already loaded file on the current thread.
    pub fn scan_source(&self, source: &SourceFile) -> Result<ScanOutcome> {
        source.check(self.options.accept)?;

        let started = Instant::now();
        let mut attempts = Vec::new();

        let payload = match source.kind {
            FileKind::Pdf => self.scan_pdf(&source.bytes, &mut attempts)?,
            FileKind::Image(format) => {
                let img = image::load_from_memory_with_format(&source.bytes, format)?;
                self.scan_image(&img, &mut attempts)?
            }
        };

        let elapsed = started.elapsed();
        info!(
            file = %source.name,
            kind = source.kind.label(),
            found = payload.is_some(),
            attempts = attempts.len(),
            inversion = ?self.decoder.inversion(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Scan finished"
        );

        Ok(ScanOutcome {
            file: source.name.clone(),
            kind: source.kind,
            payload,
            attempts,
            elapsed,
        })
    }

    /// Render each page in order and return the first code found.
    fn scan_pdf(
        &self,
        bytes: &[u8],
        attempts: &mut Vec<ScanAttempt>,
    ) -> Result<Option<QrPayload>> {
        let document = PdfDocument::from_bytes(bytes)?;
        let last_page = match self.options.max_pages {
            Some(max) => document.page_count().min(max),
            None => document.page_count(),
        };

        let width = self.options.canvas_width;
        let height = self.options.canvas_height;
        let mut canvas = Canvas::new(width, height)?;

        for page in 1..=last_page {
            let scale = document.render_page(page, &mut canvas, width, height)?;
            let result = self.decode(&canvas);
            let found = result.is_some();

            attempts.push(ScanAttempt {
                page: Some(page),
                scale,
                width,
                height,
                found,
            });
            debug!(page, scale, found, "Scanned PDF page");

            if found {
                return Ok(result);
            }
        }

        Ok(None)
    }

    /// Try each scale in order and return the first code found.
    pub fn scan_image(
        &self,
        img: &image::DynamicImage,
        attempts: &mut Vec<ScanAttempt>,
    ) -> Result<Option<QrPayload>> {
        let mut canvas = Canvas::new(1, 1)?;

        for &scale in &self.options.image_scales {
            let (width, height) = scaled_dimensions(img.width(), img.height(), scale)?;
            canvas.resize(width, height)?;
            canvas.draw_image(img);

            let result = self.decode(&canvas);
            let found = result.is_some();

            attempts.push(ScanAttempt {
                page: None,
                scale,
                width,
                height,
                found,
            });
            debug!(scale, width, height, found, "Scanned image");

            if found {
                return Ok(result);
            }
        }

        Ok(None)
    }

    /// A missing code is not an error; anything else is logged and treated as a miss.
    fn decode(&self, canvas: &Canvas) -> Option<QrPayload> {
        match self.decoder.decode_canvas(canvas) {
            Ok(payload) => Some(payload),
            Err(Error::NoQrCodeFound) => None,
            Err(err) => {
                warn!("QR detection failed: {err}");
                None
            }
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            options: ScanOptions::default(),
            decoder: QrDecoder::default(),
        }
    }
}
