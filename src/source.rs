//! File intake: reading a selected file and deciding how to render it

use crate::error::{Error, Result};
use bytes::Bytes;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers tolerate leading garbage before the header, so search a window rather than offset 0.
const PDF_MAGIC_WINDOW: usize = 1024;

/// MIME type reported for PDF documents
pub const PDF_MIME: &str = "application/pdf";

/// How a selected file will be rasterized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Paged document rendered through the PDF engine
    Pdf,
    /// Raster image decoded with `image`
    Image(ImageFormat),
}

impl FileKind {
    /// MIME type for this kind of file.
    pub fn mime(&self) -> &'static str {
        match self {
            FileKind::Pdf => PDF_MIME,
            FileKind::Image(format) => format.to_mime_type(),
        }
    }

    /// Short lowercase label used in output.
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image(_) => "image",
        }
    }

    /// Whether the file goes through the PDF branch.
    pub fn is_pdf(&self) -> bool {
        matches!(self, FileKind::Pdf)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Which files the intake accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AcceptPolicy {
    /// Only PDF documents; everything else is rejected
    PdfOnly,
    /// PDF documents and any image format `image` can decode
    #[default]
    PdfOrImage,
}

impl AcceptPolicy {
    /// Parse a policy identifier (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pdf-only" | "pdf" => Some(Self::PdfOnly),
            "pdf-or-image" | "any" | "all" => Some(Self::PdfOrImage),
            _ => None,
        }
    }
}

/// A file selected for scanning, held in memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name (usually the path as given)
    pub name: String,
    /// Detected kind
    pub kind: FileKind,
    /// Raw file contents
    pub bytes: Bytes,
}

impl SourceFile {
    /// Read a file from disk and detect its kind.
    pub async fn open(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read source file");
        Self::from_bytes(path.display().to_string(), bytes)
    }

    /// Wrap an in-memory buffer, detecting its kind from content and name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Result<Self> {
        let name = name.into();
        let bytes = bytes.into();

        if bytes.is_empty() {
            return Err(Error::UnsupportedFile("File is empty".to_string()));
        }

        let kind = detect_kind(&bytes, Path::new(&name)).ok_or_else(|| {
            Error::UnsupportedFile(format!("Unrecognised file type for '{name}'"))
        })?;

        Ok(Self { name, kind, bytes })
    }

    /// MIME type of the file.
    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    /// Apply the accept policy, mirroring the file picker's validation.
    pub fn check(&self, policy: AcceptPolicy) -> Result<()> {
        match (policy, self.kind) {
            (AcceptPolicy::PdfOnly, FileKind::Image(_)) => {
                Err(Error::UnsupportedFile("File must be a PDF".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Sniff the content first and fall back to the file extension.
pub fn detect_kind(bytes: &[u8], path: &Path) -> Option<FileKind> {
    if has_pdf_magic(bytes) {
        return Some(FileKind::Pdf);
    }

    if let Ok(format) = image::guess_format(bytes) {
        return Some(FileKind::Image(format));
    }

    let ext = path.extension().and_then(|e| e.to_str())?;
    if ext.eq_ignore_ascii_case("pdf") {
        return Some(FileKind::Pdf);
    }
    ImageFormat::from_extension(ext).map(FileKind::Image)
}

fn has_pdf_magic(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_MAGIC_WINDOW)];
    window
        .windows(PDF_MAGIC.len())
        .any(|candidate| candidate == PDF_MAGIC)
}
