//! Error types for docqr operations

use thiserror::Error;

/// Result type alias using docqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// The selected file was rejected before scanning
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// The PDF engine could not load or render the document
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Requested page does not exist in the document
    #[error("Page {0} not found")]
    PageNotFound(usize),

    /// Canvas could not be created with the requested dimensions
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found on the canvas
    #[error("No QR code found")]
    NoQrCodeFound,

    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Other(format!("Scan task failed: {}", e))
    }
}
