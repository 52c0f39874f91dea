//! QR code decoder using rqrr

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::qr::QrPayload;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which polarities of the image the decoder tries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InversionMode {
    /// Dark modules on a light background only
    Original,
    /// Light modules on a dark background only
    Inverted,
    /// Original first, then inverted
    #[default]
    AttemptBoth,
}

impl InversionMode {
    fn passes(self) -> &'static [bool] {
        match self {
            InversionMode::Original => &[false],
            InversionMode::Inverted => &[true],
            InversionMode::AttemptBoth => &[false, true],
        }
    }
}

impl FromStr for InversionMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "original" | "dont-invert" => Ok(Self::Original),
            "inverted" | "only-invert" => Ok(Self::Inverted),
            "attempt-both" | "both" => Ok(Self::AttemptBoth),
            _ => Err(format!(
                "Unknown inversion mode '{value}', expected original, inverted or attempt-both"
            )),
        }
    }
}

/// QR code decoder
#[derive(Debug, Clone, Default)]
pub struct QrDecoder {
    inversion: InversionMode,
}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder that tries the given polarities
    pub fn with_inversion(inversion: InversionMode) -> Self {
        Self { inversion }
    }

    /// Configured inversion mode
    pub fn inversion(&self) -> InversionMode {
        self.inversion
    }

    /// Decode a QR code from the current canvas contents
    pub fn decode_canvas(&self, canvas: &Canvas) -> Result<QrPayload> {
        self.decode_gray(&canvas.to_luma())
    }

    /// Decode a QR code from an image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(&img.to_luma8())
    }

    /// Decode a QR code from a grayscale image, honouring the inversion mode.
    ///
    /// A decode failure on one polarity is remembered but does not stop the
    /// next polarity from being tried.
    pub fn decode_gray(&self, img: &GrayImage) -> Result<QrPayload> {
        let mut last_err = Error::NoQrCodeFound;

        for &invert in self.inversion.passes() {
            let attempt = if invert {
                let mut inverted = img.clone();
                image::imageops::invert(&mut inverted);
                decode_once(inverted)
            } else {
                decode_once(img.clone())
            };

            match attempt {
                Ok(payload) => return Ok(payload),
                Err(Error::NoQrCodeFound) => {}
                Err(e) => {
                    tracing::debug!(invert, "QR grid found but not decoded: {e}");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

fn decode_once(img: GrayImage) -> Result<QrPayload> {
    let mut prepared = rqrr::PreparedImage::prepare(img);

    let grids = prepared.detect_grids();

    if grids.is_empty() {
        return Err(Error::NoQrCodeFound);
    }

    let mut last_err = None;
    for grid in &grids {
        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );
                return Ok(QrPayload::from_bytes(content.into_bytes()));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(Error::QrDecode(format!(
        "Decode failed for {} grid(s): {:?}",
        grids.len(),
        last_err
    )))
}
