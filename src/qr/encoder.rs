//! QR code encoder used to produce scannable test sheets

use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage, Luma, imageops};
use qrcode::{Color, EcLevel, QrCode};

/// Module grid of an encoded QR symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrModules {
    /// Side length in modules
    pub width: usize,
    /// Row-major, `true` for dark modules
    pub dark: Vec<bool>,
}

impl QrModules {
    /// Whether the module at (`x`, `y`) is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }

    /// Rasterize the grid with a four-module quiet zone
    pub fn to_image(&self, module_px: u32) -> GrayImage {
        let module_px = module_px.max(1);
        let quiet = 4 * module_px;
        let side = self.width as u32 * module_px + 2 * quiet;
        GrayImage::from_fn(side, side, |px, py| {
            let inside = |v: u32| v >= quiet && v < side - quiet;
            if inside(px) && inside(py) {
                let x = ((px - quiet) / module_px) as usize;
                let y = ((py - quiet) / module_px) as usize;
                if self.is_dark(x, y) {
                    return Luma([0]);
                }
            }
            Luma([255])
        })
    }
}

/// QR code encoder
#[derive(Debug, Clone)]
pub struct QrEncoder {
    ecc_level: EcLevel,
    min_size: u32,
}

impl QrEncoder {
    /// Create a new QR encoder with default settings (Medium ECC, 400px minimum)
    pub fn new() -> Self {
        Self {
            ecc_level: EcLevel::M,
            min_size: 400,
        }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_ecc_level(ecc_level: EcLevel) -> Self {
        Self {
            ecc_level,
            ..Self::new()
        }
    }

    /// Set the minimum rendered side length in pixels
    pub fn min_size(mut self, pixels: u32) -> Self {
        self.min_size = pixels.max(1);
        self
    }

    fn code(&self, data: &[u8]) -> Result<QrCode> {
        QrCode::with_error_correction_level(data, self.ecc_level)
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))
    }

    /// Encode bytes into a grayscale QR image with a quiet zone
    pub fn encode_bytes(&self, data: &[u8]) -> Result<DynamicImage> {
        let image = self
            .code(data)?
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .build();

        Ok(DynamicImage::ImageLuma8(image))
    }

    /// Encode a string into a grayscale QR image with a quiet zone
    pub fn encode_string(&self, data: &str) -> Result<DynamicImage> {
        self.encode_bytes(data.as_bytes())
    }

    /// Encode a string and place it on a white sheet at (`x`, `y`).
    ///
    /// The code is clipped if it does not fit the sheet.
    pub fn encode_on_sheet(
        &self,
        data: &str,
        sheet_width: u32,
        sheet_height: u32,
        x: u32,
        y: u32,
    ) -> Result<DynamicImage> {
        let code = self.encode_string(data)?.to_luma8();
        let mut sheet = GrayImage::from_pixel(sheet_width, sheet_height, Luma([255]));
        imageops::overlay(&mut sheet, &code, i64::from(x), i64::from(y));
        Ok(DynamicImage::ImageLuma8(sheet))
    }

    /// Module grid for `data`, for drawing the symbol with vector primitives
    pub fn modules(&self, data: &str) -> Result<QrModules> {
        let code = self.code(data.as_bytes())?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        Ok(QrModules { width, dark })
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}
