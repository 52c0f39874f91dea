//! Off-screen RGBA raster surface that pages and images are drawn onto
//!
//! The canvas always has an opaque white backdrop: transparent regions of a
//! rendered page or image are composited over white before the pixels are
//! handed to the QR decoder.

use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Largest canvas side in pixels; also keeps PDF renders inside hayro's u16 pixmaps
pub const MAX_CANVAS_SIDE: u32 = 16_384;
/// Largest canvas area in pixels (256 MiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Fixed-size RGBA pixel surface
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Create a white canvas of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, WHITE),
        })
    }

    /// Canvas width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Canvas height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Change the canvas size. Like assigning a canvas element's dimensions,
    /// this always discards the previous contents.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        check_dimensions(width, height)?;
        if width == self.width() && height == self.height() {
            self.clear();
        } else {
            self.pixels = RgbaImage::from_pixel(width, height, WHITE);
        }
        Ok(())
    }

    /// Fill the whole canvas with opaque white.
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = WHITE;
        }
    }

    /// Draw an image stretched over the entire canvas.
    pub fn draw_image(&mut self, img: &DynamicImage) {
        let rgba = img.to_rgba8();
        let scaled = if rgba.dimensions() == self.pixels.dimensions() {
            rgba
        } else {
            imageops::resize(&rgba, self.width(), self.height(), FilterType::Triangle)
        };

        for (dst, src) in self.pixels.pixels_mut().zip(scaled.pixels()) {
            *dst = over_white_straight(*src);
        }
    }

    /// Blit a premultiplied RGBA pixmap at the origin, clipped to the canvas.
    pub fn draw_pixmap(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<()> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() < expected {
            return Err(Error::Canvas(format!(
                "Pixmap buffer too small: {} bytes for {}x{}",
                rgba.len(),
                width,
                height
            )));
        }

        let cols = width.min(self.width());
        let rows = height.min(self.height());
        for y in 0..rows {
            for x in 0..cols {
                let offset = (y as usize * width as usize + x as usize) * 4;
                let src = [
                    rgba[offset],
                    rgba[offset + 1],
                    rgba[offset + 2],
                    rgba[offset + 3],
                ];
                self.pixels.put_pixel(x, y, over_white_premultiplied(src));
            }
        }
        Ok(())
    }

    /// Borrow the canvas as an RGBA image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Grayscale copy of the canvas for QR detection.
    pub fn to_luma(&self) -> GrayImage {
        imageops::grayscale(&self.pixels)
    }
}

/// Dimensions of `width`×`height` multiplied by `scale`, truncated like
/// integer canvas dimensions and never below one pixel.
///
/// Fails when the result would not fit on a canvas.
pub fn scaled_dimensions(width: u32, height: u32, scale: f32) -> Result<(u32, u32)> {
    let scale_axis = |v: u32| -> Result<u32> {
        let scaled = (f64::from(v) * f64::from(scale)).floor();
        if !scaled.is_finite() || scaled > f64::from(MAX_CANVAS_SIDE) {
            return Err(Error::Canvas(format!(
                "{width}x{height} at scale {scale} exceeds the {MAX_CANVAS_SIDE}px canvas limit"
            )));
        }
        Ok((scaled as u32).max(1))
    };
    let dims = (scale_axis(width)?, scale_axis(height)?);
    check_dimensions(dims.0, dims.1)?;
    Ok(dims)
}

/// Largest uniform scale at which a page of `page_width`×`page_height` fits
/// inside the canvas.
pub fn fit_scale(
    page_width: f32,
    page_height: f32,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<f32> {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(page_width) || !valid(page_height) {
        return None;
    }
    let by_height = canvas_height as f32 / page_height;
    let by_width = canvas_width as f32 / page_width;
    Some(by_height.min(by_width))
}

/// Reject canvas sizes that are empty or too large to allocate.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::Canvas(format!(
            "Invalid canvas size {}x{}",
            width, height
        )));
    }
    if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
        return Err(Error::Canvas(format!(
            "Canvas size {width}x{height} exceeds {MAX_CANVAS_SIDE}px per side"
        )));
    }
    let pixels = u64::from(width).checked_mul(u64::from(height));
    if pixels.is_none_or(|p| p > MAX_CANVAS_PIXELS) {
        return Err(Error::Canvas(format!(
            "Canvas size {width}x{height} exceeds {MAX_CANVAS_PIXELS} pixels"
        )));
    }
    Ok(())
}

fn over_white_straight(src: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = src.0;
    let blend = |c: u8| -> u8 {
        let a = a as u32;
        ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8
    };
    Rgba([blend(r), blend(g), blend(b), 255])
}

fn over_white_premultiplied(src: [u8; 4]) -> Rgba<u8> {
    let [r, g, b, a] = src;
    let inv = 255 - a;
    Rgba([
        r.saturating_add(inv),
        g.saturating_add(inv),
        b.saturating_add(inv),
        255,
    ])
}
