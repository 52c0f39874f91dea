//! PDF page rasterization using the pure Rust `hayro` renderer

use crate::canvas::{Canvas, fit_scale};
use crate::error::{Error, Result};
use hayro::{InterpreterSettings, Pdf, RenderSettings};
use std::sync::Arc;

/// A parsed PDF document ready for page rendering
pub struct PdfDocument {
    pdf: Pdf,
    page_count: usize,
}

impl PdfDocument {
    /// Parse a PDF from an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data = Arc::new(bytes.to_vec());
        let pdf =
            Pdf::new(data).map_err(|e| Error::Pdf(format!("Failed to parse PDF: {:?}", e)))?;
        let page_count = pdf.pages().len();

        tracing::debug!(page_count, "Loaded PDF document");
        Ok(Self { pdf, page_count })
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Unscaled viewport size of a 1-based page, in PDF points.
    pub fn page_size(&self, page_num: usize) -> Result<(f32, f32)> {
        let index = self.page_index(page_num)?;
        let pages = self.pdf.pages();
        let page = pages.get(index).ok_or(Error::PageNotFound(page_num))?;
        Ok(page.render_dimensions())
    }

    /// Render a 1-based page onto the canvas, scaled to fit it.
    ///
    /// The canvas is reset to `canvas_width`×`canvas_height` first and the
    /// page is drawn at the origin; any space the page does not cover stays
    /// white. Returns the scale the page was rendered at.
    pub fn render_page(
        &self,
        page_num: usize,
        canvas: &mut Canvas,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<f32> {
        let index = self.page_index(page_num)?;
        let pages = self.pdf.pages();
        let page = pages.get(index).ok_or(Error::PageNotFound(page_num))?;
        let (width, height) = page.render_dimensions();

        let scale = fit_scale(width, height, canvas_width, canvas_height).ok_or_else(|| {
            Error::Pdf(format!(
                "Invalid page size on page {}: {}x{}",
                page_num, width, height
            ))
        })?;

        canvas.resize(canvas_width, canvas_height)?;

        let settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let pixmap = hayro::render(page, &InterpreterSettings::default(), &settings);

        tracing::trace!(
            page = page_num,
            scale,
            width = pixmap.width(),
            height = pixmap.height(),
            "Rendered PDF page"
        );

        canvas.draw_pixmap(
            pixmap.data_as_u8_slice(),
            u32::from(pixmap.width()),
            u32::from(pixmap.height()),
        )?;

        Ok(scale)
    }

    fn page_index(&self, page_num: usize) -> Result<usize> {
        if page_num < 1 || page_num > self.page_count {
            return Err(Error::PageNotFound(page_num));
        }
        Ok(page_num - 1)
    }
}
