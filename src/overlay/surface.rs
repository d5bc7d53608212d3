use crate::overlay::model::{CanvasModel, Color};
use crate::overlay::raster::{self, PixelBuffer, Raster};
use crate::overlay::render;
use anyhow::Result;

/// The live drawing surface: a pixel buffer sized to the video's on-screen
/// box. Stored rasters are never mutated; the surface only holds their
/// current presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawSurface {
    buffer: PixelBuffer,
}

impl DrawSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: PixelBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.buffer.pixel(x, y)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.is_blank()
    }

    /// Adopt a new pixel size. Like a canvas element, resizing discards the
    /// current content; callers re-present or re-compose afterwards.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.buffer.width == width && self.buffer.height == height {
            return;
        }
        self.buffer = PixelBuffer::new(width, height);
    }

    /// Decode a stored snapshot and stretch it over the whole surface,
    /// replacing the current content.
    pub fn present_raster(&mut self, snapshot: &Raster) -> Result<()> {
        let decoded = raster::decode(snapshot)?;
        self.buffer = raster::present(&decoded, self.buffer.width, self.buffer.height)?;
        Ok(())
    }

    /// Rebuild the surface from an optional base layer plus the stroke list;
    /// used while an edit is in progress.
    pub fn compose(&mut self, base: Option<&PixelBuffer>, canvas: &CanvasModel) -> Result<()> {
        match base {
            Some(base) if base.width == self.buffer.width && base.height == self.buffer.height => {
                self.buffer = base.clone();
            }
            Some(base) => {
                self.buffer = raster::present(base, self.buffer.width, self.buffer.height)?;
            }
            None => self.buffer.clear(),
        }
        render::render_canvas(canvas, &mut self.buffer);
        Ok(())
    }

    /// Snapshot the current surface content.
    pub fn capture(&self) -> Result<Raster> {
        raster::encode(&self.buffer)
    }
}
