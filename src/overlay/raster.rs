use crate::overlay::model::Color;
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// RGBA8 pixel buffer in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
        self.pixels[idx + 3] = color.a;
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// A buffer is blank when no pixel carries any alpha; blank captures are
    /// rejected by the save path.
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Encoded snapshot of a drawing surface plus the pixel size it was captured
/// at. The capture size is independent of whatever size the surface has when
/// the snapshot is presented again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raster {
    pub image: String,
    pub width: u32,
    pub height: u32,
}

/// Encode a pixel buffer as a base64 PNG snapshot.
pub fn encode(buffer: &PixelBuffer) -> Result<Raster> {
    let img =
        image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.pixels.clone())
            .ok_or_else(|| anyhow!("pixel buffer does not match its dimensions"))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .context("encode sketch snapshot as png")?;
    Ok(Raster {
        image: general_purpose::STANDARD.encode(png),
        width: buffer.width,
        height: buffer.height,
    })
}

/// Decode a snapshot back into pixels. A malformed payload is an ordinary
/// error; callers log it and treat the sketch as absent.
pub fn decode(raster: &Raster) -> Result<PixelBuffer> {
    let bytes = general_purpose::STANDARD
        .decode(raster.image.as_bytes())
        .context("decode sketch snapshot base64")?;
    let img = image::load_from_memory(&bytes)
        .context("decode sketch snapshot png")?
        .into_rgba8();
    Ok(PixelBuffer::from_pixels(
        img.width(),
        img.height(),
        img.into_raw(),
    ))
}

/// Uniformly stretch `src` to the target size with bilinear resampling. No
/// letterboxing; the full source always covers the full target.
pub fn present(src: &PixelBuffer, target_width: u32, target_height: u32) -> Result<PixelBuffer> {
    if target_width == 0 || target_height == 0 || src.width == 0 || src.height == 0 {
        return Ok(PixelBuffer::new(target_width, target_height));
    }
    if src.width == target_width && src.height == target_height {
        return Ok(src.clone());
    }
    let img = image::RgbaImage::from_raw(src.width, src.height, src.pixels.clone())
        .ok_or_else(|| anyhow!("pixel buffer does not match its dimensions"))?;
    let scaled = image::imageops::resize(&img, target_width, target_height, FilterType::Triangle);
    Ok(PixelBuffer::from_pixels(
        target_width,
        target_height,
        scaled.into_raw(),
    ))
}
