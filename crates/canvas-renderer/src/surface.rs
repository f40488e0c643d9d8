//! Drawing surfaces

use frame_geometry::{FramePlacement, SurfaceMetrics};
use image::{ImageResult, Rgba, RgbaImage};
use std::path::Path;

use crate::decoder::DecodedImage;

/// Destination a renderer draws into
pub trait Surface {
    /// Backing-store size in device pixels
    fn pixel_size(&self) -> (u32, u32);

    /// Apply new sizing. Changing the backing store clears it.
    fn resize(&mut self, metrics: &SurfaceMetrics);

    /// Erase the whole surface
    fn clear(&mut self);

    /// Blit the placement's source rectangle onto its destination rectangle
    fn draw(&mut self, image: &DecodedImage, frame: &FramePlacement);
}

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// In-memory RGBA surface
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    css_width: f64,
    css_height: f64,
    draw_count: u64,
}

impl RasterSurface {
    /// Create a surface with the given backing-store size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            css_width: width as f64,
            css_height: height as f64,
            draw_count: 0,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Displayed size in logical pixels
    pub fn css_size(&self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    /// Number of draws since creation
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Write the current contents to an image file
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.pixels.save(path)
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        // Same default as an unsized HTML canvas
        Self::new(300, 150)
    }
}

impl Surface for RasterSurface {
    fn pixel_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn resize(&mut self, metrics: &SurfaceMetrics) {
        self.css_width = metrics.css_width;
        self.css_height = metrics.css_height;
        if self.pixels.dimensions() != (metrics.pixel_width, metrics.pixel_height) {
            self.pixels = RgbaImage::from_pixel(metrics.pixel_width, metrics.pixel_height, TRANSPARENT);
        }
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    fn draw(&mut self, image: &DecodedImage, frame: &FramePlacement) {
        let (width, height) = self.pixels.dimensions();
        let src = image.pixels();
        let max_x = (src.width() - 1) as f64;
        let max_y = (src.height() - 1) as f64;

        // Only the part of the destination rectangle that lands on the surface
        let x0 = frame.dx.max(0.0).floor() as u32;
        let y0 = frame.dy.max(0.0).floor() as u32;
        let x1 = ((frame.dx + frame.d_width).ceil().max(0.0) as u32).min(width);
        let y1 = ((frame.dy + frame.d_height).ceil().max(0.0) as u32).min(height);

        // Nearest neighbour: sample the source at each destination pixel center
        for y in y0..y1 {
            for x in x0..x1 {
                let (sx, sy) = frame.source_point(x as f64 + 0.5, y as f64 + 0.5);
                if sx < frame.sx || sy < frame.sy || sx >= frame.sx + frame.s_width || sy >= frame.sy + frame.s_height {
                    continue;
                }
                let px = sx.floor().clamp(0.0, max_x) as u32;
                let py = sy.floor().clamp(0.0, max_y) as u32;
                self.pixels.put_pixel(x, y, *src.get_pixel(px, py));
            }
        }
        self.draw_count += 1;
    }
}
