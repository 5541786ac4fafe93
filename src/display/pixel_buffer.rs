//! The CPU-side frame buffer and its drawing primitives.
//!
//! Storage is column-major: the buffer is indexed `[x][y][channel]`, so a
//! vertical run of pixels is contiguous in memory and region operations copy
//! whole column slices at a time.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::color::Color;
use crate::display::font::GlyphMask;
use crate::error::GraphicsError;
use crate::geometry::{clip_blit, clip_line_x, clip_line_y, Point, Rect};
use crate::texture::Texture;

/// One open buffer per process. The display window and the buffer are global
/// resources with no multi-instance support, so a second `open` must fail
/// until the first buffer is dropped.
static OPEN: AtomicBool = AtomicBool::new(false);

/// Alpha blend a single color channel: `(dst*(255-a) + src*a) / 255` with
/// truncating division. Exact at a=0 (keeps dst) and a=255 (takes src).
#[inline]
fn blend_channel(dst: u8, src: u8, alpha: u16) -> u8 {
    ((dst as u16 * (255 - alpha) + src as u16 * alpha) / 255) as u8
}

/// RGB pixel buffer for software rendering.
///
/// All drawing primitives clip against the buffer bounds; coordinates that
/// land outside are dropped silently, never reported as errors. Positions
/// are continuous (x, y) pairs rounded to the nearest pixel center at write
/// time.
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Open the process-wide pixel buffer, zero-initialized.
    ///
    /// Fails with [`GraphicsError::AlreadyOpen`] while another buffer is
    /// live; drop (or [`close`](Self::close)) the old one first.
    pub fn open(width: u32, height: u32) -> Result<Self, GraphicsError> {
        if OPEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GraphicsError::AlreadyOpen);
        }
        Ok(Self {
            data: vec![0; (width * height * 3) as usize],
            width,
            height,
        })
    }

    /// Explicit teardown; equivalent to dropping the buffer.
    pub fn close(self) {}

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The inclusive pixel rectangle covered by the buffer.
    #[inline]
    fn bounds(&self) -> Rect {
        Rect {
            x0: 0,
            y0: 0,
            x1: self.width as i32 - 1,
            y1: self.height as i32 - 1,
        }
    }

    /// Check if integer coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Byte offset of pixel (x, y): columns are contiguous.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((x * self.height + y) * 3) as usize
    }

    /// Draw a single pixel.
    ///
    /// The position is rounded to the nearest pixel center; writes outside
    /// the buffer are silent no-ops. Every higher-level primitive bottoms
    /// out in this bounds rule.
    #[inline]
    pub fn put_pixel(&mut self, p: Point, c: Color) {
        let (x, y) = p.rounded();
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.data[idx..idx + 3].copy_from_slice(&c.channels());
        }
    }

    /// Read a pixel back, or `None` when (x, y) is out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(Color::new(
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
            ))
        } else {
            None
        }
    }

    /// Clear the whole buffer to a solid color.
    pub fn clear(&mut self, c: Color) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&c.channels());
        }
    }

    /// Draw a straight line between two points, endpoints inclusive.
    ///
    /// The segment is clipped to the buffer before stepping: first the x
    /// extent, then the y extent, each pass interpolating the clipped
    /// endpoint back onto the segment. Stepping then walks the dominant
    /// axis (the one with the larger delta) one integer at a time and
    /// derives the other coordinate from the slope, so the line has no gaps
    /// along the dominant axis and one pixel per step.
    pub fn line(&mut self, p1: Point, p2: Point, c: Color) {
        let Some((p1, p2)) = clip_line_x(p1, p2, self.width as f32 - 1.0) else {
            return;
        };
        let Some((p1, p2)) = clip_line_y(p1, p2, self.height as f32 - 1.0) else {
            return;
        };

        let dx = p2.x - p1.x;
        let dy = p2.y - p1.y;
        if dx.abs() > dy.abs() {
            // Wider than tall; the x delta is nonzero here.
            let (a, b) = if p2.x < p1.x { (p2, p1) } else { (p1, p2) };
            let slope = (b.y - a.y) / (b.x - a.x);
            let start = a.x.round() as i32;
            let end = b.x.round() as i32;
            for x in start..=end {
                let y = a.y + (x as f32 - a.x) * slope;
                self.put_pixel(Point::new(x as f32, y), c);
            }
        } else if dy != 0.0 {
            let (a, b) = if p2.y < p1.y { (p2, p1) } else { (p1, p2) };
            let slope = (b.x - a.x) / (b.y - a.y);
            let start = a.y.round() as i32;
            let end = b.y.round() as i32;
            for y in start..=end {
                let x = a.x + (y as f32 - a.y) * slope;
                self.put_pixel(Point::new(x, y as f32), c);
            }
        } else {
            // Degenerate segment: both deltas are zero, emit one pixel.
            self.put_pixel(p1, c);
        }
    }

    /// Fill the rectangle spanned by two corner points, corners inclusive.
    ///
    /// The corners may be given in any order. Fills whole column slices
    /// rather than looping per pixel.
    pub fn fill_rect(&mut self, p1: Point, p2: Point, c: Color) {
        let r = Rect::from_corners(p1.rounded(), p2.rounded());
        let Some(r) = r.intersect(&self.bounds()) else {
            return;
        };
        let span = r.height() as usize * 3;
        for x in r.x0..=r.x1 {
            let start = self.pixel_index(x as u32, r.y0 as u32);
            for px in self.data[start..start + span].chunks_exact_mut(3) {
                px.copy_from_slice(&c.channels());
            }
        }
    }

    /// Copy a texture onto the buffer with its top-left corner at `origin`.
    ///
    /// Color channels are copied verbatim, no blending. Parts of the
    /// texture hanging off any edge are skipped; a fully off-screen origin
    /// leaves the buffer untouched.
    pub fn blit(&mut self, origin: (i32, i32), src: &Texture) {
        let Some(span) = clip_blit(
            origin,
            src.width() as i32,
            src.height() as i32,
            &self.bounds(),
        ) else {
            return;
        };
        let run = span.dest.height() as u32;
        for (i, x) in (span.dest.x0..=span.dest.x1).enumerate() {
            let sx = (span.src_x + i as i32) as u32;
            let col = src.column(sx, span.src_y as u32, run);
            let d0 = self.pixel_index(x as u32, span.dest.y0 as u32);
            self.data[d0..d0 + col.len()].copy_from_slice(col);
        }
    }

    /// Blend a greyscale alpha mask onto the buffer in a solid color.
    ///
    /// Per pixel and channel: `dst = (dst*(255-a) + color*a) / 255` with
    /// truncating division, so a=0 leaves the destination untouched and
    /// a=255 replaces it outright. Clipping matches [`blit`](Self::blit).
    pub fn blit_mask(&mut self, origin: (i32, i32), c: Color, mask: &GlyphMask) {
        let Some(span) = clip_blit(
            origin,
            mask.width() as i32,
            mask.height() as i32,
            &self.bounds(),
        ) else {
            return;
        };
        for (i, x) in (span.dest.x0..=span.dest.x1).enumerate() {
            let sx = (span.src_x + i as i32) as u32;
            for (j, y) in (span.dest.y0..=span.dest.y1).enumerate() {
                let sy = (span.src_y + j as i32) as u32;
                let alpha = mask.alpha(sx, sy) as u16;
                let idx = self.pixel_index(x as u32, y as u32);
                self.data[idx] = blend_channel(self.data[idx], c.r, alpha);
                self.data[idx + 1] = blend_channel(self.data[idx + 1], c.g, alpha);
                self.data[idx + 2] = blend_channel(self.data[idx + 2], c.b, alpha);
            }
        }
    }

    /// Raw column-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Repack the column-major buffer into interleaved row-major RGB, the
    /// layout streaming textures expect. `out` is reused between frames.
    pub fn to_row_major(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.pixel_index(x, y);
                out.extend_from_slice(&self.data[idx..idx + 3]);
            }
        }
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        OPEN.store(false, Ordering::Release);
    }
}
