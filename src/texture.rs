//! Decoded images ready for blitting.
//!
//! File decoding is the `image` crate's job; this module only re-orients
//! the decoder's row-major output into the crate's column-major (x, y)
//! convention so the blitter can copy column slices directly.

use std::path::Path;

use crate::color::Color;
use crate::error::GraphicsError;

/// An RGB image stored `[x][y][channel]`, the blit source type.
#[derive(Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Texture {
    /// Create a new black texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 3) as usize],
        }
    }

    /// Create a texture from raw column-major RGB data
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() == (width * height * 3) as usize {
            Some(Self {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    /// Decode an image file into a texture.
    ///
    /// The decoder hands back row-major (row, col) data; it is transposed
    /// here so the rest of the crate never sees that layout.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphicsError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| GraphicsError::Image(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let rows = img.into_raw();
        let mut data = vec![0u8; rows.len()];
        for y in 0..height {
            for x in 0..width {
                let src = ((y * width + x) * 3) as usize;
                let dst = ((x * height + y) * 3) as usize;
                data[dst..dst + 3].copy_from_slice(&rows[src..src + 3]);
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a pixel in the texture (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, c: Color) {
        if x < self.width && y < self.height {
            let idx = ((x * self.height + y) * 3) as usize;
            self.data[idx..idx + 3].copy_from_slice(&c.channels());
        }
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = ((x * self.height + y) * 3) as usize;
            Some(Color::new(self.data[idx], self.data[idx + 1], self.data[idx + 2]))
        } else {
            None
        }
    }

    /// A contiguous run of `len` pixels down column `x` starting at row `y`.
    #[inline]
    pub(crate) fn column(&self, x: u32, y: u32, len: u32) -> &[u8] {
        let start = ((x * self.height + y) * 3) as usize;
        &self.data[start..start + (len * 3) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_validates_length() {
        assert!(Texture::from_rgb(2, 2, vec![0; 12]).is_some());
        assert!(Texture::from_rgb(2, 2, vec![0; 11]).is_none());
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut tex = Texture::new(4, 4);
        tex.set_pixel(1, 2, Color::new(9, 8, 7));
        assert_eq!(tex.get_pixel(1, 2), Some(Color::new(9, 8, 7)));
        assert_eq!(tex.get_pixel(2, 1), Some(Color::BLACK));
        assert_eq!(tex.get_pixel(4, 0), None);
        // Out-of-range writes are dropped.
        tex.set_pixel(4, 0, Color::WHITE);
    }

    #[test]
    fn test_column_run_is_contiguous() {
        let mut tex = Texture::new(2, 3);
        tex.set_pixel(1, 0, Color::new(1, 1, 1));
        tex.set_pixel(1, 1, Color::new(2, 2, 2));
        tex.set_pixel(1, 2, Color::new(3, 3, 3));
        assert_eq!(tex.column(1, 0, 3), &[1, 1, 1, 2, 2, 2, 3, 3, 3]);
        assert_eq!(tex.column(1, 1, 2), &[2, 2, 2, 3, 3, 3]);
    }
}
