//! Text rendering support: the glyph rasterizer boundary and the sized-font
//! cache.
//!
//! Glyph rasterization itself is external; this module only talks to it
//! through [`GlyphSource`]. What the crate owns is the calibration problem:
//! callers ask for text of a given *pixel height*, while font files are
//! loaded by *point size*. [`FontCache`] bridges the two with a binary
//! search over the rasterizer's measured height and keeps the results in a
//! bounded LRU cache, because loading and measuring a font is expensive per
//! distinct (name, height) pair while text is drawn every frame at a small
//! set of sizes.

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::ttf::{Font, Sdl2TtfContext};

use crate::color::Color;
use crate::display::pixel_buffer::PixelBuffer;
use crate::error::GraphicsError;

/// Fixed reference string used to measure a font's rendered height. Covers
/// ascenders, descenders, and the diacritics of the Latvian extended range.
pub const REFERENCE_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyzĀāČčĒēĢģĪīĶķĻļŅŠšŪūŽž";

/// Cached sized fonts before least-recently-used eviction kicks in.
const MAX_FONTS: usize = 128;

/// Iteration budget for the point-size search. When the search does not
/// converge exactly the midpoint candidate is used instead.
const POINT_SEARCH_STEPS: u32 = 20;

/// A greyscale alpha mask for one rendered string, column-major `[x][y]`
/// like the pixel buffer. 0 is transparent, 255 fully covers.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GlyphMask {
    /// Build from column-major alpha data. Returns `None` when the data
    /// length does not match the dimensions.
    pub fn from_columns(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() == (width * height) as usize {
            Some(Self {
                width,
                height,
                data,
            })
        } else {
            None
        }
    }

    /// A mask with every cell set to `alpha`.
    pub fn filled(width: u32, height: u32, alpha: u8) -> Self {
        Self {
            width,
            height,
            data: vec![alpha; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at (x, y). Callers stay in bounds; the blitter clips before
    /// sampling.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data[(x * self.height + y) as usize]
    }
}

/// The external glyph rasterizer.
///
/// Implementations load font files at a point size, report the rendered
/// height of [`REFERENCE_ALPHABET`], and rasterize strings into alpha
/// masks. The production implementation is [`TtfGlyphSource`]; tests
/// substitute stubs.
pub trait GlyphSource {
    /// Opaque sized-font handle.
    type Font;

    fn load_font(&self, name: &str, point_size: u16) -> Result<Self::Font, GraphicsError>;

    /// Pixel height of the reference alphabet rendered with `font`.
    fn rendered_height(&self, font: &Self::Font) -> Result<u32, GraphicsError>;

    /// Rasterize `text` into an alpha mask.
    fn render(&self, font: &Self::Font, text: &str) -> Result<GlyphMask, GraphicsError>;
}

type FontKey = (String, u32);

/// Bounded cache of sized-font handles keyed by (font name, pixel height).
///
/// Hits refresh the entry's recency; misses resolve a point size through
/// the source and may evict the least-recently-used entry.
pub struct FontCache<S: GlyphSource> {
    source: S,
    fonts: HashMap<FontKey, S::Font>,
    /// Keys ordered oldest-first; the last entry is the most recent.
    order: Vec<FontKey>,
    capacity: usize,
}

impl<S: GlyphSource> FontCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, MAX_FONTS)
    }

    pub fn with_capacity(source: S, capacity: usize) -> Self {
        Self {
            source,
            fonts: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Fetch the sized font for (`name`, `height` px), resolving and
    /// caching it on first use.
    pub fn get(&mut self, name: &str, height: u32) -> Result<&S::Font, GraphicsError> {
        let key = (name.to_owned(), height);
        if self.fonts.contains_key(&key) {
            self.order.retain(|k| k != &key);
            self.order.push(key.clone());
            return Ok(&self.fonts[&key]);
        }

        let font = self.resolve(name, height)?;
        if self.fonts.len() >= self.capacity {
            if let Some(oldest) = self.order.first().cloned() {
                debug!("font cache full, evicting {}@{}px", oldest.0, oldest.1);
                self.fonts.remove(&oldest);
                self.order.remove(0);
            }
        }
        self.order.push(key.clone());
        self.fonts.insert(key.clone(), font);
        Ok(&self.fonts[&key])
    }

    /// Rasterize `text` at `height` pixels, resolving the font as needed.
    pub fn render(
        &mut self,
        name: &str,
        height: u32,
        text: &str,
    ) -> Result<GlyphMask, GraphicsError> {
        self.get(name, height)?;
        let key = (name.to_owned(), height);
        self.source.render(&self.fonts[&key], text)
    }

    /// Binary search for a point size whose rendered reference-alphabet
    /// height matches `height`, over `[1, 4*height]`. An exact hit returns
    /// early; otherwise the midpoint after the iteration budget is the
    /// accepted approximation.
    fn resolve(&self, name: &str, height: u32) -> Result<S::Font, GraphicsError> {
        debug!("resolving font {} for {}px", name, height);
        let mut lo: u32 = 1;
        let mut hi: u32 = height.saturating_mul(4).clamp(2, u16::MAX as u32);
        for _ in 0..POINT_SEARCH_STEPS {
            let mid = (lo + hi) / 2;
            let font = self.source.load_font(name, mid as u16)?;
            let measured = self.source.rendered_height(&font)?;
            if measured < height {
                lo = mid;
            } else if measured > height {
                hi = mid;
            } else {
                return Ok(font);
            }
        }
        self.source.load_font(name, ((lo + hi) / 2) as u16)
    }
}

/// Render `text` at `height` pixels and blend it into `buffer` with its
/// top-left corner at `origin`.
pub fn draw_text<S: GlyphSource>(
    buffer: &mut PixelBuffer,
    cache: &mut FontCache<S>,
    origin: (i32, i32),
    color: Color,
    text: &str,
    font_name: &str,
    height: u32,
) -> Result<(), GraphicsError> {
    let mask = cache.render(font_name, height, text)?;
    buffer.blit_mask(origin, color, &mask);
    Ok(())
}

/// Glyph rasterizer backed by SDL2_ttf. Fonts are loaded from
/// `<fonts_dir>/<name>.ttf`.
pub struct TtfGlyphSource<'ttf> {
    ttf: &'ttf Sdl2TtfContext,
    fonts_dir: PathBuf,
}

impl<'ttf> TtfGlyphSource<'ttf> {
    pub fn new(ttf: &'ttf Sdl2TtfContext, fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            ttf,
            fonts_dir: fonts_dir.into(),
        }
    }

    fn font_path(&self, name: &str) -> PathBuf {
        self.fonts_dir.join(format!("{}.ttf", name))
    }
}

impl<'ttf> GlyphSource for TtfGlyphSource<'ttf> {
    type Font = Font<'ttf, 'static>;

    fn load_font(&self, name: &str, point_size: u16) -> Result<Self::Font, GraphicsError> {
        self.ttf
            .load_font(self.font_path(name), point_size)
            .map_err(GraphicsError::Font)
    }

    fn rendered_height(&self, font: &Self::Font) -> Result<u32, GraphicsError> {
        let (_, h) = font
            .size_of(REFERENCE_ALPHABET)
            .map_err(|e| GraphicsError::Font(e.to_string()))?;
        Ok(h)
    }

    fn render(&self, font: &Self::Font, text: &str) -> Result<GlyphMask, GraphicsError> {
        if text.is_empty() {
            // SDL_ttf rejects empty strings; an empty mask blits to nothing.
            return Ok(GlyphMask::filled(0, 0, 0));
        }
        let surface = font
            .render(text)
            .blended(SdlColor::RGBA(255, 255, 255, 255))
            .map_err(|e| GraphicsError::Font(e.to_string()))?;
        // Normalize the pixel layout so the alpha channel lands at a known
        // byte offset regardless of what SDL_ttf produced.
        let surface = surface
            .convert_format(PixelFormatEnum::RGBA8888)
            .map_err(GraphicsError::Font)?;
        let (w, h) = (surface.width(), surface.height());
        let pitch = surface.pitch() as usize;
        let mask = surface.with_lock(|pixels| {
            let mut data = vec![0u8; (w * h) as usize];
            for x in 0..w {
                for y in 0..h {
                    // RGBA8888 is packed, so on little-endian the alpha is
                    // byte 0 of each 4-byte pixel.
                    data[(x * h + y) as usize] = pixels[y as usize * pitch + x as usize * 4];
                }
            }
            data
        });
        GlyphMask::from_columns(w, h, mask)
            .ok_or_else(|| GraphicsError::Font("mask size mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stub rasterizer: the font handle is the point size, and the
    /// measured height equals the point size, so the search can hit any
    /// target exactly.
    struct StubSource {
        loads: Rc<Cell<usize>>,
    }

    impl StubSource {
        fn new() -> (Self, Rc<Cell<usize>>) {
            let loads = Rc::new(Cell::new(0));
            (
                Self {
                    loads: Rc::clone(&loads),
                },
                loads,
            )
        }
    }

    impl GlyphSource for StubSource {
        type Font = u16;

        fn load_font(&self, _name: &str, point_size: u16) -> Result<u16, GraphicsError> {
            self.loads.set(self.loads.get() + 1);
            Ok(point_size)
        }

        fn rendered_height(&self, font: &u16) -> Result<u32, GraphicsError> {
            Ok(*font as u32)
        }

        fn render(&self, _font: &u16, text: &str) -> Result<GlyphMask, GraphicsError> {
            Ok(GlyphMask::filled(text.len() as u32, 1, 255))
        }
    }

    /// Measured height is twice the point size, so odd targets can never
    /// match exactly and the search must settle for the midpoint.
    struct DoublingSource;

    impl GlyphSource for DoublingSource {
        type Font = u16;

        fn load_font(&self, _name: &str, point_size: u16) -> Result<u16, GraphicsError> {
            Ok(point_size)
        }

        fn rendered_height(&self, font: &u16) -> Result<u32, GraphicsError> {
            Ok(*font as u32 * 2)
        }

        fn render(&self, _font: &u16, _text: &str) -> Result<GlyphMask, GraphicsError> {
            Ok(GlyphMask::filled(0, 0, 0))
        }
    }

    #[test]
    fn test_search_converges_on_exact_height() {
        let (source, _) = StubSource::new();
        let mut cache = FontCache::new(source);
        let font = cache.get("mono", 16).unwrap();
        assert_eq!(*font, 16);
        let font = cache.get("mono", 100).unwrap();
        assert_eq!(*font, 100);
    }

    #[test]
    fn test_search_budget_returns_closest_candidate() {
        let mut cache = FontCache::new(DoublingSource);
        // Height 15 is unreachable (measured heights are even); the search
        // must still return a candidate instead of failing.
        let font = cache.get("mono", 15).unwrap();
        assert_eq!(*font, 7);
    }

    #[test]
    fn test_hit_skips_resolution() {
        let (source, loads) = StubSource::new();
        let mut cache = FontCache::new(source);
        cache.get("mono", 16).unwrap();
        let after_miss = loads.get();
        cache.get("mono", 16).unwrap();
        assert_eq!(loads.get(), after_miss);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_heights_are_distinct_entries() {
        let (source, _) = StubSource::new();
        let mut cache = FontCache::new(source);
        cache.get("mono", 16).unwrap();
        cache.get("mono", 17).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_eviction_prefers_least_recently_used() {
        let (source, loads) = StubSource::new();
        let mut cache = FontCache::with_capacity(source, 2);
        cache.get("a", 10).unwrap();
        cache.get("b", 10).unwrap();
        // Refresh "a" so "b" becomes the eviction candidate.
        cache.get("a", 10).unwrap();
        cache.get("c", 10).unwrap();
        assert_eq!(cache.len(), 2);

        let before = loads.get();
        cache.get("a", 10).unwrap();
        assert_eq!(loads.get(), before, "a must still be cached");
        cache.get("b", 10).unwrap();
        assert!(loads.get() > before, "b must re-resolve after eviction");
    }

    #[test]
    fn test_129th_key_evicts_oldest_of_128() {
        let (source, loads) = StubSource::new();
        let mut cache = FontCache::new(source);
        for i in 0..128 {
            cache.get(&format!("font{}", i), 12).unwrap();
        }
        assert_eq!(cache.len(), 128);

        // The 129th distinct key pushes out the oldest entry.
        cache.get("font128", 12).unwrap();
        assert_eq!(cache.len(), 128);

        let before = loads.get();
        cache.get("font0", 12).unwrap();
        assert!(loads.get() > before, "font0 was evicted and re-resolves");
    }

    #[test]
    fn test_render_uses_cached_font() {
        let (source, loads) = StubSource::new();
        let mut cache = FontCache::new(source);
        let mask = cache.render("mono", 16, "hello").unwrap();
        assert_eq!(mask.width(), 5);
        let after_first = loads.get();
        cache.render("mono", 16, "again").unwrap();
        assert_eq!(loads.get(), after_first);
    }

    #[test]
    fn test_mask_accessors() {
        let mask = GlyphMask::from_columns(2, 3, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(mask.alpha(0, 0), 0);
        assert_eq!(mask.alpha(0, 2), 2);
        assert_eq!(mask.alpha(1, 0), 3);
        assert!(GlyphMask::from_columns(2, 3, vec![0; 5]).is_none());
    }
}
