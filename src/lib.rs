//! Minimal software rasterizer: clipped 2D drawing primitives on a CPU
//! pixel buffer, presented to an SDL2 window on demand.
//!
//! Conventions, used consistently by every module:
//!
//! - Axes run x rightward, y downward. Positions are (x, y) pairs,
//!   dimensions are ordered (width, height).
//! - Colors are (r, g, b) byte triples.
//! - Bulk pixel arrays are laid out `[x][y][channel]` (column-major).
//! - Pixel centers sit on integer coordinates; the screen covers the
//!   continuous region `[-0.5, width - 0.5) x [-0.5, height - 0.5)`.
//!
//! Drawing happens on a [`PixelBuffer`], the single open frame buffer.
//! Primitives clip themselves against the buffer: coordinates hanging off
//! any edge are dropped or trimmed, never reported as errors. A separate
//! [`Display`] presents the buffer's current contents when asked.

pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod texture;
pub mod util;

pub use color::Color;
pub use config::ScreenConfig;
pub use display::{
    draw_text, Display, FontCache, GlyphMask, GlyphSource, InputEvent, PixelBuffer, RenderTarget,
    TtfGlyphSource, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
pub use error::GraphicsError;
pub use geometry::{Point, Rect};
pub use texture::Texture;
