//! Error type shared across the crate

use thiserror::Error;

/// Errors surfaced by the graphics subsystem.
///
/// Boundary-crossing geometry is never an error: out-of-bounds pixel writes
/// and zero-overlap region operations are silent no-ops. The only illegal
/// call is opening a second pixel buffer while one is live.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// A pixel buffer is already open; close it before opening another.
    #[error("graphics already open, close the current buffer first")]
    AlreadyOpen,

    /// Window, texture, or presentation failure from the display backend.
    #[error("display: {0}")]
    Display(String),

    /// Font file missing, unloadable, or text rasterization failure.
    #[error("font: {0}")]
    Font(String),

    /// Image file missing or undecodable.
    #[error("image: {0}")]
    Image(String),

    /// Configuration file could not be read, written, or parsed.
    #[error("config: {0}")]
    Config(String),
}
