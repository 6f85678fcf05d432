//! Error types for fontstack

use std::thread::ThreadId;

use thiserror::Error;

use crate::types::FontKey;

pub type Result<T> = std::result::Result<T, FontError>;

/// Main error type for fontstack
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Font stack accessed off the UI thread: expected {expected:?}, called from {actual:?}")]
    ThreadAffinity { expected: ThreadId, actual: ThreadId },

    #[error("Font handle {0} was already disposed")]
    Disposed(FontKey),

    #[error("Atlas error: {0}")]
    Atlas(#[from] AtlasError),
}

impl FontError {
    /// True for the programming error of touching the font stack off the UI thread
    pub fn is_thread_affinity(&self) -> bool {
        matches!(self, FontError::ThreadAffinity { .. })
    }
}

/// Font loading errors
///
/// Captured once when the atlas resolves an entry and handed out through
/// [`crate::FontHandle::load_error`]. Never raised from a push.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data")]
    InvalidData,

    #[error("Missing glyph range: {0}")]
    MissingGlyphRange(String),

    #[error("Font load failed: {0}")]
    Other(String),
}

/// Atlas bookkeeping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("Atlas is full ({capacity} fonts)")]
    Full { capacity: usize },

    #[error("Unknown font key: {0}")]
    UnknownKey(FontKey),
}
