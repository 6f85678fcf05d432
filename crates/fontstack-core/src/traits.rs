//! The two collaborators a handle talks to
//!
//! - [`FontAtlas`] - Owns native fonts and decides when they are built, rebuilt or freed
//! - [`FontStack`] - The renderer's active-font stack

use std::time::Duration;

use crate::error::FontLoadError;
use crate::types::{FontKey, ResolutionState};

/// The atlas manager as seen from a handle
///
/// Everything is keyed by [`FontKey`]; a handle never keeps a native font
/// across calls, it asks for the current one every time. State and error
/// reads must be safe from any thread. [`FontAtlas::current_font`] is only
/// ever called by handles after they checked they run on the UI thread.
pub trait FontAtlas<F>: Send + Sync {
    /// Where this entry is in its load lifecycle
    fn state(&self, key: FontKey) -> ResolutionState;

    /// The captured failure, present only while the entry is failed
    fn load_error(&self, key: FontKey) -> Option<FontLoadError>;

    /// The native font currently backing this entry, if it is ready
    fn current_font(&self, key: FontKey) -> Option<F>;

    /// A handle for this key came alive
    fn register_interest(&self, key: FontKey);

    /// The last owner of a handle for this key went away
    fn release_interest(&self, key: FontKey);

    /// Block until the entry leaves `Pending` or the timeout runs out
    fn wait_resolved(&self, key: FontKey, _timeout: Duration) -> ResolutionState {
        self.state(key) // Atlases that resolve synchronously have nothing to wait for
    }
}

/// The renderer's LIFO stack of active fonts
///
/// Modelled after an immediate-mode context: methods take `&self` because the
/// stack lives in global render state, not in the value you hold.
///
/// ```ignore
/// struct ImGuiFonts;
///
/// impl FontStack<ImFontPtr> for ImGuiFonts {
///     fn push_font(&self, font: &ImFontPtr) {
///         unsafe { sys::igPushFont(font.raw()) }
///     }
///
///     fn pop_font(&self) {
///         unsafe { sys::igPopFont() }
///     }
/// }
/// ```
pub trait FontStack<F>: Send + Sync {
    /// Make `font` the active font until the matching pop
    fn push_font(&self, font: &F);

    /// Restore whatever font was active before the last push
    fn pop_font(&self);
}
