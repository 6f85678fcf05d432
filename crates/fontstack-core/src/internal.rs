//! Raw font access for the rendering pipeline
//!
//! Widgets should use [`FontHandle::push`]. Renderer internals that need to
//! compose the native font with other stack operations can import
//! [`RawFontAccess`] from here instead.

use crate::error::Result;
use crate::handle::FontHandle;

/// Direct access to the native font behind a handle
pub trait RawFontAccess<F> {
    /// The native font the atlas currently holds for this handle
    ///
    /// UI thread only, like a push. `None` while the font is pending or
    /// failed. Do not keep the result past the current frame: the next
    /// rebuild may replace it.
    fn native_font(&self) -> Result<Option<F>>;
}

impl<F> RawFontAccess<F> for FontHandle<F> {
    fn native_font(&self) -> Result<Option<F>> {
        self.ui_thread().check()?;
        self.ensure_live()?;
        Ok(self.atlas().current_font(self.key()))
    }
}
