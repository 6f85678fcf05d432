//! Scoped pop obligations for the font stack

// this_file: crates/fontstack-core/src/popper.rs

use std::fmt;

use crate::error::Result;
use crate::thread::UiThread;
use crate::traits::FontStack;

/// What [`crate::FontHandle::push`] hands back
///
/// Owes the font stack zero or one pops. Dropping it, or calling
/// [`FontPopper::dispose`], pays the debt; paying twice pays nothing. A popper
/// for a font that was not ready owes nothing, so callers can hold one
/// unconditionally.
///
/// Nested poppers must be released in reverse order of creation. Scopes do
/// this for you; explicit out-of-order disposal leaves the stack in whatever
/// state the renderer makes of it.
#[must_use = "dropping the popper immediately pops the font again"]
pub struct FontPopper<'a, F> {
    ui: UiThread,
    stack: Option<&'a dyn FontStack<F>>,
    pending: u32,
}

impl<'a, F> FontPopper<'a, F> {
    /// Push `font` when there is one, otherwise owe nothing
    pub(crate) fn new(ui: UiThread, stack: &'a dyn FontStack<F>, font: Option<&F>) -> Result<Self> {
        let Some(font) = font else {
            return Ok(Self::noop(ui));
        };

        ui.check()?;
        stack.push_font(font);
        log::trace!("font pushed");

        Ok(Self {
            ui,
            stack: Some(stack),
            pending: 1,
        })
    }

    pub(crate) fn noop(ui: UiThread) -> Self {
        Self {
            ui,
            stack: None,
            pending: 0,
        }
    }

    /// Pops still owed to the stack: 0 or 1
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// True when this popper never pushed anything
    pub fn is_noop(&self) -> bool {
        self.stack.is_none()
    }

    /// Pop whatever is still owed
    ///
    /// Off the UI thread this fails without touching the stack and keeps the
    /// debt, so a later call from the right thread still settles it.
    pub fn dispose(&mut self) -> Result<()> {
        self.ui.check()?;

        while self.pending > 0 {
            self.pending -= 1;
            if let Some(stack) = self.stack {
                stack.pop_font();
                log::trace!("font popped");
            }
        }

        Ok(())
    }
}

impl<F> Drop for FontPopper<'_, F> {
    fn drop(&mut self) {
        // Nothing owed, nothing to touch from whichever thread this is
        if self.pending == 0 {
            return;
        }
        if let Err(err) = self.dispose() {
            log::error!(
                "font popper dropped with {} pending pop(s): {}",
                self.pending,
                err
            );
        }
    }
}

impl<F> fmt::Debug for FontPopper<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontPopper")
            .field("ui", &self.ui)
            .field("pending", &self.pending)
            .finish()
    }
}
