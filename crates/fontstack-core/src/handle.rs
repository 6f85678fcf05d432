//! Reference-counted font handles
//!
//! A handle is a [`FontKey`] plus a way to ask the atlas about it. It never
//! holds on to the native font itself: every push looks up whatever the atlas
//! currently has for the key, so a rebuild that swaps the font out from under
//! a live handle is invisible to the code holding it.
//!
//! Every clone is an owner. Owners share one atomic count; when the last one
//! is disposed the handle tells the atlas it lost interest, exactly once.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{FontError, FontLoadError, Result};
use crate::popper::FontPopper;
use crate::thread::UiThread;
use crate::traits::{FontAtlas, FontStack};
use crate::types::{FontKey, ResolutionState};

/// State shared by all owners of one handle
struct Shared<F> {
    key: FontKey,
    atlas: Arc<dyn FontAtlas<F>>,
    ui: UiThread,
    owners: AtomicUsize,
}

/// A stable, reference-counted name for a font that may not exist yet
///
/// Safe to share and dispose from any thread. Pushing and raw font access
/// are restricted to the UI thread recorded at creation.
pub struct FontHandle<F> {
    shared: Arc<Shared<F>>,
    disposed: AtomicBool,
}

impl<F> FontHandle<F> {
    /// Create the first owner of a handle and register interest with the atlas
    ///
    /// Called by atlas implementations when a font configuration is added.
    pub fn new(key: FontKey, atlas: Arc<dyn FontAtlas<F>>, ui: UiThread) -> Self {
        atlas.register_interest(key);
        log::debug!("font handle {} registered", key);

        Self {
            shared: Arc::new(Shared {
                key,
                atlas,
                ui,
                owners: AtomicUsize::new(1),
            }),
            disposed: AtomicBool::new(false),
        }
    }

    /// The identity this handle was created with; survives every rebuild
    pub fn key(&self) -> FontKey {
        self.shared.key
    }

    /// The thread allowed to push this handle
    pub fn ui_thread(&self) -> UiThread {
        self.shared.ui
    }

    /// Snapshot of the resolution state, from any thread
    pub fn state(&self) -> ResolutionState {
        self.shared.atlas.state(self.shared.key)
    }

    /// Is the font ready right now?
    ///
    /// Only a snapshot: a rebuild may land between this and the next push,
    /// and [`FontHandle::push`] does its own check.
    pub fn available(&self) -> bool {
        self.state().is_ready()
    }

    /// Why the font failed to load, if it did
    pub fn load_error(&self) -> Option<FontLoadError> {
        self.shared.atlas.load_error(self.shared.key)
    }

    /// Number of live owners across all clones
    pub fn ref_count(&self) -> usize {
        self.shared.owners.load(Ordering::Acquire)
    }

    /// Has this particular owner been disposed?
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Push the current font onto `stack`, if there is one
    ///
    /// Ready fonts are pushed and the returned popper owes one pop. Pending or
    /// failed fonts give a popper that owes nothing, leaving the active font
    /// alone. Load failures never come out of here; see
    /// [`FontHandle::load_error`].
    ///
    /// # Errors
    ///
    /// - [`FontError::ThreadAffinity`] off the UI thread
    /// - [`FontError::Disposed`] if this owner was already disposed
    pub fn push<'a>(&self, stack: &'a dyn FontStack<F>) -> Result<FontPopper<'a, F>> {
        self.shared.ui.check()?;
        self.ensure_live()?;

        let font = self.shared.atlas.current_font(self.shared.key);
        if font.is_none() {
            log::trace!("font {} not ready, nothing pushed", self.shared.key);
        }

        FontPopper::new(self.shared.ui, stack, font.as_ref())
    }

    /// Add another owner
    ///
    /// Fails with [`FontError::Disposed`] once this owner, or the whole
    /// handle, is gone.
    pub fn acquire(&self) -> Result<Self> {
        self.ensure_live()?;

        let mut owners = self.shared.owners.load(Ordering::Acquire);
        loop {
            if owners == 0 {
                return Err(FontError::Disposed(self.shared.key));
            }
            match self.shared.owners.compare_exchange_weak(
                owners,
                owners + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => owners = actual,
            }
        }

        Ok(Self {
            shared: Arc::clone(&self.shared),
            disposed: AtomicBool::new(false),
        })
    }

    /// Give up this owner
    ///
    /// Repeated calls are no-ops. The last owner out releases the atlas
    /// interest so the backing font can be reclaimed on a later rebuild.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let previous = self.shared.owners.fetch_sub(1, Ordering::AcqRel);
        if previous == 1 {
            log::debug!("font handle {} released", self.shared.key);
            self.shared.atlas.release_interest(self.shared.key);
        }
    }

    /// Block a non-UI thread until the atlas settles this font
    ///
    /// Returns the state at the time it stopped waiting, which is still
    /// `Pending` if the timeout ran out first.
    ///
    /// # Errors
    ///
    /// [`FontError::Disposed`] if this owner was already disposed
    pub fn wait(&self, timeout: Duration) -> Result<ResolutionState> {
        self.ensure_live()?;
        Ok(self.shared.atlas.wait_resolved(self.shared.key, timeout))
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(FontError::Disposed(self.shared.key))
        } else {
            Ok(())
        }
    }

    pub(crate) fn atlas(&self) -> &dyn FontAtlas<F> {
        self.shared.atlas.as_ref()
    }
}

impl<F> Clone for FontHandle<F> {
    /// Clone of a live owner is a new owner; clone of a dead one stays dead
    fn clone(&self) -> Self {
        self.acquire().unwrap_or_else(|_| Self {
            shared: Arc::clone(&self.shared),
            disposed: AtomicBool::new(true),
        })
    }
}

impl<F> Drop for FontHandle<F> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<F> fmt::Debug for FontHandle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("key", &self.shared.key)
            .field("owners", &self.ref_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
