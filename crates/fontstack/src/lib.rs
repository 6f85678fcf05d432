//! Fontstack: rebuild-safe font handles for immediate-mode GUIs
//!
//! Widgets hold a [`FontHandle`] and push it every frame. The atlas behind
//! it may still be loading, may have failed, or may have rebuilt the font
//! into a new native object; the widget does not care. Pushes pop on every
//! exit path, and only from the UI thread.
//!
//! - [`fontstack_core`] - Handles, poppers, the UI thread token, collaborator traits
//! - [`fontstack_atlas`] - A managed atlas that issues and resolves handles
//!
//! ```rust
//! use fontstack::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct Depth(AtomicUsize);
//!
//! impl FontStack<u32> for Depth {
//!     fn push_font(&self, _font: &u32) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//!     fn pop_font(&self) {
//!         self.0.fetch_sub(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let atlas = ManagedAtlas::<u32>::new(AtlasConfig::default(), UiThread::current());
//! let title = atlas.add_font(FontSpec::new("Title.ttf", 24.0))?;
//! let stack = Depth::default();
//!
//! // Not built yet: nothing is pushed, the frame keeps its current font
//! {
//!     let _font = title.push(&stack)?;
//!     assert_eq!(stack.0.load(Ordering::SeqCst), 0);
//! }
//!
//! atlas.build(|_spec| Ok(7));
//! {
//!     let _font = title.push(&stack)?;
//!     assert_eq!(stack.0.load(Ordering::SeqCst), 1);
//! }
//! assert_eq!(stack.0.load(Ordering::SeqCst), 0);
//! # Ok::<(), fontstack::FontError>(())
//! ```

pub use fontstack_atlas::{self, AtlasConfig, AtlasStats, BuildReport, FontSpec, ManagedAtlas};
pub use fontstack_core::{
    self, AtlasError, FontAtlas, FontError, FontHandle, FontKey, FontLoadError, FontPopper,
    FontStack, ResolutionState, Result, UiThread,
};

/// Everything a render loop usually needs
pub mod prelude {
    pub use fontstack_atlas::{AtlasConfig, FontSpec, ManagedAtlas};
    pub use fontstack_core::{
        FontError, FontHandle, FontLoadError, FontPopper, FontStack, ResolutionState, UiThread,
    };
}
