//! Fontstack Core: font handles that survive atlas rebuilds
//!
//! An immediate-mode renderer keeps a stack of active fonts. Many widgets
//! want to say "draw the next bit with this font", but the font they mean may
//! still be loading, may have failed, or may have been rebuilt into a brand
//! new native object since last frame. This crate holds the pieces that make
//! that safe.
//!
//! ## The Pieces
//!
//! - [`FontHandle`] - A reference-counted, rebuild-safe name for a font
//! - [`FontPopper`] - The token a push hands back; dropping it pops exactly once
//! - [`UiThread`] - The one thread allowed to touch the font stack
//! - [`FontAtlas`] / [`FontStack`] - What the handle needs from the outside world
//!
//! ## Pushing a Font
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fontstack_core::{FontAtlas, FontHandle, FontKey, FontStack, UiThread};
//!
//! # fn atlas() -> Arc<dyn FontAtlas<u32>> { unimplemented!() }
//! # struct Stack;
//! # impl FontStack<u32> for Stack {
//! #     fn push_font(&self, _: &u32) {}
//! #     fn pop_font(&self) {}
//! # }
//! let ui = UiThread::current();
//! let handle = FontHandle::new(FontKey::new(0, 0), atlas(), ui);
//! let stack = Stack;
//!
//! {
//!     let _font = handle.push(&stack)?;
//!     // Draw with the font. Not ready yet? The previous font stays active.
//! } // Popped here, on every exit path
//! # Ok::<(), fontstack_core::FontError>(())
//! ```

pub mod error;
pub mod handle;
#[doc(hidden)]
pub mod internal;
pub mod popper;
pub mod thread;
pub mod traits;

pub use error::{AtlasError, FontError, FontLoadError, Result};
pub use handle::FontHandle;
pub use popper::FontPopper;
pub use thread::UiThread;
pub use traits::{FontAtlas, FontStack};
pub use types::{FontKey, ResolutionState};

/// Identity and lifecycle types shared by handles and atlases
pub mod types {
    use std::fmt;

    /// Stable identity of one registered font configuration
    ///
    /// The index names a slot in the atlas; the generation tells a reused
    /// slot apart from the entry that lived there before.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct FontKey {
        index: u32,
        generation: u32,
    }

    impl FontKey {
        pub const fn new(index: u32, generation: u32) -> Self {
            Self { index, generation }
        }

        pub fn index(&self) -> u32 {
            self.index
        }

        pub fn generation(&self) -> u32 {
            self.generation
        }
    }

    impl fmt::Display for FontKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }

    /// Where a font is in its load lifecycle
    ///
    /// Only the atlas moves an entry between states:
    /// `Pending -> Ready | Failed`, `Ready -> Ready` on rebuild,
    /// `Failed -> Pending` on retry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum ResolutionState {
        #[default]
        Pending,
        Ready,
        Failed,
    }

    impl ResolutionState {
        pub fn is_ready(self) -> bool {
            self == ResolutionState::Ready
        }

        /// Has the atlas made up its mind about this entry?
        pub fn is_settled(self) -> bool {
            self != ResolutionState::Pending
        }
    }
}
