//! The atlas side of fontstack handles
//!
//! [`ManagedAtlas`] is the manager that `fontstack-core` handles talk to. It
//! registers font configurations, hands out handles, runs builds and
//! rebuilds through a loader you supply, and frees entries once nobody holds
//! a handle to them any more.
//!
//! ```rust
//! use fontstack_atlas::{AtlasConfig, FontSpec, ManagedAtlas};
//! use fontstack_core::UiThread;
//!
//! let atlas = ManagedAtlas::<u32>::new(AtlasConfig::from_env(), UiThread::current());
//! let body = atlas.add_font(FontSpec::new("NotoSans-Regular.ttf", 16.0))?;
//! assert!(!body.available());
//!
//! atlas.build(|_spec| Ok(1));
//! assert!(body.available());
//! # Ok::<(), fontstack_core::AtlasError>(())
//! ```

pub mod atlas;
pub mod config;
mod registry;
pub mod spec;

pub use atlas::{AtlasStats, BuildReport, ManagedAtlas};
pub use config::AtlasConfig;
pub use spec::FontSpec;
