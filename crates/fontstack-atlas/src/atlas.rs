// this_file: crates/fontstack-atlas/src/atlas.rs

//! The managed atlas: issues handles, resolves them, reclaims them.
//!
//! Loading happens outside the registry lock, so a slow loader on a
//! background thread never blocks a frame that is busy pushing fonts.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, RwLock};

use fontstack_core::{
    AtlasError, FontAtlas, FontHandle, FontKey, FontLoadError, ResolutionState, UiThread,
};

use crate::config::AtlasConfig;
use crate::registry::{Entry, Registry, Resolution};
use crate::spec::FontSpec;

type Listener = Arc<dyn Fn(FontKey, ResolutionState) + Send + Sync>;

/// What one build or rebuild pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Entries that ended the pass ready
    pub ready: usize,
    /// Loads that failed; a ready entry among them kept its old font
    pub failed: usize,
    /// Entries served from a font another entry in the same pass loaded
    pub shared: usize,
}

/// Snapshot of what the atlas holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasStats {
    pub capacity: usize,
    pub entries: usize,
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
    /// Entries whose last handle is gone, waiting for `reclaim`
    pub reclaimable: usize,
    /// Completed build passes
    pub generation: u64,
}

/// In-memory font atlas handing out [`FontHandle`]s
///
/// The native font type `F` is whatever your renderer pushes: an `ImFontPtr`,
/// an index into a GPU atlas, an `Arc` of glyph data. It is cloned out to the
/// UI thread on every push, so keep it cheap.
pub struct ManagedAtlas<F> {
    config: AtlasConfig,
    ui: UiThread,
    registry: RwLock<Registry<F>>,
    generation: AtomicU64,
    settle_lock: Mutex<()>,
    settled: Condvar,
    listeners: RwLock<Vec<Listener>>,
}

impl<F> ManagedAtlas<F>
where
    F: Clone + Send + Sync + 'static,
{
    /// An empty atlas whose handles may be pushed from `ui`
    pub fn new(config: AtlasConfig, ui: UiThread) -> Arc<Self> {
        Arc::new(Self {
            config,
            ui,
            registry: RwLock::new(Registry::new()),
            generation: AtomicU64::new(0),
            settle_lock: Mutex::new(()),
            settled: Condvar::new(),
            listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn ui_thread(&self) -> UiThread {
        self.ui
    }

    /// Completed build passes so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Register a font configuration and get the first handle to it
    ///
    /// The entry starts out `Pending`; it becomes usable after a
    /// [`ManagedAtlas::build`] or [`ManagedAtlas::resolve`].
    pub fn add_font(self: &Arc<Self>, spec: FontSpec) -> Result<FontHandle<F>, AtlasError> {
        let key = {
            let mut registry = self.registry.write();
            if registry.len() >= self.config.max_fonts {
                return Err(AtlasError::Full {
                    capacity: self.config.max_fonts,
                });
            }
            log::debug!("Adding font {}", spec);
            registry.insert(Entry::new(spec))
        };

        let atlas: Arc<dyn FontAtlas<F>> = self.clone();
        Ok(FontHandle::new(key, atlas, self.ui))
    }

    /// The configuration registered under `key`
    pub fn spec(&self, key: FontKey) -> Option<FontSpec> {
        self.registry.read().get(key).map(|entry| entry.spec.clone())
    }

    /// Commit one load result, e.g. from an async loader
    ///
    /// A successful result on a ready entry swaps the native font in place.
    /// A failure on a ready entry is logged and the old font stays.
    pub fn resolve(&self, key: FontKey, result: Result<F, FontLoadError>) -> Result<(), AtlasError> {
        let state = {
            let mut registry = self.registry.write();
            let entry = registry.get_mut(key).ok_or(AtlasError::UnknownKey(key))?;
            if let Err(err) = &result {
                log::warn!("Font {} ({}) failed to load: {}", key, entry.spec, err);
            }
            if !entry.commit(result) {
                return Ok(());
            }
            entry.resolution.state()
        };

        self.announce(&[(key, state)]);
        Ok(())
    }

    /// Load every pending entry that still has an owner
    ///
    /// Entries sharing a [`FontSpec`] share one call to `loader`. Entries
    /// resolved by someone else while the loader ran are left alone.
    pub fn build(&self, mut loader: impl FnMut(&FontSpec) -> Result<F, FontLoadError>) -> BuildReport {
        let work = self.collect(|entry| {
            entry.is_wanted() && matches!(entry.resolution, Resolution::Pending)
        });
        self.run_pass(work, &mut loader, false)
    }

    /// Reload every pending or ready entry that still has an owner
    ///
    /// Ready entries stay ready throughout and get their native font swapped;
    /// one whose reload fails keeps the font it had.
    /// Failed entries are skipped; [`ManagedAtlas::retry`] them first.
    pub fn rebuild(&self, mut loader: impl FnMut(&FontSpec) -> Result<F, FontLoadError>) -> BuildReport {
        if self.config.reclaim_on_rebuild {
            self.reclaim();
        }

        let work = self.collect(|entry| {
            entry.is_wanted() && !matches!(entry.resolution, Resolution::Failed(_))
        });
        self.run_pass(work, &mut loader, true)
    }

    /// Put a failed entry back in line for the next build
    pub fn retry(&self, key: FontKey) -> Result<bool, AtlasError> {
        self.transition(key, ResolutionState::Failed)
    }

    /// Drop a ready entry's font, e.g. because its file changed on disk
    pub fn invalidate(&self, key: FontKey) -> Result<bool, AtlasError> {
        self.transition(key, ResolutionState::Ready)
    }

    /// Free every entry whose last handle is gone; returns how many
    pub fn reclaim(&self) -> usize {
        let mut registry = self.registry.write();
        let released: Vec<FontKey> = registry
            .iter()
            .filter(|(_, entry)| !entry.is_wanted())
            .map(|(key, _)| key)
            .collect();

        for key in &released {
            if let Some(entry) = registry.remove(*key) {
                log::debug!("Reclaimed font {} ({})", key, entry.spec);
            }
        }

        released.len()
    }

    /// Call `listener` with the key and new state after every committed change
    pub fn on_font_changed(&self, listener: impl Fn(FontKey, ResolutionState) + Send + Sync + 'static) {
        self.listeners.write().push(Arc::new(listener));
    }

    pub fn stats(&self) -> AtlasStats {
        let registry = self.registry.read();
        let mut stats = AtlasStats {
            capacity: self.config.max_fonts,
            entries: registry.len(),
            pending: 0,
            ready: 0,
            failed: 0,
            reclaimable: 0,
            generation: self.generation(),
        };

        for (_, entry) in registry.iter() {
            match entry.resolution.state() {
                ResolutionState::Pending => stats.pending += 1,
                ResolutionState::Ready => stats.ready += 1,
                ResolutionState::Failed => stats.failed += 1,
            }
            if !entry.is_wanted() {
                stats.reclaimable += 1;
            }
        }

        stats
    }

    fn collect(&self, wanted: impl Fn(&Entry<F>) -> bool) -> Vec<(FontKey, FontSpec)> {
        self.registry
            .read()
            .iter()
            .filter(|(_, entry)| wanted(entry))
            .map(|(key, entry)| (key, entry.spec.clone()))
            .collect()
    }

    fn run_pass(
        &self,
        work: Vec<(FontKey, FontSpec)>,
        loader: &mut impl FnMut(&FontSpec) -> Result<F, FontLoadError>,
        overwrite: bool,
    ) -> BuildReport {
        let mut report = BuildReport::default();
        let mut loaded: HashMap<FontSpec, Result<F, FontLoadError>> = HashMap::new();
        let mut results = Vec::with_capacity(work.len());

        for (key, spec) in work {
            let result = match loaded.get(&spec) {
                Some(result) => {
                    report.shared += 1;
                    result.clone()
                }
                None => {
                    let result = loader(&spec);
                    loaded.insert(spec, result.clone());
                    result
                }
            };
            results.push((key, result));
        }

        let mut changed = Vec::with_capacity(results.len());
        {
            let mut registry = self.registry.write();
            for (key, result) in results {
                // Reclaimed while we were loading
                let Some(entry) = registry.get_mut(key) else {
                    continue;
                };
                if !overwrite && entry.resolution.state() != ResolutionState::Pending {
                    continue;
                }

                match &result {
                    Ok(_) => report.ready += 1,
                    Err(err) => {
                        report.failed += 1;
                        log::warn!("Font {} ({}) failed to load: {}", key, entry.spec, err);
                    }
                }
                if entry.commit(result) {
                    changed.push((key, entry.resolution.state()));
                }
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!(
            "Atlas build {} done: {} ready, {} failed, {} shared",
            generation,
            report.ready,
            report.failed,
            report.shared
        );

        self.announce(&changed);
        report
    }

    /// Move `key` back to pending if it is currently in `from`
    fn transition(&self, key: FontKey, from: ResolutionState) -> Result<bool, AtlasError> {
        {
            let mut registry = self.registry.write();
            let entry = registry.get_mut(key).ok_or(AtlasError::UnknownKey(key))?;
            if entry.resolution.state() != from {
                return Ok(false);
            }
            entry.resolution = Resolution::Pending;
        }

        log::debug!("Font {} is pending again", key);
        self.announce(&[(key, ResolutionState::Pending)]);
        Ok(true)
    }

    fn announce(&self, changes: &[(FontKey, ResolutionState)]) {
        if changes.is_empty() {
            return;
        }

        {
            let _guard = self.settle_lock.lock();
            self.settled.notify_all();
        }

        let listeners: Vec<Listener> = self.listeners.read().clone();
        for (key, state) in changes {
            for listener in &listeners {
                listener(*key, *state);
            }
        }
    }
}

impl<F> FontAtlas<F> for ManagedAtlas<F>
where
    F: Clone + Send + Sync + 'static,
{
    fn state(&self, key: FontKey) -> ResolutionState {
        self.registry
            .read()
            .get(key)
            .map_or(ResolutionState::Pending, |entry| entry.resolution.state())
    }

    fn load_error(&self, key: FontKey) -> Option<FontLoadError> {
        match &self.registry.read().get(key)?.resolution {
            Resolution::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    fn current_font(&self, key: FontKey) -> Option<F> {
        match &self.registry.read().get(key)?.resolution {
            Resolution::Ready(font) => Some(font.clone()),
            _ => None,
        }
    }

    fn register_interest(&self, key: FontKey) {
        match self.registry.write().get_mut(key) {
            Some(entry) => {
                entry.claimed = true;
                entry.interest += 1;
            }
            None => log::warn!("Interest registered for unknown font {}", key),
        }
    }

    fn release_interest(&self, key: FontKey) {
        if let Some(entry) = self.registry.write().get_mut(key) {
            entry.interest = entry.interest.saturating_sub(1);
            if entry.interest == 0 {
                log::debug!("Font {} has no handles left", key);
            }
        }
    }

    fn wait_resolved(&self, key: FontKey, timeout: Duration) -> ResolutionState {
        // None means "wait as long as it takes"
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.settle_lock.lock();

        loop {
            // Unknown or reclaimed keys never settle
            let current = self.registry.read().get(key).map(|entry| entry.resolution.state());
            let Some(state) = current else {
                return ResolutionState::Pending;
            };
            if state.is_settled() {
                return state;
            }
            match deadline {
                Some(deadline) => {
                    if self.settled.wait_until(&mut guard, deadline).timed_out() {
                        return self.state(key);
                    }
                }
                None => self.settled.wait(&mut guard),
            }
        }
    }
}

impl<F> fmt::Debug for ManagedAtlas<F>
where
    F: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedAtlas")
            .field("config", &self.config)
            .field("ui", &self.ui)
            .field("stats", &self.stats())
            .finish()
    }
}
