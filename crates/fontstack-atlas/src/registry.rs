//! Generational slots holding atlas entries
//!
//! A freed slot bumps its generation, so a stale [`FontKey`] that points at a
//! reused index finds nothing instead of someone else's font.

use fontstack_core::{FontKey, FontLoadError, ResolutionState};

use crate::spec::FontSpec;

/// Where an entry's native font stands
pub(crate) enum Resolution<F> {
    Pending,
    Ready(F),
    Failed(FontLoadError),
}

impl<F> Resolution<F> {
    pub(crate) fn state(&self) -> ResolutionState {
        match self {
            Resolution::Pending => ResolutionState::Pending,
            Resolution::Ready(_) => ResolutionState::Ready,
            Resolution::Failed(_) => ResolutionState::Failed,
        }
    }
}

impl<F> From<Result<F, FontLoadError>> for Resolution<F> {
    fn from(result: Result<F, FontLoadError>) -> Self {
        match result {
            Ok(font) => Resolution::Ready(font),
            Err(err) => Resolution::Failed(err),
        }
    }
}

/// One registered font configuration
pub(crate) struct Entry<F> {
    pub(crate) spec: FontSpec,
    pub(crate) resolution: Resolution<F>,
    /// Live handle groups interested in this entry
    pub(crate) interest: usize,
    /// Set once the first handle registered; unclaimed entries are never reclaimed
    pub(crate) claimed: bool,
}

impl<F> Entry<F> {
    pub(crate) fn new(spec: FontSpec) -> Self {
        Self {
            spec,
            resolution: Resolution::Pending,
            interest: 0,
            claimed: false,
        }
    }

    /// Apply a load result; a failure never replaces a ready font
    ///
    /// Returns false when a failed reload left the ready font in place.
    pub(crate) fn commit(&mut self, result: Result<F, FontLoadError>) -> bool {
        if result.is_err() && matches!(self.resolution, Resolution::Ready(_)) {
            return false;
        }
        self.resolution = result.into();
        true
    }

    /// Somebody holds, or is about to hold, a handle to this entry
    pub(crate) fn is_wanted(&self) -> bool {
        !self.claimed || self.interest > 0
    }
}

struct Slot<F> {
    generation: u32,
    entry: Option<Entry<F>>,
}

pub(crate) struct Registry<F> {
    slots: Vec<Slot<F>>,
    free: Vec<u32>,
    len: usize,
}

impl<F> Registry<F> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, entry: Entry<F>) -> FontKey {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return FontKey::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        FontKey::new(index, 0)
    }

    pub(crate) fn get(&self, key: FontKey) -> Option<&Entry<F>> {
        let slot = self.slots.get(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: FontKey) -> Option<&mut Entry<F>> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.entry.as_mut()
    }

    pub(crate) fn remove(&mut self, key: FontKey) -> Option<Entry<F>> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index());
        self.len -= 1;
        Some(entry)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (FontKey, &Entry<F>)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|entry| (FontKey::new(index as u32, slot.generation), entry))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}
