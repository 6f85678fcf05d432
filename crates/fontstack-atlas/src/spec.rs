//! What a font configuration looks like to the atlas

use std::fmt;
use std::hash::{Hash, Hasher};

/// One font configuration: where to load it from, how big, which glyphs
///
/// Entries with equal specs share a single loaded font within a build.
#[derive(Clone, Debug)]
pub struct FontSpec {
    source: String,
    size_px: f32,
    glyph_ranges: Vec<(u32, u32)>,
}

impl FontSpec {
    /// A font from `source` (a path or family name) at `size_px` pixels
    pub fn new(source: impl Into<String>, size_px: f32) -> Self {
        Self {
            source: source.into(),
            size_px,
            glyph_ranges: Vec::new(),
        }
    }

    /// Ask for the inclusive codepoint range `start..=end` to be baked in
    pub fn with_glyph_range(mut self, start: u32, end: u32) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.glyph_ranges.push((start, end));
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    /// Requested codepoint ranges; empty means "whatever the loader defaults to"
    pub fn glyph_ranges(&self) -> &[(u32, u32)] {
        &self.glyph_ranges
    }
}

// Sizes compare by bit pattern so specs can key a HashMap
impl PartialEq for FontSpec {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.size_px.to_bits() == other.size_px.to_bits()
            && self.glyph_ranges == other.glyph_ranges
    }
}

impl Eq for FontSpec {}

impl Hash for FontSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.size_px.to_bits().hash(state);
        self.glyph_ranges.hash(state);
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}px", self.source, self.size_px)
    }
}
