//! Atlas configuration
//!
//! Defaults suit a typical UI with a few dozen font configurations. Two
//! environment variables override them at startup:
//!
//! - `FONTSTACK_MAX_FONTS` - how many live entries the atlas accepts
//! - `FONTSTACK_RECLAIM` - whether `rebuild` drops released entries first
//!
//! ```bash
//! FONTSTACK_MAX_FONTS=64 FONTSTACK_RECLAIM=off ./my_app
//! ```

/// Environment variable overriding [`AtlasConfig::max_fonts`]
pub const MAX_FONTS_VAR: &str = "FONTSTACK_MAX_FONTS";

/// Environment variable overriding [`AtlasConfig::reclaim_on_rebuild`]
pub const RECLAIM_VAR: &str = "FONTSTACK_RECLAIM";

const DEFAULT_MAX_FONTS: usize = 256;

/// How a [`crate::ManagedAtlas`] manages its entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Upper bound on live entries, released-but-unreclaimed ones included
    pub max_fonts: usize,
    /// Drop entries nobody holds a handle to before each rebuild
    pub reclaim_on_rebuild: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_fonts: DEFAULT_MAX_FONTS,
            reclaim_on_rebuild: true,
        }
    }
}

impl AtlasConfig {
    /// Defaults, overridden by the environment where set
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AtlasConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_FONTS_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(max_fonts) if max_fonts > 0 => config.max_fonts = max_fonts,
                _ => log::warn!("Ignoring {}={:?}: expected a positive integer", MAX_FONTS_VAR, raw),
            }
        }

        if let Some(raw) = lookup(RECLAIM_VAR) {
            match parse_switch(&raw) {
                Some(enabled) => config.reclaim_on_rebuild = enabled,
                None => log::warn!("Ignoring {}={:?}: expected on/off", RECLAIM_VAR, raw),
            }
        }

        log::debug!("Atlas config: {:?}", config);
        config
    }

    pub fn with_max_fonts(mut self, max_fonts: usize) -> Self {
        self.max_fonts = max_fonts.max(1);
        self
    }

    pub fn with_reclaim_on_rebuild(mut self, enabled: bool) -> Self {
        self.reclaim_on_rebuild = enabled;
        self
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(AtlasConfig::from_lookup(lookup(&[])), AtlasConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = AtlasConfig::from_lookup(lookup(&[
            (MAX_FONTS_VAR, " 12 "),
            (RECLAIM_VAR, "Off"),
        ]));
        assert_eq!(config.max_fonts, 12);
        assert!(!config.reclaim_on_rebuild);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = AtlasConfig::from_lookup(lookup(&[
            (MAX_FONTS_VAR, "0"),
            (RECLAIM_VAR, "sometimes"),
        ]));
        assert_eq!(config, AtlasConfig::default());
    }

    #[test]
    fn test_builder_clamps_capacity() {
        let config = AtlasConfig::default().with_max_fonts(0);
        assert_eq!(config.max_fonts, 1);
    }
}
