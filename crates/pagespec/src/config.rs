//! Reader and validation settings.

use serde::{Deserialize, Serialize};

/// Default tolerance of `~` ranges, in pixels
pub const DEFAULT_APPROXIMATION: f64 = 2.0;

/// Default limit on nested component specs
pub const DEFAULT_MAX_COMPONENT_DEPTH: usize = 8;

/// Settings applied while compiling spec text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Tolerance of approximate ranges (`~ 100px`)
    pub approximation: f64,
    /// Remove sections that end up with no specs
    pub drop_empty_sections: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            approximation: DEFAULT_APPROXIMATION,
            drop_empty_sections: true,
        }
    }
}

impl ReaderConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set approximation tolerance
    #[must_use]
    pub const fn with_approximation(mut self, approximation: f64) -> Self {
        self.approximation = approximation;
        self
    }

    /// Keep or drop empty sections
    #[must_use]
    pub const fn with_drop_empty_sections(mut self, drop: bool) -> Self {
        self.drop_empty_sections = drop;
        self
    }
}

/// Settings applied while validating a compiled spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// How deep `component` specs may nest
    pub max_component_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_component_depth: DEFAULT_MAX_COMPONENT_DEPTH,
        }
    }
}

impl ValidationConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum component nesting
    #[must_use]
    pub const fn with_max_component_depth(mut self, depth: usize) -> Self {
        self.max_component_depth = depth;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.approximation, 2.0);
        assert!(config.drop_empty_sections);
        assert_eq!(ValidationConfig::default().max_component_depth, 8);
    }

    #[test]
    fn test_builders() {
        let config = ReaderConfig::new()
            .with_approximation(5.0)
            .with_drop_empty_sections(false);
        assert_eq!(config.approximation, 5.0);
        assert!(!config.drop_empty_sections);
        assert_eq!(
            ValidationConfig::new()
                .with_max_component_depth(2)
                .max_component_depth,
            2
        );
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: ReaderConfig = serde_json::from_str(r#"{"approximation": 4}"#).unwrap();
        assert_eq!(config.approximation, 4.0);
        assert!(config.drop_empty_sections);
    }
}
