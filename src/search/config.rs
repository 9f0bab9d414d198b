//! Configuration types for fragment expansion

/// Limits for breadth-first fragment expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentConfig {
    /// Maximum number of frontier cells to fix (one per level)
    pub levels: usize,
    /// Stop expanding once the queue holds at least this many fragments
    pub target_fragments: usize,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            levels: 3,
            target_fragments: 100,
        }
    }
}

impl FragmentConfig {
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_target_fragments(mut self, target: usize) -> Self {
        self.target_fragments = target.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FragmentConfig::default();
        assert_eq!(config.levels, 3);
        assert_eq!(config.target_fragments, 100);
    }

    #[test]
    fn test_config_builder() {
        let config = FragmentConfig::default()
            .with_levels(5)
            .with_target_fragments(0);
        assert_eq!(config.levels, 5);
        assert_eq!(config.target_fragments, 1);
    }
}
