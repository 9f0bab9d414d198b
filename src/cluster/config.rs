//! Configuration for a master/worker cluster run.

use crate::search::FragmentConfig;

/// Configuration for cluster execution.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Fragments handed to a worker per batch (the worker queue size).
    pub batch_size: usize,
    /// How far the master expands each seed before distributing.
    pub fragments: FragmentConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            batch_size: 8,
            fragments: FragmentConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Set the number of workers (at least one).
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    /// Set the number of workers from an Option, keeping the default on None.
    pub fn with_workers_option(self, num_workers: Option<usize>) -> Self {
        match num_workers {
            Some(n) => self.with_workers(n),
            None => self,
        }
    }

    /// Set the batch size (at least one).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_fragments(mut self, fragments: FragmentConfig) -> Self {
        self.fragments = fragments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClusterConfig::default();
        assert!(config.num_workers >= 1);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.fragments, FragmentConfig::default());
    }

    #[test]
    fn test_config_builder() {
        let config = ClusterConfig::default()
            .with_workers(4)
            .with_batch_size(2)
            .with_fragments(FragmentConfig::default().with_levels(2));

        assert_eq!(config.num_workers, 4);
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.fragments.levels, 2);
    }

    #[test]
    fn test_minimums() {
        let config = ClusterConfig::default().with_workers(0).with_batch_size(0);
        assert_eq!(config.num_workers, 1);
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn test_workers_option() {
        let config = ClusterConfig::default().with_workers_option(Some(3));
        assert_eq!(config.num_workers, 3);
        let config = ClusterConfig::default().with_workers_option(None);
        assert_eq!(config.num_workers, num_cpus::get().max(1));
    }
}
