//! Abstractor configuration.
//!
//! A configuration is validated once, when it is built, and is immutable
//! afterwards. An invalid partition strategy or a contradictory flag
//! combination is rejected before any abstraction work starts.
//!
//! ```
//! use predabs::config::AbstractorConfig;
//!
//! let config = AbstractorConfig::builder()
//!     .partition(2)
//!     .show_cubes(true)
//!     .no_cache()
//!     .build()
//!     .unwrap();
//! assert_eq!(config.strategy().number(), 2);
//! assert!(!config.trans_caching());
//!
//! assert!(AbstractorConfig::builder().partition(9).build().is_err());
//! ```

use crate::error::ConfigError;
use crate::partition::PartitionStrategy;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AbstractorConfig {
    strategy: PartitionStrategy,
    show_cubes: bool,
    use_refinement_clusters: bool,
    relate_init_predicates: bool,
    pred_id_caching: bool,
    init_caching: bool,
    trans_caching: bool,
    abs_init_states: bool,
    verbose: bool,
}

impl AbstractorConfig {
    pub fn builder() -> AbstractorConfigBuilder {
        AbstractorConfigBuilder::new()
    }

    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    pub fn show_cubes(&self) -> bool {
        self.show_cubes
    }

    pub fn use_refinement_clusters(&self) -> bool {
        self.use_refinement_clusters
    }

    pub fn relate_init_predicates(&self) -> bool {
        self.relate_init_predicates
    }

    pub fn pred_id_caching(&self) -> bool {
        self.pred_id_caching
    }

    pub fn init_caching(&self) -> bool {
        self.init_caching
    }

    pub fn trans_caching(&self) -> bool {
        self.trans_caching
    }

    pub fn abs_init_states(&self) -> bool {
        self.abs_init_states
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for AbstractorConfig {
    fn default() -> Self {
        Self {
            strategy: PartitionStrategy::DEFAULT,
            show_cubes: false,
            use_refinement_clusters: false,
            relate_init_predicates: false,
            pred_id_caching: true,
            init_caching: true,
            trans_caching: true,
            abs_init_states: true,
            verbose: false,
        }
    }
}

/// Builder for [`AbstractorConfig`].
///
/// Setters take raw values; nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct AbstractorConfigBuilder {
    partition: u32,
    show_cubes: bool,
    use_refinement_clusters: bool,
    relate_init_predicates: bool,
    pred_id_caching: bool,
    init_caching: bool,
    trans_caching: bool,
    abs_init_states: bool,
    verbose: bool,
}

impl Default for AbstractorConfigBuilder {
    fn default() -> Self {
        let defaults = AbstractorConfig::default();
        Self {
            partition: defaults.strategy.number(),
            show_cubes: defaults.show_cubes,
            use_refinement_clusters: defaults.use_refinement_clusters,
            relate_init_predicates: defaults.relate_init_predicates,
            pred_id_caching: defaults.pred_id_caching,
            init_caching: defaults.init_caching,
            trans_caching: defaults.trans_caching,
            abs_init_states: defaults.abs_init_states,
            verbose: defaults.verbose,
        }
    }
}

impl AbstractorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitioning strategy number, `1..=8`.
    pub fn partition(mut self, strategy: u32) -> Self {
        self.partition = strategy;
        self
    }

    pub fn show_cubes(mut self, value: bool) -> Self {
        self.show_cubes = value;
        self
    }

    pub fn use_refinement_clusters(mut self, value: bool) -> Self {
        self.use_refinement_clusters = value;
        self
    }

    pub fn relate_init_predicates(mut self, value: bool) -> Self {
        self.relate_init_predicates = value;
        self
    }

    pub fn pred_id_caching(mut self, value: bool) -> Self {
        self.pred_id_caching = value;
        self
    }

    pub fn init_caching(mut self, value: bool) -> Self {
        self.init_caching = value;
        self
    }

    pub fn trans_caching(mut self, value: bool) -> Self {
        self.trans_caching = value;
        self
    }

    /// Disable all three cache tables.
    pub fn no_cache(self) -> Self {
        self.pred_id_caching(false)
            .init_caching(false)
            .trans_caching(false)
    }

    pub fn abs_init_states(mut self, value: bool) -> Self {
        self.abs_init_states = value;
        self
    }

    /// Leave the abstract initial states unconstrained.
    pub fn no_init(self) -> Self {
        self.abs_init_states(false)
    }

    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    pub fn build(self) -> Result<AbstractorConfig, ConfigError> {
        let strategy = PartitionStrategy::try_from(self.partition)?;
        if self.relate_init_predicates && !self.abs_init_states {
            return Err(ConfigError::ContradictoryFlags {
                first: "relate_init_predicates",
                second: "noinit",
            });
        }
        Ok(AbstractorConfig {
            strategy,
            show_cubes: self.show_cubes,
            use_refinement_clusters: self.use_refinement_clusters,
            relate_init_predicates: self.relate_init_predicates,
            pred_id_caching: self.pred_id_caching,
            init_caching: self.init_caching,
            trans_caching: self.trans_caching,
            abs_init_states: self.abs_init_states,
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_default() {
        let config = AbstractorConfig::default();
        assert_eq!(config.strategy().number(), 6);
        assert!(config.pred_id_caching() && config.init_caching() && config.trans_caching());
        assert!(config.abs_init_states());
        assert!(!config.show_cubes());
        assert!(!config.use_refinement_clusters());
        assert!(!config.relate_init_predicates());
        assert!(!config.verbose());
        assert_eq!(AbstractorConfig::builder().build(), Ok(config));
    }

    #[test]
    fn test_invalid_strategy() {
        for n in [0, 9, 100] {
            assert_eq!(
                AbstractorConfig::builder().partition(n).build(),
                Err(ConfigError::InvalidPartitionStrategy(n))
            );
        }
    }

    #[test]
    fn test_contradictory_flags() {
        let res = AbstractorConfig::builder()
            .relate_init_predicates(true)
            .no_init()
            .build();
        assert!(matches!(res, Err(ConfigError::ContradictoryFlags { .. })));
    }

    #[test]
    fn test_setters() {
        let config = AbstractorConfig::builder()
            .partition(1)
            .use_refinement_clusters(true)
            .relate_init_predicates(true)
            .init_caching(false)
            .verbose(true)
            .build()
            .unwrap();
        assert_eq!(config.strategy().number(), 1);
        assert!(config.use_refinement_clusters());
        assert!(config.relate_init_predicates());
        assert!(!config.init_caching());
        assert!(config.pred_id_caching());
        assert!(config.verbose());
    }
}
