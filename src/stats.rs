//! Cluster and cache statistics.

use std::fmt::{Display, Formatter};

use crate::cache::abstraction::{AbstractionCache, CacheKind, CacheTable};
use crate::partition::{PartitionStrategy, PredicateCluster};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CacheStats {
    pub kind: CacheKind,
    pub enabled: bool,
    pub accesses: u64,
    pub hits: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn from_table(table: &CacheTable) -> Self {
        Self {
            kind: table.kind(),
            enabled: table.is_enabled(),
            accesses: table.accesses(),
            hits: table.hits(),
            entries: table.len(),
        }
    }

    /// Fraction of accesses that hit; `0.0` before the first access.
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbstractionStats {
    pub strategy: PartitionStrategy,
    pub num_trans_clusters: usize,
    pub max_trans_cluster_size: usize,
    pub num_init_clusters: usize,
    pub max_init_state_cluster_size: usize,
    pub num_refinement_clusters: usize,
    pub caches: [CacheStats; 3],
}

impl AbstractionStats {
    pub fn new(
        strategy: PartitionStrategy,
        trans_clusters: &[PredicateCluster],
        init_clusters: &[PredicateCluster],
        cache: &AbstractionCache,
    ) -> Self {
        let max_size = |clusters: &[PredicateCluster]| clusters.iter().map(|c| c.len()).max().unwrap_or(0);
        Self {
            strategy,
            num_trans_clusters: trans_clusters.len(),
            max_trans_cluster_size: max_size(trans_clusters),
            num_init_clusters: init_clusters.len(),
            max_init_state_cluster_size: max_size(init_clusters),
            num_refinement_clusters: trans_clusters.iter().filter(|c| c.is_refinement()).count(),
            caches: CacheKind::ALL.map(|kind| CacheStats::from_table(cache.table(kind))),
        }
    }

    pub fn cache(&self, kind: CacheKind) -> &CacheStats {
        match kind {
            CacheKind::PredId => &self.caches[0],
            CacheKind::Init => &self.caches[1],
            CacheKind::Trans => &self.caches[2],
        }
    }
}

impl Display for AbstractionStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "partitioning_strategy: {}", self.strategy)?;
        writeln!(f, "num_trans_clusters: {}", self.num_trans_clusters)?;
        writeln!(f, "max_trans_cluster_size: {}", self.max_trans_cluster_size)?;
        writeln!(f, "num_refinement_clusters: {}", self.num_refinement_clusters)?;
        writeln!(f, "num_init_clusters: {}", self.num_init_clusters)?;
        writeln!(f, "max_init_state_cluster_size: {}", self.max_init_state_cluster_size)?;
        for stats in &self.caches {
            let kind = stats.kind;
            writeln!(f, "{}_cache_num_access: {}", kind, stats.accesses)?;
            writeln!(f, "{}_cache_num_hits: {}", kind, stats.hits)?;
            writeln!(f, "{}_cache_hit_ratio: {:.2}", kind, stats.hit_ratio())?;
            if !stats.enabled {
                writeln!(f, "{}_cache: disabled", kind)?;
            }
        }
        Ok(())
    }
}
