//! Clusters supplied by refinement.
//!
//! When a counterexample turns out to be spurious, the refinement procedure
//! extracts an unsat core and reports which predicates it correlates. Those
//! predicates must be abstracted together from then on, otherwise the same
//! spurious counterexample reappears. Refinement clusters therefore take
//! precedence over the default partition for every id they cover.

use log::{debug, warn};

use crate::error::{AbstractionError, Result};
use crate::partition::{ClusterOrigin, PredicateCluster};
use crate::predicate::{PredIdSet, Predicates};

/// Append-only store of refinement clusters, kept across iterations.
#[derive(Debug, Clone, Default)]
pub struct RefinementClusters {
    enabled: bool,
    clusters: Vec<PredIdSet>,
}

impl RefinementClusters {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            clusters: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredIdSet> {
        self.clusters.iter()
    }

    /// Record new clusters. Empty and already known clusters are skipped.
    ///
    /// Returns the number of clusters added.
    pub fn ingest(&mut self, clusters: impl IntoIterator<Item = PredIdSet>) -> usize {
        let mut added = 0;
        for cluster in clusters {
            if !self.enabled {
                warn!("Ignoring refinement cluster {}: refinement clusters are disabled", cluster);
                continue;
            }
            if cluster.is_empty() || self.clusters.contains(&cluster) {
                continue;
            }
            debug!("New refinement cluster {}", cluster);
            self.clusters.push(cluster);
            added += 1;
        }
        added
    }

    /// Check that every stored id refers to a registered predicate.
    pub fn validate(&self, predicates: &Predicates) -> Result<()> {
        validate_clusters(&self.clusters, predicates)
    }

    /// The clusters to abstract: the default partition, overridden by the
    /// stored refinement clusters when enabled.
    pub fn effective_clusters(&self, default: Vec<PredicateCluster>) -> Vec<PredicateCluster> {
        if !self.enabled || self.clusters.is_empty() {
            return default;
        }
        merge_clusters(&default, &self.clusters)
    }
}

/// Fail on the first id that is not a registered predicate.
pub fn validate_clusters(clusters: &[PredIdSet], predicates: &Predicates) -> Result<()> {
    for cluster in clusters {
        for id in cluster.iter() {
            if predicates.get(id).is_none() {
                return Err(AbstractionError::UnknownPredicate {
                    id,
                    context: "refinement cluster",
                });
            }
        }
    }
    Ok(())
}

/// Union every group of transitively overlapping sets.
fn union_overlapping(sets: &[PredIdSet]) -> Vec<PredIdSet> {
    let mut merged: Vec<PredIdSet> = Vec::new();
    for set in sets {
        let mut acc = set.clone();
        merged.retain(|other| {
            if other.is_disjoint(&acc) {
                true
            } else {
                acc = acc.union(other);
                false
            }
        });
        merged.push(acc);
    }
    merged
}

/// Merge refinement clusters into a default partition.
///
/// Overlapping refinement clusters are joined. Each default cluster keeps the
/// ids no refinement cluster covers; default clusters left empty are dropped.
/// If `default` partitions a set of ids containing every refinement id, so
/// does the result. Clusters are ordered by their smallest id.
pub fn merge_clusters(
    default: &[PredicateCluster],
    refinement: &[PredIdSet],
) -> Vec<PredicateCluster> {
    let refined = union_overlapping(refinement);
    let covered = refined
        .iter()
        .fold(PredIdSet::new(), |acc, set| acc.union(set));

    let mut result: Vec<PredicateCluster> = refined
        .into_iter()
        .filter(|set| !set.is_empty())
        .map(|set| PredicateCluster::new(set, ClusterOrigin::RefinementSupplied))
        .collect();
    for cluster in default {
        let rest = cluster.ids().difference(&covered);
        if !rest.is_empty() {
            result.push(PredicateCluster::new(rest, cluster.origin()));
        }
    }
    result.sort_by_key(|c| c.ids().first());
    result
}
