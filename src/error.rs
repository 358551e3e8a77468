//! Error types.
//!
//! Every failure aborts the current abstraction pass: a partial abstraction
//! is never handed to the caller.

use thiserror::Error;

use crate::cache::abstraction::CacheKind;
use crate::predicate::PredId;

/// Invalid abstractor configuration, detected before any work is done.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--partition option takes only 1, 2, 3, 4, 5, 6, 7, 8 as values (got {0})")]
    InvalidPartitionStrategy(u32),
    #[error("contradictory options: {first} conflicts with {second}")]
    ContradictoryFlags {
        first: &'static str,
        second: &'static str,
    },
}

/// Failure of the decision procedure on a single query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("failed to find identifier '{0}'")]
    UnknownSymbol(String),
    #[error("predicate {0} refers to next-state symbols")]
    PrimedPredicate(PredId),
    #[error("decision procedure failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbstractionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("decision procedure failed on cluster {cluster}: {source}")]
    Oracle {
        cluster: String,
        #[source]
        source: OracleError,
    },
    #[error("unknown predicate {id} in {context}")]
    UnknownPredicate { id: PredId, context: &'static str },
    #[error("empty predicate cluster in {context}")]
    EmptyCluster { context: &'static str },
    #[error("predicate {id} occurs in more than one cluster")]
    OverlappingClusters { id: PredId },
    #[error("predicates not covered by any cluster: {ids}")]
    MissingPredicates { ids: String },
    #[error("inconsistent {kind} cache entry for {key}")]
    CacheInconsistency { kind: CacheKind, key: String },
}

pub type Result<T, E = AbstractionError> = std::result::Result<T, E>;
