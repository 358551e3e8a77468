//! Per-cluster abstraction, through the cache.
//!
//! Every relation is looked up first; only on a miss is the decision
//! procedure queried, and its answer is stored before it is returned.
//!
//! | Relation | Table | Key |
//! |----------|-------|-----|
//! | initial states of a cluster | `init` | `Set(ids)` |
//! | initial states of two clusters jointly | `init` | `Pair(a, b)` |
//! | transitions of a default cluster | `trans` | `Pair(ids, ids)` |
//! | transitions of a refinement cluster | `pred_id` | `Pair(ids, ids)` |

use log::{debug, Level};

use crate::cache::abstraction::{AbstractionCache, CacheKey, CacheKind};
use crate::cube::CubeSet;
use crate::error::{AbstractionError, OracleError, Result};
use crate::message::MessageHandler;
use crate::oracle::{DecisionProcedure, QueryContext};
use crate::partition::PredicateCluster;
use crate::predicate::{PredIdSet, Predicate, Predicates};

pub struct ClusterCalculator<'a> {
    oracle: &'a mut dyn DecisionProcedure,
    ctx: QueryContext<'a>,
    predicates: &'a Predicates,
    cache: &'a mut AbstractionCache,
    handler: &'a dyn MessageHandler,
    show_cubes: bool,
    verbose: bool,
}

impl<'a> ClusterCalculator<'a> {
    pub fn new(
        oracle: &'a mut dyn DecisionProcedure,
        ctx: QueryContext<'a>,
        predicates: &'a Predicates,
        cache: &'a mut AbstractionCache,
        handler: &'a dyn MessageHandler,
    ) -> Self {
        Self {
            oracle,
            ctx,
            predicates,
            cache,
            handler,
            show_cubes: false,
            verbose: false,
        }
    }

    /// Write every returned relation to the message handler.
    pub fn show_cubes(mut self, value: bool) -> Self {
        self.show_cubes = value;
        self
    }

    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    fn resolve(&self, ids: &PredIdSet, context: &'static str) -> Result<Vec<&'a Predicate>> {
        if ids.is_empty() {
            return Err(AbstractionError::EmptyCluster { context });
        }
        ids.iter()
            .map(|id| {
                self.predicates
                    .get(id)
                    .ok_or(AbstractionError::UnknownPredicate { id, context })
            })
            .collect()
    }

    fn cached<F>(&mut self, kind: CacheKind, key: CacheKey, query: F) -> Result<CubeSet>
    where
        F: FnOnce(&mut dyn DecisionProcedure, &QueryContext<'_>) -> Result<CubeSet, OracleError>,
    {
        let ctx = self.ctx;
        let oracle = &mut *self.oracle;
        let label = key.to_string();
        let table = self.cache.table_mut(kind);
        let hits = table.hits();
        let cubes = table.get_or_compute(key, || {
            query(oracle, &ctx).map_err(|source| AbstractionError::Oracle {
                cluster: label.clone(),
                source,
            })
        })?;

        let level = if self.verbose { Level::Info } else { Level::Debug };
        let origin = if table.hits() > hits { "cached" } else { "computed" };
        log::log!(
            level,
            "{} {}: {} cubes, {} literals ({})",
            kind,
            label,
            cubes.len(),
            cubes.num_literals(),
            origin
        );
        if self.show_cubes {
            self.handler
                .message(Level::Info, &format!("{} cubes for {}:\n{}", kind, label, cubes));
        }
        Ok(cubes)
    }

    /// Abstract initial states of one cluster.
    pub fn compute_initial(&mut self, cluster: &PredicateCluster) -> Result<CubeSet> {
        let preds = self.resolve(cluster.ids(), "initial-state cluster")?;
        let key = CacheKey::Set(cluster.ids().clone());
        self.cached(CacheKind::Init, key, |oracle, ctx| {
            oracle.initial_cubes(ctx, &preds)
        })
    }

    /// Abstract transition relation of one cluster.
    pub fn compute_transition(&mut self, cluster: &PredicateCluster) -> Result<CubeSet> {
        let preds = self.resolve(cluster.ids(), "transition cluster")?;
        let kind = if cluster.is_refinement() {
            CacheKind::PredId
        } else {
            CacheKind::Trans
        };
        let key = CacheKey::Pair(cluster.ids().clone(), cluster.ids().clone());
        self.cached(kind, key, |oracle, ctx| oracle.transition_cubes(ctx, &preds))
    }

    /// Joint initial states of two clusters.
    pub fn relate_initial(
        &mut self,
        a: &PredicateCluster,
        b: &PredicateCluster,
    ) -> Result<CubeSet> {
        let mut preds = self.resolve(a.ids(), "initial-state cluster")?;
        preds.extend(self.resolve(b.ids(), "initial-state cluster")?);
        debug!("Relating initial states of {} and {}", a, b);
        let key = CacheKey::Pair(a.ids().clone(), b.ids().clone());
        self.cached(CacheKind::Init, key, |oracle, ctx| {
            oracle.initial_cubes(ctx, &preds)
        })
    }
}
