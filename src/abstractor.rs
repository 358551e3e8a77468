//! The abstraction step of the CEGAR loop.
//!
//! An [`Abstractor`] lives for a whole verification run. Each refinement
//! iteration calls [`Abstractor::calc_abstraction`] with the grown predicate
//! set; cluster relations computed in earlier iterations are served from the
//! cache as long as their clusters reappear unchanged.
//!
//! One pass:
//!
//! 1. record the new refinement clusters (when enabled) and validate them,
//! 2. partition the predicates; refinement clusters override the default
//!    partition for the transition relation,
//! 3. compute every cluster's transition relation and, unless disabled, its
//!    initial states,
//! 4. optionally relate the initial states of every pair of clusters,
//! 5. combine the relations into an [`AbstractTransitionSystem`].
//!
//! A failing pass returns the error and leaves the previous abstraction in
//! place.

use std::io::Write;

use log::{debug, info, Level};

use crate::cache::abstraction::AbstractionCache;
use crate::calculator::ClusterCalculator;
use crate::combine::{self, AbstractTransitionSystem, AbstractVariable, InitRelation};
use crate::concrete::ConcreteTrans;
use crate::config::AbstractorConfig;
use crate::error::Result;
use crate::message::{LogHandler, MessageHandler};
use crate::namespace::Namespace;
use crate::network::NetworkInfo;
use crate::oracle::{DecisionProcedure, QueryContext};
use crate::partition::{partition, PredicateCluster};
use crate::predicate::{PredIdSet, Predicates};
use crate::refinement::{validate_clusters, RefinementClusters};
use crate::stats::AbstractionStats;

pub struct Abstractor {
    config: AbstractorConfig,
    cache: AbstractionCache,
    refinement: RefinementClusters,
    handler: Box<dyn MessageHandler>,
    abstraction: Option<AbstractTransitionSystem>,
    trans_clusters: Vec<PredicateCluster>,
    init_clusters: Vec<PredicateCluster>,
    passes: u64,
}

impl Abstractor {
    pub fn new(config: AbstractorConfig) -> Self {
        Self {
            cache: AbstractionCache::new(
                config.pred_id_caching(),
                config.init_caching(),
                config.trans_caching(),
            ),
            refinement: RefinementClusters::new(config.use_refinement_clusters()),
            handler: Box::new(LogHandler),
            abstraction: None,
            trans_clusters: Vec::new(),
            init_clusters: Vec::new(),
            passes: 0,
            config,
        }
    }

    /// Send diagnostics to `handler` instead of the logger.
    pub fn with_handler(mut self, handler: impl MessageHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn config(&self) -> &AbstractorConfig {
        &self.config
    }

    /// Compute the abstraction of `system` with respect to `predicates`.
    ///
    /// `system` and the meaning of every predicate id must stay the same for
    /// the lifetime of the abstractor, since cached relations are reused.
    pub fn calc_abstraction(
        &mut self,
        oracle: &mut dyn DecisionProcedure,
        predicates: &Predicates,
        system: &ConcreteTrans,
        ns: &Namespace,
        network: &NetworkInfo,
        new_refinement_clusters: impl IntoIterator<Item = PredIdSet>,
    ) -> Result<&AbstractTransitionSystem> {
        let new_clusters: Vec<PredIdSet> = new_refinement_clusters.into_iter().collect();
        validate_clusters(&new_clusters, predicates)?;
        self.refinement.ingest(new_clusters);
        self.refinement.validate(predicates)?;

        let default = partition(predicates, self.config.strategy(), system, network);
        let init_clusters = if self.config.abs_init_states() {
            default.clone()
        } else {
            Vec::new()
        };
        let trans_clusters = self.refinement.effective_clusters(default);
        debug!(
            "Pass {}: {} predicates, {} transition clusters, {} initial-state clusters",
            self.passes + 1,
            predicates.len(),
            trans_clusters.len(),
            init_clusters.len()
        );

        let ctx = QueryContext { system, ns };
        let mut calc = ClusterCalculator::new(
            oracle,
            ctx,
            predicates,
            &mut self.cache,
            self.handler.as_ref(),
        )
        .show_cubes(self.config.show_cubes())
        .verbose(self.config.verbose());

        let mut transitions = Vec::with_capacity(trans_clusters.len());
        for cluster in &trans_clusters {
            let cubes = calc.compute_transition(cluster)?;
            transitions.push((cluster.clone(), cubes));
        }

        let mut initial = Vec::with_capacity(init_clusters.len());
        for cluster in &init_clusters {
            let cubes = calc.compute_initial(cluster)?;
            initial.push((cluster.clone(), cubes));
        }

        let mut init_relations = Vec::new();
        if self.config.relate_init_predicates() {
            for (i, a) in init_clusters.iter().enumerate() {
                for b in &init_clusters[i + 1..] {
                    let cubes = calc.relate_initial(a, b)?;
                    init_relations.push(InitRelation {
                        first: a.ids().clone(),
                        second: b.ids().clone(),
                        cubes,
                    });
                }
            }
        }

        let ats = combine::combine(
            combine::abstract_variables(predicates),
            transitions,
            initial,
            init_relations,
            self.config.abs_init_states(),
        )?;

        self.passes += 1;
        let level = if self.config.verbose() {
            Level::Info
        } else {
            Level::Debug
        };
        self.handler.message(
            level,
            &format!(
                "Abstraction pass {} done: {} transition clusters, {} initial-state clusters",
                self.passes,
                trans_clusters.len(),
                init_clusters.len()
            ),
        );
        self.trans_clusters = trans_clusters;
        self.init_clusters = init_clusters;
        let ats: &AbstractTransitionSystem = self.abstraction.insert(ats);
        Ok(ats)
    }

    /// The result of the last successful pass.
    pub fn abstraction(&self) -> Option<&AbstractTransitionSystem> {
        self.abstraction.as_ref()
    }

    pub fn abstract_variables(&self, predicates: &Predicates) -> Vec<AbstractVariable> {
        combine::abstract_variables(predicates)
    }

    /// Number of successful passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn trans_clusters(&self) -> &[PredicateCluster] {
        &self.trans_clusters
    }

    pub fn init_clusters(&self) -> &[PredicateCluster] {
        &self.init_clusters
    }

    pub fn refinement_clusters(&self) -> &RefinementClusters {
        &self.refinement
    }

    pub fn cache(&self) -> &AbstractionCache {
        &self.cache
    }

    pub fn stats(&self) -> AbstractionStats {
        AbstractionStats::new(
            self.config.strategy(),
            &self.trans_clusters,
            &self.init_clusters,
            &self.cache,
        )
    }

    pub fn out_stats(&self, out: &mut impl Write) -> std::io::Result<()> {
        let stats = self.stats();
        info!(
            "Abstraction stats after {} passes: {} transition clusters",
            self.passes, stats.num_trans_clusters
        );
        write!(out, "{}", stats)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::cache::abstraction::CacheKind;
    use crate::error::{AbstractionError, ConfigError};
    use crate::expr::Expr;
    use crate::message::BufferHandler;
    use crate::oracle::BddOracle;
    use crate::predicate::PredId;

    struct Model {
        system: ConcreteTrans,
        ns: Namespace,
        network: NetworkInfo,
    }

    /// Three independent toggling bits.
    fn model() -> Model {
        let names = ["a", "b", "c"];
        let system = ConcreteTrans::from_latches(names.map(|n| (n, Some(false), !Expr::var(n))));
        let mut ns = Namespace::new();
        for n in names {
            ns.add_latch(n);
        }
        Model {
            system,
            ns,
            network: NetworkInfo::new(),
        }
    }

    fn predicates(names: &[&str]) -> Predicates {
        let mut preds = Predicates::new();
        for n in names {
            preds.add(Expr::var(*n));
        }
        preds
    }

    #[test]
    fn test_singleton_partition() {
        let m = model();
        let preds = predicates(&["a", "b", "c"]);
        let config = AbstractorConfig::builder().partition(1).build().unwrap();
        let mut abstractor = Abstractor::new(config);
        let mut oracle = BddOracle::new();

        let ats = abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert_eq!(ats.transitions().len(), 3);
        let clusters: Vec<_> = abstractor
            .trans_clusters()
            .iter()
            .map(|c| c.ids().clone())
            .collect();
        assert_eq!(
            clusters,
            vec![
                PredIdSet::from([0]),
                PredIdSet::from([1]),
                PredIdSet::from([2])
            ]
        );
    }

    #[test]
    fn test_second_pass_hits_cache() {
        let m = model();
        let preds = predicates(&["a", "b", "c"]);
        let mut abstractor = Abstractor::new(AbstractorConfig::default());
        let mut oracle = BddOracle::new();

        abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        let queries = oracle.queries();
        abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert_eq!(oracle.queries(), queries);
        assert_eq!(abstractor.passes(), 2);

        let stats = abstractor.stats();
        let trans = stats.cache(CacheKind::Trans);
        assert_eq!(trans.accesses, 2 * stats.num_trans_clusters as u64);
        assert_eq!(trans.hits, stats.num_trans_clusters as u64);
    }

    #[test]
    fn test_growing_predicates_reuse_clusters() {
        let m = model();
        let mut abstractor = Abstractor::new(AbstractorConfig::builder().partition(1).build().unwrap());
        let mut oracle = BddOracle::new();

        let preds = predicates(&["a", "b"]);
        abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        let preds = predicates(&["a", "b", "c"]);
        let ats = abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert_eq!(ats.num_variables(), 3);

        let trans = abstractor.cache().table(CacheKind::Trans);
        assert_eq!((trans.accesses(), trans.hits()), (5, 2));
    }

    #[test]
    fn test_refinement_clusters_override() {
        let m = model();
        let preds = predicates(&["a", "b", "c"]);
        let config = AbstractorConfig::builder()
            .partition(1)
            .use_refinement_clusters(true)
            .build()
            .unwrap();
        let mut abstractor = Abstractor::new(config);
        let mut oracle = BddOracle::new();

        abstractor
            .calc_abstraction(
                &mut oracle,
                &preds,
                &m.system,
                &m.ns,
                &m.network,
                [PredIdSet::from([0, 2])],
            )
            .unwrap();
        let clusters = abstractor.trans_clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].ids(), &PredIdSet::from([0, 2]));
        assert!(clusters[0].is_refinement());
        assert_eq!(abstractor.init_clusters().len(), 3);
        assert_eq!(abstractor.cache().table(CacheKind::PredId).len(), 1);

        // The stored cluster keeps applying on later passes.
        abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert_eq!(abstractor.refinement_clusters().len(), 1);
        assert_eq!(abstractor.cache().table(CacheKind::PredId).hits(), 1);
    }

    #[test]
    fn test_unknown_refinement_id_fails() {
        let m = model();
        let preds = predicates(&["a"]);
        let config = AbstractorConfig::builder()
            .use_refinement_clusters(true)
            .build()
            .unwrap();
        let mut abstractor = Abstractor::new(config);
        let mut oracle = BddOracle::new();

        let err = abstractor
            .calc_abstraction(
                &mut oracle,
                &preds,
                &m.system,
                &m.ns,
                &m.network,
                [PredIdSet::from([0, 4])],
            )
            .unwrap_err();
        assert_eq!(
            err,
            AbstractionError::UnknownPredicate {
                id: PredId::new(4),
                context: "refinement cluster",
            }
        );
        assert!(abstractor.refinement_clusters().is_empty());
        assert!(abstractor.abstraction().is_none());
        assert_eq!(oracle.queries(), 0);
    }

    #[test]
    fn test_failure_keeps_previous_abstraction() {
        let m = model();
        let mut abstractor = Abstractor::new(AbstractorConfig::default());
        let mut oracle = BddOracle::new();

        let preds = predicates(&["a"]);
        abstractor
            .calc_abstraction(&mut oracle, &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();

        let bad = predicates(&["a", "nowhere"]);
        let err = abstractor
            .calc_abstraction(&mut oracle, &bad, &m.system, &m.ns, &m.network, [])
            .unwrap_err();
        assert!(matches!(err, AbstractionError::Oracle { .. }));
        assert_eq!(abstractor.passes(), 1);
        assert_eq!(abstractor.abstraction().map(|a| a.num_variables()), Some(1));
    }

    #[test]
    fn test_no_init_and_relate_init() {
        let m = model();
        let preds = predicates(&["a", "b", "c"]);

        let config = AbstractorConfig::builder().partition(1).no_init().build().unwrap();
        let mut abstractor = Abstractor::new(config);
        let ats = abstractor
            .calc_abstraction(&mut BddOracle::new(), &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert!(!ats.init_computed());
        assert_eq!(abstractor.cache().table(CacheKind::Init).accesses(), 0);

        let config = AbstractorConfig::builder()
            .partition(1)
            .relate_init_predicates(true)
            .build()
            .unwrap();
        let mut abstractor = Abstractor::new(config);
        let ats = abstractor
            .calc_abstraction(&mut BddOracle::new(), &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();
        assert_eq!(ats.init_relations().len(), 3);
        // Three single-cluster entries plus three pair entries.
        assert_eq!(abstractor.cache().table(CacheKind::Init).len(), 6);
    }

    #[test]
    fn test_show_cubes_goes_to_handler() {
        let m = model();
        let preds = predicates(&["a", "b"]);
        let config = AbstractorConfig::builder()
            .partition(1)
            .show_cubes(true)
            .build()
            .unwrap();
        let buffer = BufferHandler::new();
        let mut abstractor = Abstractor::new(config).with_handler(buffer.clone());
        abstractor
            .calc_abstraction(&mut BddOracle::new(), &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();

        let texts = buffer.texts();
        // 2 transition relations, 2 initial-state sets, 1 summary.
        assert_eq!(texts.len(), 5);
        assert!(texts[0].starts_with("trans cubes for ({b0}, {b0}):\n"));
        assert!(texts[2].starts_with("init cubes for {b0}:\n!b0"));
    }

    #[test]
    fn test_out_stats() {
        let m = model();
        let preds = predicates(&["a", "b", "c"]);
        let mut abstractor = Abstractor::new(AbstractorConfig::default());
        abstractor
            .calc_abstraction(&mut BddOracle::new(), &preds, &m.system, &m.ns, &m.network, [])
            .unwrap();

        let mut out = Vec::new();
        abstractor.out_stats(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("partitioning_strategy: 6"));
        assert!(report.contains("trans_cache_num_access: 3\n"));
        assert!(report.contains("init_cache_num_hits: 0\n"));
    }

    #[test]
    fn test_invalid_config_never_builds() {
        assert_eq!(
            AbstractorConfig::builder().partition(0).build().map(Abstractor::new).err(),
            Some(ConfigError::InvalidPartitionStrategy(0))
        );
    }
}
