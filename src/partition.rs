//! Splitting the predicate set into clusters.
//!
//! Each cluster is abstracted by a single decision-procedure query whose cost
//! grows exponentially with the cluster size, so every strategy bounds the
//! cluster size. Strategies differ in which predicates they consider worth
//! abstracting together:
//!
//! | # | Linking | Max size |
//! |---|---------|----------|
//! | 1 | none (singletons) | 1 |
//! | 2 | shared support | 2 |
//! | 3 | shared support | 4 |
//! | 4 | same network component | 4 |
//! | 5 | transition coupling | 4 |
//! | 6 | transition coupling | 6 |
//! | 7 | transition coupling | unbounded |
//! | 8 | everything (monolithic) | unbounded |
//!
//! Linked predicates are merged greedily, visiting pairs in ascending id
//! order, as long as the merged cluster stays within the size bound. The
//! result only depends on the inputs.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::concrete::ConcreteTrans;
use crate::error::ConfigError;
use crate::network::NetworkInfo;
use crate::predicate::{PredIdSet, Predicates};

/// When two predicates are considered correlated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Linking {
    None,
    /// The predicates mention a common symbol.
    SharedSupport,
    /// The predicates mention symbols of a common network component.
    Component,
    /// Shared support, or the next value of one predicate's symbols depends
    /// on the other predicate's symbols.
    TransitionCoupled,
    All,
}

/// Validated partitioning strategy, `1..=8`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PartitionStrategy(u32);

impl PartitionStrategy {
    pub const DEFAULT: PartitionStrategy = PartitionStrategy(6);

    pub fn number(self) -> u32 {
        self.0
    }

    pub fn linking(self) -> Linking {
        match self.0 {
            1 => Linking::None,
            2 | 3 => Linking::SharedSupport,
            4 => Linking::Component,
            5..=7 => Linking::TransitionCoupled,
            _ => Linking::All,
        }
    }

    /// Upper bound on the cluster size, `None` if unbounded.
    pub fn max_cluster_size(self) -> Option<usize> {
        match self.0 {
            1 => Some(1),
            2 => Some(2),
            3..=5 => Some(4),
            6 => Some(6),
            _ => None,
        }
    }
}

impl Default for PartitionStrategy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PartitionStrategy {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if (1..=8).contains(&value) {
            Ok(PartitionStrategy(value))
        } else {
            Err(ConfigError::InvalidPartitionStrategy(value))
        }
    }
}

impl Display for PartitionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let linking = match self.linking() {
            Linking::None => "singleton",
            Linking::SharedSupport => "shared-support",
            Linking::Component => "component",
            Linking::TransitionCoupled => "transition-coupled",
            Linking::All => "monolithic",
        };
        match self.max_cluster_size() {
            Some(max) => write!(f, "{} ({}, max {})", self.0, linking, max),
            None => write!(f, "{} ({})", self.0, linking),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClusterOrigin {
    DefaultPartition,
    RefinementSupplied,
}

/// A set of predicates abstracted jointly.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PredicateCluster {
    preds: PredIdSet,
    origin: ClusterOrigin,
}

impl PredicateCluster {
    pub fn new(preds: PredIdSet, origin: ClusterOrigin) -> Self {
        Self { preds, origin }
    }

    pub fn ids(&self) -> &PredIdSet {
        &self.preds
    }

    pub fn origin(&self) -> ClusterOrigin {
        self.origin
    }

    pub fn is_refinement(&self) -> bool {
        self.origin == ClusterOrigin::RefinementSupplied
    }

    pub fn len(&self) -> usize {
        self.preds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }
}

impl Display for PredicateCluster {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.preds)?;
        if self.is_refinement() {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// Union-find with a size per root.
struct Groups {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl Groups {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Merge the groups of `a` and `b` unless that exceeds `cap`.
    fn union_capped(&mut self, a: usize, b: usize, cap: Option<usize>) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let merged = self.size[ra] + self.size[rb];
        if cap.is_some_and(|cap| merged > cap) {
            return false;
        }
        // Smaller index stays root.
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[child] = root;
        self.size[root] = merged;
        true
    }
}

/// Partition all registered predicates into default clusters.
///
/// Every predicate id ends up in exactly one cluster; clusters are ordered by
/// their smallest id.
pub fn partition(
    predicates: &Predicates,
    strategy: PartitionStrategy,
    system: &ConcreteTrans,
    network: &NetworkInfo,
) -> Vec<PredicateCluster> {
    let preds: Vec<_> = predicates.iter().collect();
    let n = preds.len();
    let supports: Vec<BTreeSet<&str>> = preds.iter().map(|p| p.expr().support()).collect();

    let mut linking = strategy.linking();
    if linking == Linking::Component && network.is_empty() {
        debug!("No network components, partitioning by shared support");
        linking = Linking::SharedSupport;
    }

    // Symbols each predicate's symbols are coupled to through the transition relation.
    let influence: Vec<BTreeSet<&str>> = if linking == Linking::TransitionCoupled {
        let deps = system.dependencies();
        supports
            .iter()
            .map(|support| {
                support
                    .iter()
                    .filter_map(|s| deps.get(s))
                    .flat_map(|d| d.iter().copied())
                    .collect()
            })
            .collect()
    } else {
        vec![BTreeSet::new(); n]
    };

    let components: Vec<BTreeSet<&str>> = if linking == Linking::Component {
        supports
            .iter()
            .map(|support| {
                support
                    .iter()
                    .filter_map(|s| network.component_of(s))
                    .collect()
            })
            .collect()
    } else {
        vec![BTreeSet::new(); n]
    };

    let linked = |i: usize, j: usize| -> bool {
        let shared = !supports[i].is_disjoint(&supports[j]);
        match linking {
            Linking::None => false,
            Linking::All => true,
            Linking::SharedSupport => shared,
            Linking::Component => shared || !components[i].is_disjoint(&components[j]),
            Linking::TransitionCoupled => {
                shared
                    || !influence[i].is_disjoint(&supports[j])
                    || !influence[j].is_disjoint(&supports[i])
            }
        }
    };

    let cap = strategy.max_cluster_size();
    let mut groups = Groups::new(n);
    if linking != Linking::None {
        for i in 0..n {
            for j in (i + 1)..n {
                if linked(i, j) {
                    groups.union_capped(i, j, cap);
                }
            }
        }
    }

    let mut clusters: Vec<PredIdSet> = Vec::new();
    let mut root_to_cluster = vec![usize::MAX; n];
    for (i, pred) in preds.iter().enumerate() {
        let root = groups.find(i);
        if root_to_cluster[root] == usize::MAX {
            root_to_cluster[root] = clusters.len();
            clusters.push(PredIdSet::new());
        }
        clusters[root_to_cluster[root]].insert(pred.id());
    }

    // Roots are the smallest member, visited in order: already sorted by smallest id.
    let clusters: Vec<PredicateCluster> = clusters
        .into_iter()
        .map(|ids| PredicateCluster::new(ids, ClusterOrigin::DefaultPartition))
        .collect();
    debug!(
        "partition(strategy = {}, |preds| = {}) -> {} clusters",
        strategy,
        n,
        clusters.len()
    );
    clusters
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::expr::Expr;

    fn strategy(n: u32) -> PartitionStrategy {
        PartitionStrategy::try_from(n).unwrap()
    }

    fn ids(clusters: &[PredicateCluster]) -> Vec<PredIdSet> {
        clusters.iter().map(|c| c.ids().clone()).collect()
    }

    /// x0..x5 in a shift register: x(i+1)' = x(i).
    fn shift_register() -> ConcreteTrans {
        ConcreteTrans::from_latches(
            (0..6).map(|i| {
                let prev = if i == 0 {
                    Expr::var("in")
                } else {
                    Expr::var(format!("x{}", i - 1))
                };
                (format!("x{}", i), Some(false), prev)
            }),
        )
    }

    fn chain_predicates() -> Predicates {
        let mut preds = Predicates::new();
        for i in 0..6 {
            preds.add(Expr::var(format!("x{}", i)));
        }
        preds
    }

    #[test]
    fn test_strategy_validation() {
        for n in 1..=8 {
            assert_eq!(strategy(n).number(), n);
        }
        assert_eq!(
            PartitionStrategy::try_from(0),
            Err(ConfigError::InvalidPartitionStrategy(0))
        );
        assert_eq!(
            PartitionStrategy::try_from(9),
            Err(ConfigError::InvalidPartitionStrategy(9))
        );
        assert_eq!(PartitionStrategy::default().number(), 6);
    }

    #[test]
    fn test_singleton() {
        let mut preds = Predicates::new();
        preds.add(Expr::var("x"));
        preds.add(Expr::var("x") & Expr::var("y"));
        preds.add(Expr::var("y"));
        let system = ConcreteTrans::new(Expr::Const(true), Expr::Const(true));

        let clusters = partition(&preds, strategy(1), &system, &NetworkInfo::new());
        assert_eq!(
            ids(&clusters),
            vec![
                PredIdSet::from([0]),
                PredIdSet::from([1]),
                PredIdSet::from([2])
            ]
        );
        assert!(clusters
            .iter()
            .all(|c| c.origin() == ClusterOrigin::DefaultPartition));
    }

    #[test]
    fn test_shared_support_respects_cap() {
        let mut preds = Predicates::new();
        for i in 0..5 {
            preds.add(Expr::var("x") & Expr::var(format!("y{}", i)));
        }
        let system = ConcreteTrans::new(Expr::Const(true), Expr::Const(true));
        let network = NetworkInfo::new();

        let two = partition(&preds, strategy(2), &system, &network);
        assert_eq!(
            ids(&two),
            vec![
                PredIdSet::from([0, 1]),
                PredIdSet::from([2, 3]),
                PredIdSet::from([4])
            ]
        );

        let four = partition(&preds, strategy(3), &system, &network);
        assert_eq!(
            ids(&four),
            vec![PredIdSet::from([0, 1, 2, 3]), PredIdSet::from([4])]
        );
    }

    #[test]
    fn test_unrelated_predicates_stay_apart() {
        let preds = chain_predicates();
        let system = ConcreteTrans::new(Expr::Const(true), Expr::Const(true));
        let clusters = partition(&preds, strategy(3), &system, &NetworkInfo::new());
        assert_eq!(clusters.len(), 6);
    }

    #[test]
    fn test_component() {
        let preds = chain_predicates();
        let system = shift_register();
        let mut network = NetworkInfo::new();
        network.add_component("lo", ["x0", "x1", "x2"]);
        network.add_component("hi", ["x3", "x4", "x5"]);

        let clusters = partition(&preds, strategy(4), &system, &network);
        assert_eq!(
            ids(&clusters),
            vec![PredIdSet::from([0, 1, 2]), PredIdSet::from([3, 4, 5])]
        );

        // Without components it falls back to shared support.
        let clusters = partition(&preds, strategy(4), &system, &NetworkInfo::new());
        assert_eq!(clusters.len(), 6);
    }

    #[test]
    fn test_transition_coupled() {
        let preds = chain_predicates();
        let system = shift_register();
        let network = NetworkInfo::new();

        let five = partition(&preds, strategy(5), &system, &network);
        assert_eq!(
            ids(&five),
            vec![PredIdSet::from([0, 1, 2, 3]), PredIdSet::from([4, 5])]
        );

        let six = partition(&preds, strategy(6), &system, &network);
        assert_eq!(ids(&six), vec![PredIdSet::from([0, 1, 2, 3, 4, 5])]);

        let seven = partition(&preds, strategy(7), &system, &network);
        assert_eq!(ids(&seven), ids(&six));
    }

    #[test]
    fn test_monolithic() {
        let preds = chain_predicates();
        let system = ConcreteTrans::new(Expr::Const(true), Expr::Const(true));
        let clusters = partition(&preds, strategy(8), &system, &NetworkInfo::new());
        assert_eq!(ids(&clusters), vec![PredIdSet::from([0, 1, 2, 3, 4, 5])]);
    }

    #[test]
    fn test_empty_predicate_set() {
        let system = ConcreteTrans::new(Expr::Const(true), Expr::Const(true));
        for n in 1..=8 {
            let clusters = partition(&Predicates::new(), strategy(n), &system, &NetworkInfo::new());
            assert!(clusters.is_empty());
        }
    }

    #[test]
    fn test_every_strategy_partitions() {
        let preds = chain_predicates();
        let system = shift_register();
        let mut network = NetworkInfo::new();
        network.add_component("odd", ["x1", "x3", "x5"]);
        for n in 1..=8 {
            let s = strategy(n);
            let clusters = partition(&preds, s, &system, &network);
            let mut seen = PredIdSet::new();
            for cluster in &clusters {
                assert!(!cluster.is_empty());
                if let Some(max) = s.max_cluster_size() {
                    assert!(cluster.len() <= max);
                }
                for id in cluster.ids().iter() {
                    assert!(seen.insert(id), "{} in two clusters", id);
                }
            }
            assert_eq!(seen, preds.ids());
        }
    }
}
