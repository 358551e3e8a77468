//! Combining per-cluster relations into one abstract system.
//!
//! The abstract system is kept in product form: a global valuation pair is
//! feasible iff every cluster's relation, restricted to that cluster's
//! predicates, allows it. Since transition clusters partition the predicate
//! set, the product is a sound over-approximation whenever each factor is.

use std::fmt::{Display, Formatter};

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::cube::{Cube, CubeSet, PredLit, Valuation};
use crate::error::{AbstractionError, Result};
use crate::partition::PredicateCluster;
use crate::predicate::{PredId, PredIdSet, Predicates};
use crate::reference::Ref;
use crate::types::{Lit, Var};

/// Boolean variable of the abstract system standing for one predicate.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AbstractVariable {
    pub id: PredId,
    pub name: String,
    pub description: String,
}

/// One abstract variable per registered predicate, in id order.
pub fn abstract_variables(predicates: &Predicates) -> Vec<AbstractVariable> {
    predicates
        .iter()
        .map(|p| AbstractVariable {
            id: p.id(),
            name: p.id().to_string(),
            description: p.expr().to_string(),
        })
        .collect()
}

/// Initial-state relation between two clusters.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InitRelation {
    pub first: PredIdSet,
    pub second: PredIdSet,
    pub cubes: CubeSet,
}

#[derive(Debug, Clone, Default)]
pub struct AbstractTransitionSystem {
    variables: Vec<AbstractVariable>,
    transitions: Vec<(PredicateCluster, CubeSet)>,
    initial: Vec<(PredicateCluster, CubeSet)>,
    init_relations: Vec<InitRelation>,
    init_computed: bool,
}

impl AbstractTransitionSystem {
    pub fn variables(&self) -> &[AbstractVariable] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Transition relation per cluster.
    pub fn transitions(&self) -> &[(PredicateCluster, CubeSet)] {
        &self.transitions
    }

    /// Initial states per cluster; empty if initial states were not computed.
    pub fn initial_states(&self) -> &[(PredicateCluster, CubeSet)] {
        &self.initial
    }

    pub fn init_relations(&self) -> &[InitRelation] {
        &self.init_relations
    }

    /// Whether initial states are constrained at all.
    pub fn init_computed(&self) -> bool {
        self.init_computed
    }

    pub fn is_initial(&self, valuation: &Valuation) -> bool {
        if !self.init_computed {
            return true;
        }
        let none = Valuation::new();
        self.initial
            .iter()
            .map(|(_, cubes)| cubes)
            .chain(self.init_relations.iter().map(|r| &r.cubes))
            .all(|cubes| cubes.contains(valuation, &none))
    }

    /// Whether the abstract transition relation allows `current -> next`.
    pub fn allows(&self, current: &Valuation, next: &Valuation) -> bool {
        self.transitions
            .iter()
            .all(|(_, cubes)| cubes.contains(current, next))
    }

    fn lit_var(lit: &PredLit) -> Var {
        Var::new(2 * lit.pred.id() + 1 + lit.next as u32)
    }

    fn cube_to_bdd(bdd: &Bdd, cube: &Cube) -> Ref {
        bdd.cube(
            cube.lits()
                .iter()
                .map(|lit| Lit::new(Self::lit_var(lit), !lit.value)),
        )
    }

    fn cubes_to_bdd(bdd: &Bdd, cubes: &CubeSet) -> Ref {
        bdd.apply_or_many(cubes.iter().map(|c| Self::cube_to_bdd(bdd, c)))
    }

    /// Symbolic form `(init, trans)` of the abstract system.
    ///
    /// Predicate `k` is variable `2k+1` in the current state and `2k+2` in
    /// the next state.
    pub fn to_bdd(&self, bdd: &Bdd) -> (Ref, Ref) {
        let init = if self.init_computed {
            bdd.apply_and_many(
                self.initial
                    .iter()
                    .map(|(_, cubes)| cubes)
                    .chain(self.init_relations.iter().map(|r| &r.cubes))
                    .map(|cubes| Self::cubes_to_bdd(bdd, cubes)),
            )
        } else {
            bdd.one()
        };
        let trans = bdd.apply_and_many(
            self.transitions
                .iter()
                .map(|(_, cubes)| Self::cubes_to_bdd(bdd, cubes)),
        );
        (init, trans)
    }

    /// Number of abstract initial states.
    pub fn count_initial_states(&self) -> BigUint {
        let bdd = Bdd::default();
        let (init, _) = self.to_bdd(&bdd);
        let n = self.num_variables();
        // `init` does not mention the next-state variables.
        bdd.sat_count(init, 2 * n) >> n
    }
}

impl Display for AbstractTransitionSystem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "VARIABLES")?;
        for var in &self.variables {
            writeln!(f, "  {} := {}", var.name, var.description)?;
        }
        writeln!(f, "INIT")?;
        if !self.init_computed {
            writeln!(f, "  (unconstrained)")?;
        }
        for (cluster, cubes) in &self.initial {
            writeln!(f, "  {}: {} cubes", cluster, cubes.len())?;
        }
        for rel in &self.init_relations {
            writeln!(f, "  ({}, {}): {} cubes", rel.first, rel.second, rel.cubes.len())?;
        }
        writeln!(f, "TRANS")?;
        for (cluster, cubes) in &self.transitions {
            writeln!(f, "  {}: {} cubes", cluster, cubes.len())?;
        }
        Ok(())
    }
}

fn check_partition(
    variables: &[AbstractVariable],
    clusters: &[(PredicateCluster, CubeSet)],
) -> Result<()> {
    let mut seen = PredIdSet::new();
    for (cluster, _) in clusters {
        for id in cluster.ids().iter() {
            if !seen.insert(id) {
                return Err(AbstractionError::OverlappingClusters { id });
            }
        }
    }
    let expected: PredIdSet = variables.iter().map(|v| v.id).collect();
    let missing = expected.difference(&seen);
    if !missing.is_empty() {
        return Err(AbstractionError::MissingPredicates {
            ids: missing.to_string(),
        });
    }
    let unknown = seen.difference(&expected);
    if let Some(id) = unknown.first() {
        return Err(AbstractionError::UnknownPredicate {
            id,
            context: "combined clusters",
        });
    }
    Ok(())
}

/// Assemble the abstract system from per-cluster relations.
///
/// Transition clusters must partition the predicates of `variables`, and so
/// must initial-state clusters when `init_computed` is set.
pub fn combine(
    variables: Vec<AbstractVariable>,
    transitions: Vec<(PredicateCluster, CubeSet)>,
    initial: Vec<(PredicateCluster, CubeSet)>,
    init_relations: Vec<InitRelation>,
    init_computed: bool,
) -> Result<AbstractTransitionSystem> {
    check_partition(&variables, &transitions)?;
    if init_computed {
        check_partition(&variables, &initial)?;
    }
    Ok(AbstractTransitionSystem {
        variables,
        transitions,
        initial,
        init_relations,
        init_computed,
    })
}
