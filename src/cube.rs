//! Cubes and cube sets over predicate literals.
//!
//! An abstract relation is a disjunction of cubes; each cube is a conjunction
//! of literals over current-state (`b3`) and next-state (`b3'`) predicate
//! variables. Cubes and cube sets are kept in a canonical order so that two
//! computations of the same relation compare equal.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::predicate::PredId;

/// Truth value per predicate.
pub type Valuation = BTreeMap<PredId, bool>;

/// Literal over a predicate variable.
///
/// Ordering puts current-state literals before next-state ones.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PredLit {
    pub next: bool,
    pub pred: PredId,
    pub value: bool,
}

impl PredLit {
    pub fn current(pred: PredId, value: bool) -> Self {
        Self {
            next: false,
            pred,
            value,
        }
    }

    pub fn next(pred: PredId, value: bool) -> Self {
        Self {
            next: true,
            pred,
            value,
        }
    }
}

impl Display for PredLit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.value { "" } else { "!" },
            self.pred,
            if self.next { "'" } else { "" }
        )
    }
}

/// Conjunction of literals, at most one per predicate variable.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Cube(Vec<PredLit>);

impl Cube {
    /// Build a cube; `None` if two literals contradict each other.
    pub fn new(lits: impl IntoIterator<Item = PredLit>) -> Option<Self> {
        let mut lits: Vec<PredLit> = lits.into_iter().collect();
        lits.sort_unstable();
        lits.dedup();
        let consistent = lits
            .windows(2)
            .all(|w| (w[0].next, w[0].pred) != (w[1].next, w[1].pred));
        consistent.then_some(Self(lits))
    }

    pub fn lits(&self) -> &[PredLit] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the valuation pair satisfies every literal.
    ///
    /// A literal over a predicate missing from the valuation is not satisfied.
    pub fn matches(&self, current: &Valuation, next: &Valuation) -> bool {
        self.0.iter().all(|lit| {
            let valuation = if lit.next { next } else { current };
            valuation.get(&lit.pred) == Some(&lit.value)
        })
    }
}

impl Display for Cube {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "true");
        }
        for (i, lit) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", lit)?;
        }
        Ok(())
    }
}

/// Disjunction of cubes.
///
/// The empty set denotes `false`; a set holding the empty cube denotes `true`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct CubeSet(Vec<Cube>);

impl CubeSet {
    pub fn new(cubes: impl IntoIterator<Item = Cube>) -> Self {
        let mut cubes: Vec<Cube> = cubes.into_iter().collect();
        cubes.sort_unstable();
        cubes.dedup();
        Self(cubes)
    }

    /// The unsatisfiable relation.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The relation that allows everything.
    pub fn universe() -> Self {
        Self(vec![Cube::default()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cube> {
        self.0.iter()
    }

    pub fn contains(&self, current: &Valuation, next: &Valuation) -> bool {
        self.0.iter().any(|cube| cube.matches(current, next))
    }

    /// Total number of literals over all cubes.
    pub fn num_literals(&self) -> usize {
        self.0.iter().map(Cube::len).sum()
    }
}

impl Display for CubeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "false");
        }
        for (i, cube) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", cube)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u32) -> PredId {
        PredId::new(id)
    }

    fn valuation(values: &[(u32, bool)]) -> Valuation {
        values.iter().map(|&(id, v)| (p(id), v)).collect()
    }

    #[test]
    fn test_cube_canonical_order() {
        let a = Cube::new([PredLit::next(p(0), true), PredLit::current(p(1), false)]).unwrap();
        let b = Cube::new([PredLit::current(p(1), false), PredLit::next(p(0), true)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "!b1 & b0'");
    }

    #[test]
    fn test_cube_contradiction() {
        assert!(Cube::new([PredLit::current(p(0), true), PredLit::current(p(0), false)]).is_none());
        // Same predicate, different time frames: fine.
        assert!(Cube::new([PredLit::current(p(0), true), PredLit::next(p(0), false)]).is_some());
    }

    #[test]
    fn test_cube_matches() {
        let cube = Cube::new([PredLit::current(p(0), true), PredLit::next(p(1), false)]).unwrap();
        assert!(cube.matches(&valuation(&[(0, true)]), &valuation(&[(1, false)])));
        assert!(!cube.matches(&valuation(&[(0, false)]), &valuation(&[(1, false)])));
        assert!(!cube.matches(&valuation(&[(0, true)]), &valuation(&[])));
        assert!(Cube::default().matches(&valuation(&[]), &valuation(&[])));
    }

    #[test]
    fn test_cube_set() {
        let c1 = Cube::new([PredLit::current(p(0), true)]).unwrap();
        let c2 = Cube::new([PredLit::current(p(0), false), PredLit::current(p(1), true)]).unwrap();
        let set = CubeSet::new([c2.clone(), c1.clone(), c2]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.num_literals(), 3);
        assert!(set.contains(&valuation(&[(0, true), (1, false)]), &Valuation::new()));
        assert!(set.contains(&valuation(&[(0, false), (1, true)]), &Valuation::new()));
        assert!(!set.contains(&valuation(&[(0, false), (1, false)]), &Valuation::new()));
        assert_eq!(set.to_string(), "!b0 & b1\nb0");
    }

    #[test]
    fn test_empty_and_universe() {
        let v = valuation(&[(0, true)]);
        assert!(!CubeSet::empty().contains(&v, &v));
        assert!(CubeSet::universe().contains(&v, &v));
        assert_eq!(CubeSet::empty().to_string(), "false");
        assert_eq!(CubeSet::universe().to_string(), "true");
    }
}
