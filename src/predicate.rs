//! Predicates and canonical predicate-id sets.
//!
//! Predicates are registered once and never change; their ids are dense and
//! stable for the whole run, which is what makes id sets usable as cache keys
//! across refinement iterations.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::concrete::State;
use crate::cube::Valuation;
use crate::expr::Expr;
use crate::utils::{pairing_seq, MyHash};

/// Stable identifier of a registered predicate.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PredId(u32);

impl PredId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for PredId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<u32> for PredId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Canonical set of predicate ids: sorted, without duplicates.
///
/// Two sets with the same members are equal and hash equally, regardless of
/// the order the ids were discovered in.
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PredIdSet(Vec<PredId>);

impl PredIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: PredId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    pub fn insert(&mut self, id: PredId) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PredId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[PredId] {
        &self.0
    }

    pub fn first(&self) -> Option<PredId> {
        self.0.first().copied()
    }

    pub fn union(&self, other: &PredIdSet) -> PredIdSet {
        self.iter().chain(other.iter()).collect()
    }

    /// Members of `self` not in `other`.
    pub fn difference(&self, other: &PredIdSet) -> PredIdSet {
        self.iter().filter(|&id| !other.contains(id)).collect()
    }

    pub fn is_disjoint(&self, other: &PredIdSet) -> bool {
        self.iter().all(|id| !other.contains(id))
    }
}

impl FromIterator<PredId> for PredIdSet {
    fn from_iter<I: IntoIterator<Item = PredId>>(iter: I) -> Self {
        let mut ids: Vec<PredId> = iter.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }
}

impl<const N: usize> From<[u32; N]> for PredIdSet {
    fn from(ids: [u32; N]) -> Self {
        ids.into_iter().map(PredId::new).collect()
    }
}

impl MyHash for PredIdSet {
    fn hash(&self) -> u64 {
        pairing_seq(self.iter().map(|id| id.id() as u64))
    }
}

impl Display for PredIdSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    id: PredId,
    expr: Expr,
}

impl Predicate {
    pub fn id(&self) -> PredId {
        self.id
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} := {}", self.id, self.expr)
    }
}

/// Registry of predicates, in id order.
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    predicates: Vec<Predicate>,
    by_expr: HashMap<Expr, PredId>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `expr` and return its id. Registering a structurally equal
    /// expression twice returns the existing id.
    pub fn add(&mut self, expr: Expr) -> PredId {
        if let Some(&id) = self.by_expr.get(&expr) {
            return id;
        }
        let id = PredId::new(self.predicates.len() as u32);
        self.by_expr.insert(expr.clone(), id);
        self.predicates.push(Predicate { id, expr });
        id
    }

    pub fn get(&self, id: PredId) -> Option<&Predicate> {
        self.predicates.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    pub fn ids(&self) -> PredIdSet {
        self.predicates.iter().map(|p| p.id).collect()
    }

    /// Value of every predicate in a concrete state.
    ///
    /// Returns `None` if some predicate mentions a symbol `state` does not bind.
    pub fn valuation(&self, state: &State) -> Option<Valuation> {
        let lookup = |name: &str, next: bool| {
            if next {
                None
            } else {
                state.get(name).copied()
            }
        };
        self.predicates
            .iter()
            .map(|p| Some((p.id, p.expr.eval(&lookup)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pred_id_set_is_canonical() {
        let a: PredIdSet = [3, 1, 2, 1].into_iter().map(PredId::new).collect();
        let b = PredIdSet::from([1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(MyHash::hash(&a), MyHash::hash(&b));
        assert_eq!(a.as_slice(), &[PredId::new(1), PredId::new(2), PredId::new(3)]);
        assert_eq!(a.to_string(), "{b1, b2, b3}");
    }

    #[test]
    fn test_pred_id_set_ops() {
        let a = PredIdSet::from([0, 2, 4]);
        let b = PredIdSet::from([2, 3]);
        assert_eq!(a.union(&b), PredIdSet::from([0, 2, 3, 4]));
        assert_eq!(a.difference(&b), PredIdSet::from([0, 4]));
        assert!(!a.is_disjoint(&b));
        assert!(a.is_disjoint(&PredIdSet::from([1, 5])));

        let mut c = PredIdSet::new();
        assert!(c.insert(PredId::new(5)));
        assert!(c.insert(PredId::new(1)));
        assert!(!c.insert(PredId::new(5)));
        assert_eq!(c, PredIdSet::from([1, 5]));
        assert_eq!(c.first(), Some(PredId::new(1)));
    }

    #[test]
    fn test_registry_ids_are_stable() {
        let mut preds = Predicates::new();
        let p0 = preds.add(Expr::var("x"));
        let p1 = preds.add(Expr::var("x") & Expr::var("y"));
        let again = preds.add(Expr::var("x"));
        assert_eq!(p0, PredId::new(0));
        assert_eq!(p1, PredId::new(1));
        assert_eq!(again, p0);
        assert_eq!(preds.len(), 2);
        assert_eq!(preds.get(p1).unwrap().to_string(), "b1 := (x & y)");
        assert!(preds.get(PredId::new(7)).is_none());
    }

    #[test]
    fn test_registry_keeps_expressions_with_equal_rendering() {
        let mut preds = Predicates::new();
        let conj = preds.add(Expr::var("x") & Expr::var("y"));
        // A symbol whose name happens to print like the conjunction.
        let symbol = preds.add(Expr::var("(x & y)"));
        assert_ne!(conj, symbol);
        assert_eq!(preds.len(), 2);
        assert_eq!(preds.get(conj).unwrap().expr(), &(Expr::var("x") & Expr::var("y")));
        assert_eq!(preds.get(symbol).unwrap().expr(), &Expr::var("(x & y)"));
    }

    #[test]
    fn test_valuation() {
        let mut preds = Predicates::new();
        let p0 = preds.add(Expr::var("x"));
        let p1 = preds.add(Expr::var("x") ^ Expr::var("y"));
        let state: State = [("x".to_string(), true), ("y".to_string(), true)].into();
        let val = preds.valuation(&state).unwrap();
        assert_eq!(val.get(&p0), Some(&true));
        assert_eq!(val.get(&p1), Some(&false));

        let partial: State = [("x".to_string(), true)].into();
        assert!(preds.valuation(&partial).is_none());
    }
}
