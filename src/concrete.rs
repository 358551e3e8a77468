//! The concrete transition system being abstracted.
//!
//! A system is an initial condition over current-state symbols and a
//! transition relation over current and next-state symbols. It is treated as
//! immutable for the whole verification run: cached abstractions are only
//! valid as long as the system does not change.

use std::collections::{BTreeMap, BTreeSet};

use crate::expr::Expr;

/// A concrete state: value of every symbol by name.
pub type State = BTreeMap<String, bool>;

#[derive(Debug, Clone)]
pub struct ConcreteTrans {
    init: Expr,
    trans: Expr,
    next_state: BTreeMap<String, Expr>,
}

impl ConcreteTrans {
    /// System given directly by its initial condition and transition relation.
    pub fn new(init: Expr, trans: Expr) -> Self {
        Self {
            init,
            trans,
            next_state: BTreeMap::new(),
        }
    }

    /// Circuit-style system: every latch has an optional reset value and a
    /// next-state function over current-state symbols.
    ///
    /// Latches without reset value start unconstrained.
    ///
    /// # Panics
    ///
    /// Panics if a next-state function mentions a next-state symbol.
    pub fn from_latches<S: Into<String>>(
        latches: impl IntoIterator<Item = (S, Option<bool>, Expr)>,
    ) -> Self {
        let mut init = Vec::new();
        let mut trans = Vec::new();
        let mut next_state = BTreeMap::new();
        for (name, reset, next) in latches {
            let name = name.into();
            assert!(
                !next.has_next(),
                "Next-state function of '{}' refers to next-state symbols",
                name
            );
            if let Some(value) = reset {
                init.push(Expr::iff(Expr::var(name.clone()), Expr::Const(value)));
            }
            trans.push(Expr::iff(Expr::next(name.clone()), next.clone()));
            next_state.insert(name, next);
        }
        Self {
            init: Expr::and_many(init),
            trans: Expr::and_many(trans),
            next_state,
        }
    }

    /// Additional constraint on every transition (environment assumption).
    pub fn with_constraint(mut self, constraint: Expr) -> Self {
        self.trans = Expr::and(self.trans, constraint);
        self
    }

    pub fn init(&self) -> &Expr {
        &self.init
    }

    pub fn trans(&self) -> &Expr {
        &self.trans
    }

    /// Next-state functions, if the system was built from latches.
    pub fn next_state_functions(&self) -> &BTreeMap<String, Expr> {
        &self.next_state
    }

    /// `None` if the state does not bind every symbol of the initial condition.
    pub fn is_initial(&self, state: &State) -> Option<bool> {
        self.init
            .eval(&|name: &str, next: bool| if next { None } else { state.get(name).copied() })
    }

    pub fn is_transition(&self, state: &State, next_state: &State) -> Option<bool> {
        self.trans.eval(&|name: &str, next: bool| {
            if next {
                next_state.get(name).copied()
            } else {
                state.get(name).copied()
            }
        })
    }

    /// Successor of a latch-based system under the given input values.
    ///
    /// Returns `None` for relational systems or unbound symbols.
    pub fn step(&self, state: &State, inputs: &State) -> Option<State> {
        if self.next_state.is_empty() {
            return None;
        }
        let lookup = |name: &str, next: bool| {
            if next {
                None
            } else {
                state.get(name).or_else(|| inputs.get(name)).copied()
            }
        };
        self.next_state
            .iter()
            .map(|(name, f)| Some((name.clone(), f.eval(&lookup)?)))
            .collect()
    }

    /// For every symbol with a next-state occurrence, the current-state
    /// symbols its next value is related to.
    ///
    /// Computed from the top-level conjuncts of the transition relation, so it
    /// over-approximates the true dependencies.
    pub fn dependencies(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut deps: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for conjunct in self.trans.conjuncts() {
            let support = conjunct.support();
            for target in conjunct.next_support() {
                deps.entry(target).or_default().extend(support.iter().copied());
            }
        }
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(values: &[(&str, bool)]) -> State {
        values.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn toggle() -> ConcreteTrans {
        // x' = !x, y' = x & en
        ConcreteTrans::from_latches([
            ("x", Some(false), !Expr::var("x")),
            ("y", None, Expr::var("x") & Expr::var("en")),
        ])
    }

    #[test]
    #[should_panic(expected = "refers to next-state symbols")]
    fn test_from_latches_rejects_next_state_functions() {
        ConcreteTrans::from_latches([("x", None, Expr::next("x"))]);
    }

    #[test]
    fn test_from_latches_init() {
        let sys = toggle();
        assert_eq!(sys.is_initial(&state(&[("x", false), ("y", true)])), Some(true));
        assert_eq!(sys.is_initial(&state(&[("x", true), ("y", true)])), Some(false));
        assert_eq!(sys.is_initial(&state(&[("y", true)])), None);
    }

    #[test]
    fn test_step_agrees_with_relation() {
        let sys = toggle();
        let s = state(&[("x", true), ("y", false)]);
        let i = state(&[("en", true)]);
        let t = sys.step(&s, &i).unwrap();
        assert_eq!(t, state(&[("x", false), ("y", true)]));

        let mut current = s.clone();
        current.extend(i);
        assert_eq!(sys.is_transition(&current, &t), Some(true));
        assert_eq!(
            sys.is_transition(&current, &state(&[("x", true), ("y", true)])),
            Some(false)
        );
    }

    #[test]
    fn test_dependencies() {
        let sys = toggle();
        let deps = sys.dependencies();
        assert_eq!(deps["x"], BTreeSet::from(["x"]));
        assert_eq!(deps["y"], BTreeSet::from(["en", "x"]));
    }

    #[test]
    fn test_relational_system_has_no_step() {
        let sys = ConcreteTrans::new(Expr::var("x"), Expr::iff(Expr::next("x"), Expr::var("x")));
        assert!(sys.step(&state(&[("x", true)]), &State::new()).is_none());
        assert!(sys.next_state_functions().is_empty());
    }

    #[test]
    fn test_constraint_restricts_transitions() {
        let sys = toggle().with_constraint(!Expr::var("en"));
        let s = state(&[("x", true), ("y", false), ("en", true)]);
        let t = state(&[("x", false), ("y", true)]);
        assert_eq!(sys.is_transition(&s, &t), Some(false));
    }
}
