//! Decision procedures answering abstraction queries.
//!
//! A query asks which valuations of a cluster's predicates are possible in an
//! initial state, or across a transition, of the concrete system. The answer
//! is a [`CubeSet`] that must contain every possible valuation (it may
//! contain more). The procedure is the only expensive step of the
//! abstraction, which is why its results are cached per cluster.
//!
//! [`BddOracle`] answers queries exactly for finite Boolean systems. Other
//! procedures (SAT or SMT based) plug in through [`DecisionProcedure`].

use log::debug;

use crate::bdd::Bdd;
use crate::concrete::ConcreteTrans;
use crate::cube::{Cube, CubeSet, PredLit};
use crate::error::OracleError;
use crate::expr::Expr;
use crate::namespace::Namespace;
use crate::predicate::Predicate;
use crate::reference::Ref;
use crate::types::Var;

/// What a query is asked against.
#[derive(Debug, Copy, Clone)]
pub struct QueryContext<'a> {
    pub system: &'a ConcreteTrans,
    pub ns: &'a Namespace,
}

pub trait DecisionProcedure {
    /// Cubes over current-state literals of `preds` covering every initial state.
    fn initial_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError>;

    /// Cubes over current and next-state literals of `preds` covering every
    /// concrete transition.
    fn transition_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError>;
}

impl<D: DecisionProcedure + ?Sized> DecisionProcedure for &mut D {
    fn initial_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError> {
        (**self).initial_cubes(ctx, preds)
    }

    fn transition_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError> {
        (**self).transition_cubes(ctx, preds)
    }
}

/// Exact decision procedure for Boolean systems, using BDDs.
///
/// Each query builds the relation between abstract and concrete variables,
/// quantifies the concrete ones away and reads the cubes off the paths of the
/// result. Abstract variables come first in the order, so the quantified
/// result only depends on them.
#[derive(Debug)]
pub struct BddOracle {
    storage_bits: usize,
    queries: u64,
}

impl Default for BddOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl BddOracle {
    pub fn new() -> Self {
        Self::with_storage_bits(16)
    }

    /// Initial node table size, as a power of two, of the per-query manager.
    pub fn with_storage_bits(storage_bits: usize) -> Self {
        Self {
            storage_bits,
            queries: 0,
        }
    }

    /// Number of queries answered so far.
    pub fn queries(&self) -> u64 {
        self.queries
    }

    fn query(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
        transition: bool,
    ) -> Result<CubeSet, OracleError> {
        self.queries += 1;
        for p in preds {
            if p.expr().has_next() {
                return Err(OracleError::PrimedPredicate(p.id()));
            }
        }

        let encoder = Encoder::new(Bdd::new(self.storage_bits), ctx.ns, preds.len());
        let bdd = &encoder.bdd;
        let k = preds.len() as u32;

        let mut f = if transition {
            encoder.encode(ctx.system.trans())?
        } else {
            encoder.encode(ctx.system.init())?
        };
        for (j, p) in (0u32..).zip(preds) {
            let current = encoder.encode(p.expr())?;
            f = bdd.apply_and(f, bdd.apply_eq(bdd.mk_var(j + 1), current));
            if transition {
                let next = encoder.encode(&p.expr().rename_to_next())?;
                f = bdd.apply_and(f, bdd.apply_eq(bdd.mk_var(k + j + 1), next));
            }
        }
        let r = bdd.exists(f, encoder.concrete_vars());

        let mut cubes = Vec::new();
        for path in bdd.paths(r) {
            let lits = path
                .iter()
                .map(|lit| {
                    let v = lit.var().id();
                    let value = lit.is_positive();
                    if (1..=k).contains(&v) {
                        Ok(PredLit::current(preds[(v - 1) as usize].id(), value))
                    } else if transition && (k + 1..=2 * k).contains(&v) {
                        Ok(PredLit::next(preds[(v - k - 1) as usize].id(), value))
                    } else {
                        Err(OracleError::Failed(format!(
                            "variable {} survived quantification",
                            v
                        )))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            let cube = Cube::new(lits)
                .ok_or_else(|| OracleError::Failed("contradictory path".to_string()))?;
            cubes.push(cube);
        }

        debug!(
            "BddOracle: {} query over {} predicates: {} cubes, {} nodes",
            if transition { "transition" } else { "initial" },
            k,
            cubes.len(),
            bdd.num_nodes()
        );
        Ok(CubeSet::new(cubes))
    }
}

impl DecisionProcedure for BddOracle {
    fn initial_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError> {
        self.query(ctx, preds, false)
    }

    fn transition_cubes(
        &mut self,
        ctx: &QueryContext<'_>,
        preds: &[&Predicate],
    ) -> Result<CubeSet, OracleError> {
        self.query(ctx, preds, true)
    }
}

/// Expression to BDD translation for one query.
///
/// Variables `1..=2k` are the abstract ones; concrete symbol `i` takes
/// `base + 2i` (current) and `base + 2i + 1` (next).
struct Encoder<'a> {
    bdd: Bdd,
    ns: &'a Namespace,
    base: u32,
}

impl<'a> Encoder<'a> {
    fn new(bdd: Bdd, ns: &'a Namespace, num_preds: usize) -> Self {
        Self {
            bdd,
            ns,
            base: 2 * num_preds as u32 + 1,
        }
    }

    fn concrete_var(&self, name: &str, next: bool) -> Result<u32, OracleError> {
        let symbol = self
            .ns
            .lookup(name)
            .ok_or_else(|| OracleError::UnknownSymbol(name.to_string()))?;
        Ok(self.base + 2 * symbol.index as u32 + next as u32)
    }

    fn concrete_vars(&self) -> impl Iterator<Item = Var> + '_ {
        (0..2 * self.ns.len() as u32).map(move |i| Var::new(self.base + i))
    }

    fn encode(&self, expr: &Expr) -> Result<Ref, OracleError> {
        let bdd = &self.bdd;
        Ok(match expr {
            Expr::Const(true) => bdd.one(),
            Expr::Const(false) => bdd.zero(),
            Expr::Var(name) => bdd.mk_var(self.concrete_var(name, false)?),
            Expr::Next(name) => bdd.mk_var(self.concrete_var(name, true)?),
            Expr::Not(a) => -self.encode(a)?,
            Expr::And(a, b) => bdd.apply_and(self.encode(a)?, self.encode(b)?),
            Expr::Or(a, b) => bdd.apply_or(self.encode(a)?, self.encode(b)?),
            Expr::Xor(a, b) => bdd.apply_xor(self.encode(a)?, self.encode(b)?),
            Expr::Ite(a, b, c) => bdd.apply_ite(self.encode(a)?, self.encode(b)?, self.encode(c)?),
        })
    }
}
