//! Paths to TRUE, one cube each.
//!
//! The paths of a BDD form a disjoint cover of its function: every
//! satisfying assignment extends exactly one path. This is how abstract
//! relations computed symbolically are turned back into cube sets.
//!
//! ```
//! use predabs::bdd::Bdd;
//! use predabs::types::Var;
//!
//! let bdd = Bdd::default();
//! // b1 -> b1' over current (1) and next (2) variables
//! let f = bdd.apply_or(-bdd.mk_var(1), bdd.mk_var(2));
//!
//! let (b, b_next) = (Var::new(1), Var::new(2));
//! let cubes: Vec<_> = bdd.paths(f).collect();
//! assert_eq!(cubes, vec![vec![b.pos(), b_next.pos()], vec![b.neg()]]);
//! ```
//!
//! The number of paths can be exponential in the number of variables.

use crate::bdd::Bdd;
use crate::reference::Ref;
use crate::types::{Lit, Var};

impl Bdd {
    /// Returns an iterator over all paths to TRUE in `f`.
    ///
    /// Literals of a path follow the variable order. Variables skipped by a
    /// path are don't-cares.
    pub fn paths(&self, f: Ref) -> BddPaths<'_> {
        BddPaths::new(self, f)
    }
}

#[derive(Debug, Clone, Copy)]
enum Branch {
    High,
    Low,
}

#[derive(Debug)]
struct StackFrame {
    node: Ref,
    /// Which branch to explore next (None if both explored)
    next_branch: Option<Branch>,
}

/// An iterator over satisfying paths in a BDD.
///
/// Depth-first with backtracking; the current path is a single vector that
/// grows and shrinks with the stack, so prefixes are never cloned.
pub struct BddPaths<'a> {
    bdd: &'a Bdd,
    stack: Vec<StackFrame>,
    current_path: Vec<Lit>,
}

impl<'a> BddPaths<'a> {
    pub fn new(bdd: &'a Bdd, f: Ref) -> Self {
        BddPaths {
            bdd,
            stack: vec![StackFrame {
                node: f,
                next_branch: Some(Branch::High),
            }],
            current_path: Vec::new(),
        }
    }

    fn backtrack(&mut self) {
        self.stack.pop();
        // Drop the literal that led here (the root has none).
        if !self.stack.is_empty() {
            self.current_path.pop();
        }
    }
}

impl Iterator for BddPaths<'_> {
    type Item = Vec<Lit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;

            if self.bdd.is_one(node) {
                let result = self.current_path.clone();
                self.backtrack();
                return Some(result);
            }

            if self.bdd.is_zero(node) {
                self.backtrack();
                continue;
            }

            let var = Var::new(self.bdd.variable(node.index()));

            match frame.next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    let child = self.bdd.high_node(node);
                    self.current_path.push(var.pos());
                    self.stack.push(StackFrame {
                        node: child,
                        next_branch: Some(Branch::High),
                    });
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    let child = self.bdd.low_node(node);
                    self.current_path.push(var.neg());
                    self.stack.push(StackFrame {
                        node: child,
                        next_branch: Some(Branch::High),
                    });
                }
                None => self.backtrack(),
            }
        }
    }
}
