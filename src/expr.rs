//! Boolean expressions over named state symbols.
//!
//! Concrete initial conditions, transition relations and predicates are all
//! [`Expr`] values. A symbol occurs either in its current-state form
//! ([`Expr::Var`]) or its next-state form ([`Expr::Next`]); predicates only
//! use the former.
//!
//! ```
//! use predabs::expr::Expr;
//!
//! let x = Expr::var("x");
//! let y = Expr::var("y");
//! let f = (x.clone() & !y) | Expr::next("x");
//! assert_eq!(f.to_string(), "((x & !y) | x')");
//! assert_eq!(x.rename_to_next(), Expr::next("x"));
//! ```

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::ops::{BitAnd, BitOr, BitXor, Not};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(bool),
    Var(String),
    Next(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
    Ite(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn next(name: impl Into<String>) -> Self {
        Expr::Next(name.into())
    }

    pub fn not(value: Self) -> Self {
        match value {
            Expr::Const(b) => Expr::Const(!b),
            Expr::Not(inner) => *inner,
            _ => Expr::Not(Box::new(value)),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn xor(lhs: Self, rhs: Self) -> Self {
        Expr::Xor(Box::new(lhs), Box::new(rhs))
    }

    pub fn iff(lhs: Self, rhs: Self) -> Self {
        Expr::not(Expr::xor(lhs, rhs))
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Expr::or(Expr::not(lhs), rhs)
    }

    pub fn ite(cond: Self, then: Self, else_: Self) -> Self {
        Expr::Ite(Box::new(cond), Box::new(then), Box::new(else_))
    }

    /// Conjunction of all items; `true` when empty.
    pub fn and_many(items: impl IntoIterator<Item = Expr>) -> Self {
        items
            .into_iter()
            .reduce(Expr::and)
            .unwrap_or(Expr::Const(true))
    }

    /// Disjunction of all items; `false` when empty.
    pub fn or_many(items: impl IntoIterator<Item = Expr>) -> Self {
        items
            .into_iter()
            .reduce(Expr::or)
            .unwrap_or(Expr::Const(false))
    }

    fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Const(_) | Expr::Var(_) | Expr::Next(_) => vec![],
            Expr::Not(a) => vec![a],
            Expr::And(a, b) | Expr::Or(a, b) | Expr::Xor(a, b) => vec![a, b],
            Expr::Ite(a, b, c) => vec![a, b, c],
        }
    }

    fn collect_symbols<'a>(&'a self, next: bool, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Var(name) if !next => {
                out.insert(name);
            }
            Expr::Next(name) if next => {
                out.insert(name);
            }
            _ => {
                for child in self.children() {
                    child.collect_symbols(next, out);
                }
            }
        }
    }

    /// Symbols occurring in current-state form.
    pub fn support(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_symbols(false, &mut out);
        out
    }

    /// Symbols occurring in next-state form.
    pub fn next_support(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_symbols(true, &mut out);
        out
    }

    pub fn has_next(&self) -> bool {
        !self.next_support().is_empty()
    }

    /// Replace every current-state symbol by its next-state counterpart.
    pub fn rename_to_next(&self) -> Expr {
        match self {
            Expr::Const(b) => Expr::Const(*b),
            Expr::Var(name) | Expr::Next(name) => Expr::Next(name.clone()),
            Expr::Not(a) => Expr::Not(Box::new(a.rename_to_next())),
            Expr::And(a, b) => Expr::and(a.rename_to_next(), b.rename_to_next()),
            Expr::Or(a, b) => Expr::or(a.rename_to_next(), b.rename_to_next()),
            Expr::Xor(a, b) => Expr::xor(a.rename_to_next(), b.rename_to_next()),
            Expr::Ite(a, b, c) => {
                Expr::ite(a.rename_to_next(), b.rename_to_next(), c.rename_to_next())
            }
        }
    }

    /// Top-level conjuncts (`a & (b & c)` yields `[a, b, c]`).
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::And(a, b) => {
                let mut res = a.conjuncts();
                res.extend(b.conjuncts());
                res
            }
            _ => vec![self],
        }
    }

    /// Evaluate under `lookup(name, is_next)`; `None` if a symbol is unbound.
    pub fn eval(&self, lookup: &impl Fn(&str, bool) -> Option<bool>) -> Option<bool> {
        Some(match self {
            Expr::Const(b) => *b,
            Expr::Var(name) => lookup(name, false)?,
            Expr::Next(name) => lookup(name, true)?,
            Expr::Not(a) => !a.eval(lookup)?,
            Expr::And(a, b) => a.eval(lookup)? && b.eval(lookup)?,
            Expr::Or(a, b) => a.eval(lookup)? || b.eval(lookup)?,
            Expr::Xor(a, b) => a.eval(lookup)? ^ b.eval(lookup)?,
            Expr::Ite(a, b, c) => {
                if a.eval(lookup)? {
                    b.eval(lookup)?
                } else {
                    c.eval(lookup)?
                }
            }
        })
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Const(b) => write!(f, "{}", b),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Next(name) => write!(f, "{}'", name),
            Expr::Not(a) => write!(f, "!{}", a),
            Expr::And(a, b) => write!(f, "({} & {})", a, b),
            Expr::Or(a, b) => write!(f, "({} | {})", a, b),
            Expr::Xor(a, b) => write!(f, "({} ^ {})", a, b),
            Expr::Ite(a, b, c) => write!(f, "({} ? {} : {})", a, b, c),
        }
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Const(value)
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(self, rhs)
    }
}

impl BitXor for Expr {
    type Output = Expr;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Expr::xor(self, rhs)
    }
}
