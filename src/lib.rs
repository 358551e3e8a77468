//! # predabs: cluster-based predicate abstraction
//!
//! **`predabs`** computes the abstraction step of a CEGAR (counterexample-guided abstraction refinement) loop:
//! given a concrete transition system and a set of predicates over its state, it builds a finite Boolean
//! transition system over one variable per predicate that over-approximates every concrete behavior.
//!
//! ## How it works
//!
//! Abstracting all predicates at once costs a decision-procedure query that is exponential in the number of
//! predicates. Instead, predicates are split into small **clusters**, each cluster is abstracted separately, and
//! the abstract system is the product of the per-cluster relations.
//!
//! Refinement iterations only ever add predicates, so most clusters reappear unchanged from one iteration to the
//! next. Every cluster relation is therefore **cached**, keyed by the exact set of predicate ids it covers.
//!
//! ## Key Features
//!
//! - **Eight partitioning strategies**, from singleton clusters to a single monolithic one (see [`partition`]).
//! - **Refinement clusters**: predicates correlated by an unsat core are abstracted together from then on (see [`refinement`]).
//! - **Three cache tables** with access and hit counters (see [`cache::abstraction`]).
//! - **Pluggable decision procedure** through the [`DecisionProcedure`][crate::oracle::DecisionProcedure] trait,
//!   with an exact BDD-based one included ([`BddOracle`][crate::oracle::BddOracle]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use predabs::abstractor::Abstractor;
//! use predabs::concrete::ConcreteTrans;
//! use predabs::config::AbstractorConfig;
//! use predabs::expr::Expr;
//! use predabs::namespace::Namespace;
//! use predabs::network::NetworkInfo;
//! use predabs::oracle::BddOracle;
//! use predabs::predicate::Predicates;
//!
//! // 1. A 2-bit counter starting at 0
//! let lo = Expr::var("lo");
//! let hi = Expr::var("hi");
//! let system = ConcreteTrans::from_latches([
//!     ("lo", Some(false), !lo.clone()),
//!     ("hi", Some(false), hi.clone() ^ lo.clone()),
//! ]);
//! let mut ns = Namespace::new();
//! ns.add_latch("lo");
//! ns.add_latch("hi");
//!
//! // 2. Predicates
//! let mut predicates = Predicates::new();
//! predicates.add(lo & hi);
//!
//! // 3. Abstract
//! let config = AbstractorConfig::builder().partition(6).build().unwrap();
//! let mut abstractor = Abstractor::new(config);
//! let mut oracle = BddOracle::new();
//! let ats = abstractor
//!     .calc_abstraction(&mut oracle, &predicates, &system, &ns, &NetworkInfo::new(), [])
//!     .unwrap();
//!
//! // The counter does not start at 3
//! assert_eq!(ats.count_initial_states().to_string(), "1");
//! ```
//!
//! ## Core Components
//!
//! - **[`abstractor`]**: The [`Abstractor`][crate::abstractor::Abstractor], driving one abstraction pass per refinement iteration.
//! - **[`calculator`]**: Per-cluster abstraction through the cache.
//! - **[`combine`]**: The product [`AbstractTransitionSystem`][crate::combine::AbstractTransitionSystem].
//! - **[`bdd`]**: The BDD manager behind [`BddOracle`][crate::oracle::BddOracle] and [`combine`]'s symbolic export.

pub mod abstractor;
pub mod bdd;
pub mod cache;
pub mod calculator;
pub mod combine;
pub mod concrete;
pub mod config;
pub mod cube;
pub mod error;
pub mod expr;
pub mod message;
pub mod namespace;
pub mod network;
pub mod oracle;
pub mod partition;
pub mod paths;
pub mod predicate;
pub mod reference;
pub mod refinement;
pub mod sat;
pub mod stats;
pub mod table;
pub mod types;
pub mod utils;
