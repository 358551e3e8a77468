//! Caches.
//!
//! | Cache | Key | Lifetime | Purpose |
//! |-------|-----|----------|---------|
//! | [`computed::ComputedCache`] | BDD operation | one [`Bdd`][crate::bdd::Bdd] manager | memoize ITE results |
//! | [`abstraction::AbstractionCache`] | predicate-id set(s) | one [`Abstractor`][crate::abstractor::Abstractor] | reuse cluster abstractions across refinement iterations |
//!
//! The abstraction cache is the expensive one: each miss costs a
//! decision-procedure query.

pub mod abstraction;
pub mod computed;

pub use abstraction::{AbstractionCache, CacheKey, CacheKind, CacheTable};
