//! Memoization of cluster abstractions across refinement iterations.
//!
//! Three tables, one per [`CacheKind`], each mapping a canonical
//! [`CacheKey`] to the cube set computed for it. Keys are exact predicate-id
//! sets, so entries never go stale while the concrete system is unchanged and
//! nothing is ever evicted.
//!
//! Counters are table-level: `accesses` counts every lookup, `hits` counts the
//! lookups that found an entry. A disabled table still counts accesses (the
//! numbers feed the statistics report) but never finds or stores anything.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::trace;

use crate::cube::CubeSet;
use crate::error::{AbstractionError, Result};
use crate::predicate::PredIdSet;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CacheKind {
    /// Transition relations of refinement-supplied clusters.
    PredId,
    /// Initial states of single clusters and of cluster pairs.
    Init,
    /// Transition relations of default-partition clusters.
    Trans,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [CacheKind::PredId, CacheKind::Init, CacheKind::Trans];

    /// Short name used in the statistics report.
    pub fn name(self) -> &'static str {
        match self {
            CacheKind::PredId => "pred_id",
            CacheKind::Init => "init",
            CacheKind::Trans => "trans",
        }
    }
}

impl Display for CacheKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Canonical cache key.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum CacheKey {
    /// A single cluster (initial states).
    Set(PredIdSet),
    /// Ordered pair: (current, next) ids of a transition cluster, or two
    /// clusters related through their initial states.
    Pair(PredIdSet, PredIdSet),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Set(ids) => write!(f, "{}", ids),
            CacheKey::Pair(a, b) => write!(f, "({}, {})", a, b),
        }
    }
}

#[derive(Debug)]
pub struct CacheTable {
    kind: CacheKind,
    enabled: bool,
    entries: HashMap<CacheKey, CubeSet>,
    accesses: u64,
    hits: u64,
}

impl CacheTable {
    pub fn new(kind: CacheKind, enabled: bool) -> Self {
        Self {
            kind,
            enabled,
            entries: HashMap::new(),
            accesses: 0,
            hits: 0,
        }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&mut self, key: &CacheKey) -> Option<&CubeSet> {
        self.accesses += 1;
        if !self.enabled {
            return None;
        }
        let found = self.entries.get(key);
        if found.is_some() {
            self.hits += 1;
        }
        trace!(
            "{} cache {}: {}",
            self.kind,
            if found.is_some() { "hit" } else { "miss" },
            key
        );
        found
    }

    /// Store a freshly computed value.
    ///
    /// Storing a different value under an existing key means the cache was
    /// keyed inconsistently; this is reported, never overwritten.
    pub fn store(&mut self, key: CacheKey, value: CubeSet) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(existing) = self.entries.get(&key) {
            if *existing != value {
                return Err(AbstractionError::CacheInconsistency {
                    kind: self.kind,
                    key: key.to_string(),
                });
            }
            return Ok(());
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Return the cached value for `key`, or compute, store and return it.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<CubeSet>
    where
        F: FnOnce() -> Result<CubeSet>,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.store(key, value.clone())?;
        Ok(value)
    }
}

/// The three cache tables of one abstractor instance.
#[derive(Debug)]
pub struct AbstractionCache {
    pred_id: CacheTable,
    init: CacheTable,
    trans: CacheTable,
}

impl AbstractionCache {
    pub fn new(pred_id_enabled: bool, init_enabled: bool, trans_enabled: bool) -> Self {
        Self {
            pred_id: CacheTable::new(CacheKind::PredId, pred_id_enabled),
            init: CacheTable::new(CacheKind::Init, init_enabled),
            trans: CacheTable::new(CacheKind::Trans, trans_enabled),
        }
    }

    pub fn table(&self, kind: CacheKind) -> &CacheTable {
        match kind {
            CacheKind::PredId => &self.pred_id,
            CacheKind::Init => &self.init,
            CacheKind::Trans => &self.trans,
        }
    }

    pub fn table_mut(&mut self, kind: CacheKind) -> &mut CacheTable {
        match kind {
            CacheKind::PredId => &mut self.pred_id,
            CacheKind::Init => &mut self.init,
            CacheKind::Trans => &mut self.trans,
        }
    }
}
