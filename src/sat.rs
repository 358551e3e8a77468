use std::collections::HashMap;

use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Number of satisfying assignments of `node` over variables `1..=num_vars`.
    ///
    /// `node` must not depend on variables beyond `num_vars`.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let max = BigUint::from(1u32) << num_vars;
        let mut cache = HashMap::new();
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        }
        if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        // Each node halves the fraction of the space its children cover.
        let low = self.sat_count_(self.low_node(node), max, cache);
        let high = self.sat_count_(self.high_node(node), max, cache);
        let count: BigUint = (low + high) >> 1;

        cache.insert(node, count.clone());
        count
    }
}
