//! Structural decomposition of the concrete system.
//!
//! A hierarchical design is a network of components (modules, processes),
//! each owning some state symbols. Predicates whose symbols live in the same
//! component tend to be correlated, which the component partitioning
//! strategy exploits.

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct NetworkInfo {
    components: BTreeMap<String, BTreeSet<String>>,
    owner: HashMap<String, String>,
}

impl NetworkInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component owning the given symbols.
    ///
    /// A symbol belongs to at most one component; later registrations take it over.
    pub fn add_component<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) {
        let name = name.into();
        for symbol in symbols {
            let symbol = symbol.into();
            if let Some(previous) = self.owner.insert(symbol.clone(), name.clone()) {
                if let Some(owned) = self.components.get_mut(&previous) {
                    owned.remove(&symbol);
                }
            }
            self.components
                .entry(name.clone())
                .or_default()
                .insert(symbol);
        }
        self.components.entry(name).or_default();
    }

    pub fn component_of(&self, symbol: &str) -> Option<&str> {
        self.owner.get(symbol).map(String::as_str)
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.components.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components() {
        let mut network = NetworkInfo::new();
        network.add_component("alu", ["a", "b"]);
        network.add_component("ctrl", ["c"]);

        assert_eq!(network.component_of("a"), Some("alu"));
        assert_eq!(network.component_of("c"), Some("ctrl"));
        assert_eq!(network.component_of("z"), None);
        assert_eq!(network.components().count(), 2);
    }

    #[test]
    fn test_symbol_moves_to_latest_component() {
        let mut network = NetworkInfo::new();
        network.add_component("m1", ["a", "b"]);
        network.add_component("m2", ["b"]);

        assert_eq!(network.component_of("b"), Some("m2"));
        let m1: Vec<_> = network
            .components()
            .find(|(name, _)| *name == "m1")
            .map(|(_, symbols)| symbols.iter().cloned().collect())
            .unwrap();
        assert_eq!(m1, vec!["a".to_string()]);
    }
}
