//! Dependency Graph - static validation of declared bindings
//!
//! The graph is an adjacency mapping `name → [required names]` derived from a
//! registry snapshot. It is built once, never mutated, and answers two
//! questions before an injector is handed out:
//! - does any binding require a name that was never registered?
//! - do the bindings require each other in a cycle?

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Adjacency view of the bindings, used purely for validation and reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Bindings by name, each with its ordered dependency list
    graph: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new(graph: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            graph: graph.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graph.contains_key(name)
    }

    /// Declared dependencies of `name`, in order
    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.graph.get(name).map(|v| v.as_slice())
    }

    /// All binding names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.keys().map(String::as_str)
    }

    /// Check whether any binding refers to a name that is not in the graph
    pub fn has_missing_dependencies(&self) -> bool {
        self.graph
            .values()
            .flatten()
            .any(|dependency| !self.graph.contains_key(dependency))
    }

    /// Every `(binding, missing dependency)` pair, sorted by binding
    pub fn missing_dependencies(&self) -> Vec<(&str, &str)> {
        self.graph
            .iter()
            .flat_map(|(name, dependencies)| {
                dependencies
                    .iter()
                    .filter(move |d| !self.graph.contains_key(*d))
                    .map(move |d| (name.as_str(), d.as_str()))
            })
            .collect()
    }

    /// Check whether the bindings contain a cycle
    pub fn has_circular_dependencies(&self) -> bool {
        self.eliminate().len() < self.graph.len()
    }

    /// Names that can never be constructed: members of a cycle and anything
    /// depending on one. Empty for an acyclic graph.
    pub fn cyclic_bindings(&self) -> Vec<&str> {
        let removed = self.eliminate();
        if removed.len() == self.graph.len() {
            return Vec::new();
        }
        let mut remaining: Vec<&str> = self
            .graph
            .keys()
            .map(String::as_str)
            .filter(|name| !removed.contains(name))
            .collect();
        remaining.sort_unstable();
        remaining
    }

    /// Dependency-first construction order, or `None` if there is a cycle
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let order = self.eliminate();
        (order.len() == self.graph.len()).then_some(order)
    }

    /// Bindings that directly require `name`, sorted and deduplicated
    pub fn dependents(&self, name: &str) -> Vec<&str> {
        self.graph
            .iter()
            .filter(|(_, dependencies)| dependencies.iter().any(|d| d == name))
            .map(|(dependent, _)| dependent.as_str())
            .collect()
    }

    /// Kahn-style elimination. Each node starts with the number of its
    /// dependencies that are nodes of the graph; nodes reaching zero are
    /// removed and release their dependents. Returns nodes in removal order.
    ///
    /// Duplicate entries in a dependency list count once per occurrence and
    /// are released once per occurrence.
    fn eliminate(&self) -> Vec<&str> {
        let mut remaining: HashMap<&str, usize> = HashMap::with_capacity(self.graph.len());
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for (name, dependencies) in &self.graph {
            let mut count = 0;
            for dependency in dependencies {
                if self.graph.contains_key(dependency) {
                    count += 1;
                    dependents
                        .entry(dependency.as_str())
                        .or_default()
                        .push(name.as_str());
                }
            }
            remaining.insert(name.as_str(), count);
        }

        let mut ready: VecDeque<&str> = self
            .graph
            .keys()
            .map(String::as_str)
            .filter(|name| remaining[name] == 0)
            .collect();

        let mut removed = Vec::with_capacity(self.graph.len());
        while let Some(done) = ready.pop_front() {
            removed.push(done);
            for &dependent in dependents.get(done).into_iter().flatten() {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        removed
    }

    /// Get statistics about the graph
    pub fn stats(&self) -> GraphStats {
        let edges = self.graph.values().map(Vec::len).sum();
        let roots = self.graph.values().filter(|d| d.is_empty()).count();
        let depth = self.topological_order().map(|order| self.depth(&order));

        GraphStats {
            bindings: self.graph.len(),
            edges,
            roots,
            missing: self.missing_dependencies().len(),
            cyclic: self.cyclic_bindings().len(),
            depth,
        }
    }

    /// Longest dependency chain, given a topological order
    fn depth(&self, order: &[&str]) -> usize {
        let mut levels: HashMap<&str, usize> = HashMap::with_capacity(order.len());
        for &name in order {
            let level = self.graph[name]
                .iter()
                .filter_map(|d| levels.get(d.as_str()))
                .map(|l| l + 1)
                .max()
                .unwrap_or(0);
            levels.insert(name, level);
        }
        levels.values().copied().max().unwrap_or(0)
    }
}

impl FromIterator<(String, Vec<String>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Statistics about a dependency graph
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub bindings: usize,
    pub edges: usize,
    /// Bindings with no dependencies
    pub roots: usize,
    /// References to unregistered names
    pub missing: usize,
    /// Bindings blocked by a cycle
    pub cyclic: usize,
    /// Longest dependency chain; `None` when the graph is cyclic
    pub depth: Option<usize>,
}

impl GraphStats {
    pub fn is_valid(&self) -> bool {
        self.missing == 0 && self.cyclic == 0
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dependency Graph Statistics:")?;
        writeln!(f, "  Bindings: {} (roots: {})", self.bindings, self.roots)?;
        writeln!(f, "  Edges: {}", self.edges)?;
        match self.depth {
            Some(depth) => writeln!(f, "  Depth: {}", depth)?,
            None => writeln!(f, "  Depth: n/a")?,
        }
        writeln!(f, "  Missing: {}, cyclic: {}", self.missing, self.cyclic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(entries: &[(&str, &[&str])]) -> DependencyGraph {
        entries
            .iter()
            .map(|(name, deps)| {
                (
                    name.to_string(),
                    deps.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_approves_empty_graph() {
        let g = graph(&[]);
        assert!(!g.has_missing_dependencies());
        assert!(!g.has_circular_dependencies());
        assert_eq!(g.topological_order(), Some(vec![]));
    }

    #[test]
    fn test_approves_when_dependencies_met() {
        let g = graph(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[])]);
        assert!(!g.has_missing_dependencies());
        assert!(g.missing_dependencies().is_empty());
    }

    #[test]
    fn test_rejects_when_missing_dependencies() {
        let g = graph(&[("a", &["b", "c"]), ("b", &["c"])]);
        assert!(g.has_missing_dependencies());
        assert_eq!(g.missing_dependencies(), vec![("a", "c"), ("b", "c")]);
    }

    #[test]
    fn test_no_cycles_in_good_graph() {
        let g = graph(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &[])]);
        assert!(!g.has_circular_dependencies());
        assert!(g.cyclic_bindings().is_empty());
        assert_eq!(g.topological_order(), Some(vec!["c", "b", "a"]));
    }

    #[test]
    fn test_finds_cycles() {
        let g = graph(&[
            ("a", &["b", "c"]),
            ("b", &["c"]),
            ("c", &["d"]),
            ("d", &["b"]),
        ]);
        assert!(g.has_circular_dependencies());
        // a never becomes constructible because it depends on the cycle
        assert_eq!(g.cyclic_bindings(), vec!["a", "b", "c", "d"]);
        assert_eq!(g.topological_order(), None);
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let g = graph(&[("a", &["a"]), ("b", &[])]);
        assert!(g.has_circular_dependencies());
        assert_eq!(g.cyclic_bindings(), vec!["a"]);
    }

    #[test]
    fn test_duplicate_dependency_entries_are_not_a_cycle() {
        let g = graph(&[("a", &["b", "b"]), ("b", &[])]);
        assert!(!g.has_missing_dependencies());
        assert!(!g.has_circular_dependencies());
        assert_eq!(g.topological_order(), Some(vec!["b", "a"]));
    }

    #[test]
    fn test_dependents() {
        let g = graph(&[("a", &["d"]), ("b", &["d", "d"]), ("c", &[]), ("d", &[])]);
        assert_eq!(g.dependents("d"), vec!["a", "b"]);
        assert!(g.dependents("a").is_empty());
    }

    #[test]
    fn test_stats() {
        let g = graph(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &["d"]), ("d", &[])]);
        let stats = g.stats();
        assert_eq!(stats.bindings, 4);
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.roots, 1);
        assert_eq!(stats.depth, Some(2));
        assert!(stats.is_valid());

        let cyclic = graph(&[("a", &["b"]), ("b", &["a"])]).stats();
        assert_eq!(cyclic.cyclic, 2);
        assert_eq!(cyclic.depth, None);
        assert!(!cyclic.is_valid());
    }
}
