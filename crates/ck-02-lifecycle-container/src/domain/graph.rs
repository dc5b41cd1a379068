//! Dependency graph ordering.
//!
//! Edges point from a service to the services it depends on. Dependencies
//! that are not nodes of the graph are ignored here; the container decides
//! what to do with them.

use std::collections::{BTreeMap, BTreeSet};

/// Service name to declared dependencies.
pub type DependencyGraph = BTreeMap<String, Vec<String>>;

/// Deterministic topological order, dependencies first.
///
/// Among services that are ready at the same time, the lexicographically
/// smallest goes first. On failure every strongly connected component that
/// forms a cycle is returned, members sorted, components sorted.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>, Vec<Vec<String>>> {
    let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, deps) in graph {
        let known: BTreeSet<&str> = deps
            .iter()
            .map(String::as_str)
            .filter(|d| graph.contains_key(*d))
            .collect();
        pending.insert(name, known.len());
        for dep in known {
            dependents.entry(dep).or_default().push(name);
        }
    }

    let mut ready: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        for dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(find_cycles(graph))
    }
}

/// Group a topological order into waves. Every member of wave `n` depends
/// only on members of waves `< n`, so a wave may start concurrently.
#[must_use]
pub fn start_waves(graph: &DependencyGraph, order: &[String]) -> Vec<Vec<String>> {
    let mut level: BTreeMap<&str, usize> = BTreeMap::new();
    let mut waves: Vec<Vec<String>> = Vec::new();

    for name in order {
        let depth = graph
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|dep| level.get(dep.as_str()))
            .map(|l| l + 1)
            .max()
            .unwrap_or(0);
        level.insert(name, depth);
        if waves.len() <= depth {
            waves.resize_with(depth + 1, Vec::new);
        }
        waves[depth].push(name.clone());
    }

    waves
}

/// Tarjan's strongly connected components, keeping those that are cycles.
///
/// Iterative, so arbitrarily long dependency chains do not grow the call stack.
fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    struct Tarjan<'a> {
        graph: &'a DependencyGraph,
        index: usize,
        indices: BTreeMap<&'a str, usize>,
        lowlink: BTreeMap<&'a str, usize>,
        stack: Vec<&'a str>,
        on_stack: BTreeSet<&'a str>,
        /// DFS frames: node and position of its next dependency.
        frames: Vec<(&'a str, usize)>,
        cycles: Vec<Vec<String>>,
    }

    impl<'a> Tarjan<'a> {
        fn enter(&mut self, node: &'a str) {
            self.indices.insert(node, self.index);
            self.lowlink.insert(node, self.index);
            self.index += 1;
            self.stack.push(node);
            self.on_stack.insert(node);
            self.frames.push((node, 0));
        }

        fn lower(&mut self, node: &'a str, candidate: usize) {
            if candidate < self.lowlink[node] {
                self.lowlink.insert(node, candidate);
            }
        }

        fn visit(&mut self, root: &'a str) {
            let graph = self.graph;
            self.enter(root);

            while let Some(frame) = self.frames.last_mut() {
                let node = frame.0;
                let deps = graph.get(node).map(Vec::as_slice).unwrap_or_default();
                if let Some(dep) = deps.get(frame.1) {
                    frame.1 += 1;
                    let dep = dep.as_str();
                    if !graph.contains_key(dep) {
                        continue;
                    }
                    if !self.indices.contains_key(dep) {
                        self.enter(dep);
                    } else if self.on_stack.contains(dep) {
                        self.lower(node, self.indices[dep]);
                    }
                    continue;
                }

                self.frames.pop();
                if let Some(&(parent, _)) = self.frames.last() {
                    self.lower(parent, self.lowlink[node]);
                }
                if self.lowlink[node] == self.indices[node] {
                    self.close_component(node);
                }
            }
        }

        fn close_component(&mut self, node: &'a str) {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.push(member.to_string());
                if member == node {
                    break;
                }
            }
            let self_loop = self
                .graph
                .get(node)
                .is_some_and(|deps| deps.iter().any(|d| d == node));
            if component.len() > 1 || self_loop {
                component.sort();
                self.cycles.push(component);
            }
        }
    }

    let mut tarjan = Tarjan {
        graph,
        index: 0,
        indices: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        frames: Vec::new(),
        cycles: Vec::new(),
    };
    for node in graph.keys() {
        if !tarjan.indices.contains_key(node.as_str()) {
            tarjan.visit(node);
        }
    }

    let mut cycles = tarjan.cycles;
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        edges
            .iter()
            .map(|(name, deps)| {
                (
                    name.to_string(),
                    deps.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_dependencies_first() {
        let g = graph(&[("b", &["a"]), ("a", &[]), ("c", &["b", "a"])]);
        assert_eq!(topological_order(&g).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_deterministic_tie_break() {
        let g = graph(&[("zeta", &[]), ("alpha", &[]), ("mid", &["zeta"])]);
        assert_eq!(topological_order(&g).unwrap(), vec!["alpha", "zeta", "mid"]);
    }

    #[test]
    fn test_unknown_dependencies_ignored() {
        let g = graph(&[("a", &["external"])]);
        assert_eq!(topological_order(&g).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_two_node_cycle_names_both() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        assert_eq!(
            topological_order(&g).unwrap_err(),
            vec![vec!["a".to_string(), "b".to_string()]]
        );
    }

    #[test]
    fn test_all_cycles_reported() {
        let g = graph(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("c", &["d"]),
            ("d", &["e"]),
            ("e", &["c"]),
            ("f", &["f"]),
            ("g", &["a"]),
        ]);
        assert_eq!(
            topological_order(&g).unwrap_err(),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string(), "e".to_string()],
                vec!["f".to_string()],
            ]
        );
    }

    #[test]
    fn test_long_chain_cycle_does_not_exhaust_stack() {
        const LEN: usize = 50_000;
        let g: DependencyGraph = (0..LEN)
            .map(|i| (format!("s{i:05}"), vec![format!("s{:05}", (i + 1) % LEN)]))
            .collect();

        let cycles = topological_order(&g).unwrap_err();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), LEN);
    }

    #[test]
    fn test_waves() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &[]), ("d", &["b", "c"])]);
        let order = topological_order(&g).unwrap();
        assert_eq!(
            start_waves(&g, &order),
            vec![
                vec!["a".to_string(), "c".to_string()],
                vec!["b".to_string()],
                vec!["d".to_string()],
            ]
        );
    }

    /// Random DAG: node i may only depend on nodes < i.
    fn dag() -> impl Strategy<Value = DependencyGraph> {
        (1usize..25).prop_flat_map(|n| {
            proptest::collection::vec(proptest::collection::vec(any::<prop::sample::Index>(), 0..4), n)
                .prop_map(move |deps| {
                    deps.into_iter()
                        .enumerate()
                        .map(|(i, picks)| {
                            let targets = if i == 0 {
                                Vec::new()
                            } else {
                                picks.iter().map(|p| format!("s{:02}", p.index(i))).collect()
                            };
                            (format!("s{i:02}"), targets)
                        })
                        .collect()
                })
        })
    }

    proptest! {
        #[test]
        fn prop_order_respects_every_edge(g in dag()) {
            let order = topological_order(&g).unwrap();
            prop_assert_eq!(order.len(), g.len());
            let position: BTreeMap<&str, usize> =
                order.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
            for (name, deps) in &g {
                for dep in deps {
                    prop_assert!(position[dep.as_str()] < position[name.as_str()]);
                }
            }
        }

        #[test]
        fn prop_order_is_deterministic(g in dag()) {
            prop_assert_eq!(topological_order(&g).unwrap(), topological_order(&g.clone()).unwrap());
        }

        #[test]
        fn prop_back_edge_is_reported(g in dag()) {
            // Adding an edge from the first node to the last closes a cycle.
            let mut g = g;
            let order = topological_order(&g).unwrap();
            let first = order.first().unwrap().clone();
            let last = order.last().unwrap().clone();
            prop_assume!(first != last);
            let reaches_last = {
                // Only a cycle if `last` transitively depends on `first`.
                let mut stack = vec![last.clone()];
                let mut seen = BTreeSet::new();
                let mut found = false;
                while let Some(n) = stack.pop() {
                    if n == first { found = true; break; }
                    if seen.insert(n.clone()) {
                        stack.extend(g[&n].iter().cloned());
                    }
                }
                found
            };
            g.get_mut(&first).unwrap().push(last.clone());
            let result = topological_order(&g);
            if reaches_last {
                let cycles = result.unwrap_err();
                prop_assert!(cycles.iter().any(|c| c.contains(&first) && c.contains(&last)));
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
