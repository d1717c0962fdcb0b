//! Structural checks and metrics over a parsed graph.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::{ConceptGraph, GdlWarning, ValidateConfig};

/// A directed `(source, target)` pair declared more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEdge {
    pub source: String,
    pub target: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GraphReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub self_loops: usize,
    pub density: f64,
    pub avg_in_degree: f64,
    pub avg_out_degree: f64,
    pub duplicate_edges: Vec<DuplicateEdge>,
    /// Node ids touched by no edge, sorted.
    pub unreferenced_nodes: Vec<String>,
    pub weak_components: usize,
    /// True for graphs with at most one weak component, the empty graph
    /// included.
    pub is_connected: bool,
    pub largest_component_size: usize,
    /// Mean hop distance between ordered node pairs of the largest weak
    /// component, edges taken as undirected.
    pub avg_shortest_path: f64,
    /// Longest hop distance within the largest weak component.
    pub diameter: usize,
    /// `(in + out) / (n - 1)` per node, in declaration order. Parallel edges
    /// count once.
    pub degree_centrality: IndexMap<String, f64>,
    /// Maximal linear chains of two or more nodes.
    pub chains: Vec<Vec<String>>,
    /// Cycles through nodes no chain consumed, one per node set.
    pub cycles: Vec<Vec<String>>,
    pub longest_chain_length: usize,
    pub longest_cycle_length: usize,
}

impl GraphReport {
    #[must_use]
    pub fn analyze(graph: &ConceptGraph) -> Self {
        let index = NodeIndex::new(graph);
        let node_count = graph.nodes.len();
        let edge_count = graph.edges.len();

        let self_loops = graph
            .edges
            .iter()
            .filter(|edge| edge.source == edge.target)
            .count();

        #[allow(clippy::cast_precision_loss)]
        let (density, avg_degree) = if node_count == 0 {
            (0.0, 0.0)
        } else {
            let n = node_count as f64;
            let e = edge_count as f64;
            let density = if node_count > 1 { e / (n * (n - 1.0)) } else { 0.0 };
            (density, e / n)
        };

        let components = index.weak_components();
        let largest = largest_component(&components);
        let (avg_shortest_path, diameter) = largest.map_or((0.0, 0), |nodes| index.distances(nodes));

        let (chains, cycles) = index.chains_and_cycles();

        Self {
            node_count,
            edge_count,
            self_loops,
            density,
            avg_in_degree: avg_degree,
            avg_out_degree: avg_degree,
            duplicate_edges: duplicate_edges(graph),
            unreferenced_nodes: unreferenced_nodes(graph),
            weak_components: components.len(),
            is_connected: components.len() <= 1,
            largest_component_size: largest.map_or(0, Vec::len),
            avg_shortest_path,
            diameter,
            degree_centrality: index.degree_centrality(),
            longest_chain_length: longest_path(&chains),
            longest_cycle_length: longest_path(&cycles),
            chains,
            cycles,
        }
    }

    /// Findings that `config` asks to report.
    #[must_use]
    pub fn finding_count(&self, config: &ValidateConfig) -> usize {
        let mut count = 0;
        if config.report_duplicates {
            count += self.duplicate_edges.len();
        }
        if config.report_unreferenced {
            count += self.unreferenced_nodes.len();
        }
        count
    }

    /// Validation verdict: parse warnings always fail, reported findings
    /// fail only in strict mode.
    #[must_use]
    pub fn is_valid(&self, config: &ValidateConfig, warnings: &[GdlWarning]) -> bool {
        warnings.is_empty() && (!config.strict || self.finding_count(config) == 0)
    }
}

fn duplicate_edges(graph: &ConceptGraph) -> Vec<DuplicateEdge> {
    let mut order: Vec<(&str, &str)> = Vec::new();
    let mut counts: FxHashMap<(&str, &str), usize> = FxHashMap::default();
    for edge in &graph.edges {
        let key = (edge.source.as_str(), edge.target.as_str());
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let count = counts.get(&key).copied().unwrap_or_default();
            (count > 1).then(|| DuplicateEdge {
                source: key.0.to_string(),
                target: key.1.to_string(),
                count,
            })
        })
        .collect()
}

fn unreferenced_nodes(graph: &ConceptGraph) -> Vec<String> {
    let referenced: FxHashSet<&str> = graph
        .edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect();
    let mut unreferenced: Vec<String> = graph
        .nodes
        .iter()
        .filter(|node| !referenced.contains(node.id.as_str()))
        .map(|node| node.id.clone())
        .collect();
    unreferenced.sort();
    unreferenced
}

fn longest_path(paths: &[Vec<String>]) -> usize {
    paths.iter().map(Vec::len).max().unwrap_or(0)
}

/// First of the largest components.
fn largest_component(components: &[Vec<usize>]) -> Option<&Vec<usize>> {
    let mut largest: Option<&Vec<usize>> = None;
    for component in components {
        if largest.is_none_or(|best| component.len() > best.len()) {
            largest = Some(component);
        }
    }
    largest
}

/// Adjacency over node positions. Parallel edges collapse into one link and
/// edges with unknown endpoints are ignored.
struct NodeIndex<'a> {
    ids: Vec<&'a str>,
    successors: Vec<Vec<usize>>,
    /// Undirected neighbours without self links.
    neighbours: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl<'a> NodeIndex<'a> {
    fn new(graph: &'a ConceptGraph) -> Self {
        let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
        let position: FxHashMap<&str, usize> =
            ids.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();

        let mut successors = vec![Vec::new(); ids.len()];
        let mut neighbours = vec![Vec::new(); ids.len()];
        let mut in_degree = vec![0; ids.len()];
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                position.get(edge.source.as_str()),
                position.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if seen.insert((from, to)) {
                successors[from].push(to);
                in_degree[to] += 1;
                if from != to {
                    neighbours[from].push(to);
                    neighbours[to].push(from);
                }
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            ids,
            successors,
            neighbours,
            in_degree,
        }
    }

    fn out_degree(&self, node: usize) -> usize {
        self.successors[node].len()
    }

    fn is_chain_interior(&self, node: usize) -> bool {
        self.in_degree[node] == 1 && self.out_degree(node) == 1
    }

    fn names(&self, paths: Vec<Vec<usize>>) -> Vec<Vec<String>> {
        paths
            .into_iter()
            .map(|path| path.into_iter().map(|idx| self.ids[idx].to_string()).collect())
            .collect()
    }

    /// Weak components in order of their first declared node.
    fn weak_components(&self) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; self.ids.len()];
        let mut components = Vec::new();

        for start in 0..self.ids.len() {
            if assigned[start] {
                continue;
            }
            assigned[start] = true;
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for &next in &self.neighbours[node] {
                    if !assigned[next] {
                        assigned[next] = true;
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// Hop counts from `start` over undirected links; `None` when unreachable.
    fn hops_from(&self, start: usize) -> Vec<Option<usize>> {
        let mut hops = vec![None; self.ids.len()];
        hops[start] = Some(0);
        let mut queue = VecDeque::from([(start, 0)]);
        while let Some((node, depth)) = queue.pop_front() {
            for &next in &self.neighbours[node] {
                if hops[next].is_none() {
                    hops[next] = Some(depth + 1);
                    queue.push_back((next, depth + 1));
                }
            }
        }
        hops
    }

    /// Average shortest path and diameter of one component.
    #[allow(clippy::cast_precision_loss)]
    fn distances(&self, component: &[usize]) -> (f64, usize) {
        let size = component.len();
        if size < 2 {
            return (0.0, 0);
        }

        let mut total = 0_usize;
        let mut diameter = 0;
        for &source in component {
            let hops = self.hops_from(source);
            for &target in component {
                if let Some(distance) = hops[target] {
                    total += distance;
                    diameter = diameter.max(distance);
                }
            }
        }

        (total as f64 / (size * (size - 1)) as f64, diameter)
    }

    #[allow(clippy::cast_precision_loss)]
    fn degree_centrality(&self) -> IndexMap<String, f64> {
        let n = self.ids.len();
        self.ids
            .iter()
            .enumerate()
            .map(|(idx, id)| {
                let centrality = if n <= 1 {
                    1.0
                } else {
                    (self.in_degree[idx] + self.out_degree(idx)) as f64 / (n - 1) as f64
                };
                ((*id).to_string(), centrality)
            })
            .collect()
    }

    fn chains_and_cycles(&self) -> (Vec<Vec<String>>, Vec<Vec<String>>) {
        let mut visited = vec![false; self.ids.len()];
        let chains = self.chains(&mut visited);
        let cycles = self.cycles(&mut visited);
        (self.names(chains), self.names(cycles))
    }

    fn chains(&self, visited: &mut [bool]) -> Vec<Vec<usize>> {
        let mut chains = Vec::new();

        for start in 0..self.ids.len() {
            if visited[start] || self.is_chain_interior(start) {
                continue;
            }

            let mut chain = vec![start];
            visited[start] = true;
            let mut current = start;
            while self.out_degree(current) == 1 {
                let next = self.successors[current][0];
                if next == current {
                    break;
                }
                if self.is_chain_interior(next) && !visited[next] {
                    chain.push(next);
                    visited[next] = true;
                    current = next;
                } else {
                    if !visited[next] {
                        chain.push(next);
                        visited[next] = true;
                    }
                    break;
                }
            }

            if chain.len() > 1 {
                chains.push(chain);
            } else {
                visited[start] = false;
            }
        }

        chains
    }

    /// Shortest cycle through each node the chain walk left behind, skipping
    /// cycles whose node set is already listed.
    fn cycles(&self, visited: &mut [bool]) -> Vec<Vec<usize>> {
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        let mut node_sets: FxHashSet<Vec<usize>> = FxHashSet::default();

        for start in 0..self.ids.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let Some(cycle) = self.shortest_cycle_through(start) else {
                continue;
            };

            let mut members = cycle.clone();
            members.sort_unstable();
            if node_sets.insert(members) {
                for &node in &cycle {
                    visited[node] = true;
                }
                cycles.push(cycle);
            }
        }

        cycles
    }

    /// Breadth-first search along edge direction, back to `start`.
    fn shortest_cycle_through(&self, start: usize) -> Option<Vec<usize>> {
        let mut parent: Vec<Option<usize>> = vec![None; self.ids.len()];
        let mut seen = vec![false; self.ids.len()];
        seen[start] = true;
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for &next in &self.successors[node] {
                if next == start {
                    let mut cycle = vec![node];
                    let mut current = node;
                    while let Some(previous) = parent[current] {
                        cycle.push(previous);
                        current = previous;
                    }
                    cycle.reverse();
                    return Some(cycle);
                }
                if !seen[next] {
                    seen[next] = true;
                    parent[next] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        None
    }
}
