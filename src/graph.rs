//! Cycle detection over small name graphs.
//!
//! Storage is a petgraph `GraphMap`: nodes and neighbor lists keep insertion
//! order and parallel edges collapse, so the cycle reported for a given model
//! is always the same one.

use std::collections::HashSet;

use petgraph::graphmap::{GraphMap, NodeTrait};
use petgraph::{Directed, EdgeType, Undirected};

#[derive(Debug, Clone)]
pub struct Graph<N: NodeTrait, Ty: EdgeType = Directed> {
    inner: GraphMap<N, (), Ty>,
}

impl<N: NodeTrait> Graph<N, Directed> {
    pub fn directed() -> Self {
        Self {
            inner: GraphMap::new(),
        }
    }

    /// Build a directed graph from an adjacency list.
    pub fn from_adjacency<'a, I>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = &'a (N, Vec<N>)>,
        N: 'a,
    {
        let mut graph = Self::directed();
        for (node, targets) in adjacency {
            graph.add_node(*node);
            for target in targets {
                graph.add_edge(*node, *target);
            }
        }
        graph
    }
}

impl<N: NodeTrait> Graph<N, Undirected> {
    /// Every edge is walkable both ways. The DFS never walks straight back
    /// to the node it came from, so a single edge is not a cycle.
    pub fn undirected() -> Self {
        Self {
            inner: GraphMap::new(),
        }
    }
}

impl<N: NodeTrait, Ty: EdgeType> Graph<N, Ty> {
    pub fn add_node(&mut self, node: N) -> N {
        self.inner.add_node(node)
    }

    /// Add an edge; parallel edges collapse into one.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.inner.add_edge(from, to, ());
    }

    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Depth-first search with an explicit stack of the current path.
    ///
    /// A neighbor found on the path closes a cycle; the returned path runs
    /// from that neighbor to the current node inclusive.
    pub fn find_cycle(&self) -> Option<Vec<N>> {
        let mut search = Search {
            graph: &self.inner,
            done: HashSet::new(),
            path: Vec::new(),
            on_path: HashSet::new(),
        };

        for root in self.inner.nodes() {
            if search.done.contains(&root) {
                continue;
            }
            // Each root starts a fresh path; nodes completed under an earlier
            // root are known not to sit on any cycle.
            search.path.clear();
            search.on_path.clear();
            if let Some(cycle) = search.visit(root, None) {
                return Some(cycle);
            }
        }
        None
    }
}

/// Convenience wrapper over a directed adjacency list.
pub fn find_cycle<N: NodeTrait>(adjacency: &[(N, Vec<N>)]) -> Option<Vec<N>> {
    Graph::from_adjacency(adjacency).find_cycle()
}

struct Search<'g, N: NodeTrait, Ty: EdgeType> {
    graph: &'g GraphMap<N, (), Ty>,
    done: HashSet<N>,
    path: Vec<N>,
    on_path: HashSet<N>,
}

impl<N: NodeTrait, Ty: EdgeType> Search<'_, N, Ty> {
    fn visit(&mut self, node: N, parent: Option<N>) -> Option<Vec<N>> {
        self.path.push(node);
        self.on_path.insert(node);

        let graph = self.graph;
        for next in graph.neighbors(node) {
            if !Ty::is_directed() && Some(next) == parent {
                continue;
            }
            if self.on_path.contains(&next) {
                let start = self.path.iter().position(|&n| n == next).unwrap_or(0);
                return Some(self.path[start..].to_vec());
            }
            if self.done.contains(&next) {
                continue;
            }
            if let Some(cycle) = self.visit(next, Some(node)) {
                return Some(cycle);
            }
        }

        self.path.pop();
        self.on_path.remove(&node);
        self.done.insert(node);
        None
    }
}
