use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::edge::WeightedEdge;

/// The durable output of a pipeline run: an adjacency view plus the full
/// weighted edge list.
///
/// `neighbours[v]` holds one destination entry per surviving edge whose
/// source is `v` (the edge list is deduplicated by pair, the neighbour
/// list is not further deduplicated). The graph is built once, after the
/// merge point has closed, and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowGraph {
    pub neighbours: BTreeMap<String, Vec<String>>,
    pub edges: Vec<WeightedEdge>,
}

impl FlowGraph {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbours.len()
    }

    pub fn outgoing(&self, vertex: &str) -> &[String] {
        self.neighbours
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
