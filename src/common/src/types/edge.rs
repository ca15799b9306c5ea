use serde::{Deserialize, Serialize};

/// One observed instance of traffic flowing between two resolved entities.
///
/// Both endpoints are logical names, never raw addresses: an edge only
/// exists once both sides of a captured packet resolved through the
/// identity map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub destination: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Edge {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.destination
    }
}

/// A directed edge annotated with how many times it was observed and,
/// under the normalized weight policy, its share of the source vertex's
/// total outgoing traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEdge {
    #[serde(flatten)]
    pub edge: Edge,
    pub occurrences: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<f64>,
}

impl WeightedEdge {
    pub fn new(edge: Edge, occurrences: u64) -> Self {
        WeightedEdge {
            edge,
            occurrences,
            share: None,
        }
    }
}
