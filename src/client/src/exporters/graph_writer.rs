use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use meshmap_common::types::FlowGraph;
use tracing::info;

/// Persists the finished graph as pretty-printed JSON.
///
/// The graph handed in is already fully built and ordered (edges by
/// source then destination, neighbour keys sorted), so the artifact is
/// byte-identical across runs over the same weighted edge set.
pub struct GraphWriter {
    path: PathBuf,
}

impl GraphWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GraphWriter { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(&self, graph: &FlowGraph) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(graph).context("failed to serialize graph")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write graph to {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            edges = graph.edges.len(),
            "coupling graph written"
        );
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmap_common::types::{Edge, WeightedEdge};

    #[tokio::test]
    async fn test_written_artifact_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut graph = FlowGraph::default();
        let mut edge = WeightedEdge::new(Edge::new("cart", "checkout"), 3);
        edge.share = Some(1.0);
        graph
            .neighbours
            .insert("cart".to_string(), vec!["checkout".to_string()]);
        graph.edges.push(edge);

        let writer = GraphWriter::new(&path);
        writer.write(&graph).await.unwrap();

        let raw = std::fs::read(&path).unwrap();
        let parsed: FlowGraph = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed, graph);
    }

    #[tokio::test]
    async fn test_write_to_unwritable_path_is_an_error() {
        let writer = GraphWriter::new("/nonexistent-dir/graph.json");
        assert!(writer.write(&FlowGraph::default()).await.is_err());
    }
}
