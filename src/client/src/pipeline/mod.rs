mod aggregator;
mod graph;

pub use aggregator::EdgeAggregator;
pub use graph::build_graph;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use meshmap_common::identity::IdentityMap;
use meshmap_common::types::{FlowGraph, WeightPolicy};
use meshmap_extracts::flow::{IngestReport, IngestionCoordinator};
use tracing::{info, warn};

/// The pipeline's durable output plus the advisory diagnostics collected
/// along the way.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub graph: FlowGraph,
    pub report: IngestReport,
}

/// Runs the full capture-to-graph pipeline over a set of capture files.
///
/// Always produces a graph (possibly empty): unreadable sources are
/// reported in the outcome, never escalated to a run failure.
pub async fn run(
    sources: Vec<PathBuf>,
    identity: Arc<IdentityMap>,
    policy: WeightPolicy,
    channel_capacity: usize,
) -> Result<PipelineOutcome> {
    info!(
        sources = sources.len(),
        identities = identity.len(),
        %policy,
        "starting capture-to-graph pipeline"
    );

    let coordinator = IngestionCoordinator::new(identity, channel_capacity);
    let (mut rx, report_handle) = coordinator.start(sources);

    let mut aggregator = EdgeAggregator::new();
    aggregator.consume(&mut rx).await;

    let report = report_handle
        .await
        .context("ingestion supervisor failed")?;
    for failure in &report.failures {
        warn!(%failure, "capture source contributed no edges");
    }

    let graph = build_graph(aggregator.into_weighted_edges(), policy);
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edges.len(),
        frames = report.stats.frames,
        "coupling graph built"
    );

    Ok(PipelineOutcome { graph, report })
}
