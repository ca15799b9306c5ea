mod common;

use common::{scenario_identity, tcp_frame, write_capture};
use meshmap_client::exporters::GraphWriter;
use meshmap_client::pipeline;
use meshmap_common::types::{Edge, WeightPolicy};

const A: [u8; 4] = [10, 0, 0, 1];
const B: [u8; 4] = [10, 0, 0, 2];

#[tokio::test]
async fn test_self_loops_survive_raw_but_not_normalized() {
    let dir = tempfile::tempdir().unwrap();
    // hairpin traffic: a pod talking to its own service address resolves
    // to the same entity on both ends
    let frames = vec![tcp_frame(A, A), tcp_frame(A, A), tcp_frame(A, B)];
    let source = write_capture(&dir, "hairpin.pcap", &frames);

    let raw = pipeline::run(
        vec![source.clone()],
        scenario_identity(),
        WeightPolicy::Raw,
        100,
    )
    .await
    .unwrap();

    assert_eq!(raw.graph.edges.len(), 2);
    let loop_edge = raw
        .graph
        .edges
        .iter()
        .find(|e| e.edge == Edge::new("A", "A"))
        .unwrap();
    assert_eq!(loop_edge.occurrences, 2);
    assert!(loop_edge.share.is_none());
    assert_eq!(raw.graph.outgoing("A"), ["A", "B"]);

    let normalized = pipeline::run(
        vec![source],
        scenario_identity(),
        WeightPolicy::Normalized,
        100,
    )
    .await
    .unwrap();

    assert_eq!(normalized.graph.edges.len(), 1);
    assert_eq!(normalized.graph.edges[0].edge, Edge::new("A", "B"));
    assert_eq!(normalized.graph.edges[0].share, Some(1.0));
    assert_eq!(normalized.graph.outgoing("A"), ["B"]);
}

#[tokio::test]
async fn test_exported_artifact_shape() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_capture(
        &dir,
        "traffic.pcap",
        &[tcp_frame(A, B), tcp_frame(A, B), tcp_frame(B, A)],
    );

    let outcome = pipeline::run(
        vec![source],
        scenario_identity(),
        WeightPolicy::Normalized,
        100,
    )
    .await
    .unwrap();

    let path = dir.path().join("graph.json");
    GraphWriter::new(&path).write(&outcome.graph).await.unwrap();

    let raw = std::fs::read(&path).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();

    assert_eq!(json["neighbours"]["A"][0], "B");
    assert_eq!(json["neighbours"]["B"][0], "A");

    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    // edges are ordered by source then destination
    assert_eq!(edges[0]["source"], "A");
    assert_eq!(edges[0]["occurrences"], 2);
    assert_eq!(edges[0]["share"], 1.0);
}

#[tokio::test]
async fn test_raw_artifact_omits_shares() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_capture(&dir, "traffic.pcap", &[tcp_frame(A, B)]);

    let outcome = pipeline::run(vec![source], scenario_identity(), WeightPolicy::Raw, 100)
        .await
        .unwrap();

    let path = dir.path().join("graph.json");
    GraphWriter::new(&path).write(&outcome.graph).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(json["edges"][0].get("share").is_none());
}
