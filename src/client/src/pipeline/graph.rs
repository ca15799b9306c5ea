use std::collections::HashMap;

use meshmap_common::types::{FlowGraph, WeightPolicy, WeightedEdge};

/// Builds the final graph from the aggregated weighted edge set.
///
/// Under `Normalized`, per-source totals are accumulated over the complete
/// qualifying edge set before any share is derived; deriving a share from
/// a partial total is the ordering bug this two-pass shape exists to rule
/// out.
pub fn build_graph(edges: Vec<WeightedEdge>, policy: WeightPolicy) -> FlowGraph {
    match policy {
        WeightPolicy::Raw => build_raw(edges),
        WeightPolicy::Normalized => build_normalized(edges),
    }
}

fn qualifies_base(edge: &WeightedEdge) -> bool {
    !edge.edge.source.is_empty() && !edge.edge.destination.is_empty() && edge.occurrences > 0
}

fn build_raw(edges: Vec<WeightedEdge>) -> FlowGraph {
    let mut graph = FlowGraph::default();
    for mut edge in edges.into_iter().filter(qualifies_base) {
        edge.share = None;
        graph
            .neighbours
            .entry(edge.edge.source.clone())
            .or_default()
            .push(edge.edge.destination.clone());
        graph.edges.push(edge);
    }
    graph
}

fn build_normalized(edges: Vec<WeightedEdge>) -> FlowGraph {
    let qualifying: Vec<WeightedEdge> = edges
        .into_iter()
        .filter(|edge| qualifies_base(edge) && !edge.edge.is_self_loop())
        .collect();

    // first pass: complete per-source totals
    let mut totals: HashMap<String, u64> = HashMap::new();
    for edge in &qualifying {
        *totals.entry(edge.edge.source.clone()).or_insert(0) += edge.occurrences;
    }

    // second pass: shares against the finished totals
    let mut graph = FlowGraph::default();
    for mut edge in qualifying {
        let total = totals[&edge.edge.source];
        edge.share = Some(edge.occurrences as f64 / total as f64);
        graph
            .neighbours
            .entry(edge.edge.source.clone())
            .or_default()
            .push(edge.edge.destination.clone());
        graph.edges.push(edge);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshmap_common::types::Edge;

    fn weighted(source: &str, destination: &str, occurrences: u64) -> WeightedEdge {
        WeightedEdge::new(Edge::new(source, destination), occurrences)
    }

    #[test]
    fn test_normalized_shares_sum_to_one_per_source() {
        let graph = build_graph(
            vec![
                weighted("a", "b", 3),
                weighted("a", "c", 5),
                weighted("a", "d", 2),
                weighted("b", "a", 7),
            ],
            WeightPolicy::Normalized,
        );

        let mut by_source: HashMap<&str, f64> = HashMap::new();
        for edge in &graph.edges {
            *by_source.entry(edge.edge.source.as_str()).or_insert(0.0) +=
                edge.share.expect("normalized edges carry a share");
        }

        for (source, sum) in by_source {
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "shares for {} sum to {}",
                source,
                sum
            );
        }
    }

    #[test]
    fn test_normalized_share_values() {
        let graph = build_graph(
            vec![weighted("a", "b", 3), weighted("a", "c", 1)],
            WeightPolicy::Normalized,
        );

        assert_eq!(graph.edges[0].share, Some(0.75));
        assert_eq!(graph.edges[1].share, Some(0.25));
    }

    #[test]
    fn test_normalized_drops_self_loops() {
        let graph = build_graph(
            vec![weighted("a", "a", 10), weighted("a", "b", 2)],
            WeightPolicy::Normalized,
        );

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].edge, Edge::new("a", "b"));
        // the self-loop contributes nothing to the total either
        assert_eq!(graph.edges[0].share, Some(1.0));
        assert_eq!(graph.outgoing("a"), ["b"]);
    }

    #[test]
    fn test_raw_keeps_self_loops_and_no_shares() {
        let graph = build_graph(
            vec![weighted("a", "a", 10), weighted("a", "b", 2)],
            WeightPolicy::Raw,
        );

        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.share.is_none()));
        assert_eq!(graph.outgoing("a"), ["a", "b"]);
    }

    #[test]
    fn test_zero_weight_edges_are_dropped_under_both_policies() {
        for policy in [WeightPolicy::Raw, WeightPolicy::Normalized] {
            let graph = build_graph(vec![weighted("a", "b", 0)], policy);
            assert!(graph.is_empty(), "zero-weight edge survived {}", policy);
        }
    }

    #[test]
    fn test_empty_endpoints_are_dropped_under_both_policies() {
        for policy in [WeightPolicy::Raw, WeightPolicy::Normalized] {
            let graph = build_graph(
                vec![weighted("", "b", 1), weighted("a", "", 1)],
                policy,
            );
            assert!(graph.is_empty());
        }
    }

    #[test]
    fn test_neighbour_list_has_one_entry_per_edge() {
        let graph = build_graph(
            vec![weighted("a", "b", 5), weighted("a", "c", 1)],
            WeightPolicy::Normalized,
        );

        assert_eq!(graph.outgoing("a"), ["b", "c"]);
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        let graph = build_graph(Vec::new(), WeightPolicy::Normalized);
        assert!(graph.is_empty());
        assert_eq!(graph.vertex_count(), 0);
    }
}
