use std::collections::HashMap;

use itertools::Itertools;
use meshmap_common::types::{Edge, WeightedEdge};
use tokio::sync::mpsc;

/// Folds the merged edge stream into occurrence counts per distinct
/// directed pair.
///
/// The merge across extractors has no defined order, so this is a pure
/// multiset reduction: any permutation of the same raw edges produces the
/// same counts. The accumulator is owned by this single consumer; no
/// locking is involved once the merge boundary is respected.
#[derive(Debug, Default)]
pub struct EdgeAggregator {
    counts: HashMap<Edge, u64>,
}

impl EdgeAggregator {
    pub fn new() -> Self {
        EdgeAggregator::default()
    }

    pub fn observe(&mut self, edge: Edge) {
        *self.counts.entry(edge).or_insert(0) += 1;
    }

    /// Drains the merged stream to completion. Returns once the channel
    /// closes, i.e. once every extractor has finished.
    pub async fn consume(&mut self, rx: &mut mpsc::Receiver<Edge>) {
        while let Some(edge) = rx.recv().await {
            self.observe(edge);
        }
    }

    pub fn distinct_pairs(&self) -> usize {
        self.counts.len()
    }

    /// The weighted edge set, ordered by (source, destination) so every
    /// downstream consumer sees a deterministic sequence.
    pub fn into_weighted_edges(self) -> Vec<WeightedEdge> {
        self.counts
            .into_iter()
            .map(|(edge, occurrences)| WeightedEdge::new(edge, occurrences))
            .sorted_by(|a, b| {
                (&a.edge.source, &a.edge.destination).cmp(&(&b.edge.source, &b.edge.destination))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(edges: Vec<Edge>) -> Vec<WeightedEdge> {
        let mut aggregator = EdgeAggregator::new();
        for edge in edges {
            aggregator.observe(edge);
        }
        aggregator.into_weighted_edges()
    }

    #[test]
    fn test_counts_repeated_pairs() {
        let weighted = aggregate(vec![
            Edge::new("a", "b"),
            Edge::new("a", "b"),
            Edge::new("b", "a"),
            Edge::new("a", "b"),
        ]);

        assert_eq!(weighted.len(), 2);
        assert_eq!(weighted[0].edge, Edge::new("a", "b"));
        assert_eq!(weighted[0].occurrences, 3);
        assert_eq!(weighted[1].edge, Edge::new("b", "a"));
        assert_eq!(weighted[1].occurrences, 1);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let edges = vec![
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("a", "b"),
            Edge::new("c", "a"),
            Edge::new("b", "c"),
        ];
        let mut reversed = edges.clone();
        reversed.reverse();

        assert_eq!(aggregate(edges), aggregate(reversed));
    }

    #[test]
    fn test_self_loops_are_retained() {
        let weighted = aggregate(vec![Edge::new("a", "a"), Edge::new("a", "a")]);

        assert_eq!(weighted.len(), 1);
        assert_eq!(weighted[0].edge, Edge::new("a", "a"));
        assert_eq!(weighted[0].occurrences, 2);
    }

    #[tokio::test]
    async fn test_consume_drains_until_channel_closes() {
        let (tx, mut rx) = mpsc::channel(4);
        let producer = tokio::spawn(async move {
            for _ in 0..10 {
                tx.send(Edge::new("a", "b")).await.unwrap();
            }
        });

        let mut aggregator = EdgeAggregator::new();
        aggregator.consume(&mut rx).await;
        producer.await.unwrap();

        let weighted = aggregator.into_weighted_edges();
        assert_eq!(weighted.len(), 1);
        assert_eq!(weighted[0].occurrences, 10);
    }
}
