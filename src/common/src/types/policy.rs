use std::fmt;

use serde::{Deserialize, Serialize};

/// How the graph builder turns occurrence counts into final edge weights.
///
/// Historical variants of this pipeline disagreed on self-loop handling,
/// so the choice is an explicit enumerated policy rather than divergent
/// code paths: `Raw` keeps self-loops and plain counts, `Normalized` drops
/// self-loops and annotates each edge with its share of the source
/// vertex's outgoing total.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Keep every surviving edge with its raw occurrence count.
    Raw,
    /// Drop self-loops and compute per-edge shares of each source's total.
    #[default]
    Normalized,
}

impl fmt::Display for WeightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightPolicy::Raw => write!(f, "raw"),
            WeightPolicy::Normalized => write!(f, "normalized"),
        }
    }
}
