use std::path::Path;

use meshmap_common::identity::IdentityMap;
use meshmap_common::types::Edge;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::frame;
use crate::pcap::{CaptureError, PcapReader};

/// Per-source extraction counters, reported upward as diagnostics once the
/// source has been fully walked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractStats {
    /// Frames read from the capture.
    pub frames: u64,
    /// Edges emitted into the merge channel.
    pub edges: u64,
    /// Truncated or unparseable records.
    pub malformed_frames: u64,
    /// Frames without a TCP segment, or with endpoints outside the
    /// identity map. Expected in any real capture.
    pub skipped_frames: u64,
}

impl ExtractStats {
    pub fn merge(&mut self, other: &ExtractStats) {
        self.frames += other.frames;
        self.edges += other.edges;
        self.malformed_frames += other.malformed_frames;
        self.skipped_frames += other.skipped_frames;
    }
}

/// Extracts all resolvable edges from one capture file into `tx`.
pub(crate) async fn extract_source(
    path: &Path,
    identity: &IdentityMap,
    tx: &mpsc::Sender<Edge>,
) -> Result<ExtractStats, CaptureError> {
    let data = tokio::fs::read(path).await.map_err(CaptureError::Open)?;
    debug!(source = %path.display(), bytes = data.len(), "extracting capture");
    extract_capture(data, identity, tx).await
}

/// The body of [`extract_source`], split out so the walk can be exercised
/// over in-memory captures.
pub(crate) async fn extract_capture(
    data: Vec<u8>,
    identity: &IdentityMap,
    tx: &mpsc::Sender<Edge>,
) -> Result<ExtractStats, CaptureError> {
    let mut reader = PcapReader::new(data)?;
    let link_type = reader.link_type();
    let mut stats = ExtractStats::default();

    while let Some(record) = reader.next_frame() {
        let frame = match record {
            Ok(frame) => frame,
            Err(err) => {
                warn!("skipping malformed record: {}", err);
                stats.malformed_frames += 1;
                break;
            }
        };
        stats.frames += 1;

        let Some((src, dst)) = frame::endpoints(link_type, frame) else {
            stats.skipped_frames += 1;
            continue;
        };

        // traffic with endpoints outside the known topology is expected;
        // skip it silently
        let (src_name, dst_name) = match (identity.resolve_addr(&src), identity.resolve_addr(&dst))
        {
            (Some(src_name), Some(dst_name)) => (src_name, dst_name),
            _ => {
                stats.skipped_frames += 1;
                continue;
            }
        };

        stats.edges += 1;
        if tx.send(Edge::new(src_name, dst_name)).await.is_err() {
            // receiver is gone, nothing left to feed
            break;
        }
    }

    Ok(stats)
}
