use std::path::PathBuf;
use std::sync::Arc;

use meshmap_common::diagnostics::SourceFailure;
use meshmap_common::identity::IdentityMap;
use meshmap_common::types::Edge;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use super::extractor::{self, ExtractStats};

/// What came out of one ingestion run, available only after every
/// extractor has finished.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Sources that failed to open or had an unreadable container.
    /// Advisory: the run itself still succeeds.
    pub failures: Vec<SourceFailure>,
    /// Sources that were processed (successfully or not).
    pub sources: usize,
    /// Counters summed over all successful sources.
    pub stats: ExtractStats,
}

impl IngestReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Fans N capture sources into one merged edge stream.
///
/// One extractor task per source, all feeding a single bounded channel.
/// The stream ends exactly when every extractor has finished, so a
/// consumer that drains the receiver to completion has seen the final
/// merged sequence; the report resolves afterwards with the per-source
/// diagnostics.
pub struct IngestionCoordinator {
    identity: Arc<IdentityMap>,
    channel_capacity: usize,
}

impl IngestionCoordinator {
    pub fn new(identity: Arc<IdentityMap>, channel_capacity: usize) -> Self {
        IngestionCoordinator {
            identity,
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn start(&self, sources: Vec<PathBuf>) -> (mpsc::Receiver<Edge>, JoinHandle<IngestReport>) {
        let (tx, rx) = mpsc::channel::<Edge>(self.channel_capacity);

        let mut tasks: JoinSet<(PathBuf, Result<ExtractStats, crate::pcap::CaptureError>)> =
            JoinSet::new();
        for source in sources {
            let tx = tx.clone();
            let identity = Arc::clone(&self.identity);
            tasks.spawn(async move {
                let result = extractor::extract_source(&source, &identity, &tx).await;
                (source, result)
            });
        }
        // every extractor owns a clone; once they all finish the channel
        // closes and the consumer observes end of stream
        drop(tx);

        let supervisor = tokio::spawn(async move {
            let mut report = IngestReport::default();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((source, Ok(stats))) => {
                        report.sources += 1;
                        report.stats.merge(&stats);
                        debug!(
                            source = %source.display(),
                            frames = stats.frames,
                            edges = stats.edges,
                            "capture source drained"
                        );
                    }
                    Ok((source, Err(err))) => {
                        report.sources += 1;
                        warn!(source = %source.display(), "capture source failed: {}", err);
                        report.failures.push(SourceFailure::new(source, err));
                    }
                    Err(err) => {
                        // contained like any other per-source fault
                        error!("extractor task aborted: {}", err);
                        report
                            .failures
                            .push(SourceFailure::new(PathBuf::new(), err));
                    }
                }
            }
            report
        });

        (rx, supervisor)
    }
}
