mod extractor;
mod ingest;

pub use extractor::ExtractStats;
pub use ingest::{IngestReport, IngestionCoordinator};
