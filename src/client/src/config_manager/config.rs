use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use config::Config as RConfig;
use meshmap_common::constants::{DEFAULT_KUBECTL_BINARY, DEFAULT_NAMESPACE, DEFAULT_OUTPUT_FILE};
use meshmap_common::types::WeightPolicy;

const EDGE_CHANNEL_CAPACITY: usize = 100;
const WAIT_TICK_INTERVAL_MS: u64 = 5000;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Kubernetes namespace whose workload is observed.
    pub namespace: String,
    pub kubectl_binary: String,

    pub output_path: String,
    pub weight_policy: WeightPolicy,

    /// Capacity of the merge channel between extractors and the
    /// aggregator; the backpressure point of the pipeline.
    pub edge_channel_capacity: usize,
    pub wait_tick_interval_ms: u64,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads defaults, an optional TOML file, and `MESHMAP_*` environment
    /// overrides, in that precedence order.
    pub fn load_config(path: Option<&str>) -> Result<Config> {
        let mut builder = RConfig::builder()
            .set_default("namespace", DEFAULT_NAMESPACE)?
            .set_default("kubectl_binary", DEFAULT_KUBECTL_BINARY)?
            .set_default("output_path", DEFAULT_OUTPUT_FILE)?
            .set_default("weight_policy", "normalized")?
            .set_default("edge_channel_capacity", EDGE_CHANNEL_CAPACITY as u64)?
            .set_default("wait_tick_interval_ms", WAIT_TICK_INTERVAL_MS)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("MESHMAP"));

        builder
            .build()?
            .try_deserialize()
            .context("failed to parse config")
    }
}
