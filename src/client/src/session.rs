use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};
use meshmap_common::identity::IdentityMap;
use meshmap_common::types::FlowGraph;
use meshmap_kube::types::Pod;
use meshmap_kube::{KubeClient, SnifferManager};
use tracing::info;
use uuid::Uuid;

use crate::config_manager::Config;
use crate::exporters::GraphWriter;
use crate::pipeline::{self, PipelineOutcome};

/// One full observation run: discover the workload, capture its traffic,
/// distill the coupling graph, export it.
pub struct CaptureSession {
    config: Config,
    kube: KubeClient,
    sniffers: SnifferManager,

    pods: Vec<Pod>,
    identity: Option<Arc<IdentityMap>>,

    session_id: String,
    started_at: DateTime<Utc>,
}

impl CaptureSession {
    pub fn new(config: Config) -> Result<CaptureSession> {
        let kube = KubeClient::new(&config.kubectl_binary, &config.namespace)?;
        let sniffers = SnifferManager::new(&config.kubectl_binary, &config.namespace)?;

        let session_id = Uuid::new_v4().to_string();
        info!(session = %session_id, namespace = %config.namespace, "capture session created");

        Ok(CaptureSession {
            config,
            kube,
            sniffers,
            pods: Vec::new(),
            identity: None,
            session_id,
            started_at: Utc::now(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Lists the namespace's pods and services and builds the identity
    /// map the pipeline will resolve against.
    pub async fn discover(&mut self) -> Result<()> {
        let pods = self.kube.list_pods().await?;
        let services = self.kube.list_services().await?;

        let identity = KubeClient::identity_map(&pods, &services);
        ensure!(
            !identity.is_empty(),
            "no addressable pods or services in namespace {}",
            self.kube.namespace()
        );

        info!(
            pods = pods.len(),
            services = services.len(),
            identities = identity.len(),
            "workload discovered"
        );
        self.pods = pods;
        self.identity = Some(Arc::new(identity));
        Ok(())
    }

    /// Starts one sniffer per discovered pod; returns advisory warnings
    /// for pods that could not be sniffed.
    pub fn start_capture(&mut self) -> Result<Vec<String>> {
        ensure!(
            !self.pods.is_empty(),
            "discover() must run before start_capture()"
        );
        self.sniffers.start_all(&self.pods)
    }

    pub async fn stop_capture(&mut self) -> Vec<PathBuf> {
        self.sniffers.stop_all().await
    }

    /// Runs the capture-to-graph pipeline over the given capture files.
    pub async fn analyze(&self, captures: Vec<PathBuf>) -> Result<PipelineOutcome> {
        let identity = self
            .identity
            .clone()
            .context("discover() must run before analyze()")?;
        pipeline::run(
            captures,
            identity,
            self.config.weight_policy,
            self.config.edge_channel_capacity,
        )
        .await
    }

    pub async fn export(&self, graph: &FlowGraph) -> Result<PathBuf> {
        GraphWriter::new(&self.config.output_path).write(graph).await
    }
}
