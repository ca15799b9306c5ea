use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use meshmap_common::identity::IdentityMap;
use tokio::process::Command;
use tracing::{debug, info};

use crate::types::{Pod, PodList, Service, ServiceList};

/// Lists pods and services in one namespace by shelling out to kubectl.
///
/// Introspection is a precondition of a capture run: if kubectl is
/// missing or the listing fails, the run cannot start.
pub struct KubeClient {
    binary: PathBuf,
    namespace: String,
}

impl KubeClient {
    pub fn new(binary: &str, namespace: &str) -> Result<Self> {
        let binary =
            which::which(binary).with_context(|| format!("{} not found on PATH", binary))?;
        Ok(KubeClient {
            binary,
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_json(&self, resource: &str) -> Result<Vec<u8>> {
        let output = Command::new(&self.binary)
            .args(["get", resource, "-n", self.namespace.as_str(), "-o", "json"])
            .output()
            .await
            .with_context(|| format!("failed to run kubectl get {}", resource))?;

        if !output.status.success() {
            bail!(
                "kubectl get {} failed: {}",
                resource,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.stdout)
    }

    pub async fn list_pods(&self) -> Result<Vec<Pod>> {
        let raw = self.get_json("pods").await?;
        let list: PodList = serde_json::from_slice(&raw).context("failed to parse pod listing")?;
        let pods: Vec<Pod> = list.items.into_iter().map(Pod::from).collect();
        info!(
            namespace = %self.namespace,
            pods = pods.len(),
            "listed pods"
        );
        Ok(pods)
    }

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        let raw = self.get_json("services").await?;
        let list: ServiceList =
            serde_json::from_slice(&raw).context("failed to parse service listing")?;
        let services: Vec<Service> = list.items.into_iter().map(Service::from).collect();
        info!(
            namespace = %self.namespace,
            services = services.len(),
            "listed services"
        );
        Ok(services)
    }

    /// The read-only address-to-name map the pipeline resolves against.
    /// Entities without an assigned address cannot appear in captures and
    /// are left out.
    pub fn identity_map(pods: &[Pod], services: &[Service]) -> IdentityMap {
        let mut map = IdentityMap::new();
        for service in services {
            match &service.cluster_ip {
                Some(ip) => map.insert(ip.clone(), service.name.clone()),
                None => debug!(service = %service.name, "service has no cluster IP; skipping"),
            }
        }
        for pod in pods {
            match &pod.ip {
                Some(ip) => map.insert(ip.clone(), pod.name.clone()),
                None => debug!(pod = %pod.name, "pod has no IP yet; skipping"),
            }
        }
        map
    }
}
