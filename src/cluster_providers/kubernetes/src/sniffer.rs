use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::types::Pod;

struct ActiveSniffer {
    pod: String,
    child: Child,
    capture_path: PathBuf,
}

/// Lifecycle of the external per-pod capture agents (`kubectl sniff`).
///
/// Capture files live in a per-session temporary directory and disappear
/// with it once the manager is dropped, so downstream consumers must have
/// finished the pipeline before letting go of the session.
pub struct SnifferManager {
    binary: PathBuf,
    namespace: String,
    capture_dir: TempDir,
    active: Vec<ActiveSniffer>,
    started: OnceCell<()>,
}

impl SnifferManager {
    pub fn new(binary: &str, namespace: &str) -> Result<Self> {
        let binary =
            which::which(binary).with_context(|| format!("{} not found on PATH", binary))?;
        let capture_dir = tempfile::Builder::new()
            .prefix("meshmap-captures-")
            .tempdir()
            .context("failed to create capture directory")?;

        Ok(SnifferManager {
            binary,
            namespace: namespace.to_string(),
            capture_dir,
            active: Vec::new(),
            started: OnceCell::new(),
        })
    }

    pub fn capture_dir(&self) -> &Path {
        self.capture_dir.path()
    }

    /// Starts one sniffer per pod. Pods whose sniffer cannot start are
    /// returned as warnings and simply contribute no capture.
    pub fn start_all(&mut self, pods: &[Pod]) -> Result<Vec<String>> {
        self.started
            .set(())
            .map_err(|_| anyhow!("sniffers already started for this session"))?;

        let mut warnings = Vec::new();
        for pod in pods {
            let Some(container) = pod.containers.first() else {
                warnings.push(format!("pod {} has no containers; skipping", pod.name));
                continue;
            };

            let capture_path = self.capture_dir.path().join(format!("{}.pcap", pod.name));
            let spawned = Command::new(&self.binary)
                .args([
                    "sniff",
                    pod.name.as_str(),
                    "-n",
                    self.namespace.as_str(),
                    "-c",
                    container.as_str(),
                    "-o",
                ])
                .arg(&capture_path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();

            match spawned {
                Ok(child) => {
                    info!(pod = %pod.name, container = %container, "sniffer started");
                    self.active.push(ActiveSniffer {
                        pod: pod.name.clone(),
                        child,
                        capture_path,
                    });
                }
                Err(err) => {
                    warn!(pod = %pod.name, "failed to start sniffer: {}", err);
                    warnings.push(format!(
                        "could not start sniffer on pod {}: {}",
                        pod.name, err
                    ));
                }
            }
        }
        Ok(warnings)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Kills every sniffer, reaps it, and returns the capture files that
    /// actually materialized.
    pub async fn stop_all(&mut self) -> Vec<PathBuf> {
        let mut captures = Vec::new();
        for mut sniffer in self.active.drain(..) {
            if let Err(err) = sniffer.child.start_kill() {
                warn!(pod = %sniffer.pod, "failed to signal sniffer: {}", err);
            }
            match sniffer.child.wait().await {
                Ok(status) => debug!(pod = %sniffer.pod, %status, "sniffer stopped"),
                Err(err) => warn!(pod = %sniffer.pod, "failed to reap sniffer: {}", err),
            }

            if sniffer.capture_path.exists() {
                captures.push(sniffer.capture_path);
            } else {
                warn!(pod = %sniffer.pod, "sniffer produced no capture file");
            }
        }
        captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_an_error() {
        assert!(SnifferManager::new("definitely-not-kubectl-xyz", "default").is_err());
    }

    #[test]
    fn test_start_is_once_only() {
        // "sh" stands in for kubectl; no pods means nothing is spawned
        let mut manager = SnifferManager::new("sh", "default").unwrap();
        assert!(manager.start_all(&[]).unwrap().is_empty());
        assert!(manager.start_all(&[]).is_err());
    }

    #[tokio::test]
    async fn test_stop_without_active_sniffers_returns_no_captures() {
        let mut manager = SnifferManager::new("sh", "default").unwrap();
        assert!(manager.stop_all().await.is_empty());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_pod_without_containers_is_a_warning() {
        let mut manager = SnifferManager::new("sh", "default").unwrap();
        let pod = Pod {
            name: "bare".to_string(),
            ip: Some("10.0.0.1".to_string()),
            containers: Vec::new(),
        };

        let warnings = manager.start_all(&[pod]).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(manager.active_count(), 0);
    }
}
