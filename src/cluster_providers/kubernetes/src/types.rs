//! Minimal typed views over `kubectl get ... -o json` output.
//!
//! Only the fields the identity map and the sniffers need are modelled;
//! everything else in the API objects is ignored during deserialization.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<PodItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodItem {
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Container {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodStatus {
    #[serde(rename = "podIP", default)]
    pub pod_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceList {
    #[serde(default)]
    pub items: Vec<ServiceItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceItem {
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSpec {
    #[serde(rename = "clusterIP", default)]
    pub cluster_ip: Option<String>,
}

/// A pod reduced to what the capture phase needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pod {
    pub name: String,
    pub ip: Option<String>,
    pub containers: Vec<String>,
}

impl From<PodItem> for Pod {
    fn from(item: PodItem) -> Self {
        Pod {
            name: item.metadata.name,
            ip: item.status.pod_ip,
            containers: item.spec.containers.into_iter().map(|c| c.name).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub cluster_ip: Option<String>,
}

impl From<ServiceItem> for Service {
    fn from(item: ServiceItem) -> Self {
        // headless services report the literal string "None"
        let cluster_ip = item
            .spec
            .cluster_ip
            .filter(|ip| !ip.is_empty() && ip != "None");
        Service {
            name: item.metadata.name,
            cluster_ip,
        }
    }
}
