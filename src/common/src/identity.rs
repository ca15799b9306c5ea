use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Read-only lookup from network address to logical entity name.
///
/// Fully populated before a pipeline run starts and shared immutably by all
/// extractor tasks; traffic whose endpoints are not in the map does not
/// belong to the observed topology and is skipped during extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct IdentityMap {
    entries: HashMap<String, String>,
}

impl IdentityMap {
    pub fn new() -> Self {
        IdentityMap {
            entries: HashMap::new(),
        }
    }

    /// Loads an `address -> name` JSON object, as written by `meshmap run`
    /// or assembled by hand for offline analysis.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read identity map {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse identity map {}", path.display()))?;
        Ok(IdentityMap { entries })
    }

    pub fn insert(&mut self, address: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(address.into(), name.into());
    }

    pub fn resolve(&self, address: &str) -> Option<&str> {
        self.entries.get(address).map(String::as_str)
    }

    pub fn resolve_addr(&self, address: &IpAddr) -> Option<&str> {
        self.resolve(&address.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: Into<String>, N: Into<String>> FromIterator<(A, N)> for IdentityMap {
    fn from_iter<T: IntoIterator<Item = (A, N)>>(iter: T) -> Self {
        IdentityMap {
            entries: iter
                .into_iter()
                .map(|(a, n)| (a.into(), n.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_resolve_known_and_unknown_addresses() {
        let map: IdentityMap = [("10.0.0.1", "cart"), ("10.0.0.2", "checkout")]
            .into_iter()
            .collect();

        assert_eq!(map.resolve("10.0.0.1"), Some("cart"));
        assert_eq!(map.resolve("10.0.0.9"), None);
        assert_eq!(
            map.resolve_addr(&IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
            Some("checkout")
        );
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = std::env::temp_dir().join("meshmap_identity_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("identity.json");
        std::fs::write(&path, r#"{"10.0.0.1": "cart"}"#).unwrap();

        let map = IdentityMap::from_file(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("10.0.0.1"), Some("cart"));
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let dir = std::env::temp_dir().join("meshmap_identity_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(IdentityMap::from_file(&path).is_err());
    }
}
