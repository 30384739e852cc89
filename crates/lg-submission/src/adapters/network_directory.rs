//! Network Directory Adapter
//!
//! Implements `NetworkConfig` from a static JSON document:
//!
//! ```text
//! {
//!   "enable_tls": true,
//!   "orderer": { "url": "grpcs://orderer:7050", "server_hostname": "orderer", "tls_cacerts": "..." },
//!   "organizations": {
//!     "org1": {
//!       "msp_id": "Org1MSP",
//!       "peers": {
//!         "peer0": { "requests": "grpcs://peer0:7051", "events": "grpcs://peer0:7053", ... }
//!       },
//!       "orderer": { ... }            // optional per-org override
//!     }
//!   }
//! }
//! ```
//!
//! Organizations and peers are kept in key order, which is the directory
//! order the resolver searches in.

use crate::domain::PeerRecord;
use crate::error::ConfigError;
use crate::ports::outbound::NetworkConfig;
use serde::Deserialize;
use shared_types::{Endpoint, OrgId, PeerName, TlsMaterial};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Orderer or other single-endpoint node.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub url: String,
    #[serde(default)]
    pub server_hostname: Option<String>,
    #[serde(default)]
    pub tls_cacerts: Option<PathBuf>,
}

/// Peer entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerSpec {
    pub requests: String,
    #[serde(default)]
    pub events: Option<String>,
    #[serde(default)]
    pub server_hostname: Option<String>,
    #[serde(default)]
    pub tls_cacerts: Option<PathBuf>,
}

/// Organization entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrgSpec {
    pub msp_id: String,
    #[serde(default)]
    pub peers: BTreeMap<PeerName, PeerSpec>,
    #[serde(default)]
    pub orderer: Option<NodeSpec>,
}

/// Static network directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDirectory {
    #[serde(default)]
    pub enable_tls: bool,
    pub orderer: NodeSpec,
    pub organizations: BTreeMap<OrgId, OrgSpec>,
}

impl NetworkDirectory {
    /// Load and validate a directory file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            organizations = directory.organizations.len(),
            "Loaded network directory"
        );
        Ok(directory)
    }

    /// Parse and validate a directory document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let directory: Self = serde_json::from_str(raw)?;
        directory.validate()?;
        Ok(directory)
    }

    /// MSP id of `org`.
    pub fn msp_id(&self, org: &OrgId) -> Option<&str> {
        self.organizations.get(org).map(|spec| spec.msp_id.as_str())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.organizations.is_empty() {
            return Err(ConfigError::Invalid(
                "directory declares no organizations".to_string(),
            ));
        }
        self.check_node("orderer", &self.orderer.url, self.orderer.tls_cacerts.as_ref())?;

        for (org, spec) in &self.organizations {
            if spec.msp_id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{org}: msp_id is empty")));
            }
            if let Some(orderer) = &spec.orderer {
                self.check_node(
                    &format!("{org}/orderer"),
                    &orderer.url,
                    orderer.tls_cacerts.as_ref(),
                )?;
            }
            for (peer, peer_spec) in &spec.peers {
                let name = format!("{org}/{peer}");
                self.check_node(&name, &peer_spec.requests, peer_spec.tls_cacerts.as_ref())?;
                if let Some(events) = &peer_spec.events {
                    self.check_node(&name, events, peer_spec.tls_cacerts.as_ref())?;
                }
            }
        }
        Ok(())
    }

    fn check_node(
        &self,
        name: &str,
        url: &str,
        tls_cacerts: Option<&PathBuf>,
    ) -> Result<(), ConfigError> {
        if url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{name}: url is empty")));
        }
        if self.enable_tls && tls_cacerts.is_none() {
            return Err(ConfigError::Invalid(format!(
                "{name}: tls_cacerts required when enable_tls is set"
            )));
        }
        Ok(())
    }

    fn endpoint(
        &self,
        url: &str,
        server_hostname: &Option<String>,
        tls_cacerts: &Option<PathBuf>,
    ) -> Endpoint {
        match (self.enable_tls, tls_cacerts) {
            (true, Some(ca_cert_path)) => Endpoint::secure(
                url,
                TlsMaterial {
                    ca_cert_path: ca_cert_path.clone(),
                    server_hostname: server_hostname.clone(),
                },
            ),
            _ => Endpoint::plain(url),
        }
    }
}

impl NetworkConfig for NetworkDirectory {
    fn lookup_peer(&self, org: &OrgId, peer: &PeerName) -> Option<PeerRecord> {
        let spec = self.organizations.get(org)?.peers.get(peer)?;
        Some(PeerRecord {
            name: peer.clone(),
            org: org.clone(),
            requests: self.endpoint(&spec.requests, &spec.server_hostname, &spec.tls_cacerts),
            events: spec
                .events
                .as_ref()
                .map(|events| self.endpoint(events, &spec.server_hostname, &spec.tls_cacerts)),
        })
    }

    fn lookup_orderer(&self, org: &OrgId) -> Option<Endpoint> {
        let orderer = self
            .organizations
            .get(org)?
            .orderer
            .as_ref()
            .unwrap_or(&self.orderer);
        Some(self.endpoint(&orderer.url, &orderer.server_hostname, &orderer.tls_cacerts))
    }

    fn organizations(&self) -> Vec<OrgId> {
        self.organizations.keys().cloned().collect()
    }

    fn peers_of(&self, org: &OrgId) -> Vec<PeerName> {
        self.organizations
            .get(org)
            .map(|spec| spec.peers.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAIN: &str = r#"{
        "orderer": { "url": "grpc://orderer.example.com:7050" },
        "organizations": {
            "org1": {
                "msp_id": "Org1MSP",
                "peers": {
                    "peer0": { "requests": "grpc://peer0.org1:7051", "events": "grpc://peer0.org1:7053" },
                    "peer1": { "requests": "grpc://peer1.org1:7056" }
                }
            },
            "org2": {
                "msp_id": "Org2MSP",
                "peers": {
                    "peer0": { "requests": "grpc://peer0.org2:8051", "events": "grpc://peer0.org2:8053" }
                },
                "orderer": { "url": "grpc://orderer2.example.com:7050" }
            }
        }
    }"#;

    const SECURE: &str = r#"{
        "enable_tls": true,
        "orderer": {
            "url": "grpcs://orderer.example.com:7050",
            "server_hostname": "orderer.example.com",
            "tls_cacerts": "/crypto/orderer/ca.crt"
        },
        "organizations": {
            "org1": {
                "msp_id": "Org1MSP",
                "peers": {
                    "peer0": {
                        "requests": "grpcs://localhost:7051",
                        "events": "grpcs://localhost:7053",
                        "server_hostname": "peer0.org1.example.com",
                        "tls_cacerts": "/crypto/org1/peer0/ca.crt"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_lookup_peer_plain() {
        let directory = NetworkDirectory::from_json_str(PLAIN).unwrap();
        let record = directory
            .lookup_peer(&OrgId::new("org1"), &PeerName::new("peer0"))
            .unwrap();
        assert_eq!(record.requests.url(), "grpc://peer0.org1:7051");
        assert_eq!(record.events.unwrap().authority(), "peer0.org1:7053");

        let no_events = directory
            .lookup_peer(&OrgId::new("org1"), &PeerName::new("peer1"))
            .unwrap();
        assert!(no_events.events.is_none());
        assert!(directory
            .lookup_peer(&OrgId::new("org3"), &PeerName::new("peer0"))
            .is_none());
    }

    #[test]
    fn test_org_orderer_overrides_default() {
        let directory = NetworkDirectory::from_json_str(PLAIN).unwrap();
        assert_eq!(
            directory.lookup_orderer(&OrgId::new("org1")).unwrap().authority(),
            "orderer.example.com:7050"
        );
        assert_eq!(
            directory.lookup_orderer(&OrgId::new("org2")).unwrap().authority(),
            "orderer2.example.com:7050"
        );
        assert!(directory.lookup_orderer(&OrgId::new("org9")).is_none());
    }

    #[test]
    fn test_tls_endpoints_carry_material() {
        let directory = NetworkDirectory::from_json_str(SECURE).unwrap();
        let record = directory
            .lookup_peer(&OrgId::new("org1"), &PeerName::new("peer0"))
            .unwrap();
        assert!(record.requests.is_secure());
        assert_eq!(record.requests.url(), "grpcs://localhost:7051");
        let tls = record.requests.tls().unwrap();
        assert_eq!(tls.server_hostname.as_deref(), Some("peer0.org1.example.com"));
        assert_eq!(tls.ca_cert_path, PathBuf::from("/crypto/org1/peer0/ca.crt"));
    }

    #[test]
    fn test_tls_requires_ca_certs() {
        let raw = r#"{
            "enable_tls": true,
            "orderer": { "url": "grpcs://orderer:7050", "tls_cacerts": "/ca.crt" },
            "organizations": {
                "org1": { "msp_id": "Org1MSP", "peers": { "peer0": { "requests": "grpcs://peer0:7051" } } }
            }
        }"#;
        assert!(matches!(
            NetworkDirectory::from_json_str(raw),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            NetworkDirectory::from_json_str("{ \"orderer\": 5 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_directory_order() {
        let directory = NetworkDirectory::from_json_str(PLAIN).unwrap();
        assert_eq!(
            directory.organizations(),
            vec![OrgId::new("org1"), OrgId::new("org2")]
        );
        assert_eq!(
            directory.peers_of(&OrgId::new("org1")),
            vec![PeerName::new("peer0"), PeerName::new("peer1")]
        );
        assert!(directory.peers_of(&OrgId::new("org9")).is_empty());
        assert_eq!(directory.msp_id(&OrgId::new("org2")), Some("Org2MSP"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAIN.as_bytes()).unwrap();
        let directory = NetworkDirectory::from_path(file.path()).unwrap();
        assert_eq!(directory.organizations().len(), 2);

        let missing = NetworkDirectory::from_path("/nonexistent/network.json");
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
