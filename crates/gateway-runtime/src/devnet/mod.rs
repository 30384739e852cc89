//! # Devnet
//!
//! A two-organization network that lives inside the gateway process: the
//! built-in directory, enrolled development identities and the
//! [`DevnetLedger`].

pub mod chaincode;
pub mod ledger;

pub use chaincode::{ChaincodeError, Tuna, TunaChaincode, TunaEntry};
pub use ledger::{DevnetLedger, PENDING_WRITE_TTL};

use lg_submission::{ConfigError, NetworkConfig, NetworkDirectory};
use shared_types::{Endpoint, OrgId, SigningIdentity};
use uuid::Uuid;

/// Directory used when `LG_NETWORK_CONFIG` is not set.
pub const DEVNET_DIRECTORY: &str = r#"{
    "enable_tls": false,
    "orderer": { "url": "grpc://orderer.example.com:7050" },
    "organizations": {
        "org1": {
            "msp_id": "Org1MSP",
            "peers": {
                "peer0": {
                    "requests": "grpc://peer0.org1.example.com:7051",
                    "events": "grpc://peer0.org1.example.com:7053"
                },
                "peer1": {
                    "requests": "grpc://peer1.org1.example.com:7056",
                    "events": "grpc://peer1.org1.example.com:7058"
                }
            }
        },
        "org2": {
            "msp_id": "Org2MSP",
            "peers": {
                "peer0": {
                    "requests": "grpc://peer0.org2.example.com:8051",
                    "events": "grpc://peer0.org2.example.com:8053"
                }
            }
        }
    }
}"#;

/// Every event endpoint in `network`, in directory order.
pub fn event_endpoints<N: NetworkConfig + ?Sized>(network: &N) -> Vec<Endpoint> {
    network
        .organizations()
        .into_iter()
        .flat_map(|org| {
            network
                .peers_of(&org)
                .into_iter()
                .filter_map(|peer| network.lookup_peer(&org, &peer))
                .filter_map(|record| record.events)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Enrolled development identity for `user` of `org`.
///
/// The certificate is a placeholder PEM with a fresh serial, so ids issued
/// for different runs never collide.
pub fn devnet_identity(
    directory: &NetworkDirectory,
    org: &OrgId,
    user: &str,
) -> Result<SigningIdentity, ConfigError> {
    let msp_id = directory
        .msp_id(org)
        .ok_or_else(|| ConfigError::Invalid(format!("organization {org} is not in the directory")))?;
    let certificate = format!(
        "-----BEGIN CERTIFICATE-----\nCN={user}@{org} serial={}\n-----END CERTIFICATE-----\n",
        Uuid::new_v4()
    );

    Ok(SigningIdentity {
        org: org.clone(),
        msp_id: msp_id.to_string(),
        enrollment_id: user.to_string(),
        certificate: certificate.into_bytes(),
        enrolled: true,
    })
}
