//! # Tuna Chaincode Simulation
//!
//! Endorser-side execution of the tuna supply-chain contract against a
//! snapshot of the world state. Simulation never mutates the state: it
//! returns the response payload plus the read/write set the ordering side
//! validates and applies.
//!
//! | Function           | Arguments                                          |
//! |--------------------|----------------------------------------------------|
//! | `initLedger`       | none                                               |
//! | `recordTuna`       | key, vessel, location, timestamp, holder [, weight] |
//! | `queryTuna`        | key                                                |
//! | `queryAllTuna`     | none (a single empty argument is accepted)         |
//! | `changeTunaHolder` | key, holder                                        |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Value stored under a key with the block that last wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: u64,
}

/// Committed key/value state.
pub type WorldState = BTreeMap<String, VersionedValue>;

/// Keys read (with the version seen) and written by one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWriteSet {
    pub reads: Vec<(String, Option<u64>)>,
    pub writes: Vec<(String, Vec<u8>)>,
}

/// Output of one successful simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub payload: Vec<u8>,
    pub rw_set: ReadWriteSet,
}

/// Chaincode-level failure; endorsers answer it with status 500.
#[derive(Debug, Error)]
pub enum ChaincodeError {
    #[error("Invalid Smart Contract function name: {0}")]
    UnknownFunction(String),

    #[error("Incorrect number of arguments. Expecting {expected}")]
    Arguments { expected: &'static str },

    #[error("Could not locate tuna {key}")]
    NotFound { key: String },

    #[error("Corrupt record {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One catch on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuna {
    pub vessel: String,
    pub timestamp: String,
    pub location: String,
    pub holder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

/// Entry of the `queryAllTuna` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunaEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Tuna,
}

const SEED: [(&str, &str, &str, &str); 10] = [
    ("923F", "67.0006, -70.5476", "1504054225", "Miriam"),
    ("M83T", "91.2395, -49.4594", "1504057825", "Dave"),
    ("T012", "58.0148, 59.01391", "1493517025", "Igor"),
    ("P490", "-45.0945, 0.7949", "1496105425", "Amalea"),
    ("S439", "-107.6043, 19.5003", "1493512301", "Rafa"),
    ("J205", "-155.2304, -15.8723", "1494117101", "Shen"),
    ("S22L", "103.8842, 22.1277", "1496104301", "Leila"),
    ("EI89", "-132.3207, -34.0983", "1485066691", "Yuan"),
    ("129R", "153.0054, 12.6429", "1485153091", "Carlo"),
    ("49W4", "51.9435, 8.2735", "1487745091", "Fatima"),
];

/// Stateless tuna contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct TunaChaincode;

impl TunaChaincode {
    /// Execute `function` against `state` without touching it.
    pub fn simulate(
        &self,
        state: &WorldState,
        function: &str,
        args: &[String],
    ) -> Result<Simulation, ChaincodeError> {
        let mut tx = TxContext::new(state);
        let payload = match function {
            "initLedger" => self.init_ledger(&mut tx)?,
            "recordTuna" => self.record_tuna(&mut tx, args)?,
            "queryTuna" => self.query_tuna(&mut tx, args)?,
            "queryAllTuna" => self.query_all_tuna(&mut tx, args)?,
            "changeTunaHolder" => self.change_tuna_holder(&mut tx, args)?,
            other => return Err(ChaincodeError::UnknownFunction(other.to_string())),
        };
        Ok(Simulation {
            payload,
            rw_set: tx.rw_set,
        })
    }

    fn init_ledger(&self, tx: &mut TxContext<'_>) -> Result<Vec<u8>, ChaincodeError> {
        for (index, (vessel, location, timestamp, holder)) in SEED.iter().enumerate() {
            let tuna = Tuna {
                vessel: vessel.to_string(),
                timestamp: timestamp.to_string(),
                location: location.to_string(),
                holder: holder.to_string(),
                weight: None,
            };
            tx.put_tuna(&(index + 1).to_string(), &tuna);
        }
        Ok(Vec::new())
    }

    fn record_tuna(
        &self,
        tx: &mut TxContext<'_>,
        args: &[String],
    ) -> Result<Vec<u8>, ChaincodeError> {
        let (key, vessel, location, timestamp, holder, weight) = match args {
            [key, vessel, location, timestamp, holder] => {
                (key, vessel, location, timestamp, holder, None)
            }
            [key, vessel, location, timestamp, holder, weight] => {
                (key, vessel, location, timestamp, holder, Some(weight.clone()))
            }
            _ => return Err(ChaincodeError::Arguments { expected: "5 or 6" }),
        };

        // Blind put: recording over an existing key replaces it.
        tx.put_tuna(
            key,
            &Tuna {
                vessel: vessel.clone(),
                timestamp: timestamp.clone(),
                location: location.clone(),
                holder: holder.clone(),
                weight,
            },
        );
        Ok(Vec::new())
    }

    fn query_tuna(
        &self,
        tx: &mut TxContext<'_>,
        args: &[String],
    ) -> Result<Vec<u8>, ChaincodeError> {
        let [key] = args else {
            return Err(ChaincodeError::Arguments { expected: "1" });
        };
        tx.get(key)
            .ok_or_else(|| ChaincodeError::NotFound { key: key.clone() })
    }

    fn query_all_tuna(
        &self,
        tx: &mut TxContext<'_>,
        args: &[String],
    ) -> Result<Vec<u8>, ChaincodeError> {
        match args {
            [] => {}
            [only] if only.is_empty() => {}
            _ => return Err(ChaincodeError::Arguments { expected: "0" }),
        }

        let entries = tx
            .scan()
            .into_iter()
            .map(|(key, value)| {
                let record = serde_json::from_slice(&value).map_err(|source| {
                    ChaincodeError::Corrupt {
                        key: key.clone(),
                        source,
                    }
                })?;
                Ok(TunaEntry { key, record })
            })
            .collect::<Result<Vec<_>, ChaincodeError>>()?;

        serde_json::to_vec(&entries).map_err(|source| ChaincodeError::Corrupt {
            key: "*".to_string(),
            source,
        })
    }

    fn change_tuna_holder(
        &self,
        tx: &mut TxContext<'_>,
        args: &[String],
    ) -> Result<Vec<u8>, ChaincodeError> {
        let [key, holder] = args else {
            return Err(ChaincodeError::Arguments { expected: "2" });
        };
        let raw = tx
            .get(key)
            .ok_or_else(|| ChaincodeError::NotFound { key: key.clone() })?;
        let mut tuna: Tuna =
            serde_json::from_slice(&raw).map_err(|source| ChaincodeError::Corrupt {
                key: key.clone(),
                source,
            })?;
        tuna.holder = holder.clone();
        tx.put_tuna(key, &tuna);
        Ok(Vec::new())
    }
}

/// Records reads and buffers writes during one simulation.
struct TxContext<'a> {
    state: &'a WorldState,
    rw_set: ReadWriteSet,
}

impl<'a> TxContext<'a> {
    fn new(state: &'a WorldState) -> Self {
        Self {
            state,
            rw_set: ReadWriteSet::default(),
        }
    }

    fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let entry = self.state.get(key);
        self.rw_set
            .reads
            .push((key.to_string(), entry.map(|versioned| versioned.version)));
        entry.map(|versioned| versioned.value.clone())
    }

    fn scan(&mut self) -> Vec<(String, Vec<u8>)> {
        let mut entries = Vec::with_capacity(self.state.len());
        for (key, versioned) in self.state {
            self.rw_set
                .reads
                .push((key.clone(), Some(versioned.version)));
            entries.push((key.clone(), versioned.value.clone()));
        }
        entries
    }

    fn put_tuna(&mut self, key: &str, tuna: &Tuna) {
        // Tuna has only string fields; serialization cannot fail.
        let value = serde_json::to_vec(tuna).unwrap_or_default();
        self.rw_set.writes.push((key.to_string(), value));
    }
}
