//! Endorsement verdict policies
//!
//! ```text
//! responses (target order) ──→ EndorsementPolicy::evaluate ──→ Good | Bad(reason)
//!
//! FirstResponder: [200, 500, err]  → Good   (only the first is gated)
//! Unanimous:      [200, 500, err]  → Bad    (every target must answer 200)
//! ```

use super::proposal::{Endorsement, SUCCESS_STATUS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule deciding whether a set of endorsements may be ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementPolicy {
    /// Only the first target's status is inspected
    FirstResponder,
    /// Every target must have answered with status 200
    #[default]
    Unanimous,
}

/// Verdict over one proposal round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad { reason: String },
}

impl Verdict {
    pub fn is_good(&self) -> bool {
        matches!(self, Self::Good)
    }
}

impl EndorsementPolicy {
    /// Evaluate endorsements collected in target order.
    pub fn evaluate(&self, responses: &[Endorsement]) -> Verdict {
        if !responses.iter().any(|e| e.response().is_some()) {
            return Verdict::Bad {
                reason: "no target responded".to_string(),
            };
        }

        match self {
            Self::FirstResponder => match responses.first() {
                Some(first) if first.is_success() => Verdict::Good,
                Some(first) => Verdict::Bad {
                    reason: describe(first),
                },
                None => Verdict::Bad {
                    reason: "no target responded".to_string(),
                },
            },
            Self::Unanimous => match responses.iter().find(|e| !e.is_success()) {
                None => Verdict::Good,
                Some(failed) => Verdict::Bad {
                    reason: describe(failed),
                },
            },
        }
    }
}

fn describe(endorsement: &Endorsement) -> String {
    match endorsement {
        Endorsement::Responded { peer, response } => format!(
            "{} answered status {} (expected {}): {}",
            peer, response.status, SUCCESS_STATUS, response.message
        ),
        Endorsement::Failed { peer, reason } => format!("{peer} failed: {reason}"),
    }
}

impl fmt::Display for EndorsementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstResponder => f.write_str("first_responder"),
            Self::Unanimous => f.write_str("unanimous"),
        }
    }
}

impl FromStr for EndorsementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_responder" | "first" => Ok(Self::FirstResponder),
            "unanimous" | "all" => Ok(Self::Unanimous),
            other => Err(format!("unknown endorsement policy: {other}")),
        }
    }
}
