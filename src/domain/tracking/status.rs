//! Trip tracking lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a trip track.
///
/// `Active` is the only non-terminal state; both `Completed` and `Cancelled`
/// are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    Active,
    Completed,
    Cancelled,
}

impl TrackingStatus {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Active => "active",
            TrackingStatus::Completed => "completed",
            TrackingStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for TrackingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TrackingStatus::*;
        matches!((self, target), (Active, Completed) | (Active, Cancelled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            TrackingStatus::Active => vec![TrackingStatus::Completed, TrackingStatus::Cancelled],
            TrackingStatus::Completed | TrackingStatus::Cancelled => vec![],
        }
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TrackingStatus::Active),
            "completed" => Ok(TrackingStatus::Completed),
            "cancelled" => Ok(TrackingStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown tracking status '{}'", other),
            )),
        }
    }
}
