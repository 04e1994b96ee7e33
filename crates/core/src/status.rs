//! Per-event status state machine.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle status of a workflow event record.
///
/// The machine is RECEIVED → COMPLETED | FAILED. Terminal states absorb:
/// re-marking a terminal record under at-least-once redelivery writes the
/// same terminal status again and is not an error. Nothing skips RECEIVED.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Received,
    Completed,
    Failed,
}

impl EventStatus {
    /// The canonical storage/wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Received)
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(Self::Received),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::invalid_status(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_strings_round_trip() {
        for status in [EventStatus::Received, EventStatus::Completed, EventStatus::Failed] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
    }

    #[test]
    fn only_received_is_non_terminal() {
        assert!(!EventStatus::Received.is_terminal());
        assert!(EventStatus::Completed.is_terminal());
        assert!(EventStatus::Failed.is_terminal());
    }

    #[test]
    fn rejects_unknown_status_strings() {
        assert!("PENDING".parse::<EventStatus>().is_err());
        assert!("received".parse::<EventStatus>().is_err());
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&EventStatus::Received).unwrap();
        assert_eq!(json, "\"RECEIVED\"");
    }
}
