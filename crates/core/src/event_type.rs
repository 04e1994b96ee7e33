//! The event-kind registry.

use serde::{Deserialize, Serialize};

/// Kind of a workflow event, as carried in the `detailType` field.
///
/// The registry is closed: routing matches exhaustively over these variants,
/// so adding a kind without a routing arm is a compile error. Strings outside
/// the registry are preserved in `Unknown` rather than rejected, so a newer
/// producer never wedges an older consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    RegisterCustomer,
    OpenAccount,
    Deposit,
    Payout,
    Unknown(String),
}

impl EventType {
    /// The wire identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::RegisterCustomer => "RegisterCustomer",
            Self::OpenAccount => "OpenAccount",
            Self::Deposit => "Deposit",
            Self::Payout => "Payout",
            Self::Unknown(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "RegisterCustomer" => Self::RegisterCustomer,
            "OpenAccount" => Self::OpenAccount,
            "Deposit" => Self::Deposit,
            "Payout" => Self::Payout,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_strings_round_trip() {
        for s in ["RegisterCustomer", "OpenAccount", "Deposit", "Payout"] {
            let kind = EventType::from(s);
            assert!(kind.is_known());
            assert_eq!(kind.as_str(), s);
        }
    }

    #[test]
    fn unregistered_strings_are_preserved() {
        let kind = EventType::from("CloseAccount");
        assert_eq!(kind, EventType::Unknown("CloseAccount".to_string()));
        assert!(!kind.is_known());
        assert_eq!(kind.as_str(), "CloseAccount");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!EventType::from("deposit").is_known());
    }
}
