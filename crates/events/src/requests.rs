//! Typed submission payloads, one per event kind in the registry.
//!
//! These are the shapes clients POST; the submitter serializes them into the
//! opaque `detail` payload and never looks inside again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerflow_core::EventType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
}

impl RegisterRequest {
    pub const EVENT_TYPE: EventType = EventType::RegisterCustomer;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    pub user_id: String,
    pub account_type: String,
    pub currency: String,
}

impl OpenAccountRequest {
    pub const EVENT_TYPE: EventType = EventType::OpenAccount;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub user_id: String,
    pub account_id: String,
    pub currency: String,
    pub amount: f64,
    pub transacted_at: DateTime<Utc>,
}

impl DepositRequest {
    pub const EVENT_TYPE: EventType = EventType::Deposit;
}

/// Payout instruction; carries the beneficiary side the other requests lack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructionRequest {
    pub user_id: String,
    pub account_id: String,
    pub currency: String,
    pub amount: f64,
    pub transacted_at: DateTime<Utc>,
    pub beneficiary_iban: String,
    pub payment_ref: String,
    pub purpose_ref: String,
}

impl PaymentInstructionRequest {
    pub const EVENT_TYPE: EventType = EventType::Payout;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_request_uses_camel_case_wire_names() {
        let raw = r#"{
            "userId": "u-1",
            "accountId": "a-1",
            "currency": "EUR",
            "amount": 99.5,
            "transactedAt": "2026-08-01T10:00:00Z"
        }"#;

        let req: DepositRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.account_id, "a-1");
        assert_eq!(req.amount, 99.5);

        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("accountId").is_some());
        assert!(value.get("account_id").is_none());
    }

    #[test]
    fn each_request_maps_to_its_registry_kind() {
        assert_eq!(RegisterRequest::EVENT_TYPE, EventType::RegisterCustomer);
        assert_eq!(OpenAccountRequest::EVENT_TYPE, EventType::OpenAccount);
        assert_eq!(DepositRequest::EVENT_TYPE, EventType::Deposit);
        assert_eq!(PaymentInstructionRequest::EVENT_TYPE, EventType::Payout);
    }
}
