//! Studio records stored in the aggregate.
//!
//! Field names serialize in camelCase, matching the persisted layout
//! field-for-field. Optional fields are omitted when absent. Money is a
//! [`Decimal`] written as a JSON number carrying every digit of the value,
//! never rounded through `f64`; calendar dates are `YYYY-MM-DD`.

use crate::category::{
    AiJobStatus, AiJobType, CreditTransactionType, EventStatus, EventType, MessageStatus,
    MessageType, PaymentMethod,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Trait implemented by every record kind held in a collection.
///
/// # Example
///
/// ```
/// use studio_ledger::entity::{Customer, StudioRecord};
///
/// assert_eq!(Customer::collection(), "customers");
/// ```
pub trait StudioRecord: Clone + Serialize + DeserializeOwned + Send + Sync {
    /// The record's id within its collection.
    fn record_id(&self) -> &str;

    /// Collection name in the persisted layout, e.g. `"customers"`.
    fn collection() -> &'static str;
}

/// Find a record by id.
pub fn find_by_id<'a, T: StudioRecord>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.record_id() == id)
}

/// Find a record by id for mutation.
pub fn find_by_id_mut<'a, T: StudioRecord>(records: &'a mut [T], id: &str) -> Option<&'a mut T> {
    records.iter_mut().find(|r| r.record_id() == id)
}

/// A studio client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(
        default,
        deserialize_with = "date_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub birthday: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "date_or_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub anniversary: Option<NaiveDate>,
    #[serde(default)]
    pub credit_balance: Decimal,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub event_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Customer {
    /// Phone number with every non-digit removed (`+91-98765 43210` → `919876543210`).
    pub fn phone_digits(&self) -> String {
        digits_only(&self.phone)
    }
}

impl StudioRecord for Customer {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "customers"
    }
}

/// A booked shoot.
///
/// `balance_due` is derived: see [`crate::ledger::recompute_balance`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub advance_paid: Decimal,
    #[serde(default)]
    pub balance_due: Decimal,
    #[serde(default)]
    pub assigned_photographer: String,
    #[serde(default)]
    pub package_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Balance outstanding and the event date already passed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.balance_due > Decimal::ZERO && self.event_date < today
    }
}

impl StudioRecord for Event {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "events"
    }
}

/// Money received against an event. Append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub event_id: String,
    #[serde(default)]
    pub customer_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub invoice_generated: bool,
}

impl StudioRecord for Payment {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "payments"
    }
}

/// A message recorded as sent to a customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppMessage {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub message_type: MessageType,
    pub content: String,
    pub status: MessageStatus,
    pub credits_used: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl StudioRecord for WhatsAppMessage {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "messages"
    }
}

/// Audit row for a change to the message-credit counter.
///
/// Never read back to derive the counter; see
/// [`crate::messaging::audit_credit_balance`] for the drift report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: CreditTransactionType,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
}

impl StudioRecord for CreditTransaction {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "creditTransactions"
    }
}

/// A queued photo-processing job. Stored and carried through load/save only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiProcessingJob {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AiJobType,
    pub file_name: String,
    #[serde(default)]
    pub status: AiJobStatus,
    #[serde(default)]
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StudioRecord for AiProcessingJob {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn collection() -> &'static str {
        "aiProcessingJobs"
    }
}

pub(crate) fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Optional calendar date where a blank string means "not set".
fn date_or_empty<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn customer_json(birthday: &str) -> String {
        format!(
            r#"{{"id":"c1","name":"Rajesh Kumar","phone":"+91-9876543210",
                "email":"rajesh.kumar@gmail.com","address":"Mumbai",
                "birthday":"{}","creditBalance":2500,"totalSpent":45000,
                "eventHistory":[],"createdAt":"2025-01-10T09:30:00.000Z"}}"#,
            birthday
        )
    }

    #[test]
    fn test_customer_parses_legacy_json() {
        let customer: Customer = serde_json::from_str(&customer_json("1985-06-15")).unwrap();
        assert_eq!(customer.name, "Rajesh Kumar");
        assert_eq!(customer.birthday, NaiveDate::from_ymd_opt(1985, 6, 15));
        assert_eq!(customer.anniversary, None);
        assert_eq!(customer.credit_balance, dec!(2500));
        assert_eq!(customer.notes, None);
    }

    #[test]
    fn test_blank_birthday_is_absent() {
        let customer: Customer = serde_json::from_str(&customer_json("")).unwrap();
        assert_eq!(customer.birthday, None);
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let customer: Customer = serde_json::from_str(&customer_json("")).unwrap();
        let value = serde_json::to_value(&customer).unwrap();
        assert!(value.get("birthday").is_none());
        assert!(value.get("notes").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_phone_digits() {
        let customer: Customer = serde_json::from_str(&customer_json("")).unwrap();
        assert_eq!(customer.phone_digits(), "919876543210");
    }

    #[test]
    fn test_credit_transaction_type_field() {
        let tx = CreditTransaction {
            id: "t1".to_string(),
            customer_id: None,
            kind: CreditTransactionType::Purchase,
            amount: 100,
            event_id: None,
            description: "Purchased 100 WhatsApp credits for ₹120".to_string(),
            date: Utc::now(),
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "purchase");
        assert_eq!(value["amount"], 100);
    }

    #[test]
    fn test_find_by_id() {
        let customer: Customer = serde_json::from_str(&customer_json("")).unwrap();
        let mut customers = vec![customer];
        assert!(find_by_id(&customers, "c1").is_some());
        assert!(find_by_id(&customers, "missing").is_none());

        find_by_id_mut(&mut customers, "c1").unwrap().notes = Some("VIP".into());
        assert_eq!(customers[0].notes.as_deref(), Some("VIP"));
    }

    #[test]
    fn test_event_overdue() {
        let event: Event = serde_json::from_str(
            r#"{"id":"e1","customerId":"c1","customerName":"A","eventType":"Wedding",
                "eventDate":"2025-02-15","venue":"Hotel Taj","status":"confirmed",
                "totalAmount":75000,"advancePaid":30000,"balanceDue":45000,
                "assignedPhotographer":"Amit Sharma","packageType":"Premium",
                "createdAt":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let before = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(!event.is_overdue(before));
        assert!(event.is_overdue(after));
    }
}
