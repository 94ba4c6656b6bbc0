//! The studio aggregate: every collection plus the credit counter and settings.

use crate::entity::{AiProcessingJob, CreditTransaction, Customer, Event, Payment, WhatsAppMessage};
use serde::{Deserialize, Serialize};

/// Message credits a fresh studio starts with.
pub const DEFAULT_WHATSAPP_CREDITS: i64 = 500;

/// Studio identity printed on invoices and messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSettings {
    pub studio_name: String,
    pub studio_phone: String,
    pub studio_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        StudioSettings {
            studio_name: "PhotoStudio Pro".to_string(),
            studio_phone: "+91-9876543210".to_string(),
            studio_email: "info@photostudiopro.in".to_string(),
            gst_number: Some("27AABCU9603R1ZX".to_string()),
        }
    }
}

/// Aggregate root holding all state for one studio.
///
/// Loaded and saved as a whole; there are no partial updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioData {
    pub customers: Vec<Customer>,
    pub events: Vec<Event>,
    pub payments: Vec<Payment>,
    pub credit_transactions: Vec<CreditTransaction>,
    pub messages: Vec<WhatsAppMessage>,
    pub ai_processing_jobs: Vec<AiProcessingJob>,
    pub whatsapp_credits: i64,
    pub settings: StudioSettings,
}

impl Default for StudioData {
    fn default() -> Self {
        StudioData {
            customers: Vec::new(),
            events: Vec::new(),
            payments: Vec::new(),
            credit_transactions: Vec::new(),
            messages: Vec::new(),
            ai_processing_jobs: Vec::new(),
            whatsapp_credits: DEFAULT_WHATSAPP_CREDITS,
            settings: StudioSettings::default(),
        }
    }
}

impl StudioData {
    /// Top-level keys of the persisted layout, in declaration order.
    pub const TOP_LEVEL_KEYS: [&'static str; 8] = [
        "customers",
        "events",
        "payments",
        "creditTransactions",
        "messages",
        "aiProcessingJobs",
        "whatsappCredits",
        "settings",
    ];

    /// Payments recorded against one event, in insertion order.
    pub fn payments_for_event<'a>(&'a self, event_id: &'a str) -> impl Iterator<Item = &'a Payment> {
        self.payments.iter().filter(move |p| p.event_id == event_id)
    }

    /// Total number of records across all collections.
    pub fn record_count(&self) -> usize {
        self.customers.len()
            + self.events.len()
            + self.payments.len()
            + self.credit_transactions.len()
            + self.messages.len()
            + self.ai_processing_jobs.len()
    }
}
