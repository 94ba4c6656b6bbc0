//! Closed categorical values used by studio records.
//!
//! Every category that the legacy layout stored as a bare string is a
//! closed enum here. The serde names are the exact strings found in the
//! persisted aggregate, so existing data loads unchanged, and `Display`
//! renders the same strings.
//!
//! # Event pipeline
//!
//! ```text
//! booked → confirmed → shot → editing → ready → delivered
//! ```
//!
//! The order is informational. Any status may be set from any other;
//! nothing stops a delivered event from moving back to booked.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of shoot booked for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Wedding,
    Birthday,
    Corporate,
    Anniversary,
    #[serde(rename = "Pre-Wedding")]
    PreWedding,
    #[serde(rename = "Baby Shower")]
    BabyShower,
    Engagement,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Wedding,
        EventType::Birthday,
        EventType::Corporate,
        EventType::Anniversary,
        EventType::PreWedding,
        EventType::BabyShower,
        EventType::Engagement,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Wedding => "Wedding",
            EventType::Birthday => "Birthday",
            EventType::Corporate => "Corporate",
            EventType::Anniversary => "Anniversary",
            EventType::PreWedding => "Pre-Wedding",
            EventType::BabyShower => "Baby Shower",
            EventType::Engagement => "Engagement",
            EventType::Other => "Other",
        }
    }
}

/// Position of an event in the production pipeline.
///
/// Variants are declared in pipeline order, so `Ord` follows the pipeline.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Booked,
    Confirmed,
    Shot,
    Editing,
    Ready,
    Delivered,
}

impl EventStatus {
    pub const ALL: [EventStatus; 6] = [
        EventStatus::Booked,
        EventStatus::Confirmed,
        EventStatus::Shot,
        EventStatus::Editing,
        EventStatus::Ready,
        EventStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Booked => "booked",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Shot => "shot",
            EventStatus::Editing => "editing",
            EventStatus::Ready => "ready",
            EventStatus::Delivered => "delivered",
        }
    }

    /// The following pipeline stage, `None` once delivered.
    pub fn next(&self) -> Option<EventStatus> {
        match self {
            EventStatus::Booked => Some(EventStatus::Confirmed),
            EventStatus::Confirmed => Some(EventStatus::Shot),
            EventStatus::Shot => Some(EventStatus::Editing),
            EventStatus::Editing => Some(EventStatus::Ready),
            EventStatus::Ready => Some(EventStatus::Delivered),
            EventStatus::Delivered => None,
        }
    }

    /// Work still ahead of the studio: booked, confirmed, shot or editing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            EventStatus::Booked | EventStatus::Confirmed | EventStatus::Shot | EventStatus::Editing
        )
    }
}

/// How a payment was received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cheque => "Cheque",
        }
    }
}

/// Purpose of an outgoing message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Birthday,
    Anniversary,
    Reminder,
    #[default]
    Custom,
    EventUpdate,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Birthday => "birthday",
            MessageType::Anniversary => "anniversary",
            MessageType::Reminder => "reminder",
            MessageType::Custom => "custom",
            MessageType::EventUpdate => "event_update",
        }
    }
}

/// Delivery state of a message.
///
/// Only `Sent` is ever produced; there is no delivery confirmation channel
/// that could move a message to `Delivered` or `Failed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
        }
    }
}

/// Kind of row in the credit audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTransactionType {
    Credit,
    Debit,
    Purchase,
    Refund,
}

impl CreditTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTransactionType::Credit => "credit",
            CreditTransactionType::Debit => "debit",
            CreditTransactionType::Purchase => "purchase",
            CreditTransactionType::Refund => "refund",
        }
    }
}

/// Photo tool an AI job was queued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiJobType {
    BackgroundRemoval,
    FaceDetection,
    Enhancement,
}

impl AiJobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiJobType::BackgroundRemoval => "background_removal",
            AiJobType::FaceDetection => "face_detection",
            AiJobType::Enhancement => "enhancement",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiJobStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl AiJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiJobStatus::Processing => "processing",
            AiJobStatus::Completed => "completed",
            AiJobStatus::Failed => "failed",
        }
    }
}

// ============================================================================
// Display / FromStr
// ============================================================================

macro_rules! string_category {
    ($ty:ty, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                [$($variant),+]
                    .into_iter()
                    .find(|v: &$ty| v.as_str() == s)
                    .ok_or_else(|| {
                        Error::ValidationError(format!(
                            "unknown {}: {}",
                            stringify!($ty),
                            s
                        ))
                    })
            }
        }
    };
}

string_category!(
    EventType,
    [
        EventType::Wedding,
        EventType::Birthday,
        EventType::Corporate,
        EventType::Anniversary,
        EventType::PreWedding,
        EventType::BabyShower,
        EventType::Engagement,
        EventType::Other,
    ]
);
string_category!(
    EventStatus,
    [
        EventStatus::Booked,
        EventStatus::Confirmed,
        EventStatus::Shot,
        EventStatus::Editing,
        EventStatus::Ready,
        EventStatus::Delivered,
    ]
);
string_category!(
    PaymentMethod,
    [
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
    ]
);
string_category!(
    MessageType,
    [
        MessageType::Birthday,
        MessageType::Anniversary,
        MessageType::Reminder,
        MessageType::Custom,
        MessageType::EventUpdate,
    ]
);
string_category!(
    MessageStatus,
    [
        MessageStatus::Pending,
        MessageStatus::Sent,
        MessageStatus::Delivered,
        MessageStatus::Failed,
    ]
);
string_category!(
    CreditTransactionType,
    [
        CreditTransactionType::Credit,
        CreditTransactionType::Debit,
        CreditTransactionType::Purchase,
        CreditTransactionType::Refund,
    ]
);
string_category!(
    AiJobType,
    [
        AiJobType::BackgroundRemoval,
        AiJobType::FaceDetection,
        AiJobType::Enhancement,
    ]
);
string_category!(
    AiJobStatus,
    [
        AiJobStatus::Processing,
        AiJobStatus::Completed,
        AiJobStatus::Failed,
    ]
);
