//! Messaging dispatcher and the message-credit counter.
//!
//! Messages are priced in credits: one credit per started block of 160
//! characters of the rendered text. Sending records the message as `sent`
//! and debits the counter; nothing is actually delivered. The caller may
//! open [`whatsapp_link`] to hand the text to a messaging app.
//!
//! The credit counter (`whatsappCredits`) and the credit-transaction log are
//! separate fields. Purchases update both; sends update only the counter and
//! the message list. [`audit_credit_balance`] reports whether the two still
//! agree.

use crate::category::{CreditTransactionType, MessageStatus, MessageType};
use crate::entity::{
    digits_only, find_by_id, CreditTransaction, Customer, StudioRecord, WhatsAppMessage,
};
use crate::error::{Error, Result};
use crate::key::generate_id;
use crate::studio::StudioData;
use chrono::{Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Characters covered by one credit.
pub const CHARS_PER_CREDIT: i64 = 160;

/// Placeholder replaced with the customer's name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Days ahead (inclusive) that count as "upcoming" for occasions.
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

/// Credits needed to send `text`.
///
/// `ceil(len / 160)` over the UTF-16 length of the text, so an emoji counts
/// as two characters. Empty text costs nothing; any other text costs at
/// least one credit.
pub fn compute_cost(text: &str) -> i64 {
    let len = text.encode_utf16().count() as i64;
    (len + CHARS_PER_CREDIT - 1) / CHARS_PER_CREDIT
}

/// Replace every `{name}` in `template` with `name`.
///
/// No other placeholder is recognised; anything else is left verbatim.
pub fn render_template(template: &str, name: &str) -> String {
    template.replace(NAME_PLACEHOLDER, name)
}

/// Deep link that opens a chat with `phone` prefilled with `text`.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        digits_only(phone),
        urlencoding::encode(text)
    )
}

// ============================================================================
// Templates and credit packages
// ============================================================================

/// Preset message texts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageTemplate {
    Birthday,
    Anniversary,
    Reminder,
    ThankYou,
    Custom,
}

impl MessageTemplate {
    pub const ALL: [MessageTemplate; 5] = [
        MessageTemplate::Birthday,
        MessageTemplate::Anniversary,
        MessageTemplate::Reminder,
        MessageTemplate::ThankYou,
        MessageTemplate::Custom,
    ];

    /// Template text. `Custom` is empty: the caller writes the text.
    pub fn text(&self) -> &'static str {
        match self {
            MessageTemplate::Birthday => "🎉 Happy Birthday {name}! 🎂 Hope your special day is filled with joy and amazing memories! Thank you for choosing PhotoStudio Pro for your precious moments. 📸",
            MessageTemplate::Anniversary => "💕 Happy Anniversary {name}! 🥳 Wishing you both a lifetime of love and happiness. It was our pleasure capturing your beautiful moments! 📸✨",
            MessageTemplate::Reminder => "📸 Hi {name}! This is a friendly reminder about your upcoming photo session. We're excited to capture your special moments! Contact us if you have any questions.",
            MessageTemplate::ThankYou => "🙏 Thank you {name} for choosing PhotoStudio Pro! We loved capturing your special moments. Don't forget to share your favorite photos with us! 📸",
            MessageTemplate::Custom => "",
        }
    }

    /// Message type recorded for messages sent from this template.
    pub fn message_type(&self) -> MessageType {
        match self {
            MessageTemplate::Birthday => MessageType::Birthday,
            MessageTemplate::Anniversary => MessageType::Anniversary,
            MessageTemplate::Reminder => MessageType::Reminder,
            MessageTemplate::ThankYou | MessageTemplate::Custom => MessageType::Custom,
        }
    }
}

/// A purchasable bundle of message credits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditPackage {
    pub credits: i64,
    /// Price in whole rupees
    pub price: i64,
    pub popular: bool,
}

impl CreditPackage {
    /// Price of one credit in this package.
    pub fn per_credit(&self) -> Decimal {
        if self.credits == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.price) / Decimal::from(self.credits)
    }
}

pub const CREDIT_PACKAGES: [CreditPackage; 4] = [
    CreditPackage {
        credits: 100,
        price: 120,
        popular: false,
    },
    CreditPackage {
        credits: 500,
        price: 550,
        popular: true,
    },
    CreditPackage {
        credits: 1000,
        price: 1000,
        popular: false,
    },
    CreditPackage {
        credits: 2000,
        price: 1800,
        popular: false,
    },
];

// ============================================================================
// Sending
// ============================================================================

/// One message to send.
#[derive(Clone, Debug, PartialEq)]
pub struct SendRequest {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub message_type: MessageType,
    /// Text with optional `{name}` placeholders
    pub template: String,
}

impl SendRequest {
    /// Address a message to `customer`.
    pub fn to_customer(
        customer: &Customer,
        message_type: MessageType,
        template: impl Into<String>,
    ) -> Self {
        SendRequest {
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            message_type,
            template: template.into(),
        }
    }
}

/// Render, price and record one message, debiting the counter.
///
/// # Errors
/// - `Error::ValidationError`: blank template
/// - `Error::NotFound`: `customer_id` matches no customer
/// - `Error::InsufficientCredits`: the rendered text costs more than the
///   counter holds; nothing is recorded or debited
pub fn send_message(data: &mut StudioData, request: SendRequest) -> Result<WhatsAppMessage> {
    require_template(&request.template)?;
    if find_by_id(&data.customers, &request.customer_id).is_none() {
        return Err(Error::NotFound {
            collection: Customer::collection(),
            id: request.customer_id,
        });
    }

    let content = render_template(&request.template, &request.customer_name);
    let cost = compute_cost(&content);
    ensure_credits(data, cost)?;

    let message = record_message(data, request, content, cost);
    info!(
        "Message {} sent to {} ({} credits, {} left)",
        message.id, message.customer_name, cost, data.whatsapp_credits
    );
    Ok(message)
}

/// Send the same template to several customers.
///
/// The total cost of every rendered message is checked before anything is
/// sent: either all messages are recorded or none. Ids that match no
/// customer are skipped.
///
/// # Errors
/// - `Error::ValidationError`: no recipients, or a blank template
/// - `Error::InsufficientCredits`: the batch costs more than the counter holds,
///   or its total cost does not fit in an `i64`
pub fn send_bulk(
    data: &mut StudioData,
    customer_ids: &[String],
    message_type: MessageType,
    template: &str,
) -> Result<Vec<WhatsAppMessage>> {
    if customer_ids.is_empty() {
        return Err(Error::ValidationError(
            "at least one recipient is required".to_string(),
        ));
    }
    require_template(template)?;

    let mut batch = Vec::with_capacity(customer_ids.len());
    for id in customer_ids {
        match find_by_id(&data.customers, id) {
            Some(customer) => {
                let content = render_template(template, &customer.name);
                let cost = compute_cost(&content);
                let request = SendRequest::to_customer(customer, message_type, template);
                batch.push((request, content, cost));
            }
            None => warn!("Bulk send skipping unknown customer {}", id),
        }
    }

    let total = batch
        .iter()
        .try_fold(0i64, |acc, (_, _, cost)| acc.checked_add(*cost))
        .unwrap_or(i64::MAX);
    ensure_credits(data, total)?;

    let sent: Vec<WhatsAppMessage> = batch
        .into_iter()
        .map(|(request, content, cost)| record_message(data, request, content, cost))
        .collect();

    info!(
        "Bulk send: {} messages ({} credits, {} left)",
        sent.len(),
        total,
        data.whatsapp_credits
    );
    Ok(sent)
}

fn require_template(template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(Error::ValidationError("message text is required".to_string()));
    }
    Ok(())
}

fn ensure_credits(data: &StudioData, required: i64) -> Result<()> {
    if required > data.whatsapp_credits {
        warn!(
            "Send refused: need {} credits, have {}",
            required, data.whatsapp_credits
        );
        return Err(Error::InsufficientCredits {
            required,
            available: data.whatsapp_credits,
        });
    }
    Ok(())
}

fn record_message(
    data: &mut StudioData,
    request: SendRequest,
    content: String,
    cost: i64,
) -> WhatsAppMessage {
    let message = WhatsAppMessage {
        id: generate_id(),
        customer_id: request.customer_id,
        customer_name: request.customer_name,
        customer_phone: request.customer_phone,
        message_type: request.message_type,
        content,
        status: MessageStatus::Sent,
        credits_used: cost,
        sent_at: Some(Utc::now()),
        scheduled_for: None,
    };

    data.messages.push(message.clone());
    data.whatsapp_credits -= cost;
    message
}

// ============================================================================
// Credits
// ============================================================================

/// Add `credits` to the counter and log the purchase.
///
/// `price` is only written into the description; it is not checked against
/// any package.
///
/// # Errors
/// `Error::ValidationError` if `credits` is not positive, or if the counter
/// cannot hold the result. The aggregate is unchanged on error.
pub fn purchase_credits(
    data: &mut StudioData,
    credits: i64,
    price: Decimal,
) -> Result<CreditTransaction> {
    if credits <= 0 {
        return Err(Error::ValidationError(format!(
            "credits to purchase must be positive, got {}",
            credits
        )));
    }

    let Some(balance) = data.whatsapp_credits.checked_add(credits) else {
        return Err(Error::ValidationError(format!(
            "purchasing {} credits would overflow the counter ({} available)",
            credits, data.whatsapp_credits
        )));
    };

    let transaction = CreditTransaction {
        id: generate_id(),
        customer_id: None,
        kind: CreditTransactionType::Purchase,
        amount: credits,
        event_id: None,
        description: format!("Purchased {} WhatsApp credits for ₹{}", credits, price),
        date: Utc::now(),
    };

    data.whatsapp_credits = balance;
    data.credit_transactions.push(transaction.clone());

    info!(
        "Purchased {} credits for ₹{} ({} available)",
        credits, price, data.whatsapp_credits
    );
    Ok(transaction)
}

/// Buy one of the [`CREDIT_PACKAGES`].
///
/// # Errors
/// `Error::ValidationError` if the package holds no credits.
pub fn purchase_package(data: &mut StudioData, package: &CreditPackage) -> Result<CreditTransaction> {
    purchase_credits(data, package.credits, Decimal::from(package.price))
}

/// Comparison of the credit counter with what the logs account for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditAudit {
    /// Current value of `whatsappCredits`
    pub counter: i64,
    /// `opening + credits added - debits - credits used by messages`
    pub expected: i64,
}

impl CreditAudit {
    /// `counter - expected`; zero when the two agree.
    pub fn drift(&self) -> i64 {
        self.counter.saturating_sub(self.expected)
    }

    pub fn is_consistent(&self) -> bool {
        self.drift() == 0
    }
}

/// Recompute the counter from `opening` and the logs, without changing
/// anything.
///
/// Purchase, credit and refund rows add their amount; debit rows and the
/// `creditsUsed` of every message subtract. Sums saturate at the `i64`
/// bounds, so logs too large to add up show as drift.
pub fn audit_credit_balance(data: &StudioData, opening: i64) -> CreditAudit {
    let ledger = data
        .credit_transactions
        .iter()
        .fold(opening, |acc, tx| match tx.kind {
            CreditTransactionType::Purchase
            | CreditTransactionType::Credit
            | CreditTransactionType::Refund => acc.saturating_add(tx.amount),
            CreditTransactionType::Debit => acc.saturating_sub(tx.amount),
        });
    let expected = data
        .messages
        .iter()
        .fold(ledger, |acc, m| acc.saturating_sub(m.credits_used));

    let audit = CreditAudit {
        counter: data.whatsapp_credits,
        expected,
    };
    if !audit.is_consistent() {
        warn!(
            "Credit counter drift: counter {} but logs account for {}",
            audit.counter, audit.expected
        );
    }
    audit
}

// ============================================================================
// Upcoming occasions
// ============================================================================

/// Customers whose birthday falls within the next 7 days, today included.
pub fn upcoming_birthdays(customers: &[Customer], today: NaiveDate) -> Vec<&Customer> {
    customers
        .iter()
        .filter(|c| c.birthday.is_some_and(|d| is_upcoming(d, today)))
        .collect()
}

/// Customers whose wedding anniversary falls within the next 7 days, today
/// included.
pub fn upcoming_anniversaries(customers: &[Customer], today: NaiveDate) -> Vec<&Customer> {
    customers
        .iter()
        .filter(|c| c.anniversary.is_some_and(|d| is_upcoming(d, today)))
        .collect()
}

fn is_upcoming(date: NaiveDate, today: NaiveDate) -> bool {
    let Some(horizon) = today.checked_add_days(Days::new(UPCOMING_WINDOW_DAYS)) else {
        return false;
    };
    // The window may cross new year, so next year's occurrence counts too.
    [today.year(), today.year() + 1]
        .into_iter()
        .filter_map(|year| anniversary_in(date, year))
        .any(|occurrence| occurrence >= today && occurrence <= horizon)
}

/// The date's month and day in `year`. 29 February falls on 1 March in a
/// common year.
fn anniversary_in(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}
