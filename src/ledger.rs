//! Ledger engine: customer, event and payment mutations.
//!
//! Every function here works on a `&mut StudioData` the caller has already
//! loaded and is responsible for saving. Validation runs before anything is
//! touched, so a rejected call leaves the aggregate exactly as it was.
//!
//! # Balance rule
//!
//! An event's `balanceDue` is owned by [`recompute_balance`]:
//!
//! ```text
//! balanceDue = totalAmount - advancePaid - Σ(payments for the event)
//! ```
//!
//! It is recomputed from the full payment history after every payment and
//! after any update that changes `totalAmount` or `advancePaid`, never
//! adjusted incrementally.

use crate::category::{EventStatus, EventType, PaymentMethod};
use crate::entity::{find_by_id, find_by_id_mut, Customer, Event, Payment};
use crate::error::{Error, Result};
use crate::key::generate_id;
use crate::studio::StudioData;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

// ============================================================================
// Inputs
// ============================================================================

/// Fields supplied when creating a customer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub birthday: Option<NaiveDate>,
    pub anniversary: Option<NaiveDate>,
    pub credit_balance: Decimal,
    pub total_spent: Decimal,
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        NewCustomer {
            name: name.into(),
            phone: phone.into(),
            ..NewCustomer::default()
        }
    }
}

/// Partial update of a customer. `None` leaves the field as it is.
///
/// Optional fields take `Some(None)` to clear the stored value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<Option<NaiveDate>>,
    pub anniversary: Option<Option<NaiveDate>>,
    pub credit_balance: Option<Decimal>,
    pub total_spent: Option<Decimal>,
    pub event_history: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
}

/// Fields supplied when booking an event.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    pub customer_id: String,
    /// Left empty, the name is copied from the customer record.
    pub customer_name: String,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    pub venue: String,
    pub status: EventStatus,
    pub total_amount: Decimal,
    pub advance_paid: Decimal,
    pub assigned_photographer: String,
    pub package_type: String,
    pub notes: Option<String>,
}

impl NewEvent {
    pub fn new(customer_id: impl Into<String>, event_type: EventType, event_date: NaiveDate) -> Self {
        NewEvent {
            customer_id: customer_id.into(),
            customer_name: String::new(),
            event_type,
            event_date,
            venue: String::new(),
            status: EventStatus::default(),
            total_amount: Decimal::ZERO,
            advance_paid: Decimal::ZERO,
            assigned_photographer: String::new(),
            package_type: String::new(),
            notes: None,
        }
    }

    pub fn with_amounts(mut self, total_amount: Decimal, advance_paid: Decimal) -> Self {
        self.total_amount = total_amount;
        self.advance_paid = advance_paid;
        self
    }
}

/// Partial update of an event. `None` leaves the field as it is.
///
/// `balance_due` is deliberately absent: it is always derived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventPatch {
    pub customer_name: Option<String>,
    pub event_type: Option<EventType>,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub status: Option<EventStatus>,
    pub total_amount: Option<Decimal>,
    pub advance_paid: Option<Decimal>,
    pub assigned_photographer: Option<String>,
    pub package_type: Option<String>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

/// Fields supplied when recording a payment.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPayment {
    pub event_id: String,
    /// Left empty, the customer is taken from the event.
    pub customer_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub invoice_generated: bool,
}

impl NewPayment {
    pub fn new(
        event_id: impl Into<String>,
        amount: Decimal,
        method: PaymentMethod,
        date: NaiveDate,
    ) -> Self {
        NewPayment {
            event_id: event_id.into(),
            customer_id: String::new(),
            amount,
            method,
            transaction_id: None,
            date,
            notes: None,
            invoice_generated: false,
        }
    }
}

// ============================================================================
// Customers
// ============================================================================

/// Append a new customer.
///
/// # Errors
/// `Error::ValidationError` if `name` or `phone` is blank.
pub fn add_customer(data: &mut StudioData, fields: NewCustomer) -> Result<Customer> {
    require("name", &fields.name)?;
    require("phone", &fields.phone)?;

    let customer = Customer {
        id: generate_id(),
        name: fields.name,
        phone: fields.phone,
        email: fields.email,
        address: fields.address,
        birthday: fields.birthday,
        anniversary: fields.anniversary,
        credit_balance: fields.credit_balance,
        total_spent: fields.total_spent,
        event_history: Vec::new(),
        created_at: Utc::now(),
        notes: fields.notes,
    };

    data.customers.push(customer.clone());
    info!("Customer added: {} ({})", customer.name, customer.id);
    Ok(customer)
}

/// Merge `patch` over the customer `id`. Returns `None` if there is no such
/// customer.
pub fn update_customer(data: &mut StudioData, id: &str, patch: CustomerPatch) -> Option<Customer> {
    let customer = find_by_id_mut(&mut data.customers, id)?;

    if let Some(name) = patch.name {
        customer.name = name;
    }
    if let Some(phone) = patch.phone {
        customer.phone = phone;
    }
    if let Some(email) = patch.email {
        customer.email = email;
    }
    if let Some(address) = patch.address {
        customer.address = address;
    }
    if let Some(birthday) = patch.birthday {
        customer.birthday = birthday;
    }
    if let Some(anniversary) = patch.anniversary {
        customer.anniversary = anniversary;
    }
    if let Some(credit_balance) = patch.credit_balance {
        customer.credit_balance = credit_balance;
    }
    if let Some(total_spent) = patch.total_spent {
        customer.total_spent = total_spent;
    }
    if let Some(event_history) = patch.event_history {
        customer.event_history = event_history;
    }
    if let Some(notes) = patch.notes {
        customer.notes = notes;
    }

    debug!("Customer updated: {}", id);
    Some(customer.clone())
}

/// Remove the customer `id`. Events and payments that reference it are
/// kept. Returns whether a customer was removed.
pub fn delete_customer(data: &mut StudioData, id: &str) -> bool {
    let before = data.customers.len();
    data.customers.retain(|c| c.id != id);
    let removed = data.customers.len() < before;

    if removed {
        info!("Customer deleted: {}", id);
    }
    removed
}

// ============================================================================
// Events
// ============================================================================

/// Book a new event.
///
/// # Errors
/// `Error::ValidationError` if `customer_id` is blank.
pub fn add_event(data: &mut StudioData, fields: NewEvent) -> Result<Event> {
    require("customerId", &fields.customer_id)?;

    let customer_name = if fields.customer_name.trim().is_empty() {
        match find_by_id(&data.customers, &fields.customer_id) {
            Some(customer) => customer.name.clone(),
            None => {
                warn!(
                    "Event booked for unknown customer {}",
                    fields.customer_id
                );
                String::new()
            }
        }
    } else {
        fields.customer_name
    };

    let mut event = Event {
        id: generate_id(),
        customer_id: fields.customer_id,
        customer_name,
        event_type: fields.event_type,
        event_date: fields.event_date,
        venue: fields.venue,
        status: fields.status,
        total_amount: fields.total_amount,
        advance_paid: fields.advance_paid,
        balance_due: Decimal::ZERO,
        assigned_photographer: fields.assigned_photographer,
        package_type: fields.package_type,
        notes: fields.notes,
        created_at: Utc::now(),
    };
    // A new event has no payments yet, so this is totalAmount - advancePaid.
    event.balance_due = recompute_balance(&event, &data.payments);

    data.events.push(event.clone());
    info!(
        "Event booked: {} {} on {} ({})",
        event.customer_name, event.event_type, event.event_date, event.id
    );
    Ok(event)
}

/// Merge `patch` over the event `id`. Returns `None` if there is no such
/// event.
///
/// The balance is recomputed when the patch changes `total_amount` or
/// `advance_paid`.
pub fn update_event(data: &mut StudioData, id: &str, patch: EventPatch) -> Option<Event> {
    let event = find_by_id_mut(&mut data.events, id)?;
    let amounts_changed = patch.total_amount.is_some() || patch.advance_paid.is_some();

    if let Some(customer_name) = patch.customer_name {
        event.customer_name = customer_name;
    }
    if let Some(event_type) = patch.event_type {
        event.event_type = event_type;
    }
    if let Some(event_date) = patch.event_date {
        event.event_date = event_date;
    }
    if let Some(venue) = patch.venue {
        event.venue = venue;
    }
    if let Some(status) = patch.status {
        event.status = status;
    }
    if let Some(total_amount) = patch.total_amount {
        event.total_amount = total_amount;
    }
    if let Some(advance_paid) = patch.advance_paid {
        event.advance_paid = advance_paid;
    }
    if let Some(assigned_photographer) = patch.assigned_photographer {
        event.assigned_photographer = assigned_photographer;
    }
    if let Some(package_type) = patch.package_type {
        event.package_type = package_type;
    }
    if let Some(notes) = patch.notes {
        event.notes = notes;
    }

    if amounts_changed {
        event.balance_due = recompute_balance(event, &data.payments);
        warn_if_overpaid(event);
    }

    debug!("Event updated: {}", id);
    Some(event.clone())
}

/// Move the event `id` to `status`. Any transition is allowed.
pub fn set_event_status(data: &mut StudioData, id: &str, status: EventStatus) -> Option<Event> {
    let event = find_by_id_mut(&mut data.events, id)?;
    let previous = event.status;
    event.status = status;

    info!("Event {} status: {} -> {}", id, previous, status);
    Some(event.clone())
}

// ============================================================================
// Payments
// ============================================================================

/// Record a payment and recompute the owning event's balance.
///
/// A payment whose event does not exist is still recorded, and logged as
/// orphaned.
///
/// # Errors
/// `Error::ValidationError` if `event_id` is blank or `amount` is not
/// positive.
pub fn add_payment(data: &mut StudioData, fields: NewPayment) -> Result<Payment> {
    require("eventId", &fields.event_id)?;
    if fields.amount <= Decimal::ZERO {
        return Err(Error::ValidationError(format!(
            "payment amount must be positive, got {}",
            fields.amount
        )));
    }

    let customer_id = if fields.customer_id.trim().is_empty() {
        find_by_id(&data.events, &fields.event_id)
            .map(|e| e.customer_id.clone())
            .unwrap_or_default()
    } else {
        fields.customer_id
    };

    let payment = Payment {
        id: generate_id(),
        event_id: fields.event_id,
        customer_id,
        amount: fields.amount,
        method: fields.method,
        transaction_id: fields.transaction_id,
        date: fields.date,
        notes: fields.notes,
        invoice_generated: fields.invoice_generated,
    };
    data.payments.push(payment.clone());

    match find_by_id_mut(&mut data.events, &payment.event_id) {
        Some(event) => {
            event.balance_due = recompute_balance(event, &data.payments);
            warn_if_overpaid(event);
            info!(
                "Payment {} of {} via {} recorded for event {}, balance due {}",
                payment.id, payment.amount, payment.method, event.id, event.balance_due
            );
        }
        None => {
            warn!(
                "Payment {} recorded for unknown event {} (orphaned)",
                payment.id, payment.event_id
            );
        }
    }

    Ok(payment)
}

/// The balance still owed on `event` given the full payment history.
///
/// `totalAmount - advancePaid - Σ(payments whose eventId is the event's id)`.
/// Payments for other events are ignored, so the whole payment collection
/// may be passed. Overpayment yields a negative balance.
pub fn recompute_balance(event: &Event, payments: &[Payment]) -> Decimal {
    let paid: Decimal = payments
        .iter()
        .filter(|p| p.event_id == event.id)
        .map(|p| p.amount)
        .sum();
    event.total_amount - event.advance_paid - paid
}

fn warn_if_overpaid(event: &Event) {
    if event.balance_due < Decimal::ZERO {
        warn!(
            "Event {} is overpaid by {}",
            event.id,
            -event.balance_due
        );
    }
}

// ============================================================================
// Per-customer views
// ============================================================================

/// Events booked for a customer.
pub fn customer_events<'a>(data: &'a StudioData, customer_id: &str) -> Vec<&'a Event> {
    data.events
        .iter()
        .filter(|e| e.customer_id == customer_id)
        .collect()
}

/// Payments made by a customer.
pub fn customer_payments<'a>(data: &'a StudioData, customer_id: &str) -> Vec<&'a Payment> {
    data.payments
        .iter()
        .filter(|p| p.customer_id == customer_id)
        .collect()
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}
