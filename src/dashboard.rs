//! Figures derived from the aggregate for the studio overview.
//!
//! Nothing here mutates state; every value is recomputed from the
//! collections on each call.

use crate::category::{EventType, PaymentMethod};
use crate::entity::{find_by_id, Event, Payment};
use crate::key::invoice_number;
use crate::studio::StudioData;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Headline numbers for the studio overview.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub todays_events: usize,
    /// Sum of `balanceDue` over every event
    pub pending_payments: Decimal,
    pub whatsapp_credits: i64,
    /// Payments dated in the same month and year as `today`
    pub monthly_revenue: Decimal,
    pub total_customers: usize,
    /// Events still booked, confirmed, shot or in editing
    pub active_events: usize,
}

impl DashboardStats {
    pub fn compute(data: &StudioData, today: NaiveDate) -> Self {
        DashboardStats {
            todays_events: data.events.iter().filter(|e| e.event_date == today).count(),
            pending_payments: data.events.iter().map(|e| e.balance_due).sum(),
            whatsapp_credits: data.whatsapp_credits,
            monthly_revenue: data
                .payments
                .iter()
                .filter(|p| p.date.year() == today.year() && p.date.month() == today.month())
                .map(|p| p.amount)
                .sum(),
            total_customers: data.customers.len(),
            active_events: data.events.iter().filter(|e| e.status.is_active()).count(),
        }
    }
}

/// The next `limit` events dated today or later, soonest first.
pub fn upcoming_events(events: &[Event], today: NaiveDate, limit: usize) -> Vec<&Event> {
    let mut upcoming: Vec<&Event> = events.iter().filter(|e| e.event_date >= today).collect();
    upcoming.sort_by_key(|e| e.event_date);
    upcoming.truncate(limit);
    upcoming
}

/// Money received and money still owed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_revenue: Decimal,
    pub monthly_revenue: Decimal,
    /// Events with a positive balance
    pub pending_events: usize,
    pub pending_amount: Decimal,
    /// Pending events whose date has passed
    pub overdue_events: usize,
    pub overdue_amount: Decimal,
}

impl PaymentSummary {
    pub fn compute(data: &StudioData, today: NaiveDate) -> Self {
        let pending: Vec<&Event> = data
            .events
            .iter()
            .filter(|e| e.balance_due > Decimal::ZERO)
            .collect();
        let overdue: Vec<&Event> = pending
            .iter()
            .copied()
            .filter(|e| e.is_overdue(today))
            .collect();

        PaymentSummary {
            total_revenue: data.payments.iter().map(|p| p.amount).sum(),
            monthly_revenue: DashboardStats::compute(data, today).monthly_revenue,
            pending_events: pending.len(),
            pending_amount: pending.iter().map(|e| e.balance_due).sum(),
            overdue_events: overdue.len(),
            overdue_amount: overdue.iter().map(|e| e.balance_due).sum(),
        }
    }
}

/// Data printed on a payment receipt.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_number: String,
    pub date: NaiveDate,
    pub customer: String,
    pub event: EventType,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub studio_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
}

impl Invoice {
    /// Build the invoice for `payment`.
    ///
    /// Returns `None` when the payment's event or customer no longer exists.
    pub fn for_payment(payment: &Payment, data: &StudioData) -> Option<Invoice> {
        let event = find_by_id(&data.events, &payment.event_id)?;
        let customer = find_by_id(&data.customers, &payment.customer_id)?;

        Some(Invoice {
            invoice_number: invoice_number(&payment.id),
            date: payment.date,
            customer: customer.name.clone(),
            event: event.event_type,
            amount: payment.amount,
            method: payment.method,
            transaction_id: payment.transaction_id.clone(),
            studio_name: data.settings.studio_name.clone(),
            gst_number: data.settings.gst_number.clone(),
        })
    }
}
