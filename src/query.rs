//! Search, filter and sort over the record lists.

use crate::category::EventStatus;
use crate::entity::{find_by_id, Customer, Event, Payment};
use crate::studio::StudioData;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::cmp::Reverse;

/// Total spend above which a customer counts as high value.
pub const HIGH_VALUE_THRESHOLD: i64 = 30_000;

/// Days back that count as a "recent" payment.
pub const RECENT_PAYMENT_DAYS: u64 = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CustomerFilter {
    #[default]
    All,
    /// Positive credit balance
    HasCredit,
    /// Total spend above [`HIGH_VALUE_THRESHOLD`]
    HighValue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CustomerSort {
    /// Alphabetical
    #[default]
    Name,
    /// Newest first
    CreatedAt,
    /// Biggest spenders first
    TotalSpent,
    /// Largest credit balance first
    CreditBalance,
}

/// Customer list query.
///
/// ```
/// use studio_ledger::query::{CustomerFilter, CustomerQuery, CustomerSort};
///
/// let query = CustomerQuery::default()
///     .search("sharma")
///     .filter(CustomerFilter::HighValue)
///     .sort(CustomerSort::TotalSpent);
/// # let _ = query;
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerQuery {
    pub search: String,
    pub filter: CustomerFilter,
    pub sort: CustomerSort,
}

impl CustomerQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn filter(mut self, filter: CustomerFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: CustomerSort) -> Self {
        self.sort = sort;
        self
    }

    /// Matching customers in the requested order.
    ///
    /// The search term matches the name or email case-insensitively, or
    /// appears verbatim in the phone number.
    pub fn apply<'a>(&self, customers: &'a [Customer]) -> Vec<&'a Customer> {
        let term = self.search.to_lowercase();
        let mut matched: Vec<&Customer> = customers
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&term)
                    || c.phone.contains(&self.search)
                    || c.email.to_lowercase().contains(&term)
            })
            .filter(|c| match self.filter {
                CustomerFilter::All => true,
                CustomerFilter::HasCredit => c.credit_balance > Decimal::ZERO,
                CustomerFilter::HighValue => c.total_spent > Decimal::from(HIGH_VALUE_THRESHOLD),
            })
            .collect();

        match self.sort {
            CustomerSort::Name => matched.sort_by_key(|c| c.name.to_lowercase()),
            CustomerSort::CreatedAt => matched.sort_by_key(|c| Reverse(c.created_at)),
            CustomerSort::TotalSpent => matched.sort_by_key(|c| Reverse(c.total_spent)),
            CustomerSort::CreditBalance => matched.sort_by_key(|c| Reverse(c.credit_balance)),
        }
        matched
    }
}

/// Events matching `search` on customer name, event type or venue
/// (case-insensitive), optionally restricted to one status.
pub fn search_events<'a>(
    events: &'a [Event],
    search: &str,
    status: Option<EventStatus>,
) -> Vec<&'a Event> {
    let term = search.to_lowercase();
    events
        .iter()
        .filter(|e| {
            e.customer_name.to_lowercase().contains(&term)
                || e.event_type.as_str().to_lowercase().contains(&term)
                || e.venue.to_lowercase().contains(&term)
        })
        .filter(|e| status.map_or(true, |s| e.status == s))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaymentFilter {
    #[default]
    All,
    /// Dated within the last [`RECENT_PAYMENT_DAYS`] days
    Recent,
    /// The payment's event still has a balance due
    Outstanding,
}

/// Payments matching `search` on customer name, transaction id or method
/// (case-insensitive), newest first.
pub fn search_payments<'a>(
    data: &'a StudioData,
    search: &str,
    filter: PaymentFilter,
    today: NaiveDate,
) -> Vec<&'a Payment> {
    let term = search.to_lowercase();
    let recent_from = today
        .checked_sub_days(Days::new(RECENT_PAYMENT_DAYS))
        .unwrap_or(NaiveDate::MIN);

    let mut matched: Vec<&Payment> = data
        .payments
        .iter()
        .filter(|p| {
            let customer_matches = find_by_id(&data.customers, &p.customer_id)
                .is_some_and(|c| c.name.to_lowercase().contains(&term));
            customer_matches
                || p
                    .transaction_id
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&term))
                || p.method.as_str().to_lowercase().contains(&term)
        })
        .filter(|p| match filter {
            PaymentFilter::All => true,
            PaymentFilter::Recent => p.date >= recent_from,
            PaymentFilter::Outstanding => find_by_id(&data.events, &p.event_id)
                .is_some_and(|e| e.balance_due > Decimal::ZERO),
        })
        .collect();

    matched.sort_by_key(|p| Reverse(p.date));
    matched
}
