//! Demo customers and events for a fresh studio.

use crate::category::{EventStatus, EventType};
use crate::entity::Customer;
use crate::error::Result;
use crate::ledger::{add_customer, add_event, NewCustomer, NewEvent};
use crate::studio::StudioData;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Seed the demo records into `data` if it has no customers yet.
///
/// Returns whether anything was added.
///
/// # Errors
/// Propagates ledger validation errors; the demo records are valid, so
/// this does not fail in practice.
pub fn seed_sample_data(data: &mut StudioData) -> Result<bool> {
    if !data.customers.is_empty() {
        debug!(
            "Studio already has {} customers, not seeding",
            data.customers.len()
        );
        return Ok(false);
    }

    let mut customers = Vec::new();
    for fields in sample_customers() {
        customers.push(add_customer(data, fields)?);
    }
    for fields in sample_events(&customers) {
        add_event(data, fields)?;
    }

    info!(
        "Sample data initialized: {} customers, {} events",
        data.customers.len(),
        data.events.len()
    );
    Ok(true)
}

fn sample_customers() -> Vec<NewCustomer> {
    vec![
        NewCustomer {
            email: "rajesh.kumar@gmail.com".into(),
            address: "123 MG Road, Bandra, Mumbai - 400050".into(),
            birthday: ymd(1985, 6, 15),
            anniversary: ymd(2010, 12, 20),
            credit_balance: Decimal::from(2500),
            total_spent: Decimal::from(45000),
            notes: Some("Prefers outdoor shoots".into()),
            ..NewCustomer::new("Rajesh Kumar", "+91-9876543210")
        },
        NewCustomer {
            email: "priya.sharma@gmail.com".into(),
            address: "456 Park Street, Pune - 411001".into(),
            birthday: ymd(1990, 3, 22),
            anniversary: ymd(2015, 11, 28),
            credit_balance: Decimal::from(1800),
            total_spent: Decimal::from(32000),
            notes: Some("Likes traditional photography".into()),
            ..NewCustomer::new("Priya Sharma", "+91-9876543211")
        },
        NewCustomer {
            email: "amit.patel@gmail.com".into(),
            address: "789 Ring Road, Ahmedabad - 380001".into(),
            birthday: ymd(1988, 9, 10),
            total_spent: Decimal::from(28000),
            notes: Some("Corporate event specialist".into()),
            ..NewCustomer::new("Amit Patel", "+91-9876543212")
        },
        NewCustomer {
            email: "sneha.reddy@gmail.com".into(),
            address: "321 Jubilee Hills, Hyderabad - 500033".into(),
            birthday: ymd(1992, 12, 5),
            anniversary: ymd(2018, 2, 14),
            credit_balance: Decimal::from(3200),
            total_spent: Decimal::from(67000),
            notes: Some("Regular customer, high-value events".into()),
            ..NewCustomer::new("Sneha Reddy", "+91-9876543213")
        },
        NewCustomer {
            email: "vikram.singh@gmail.com".into(),
            address: "567 Civil Lines, Delhi - 110054".into(),
            birthday: ymd(1983, 7, 18),
            credit_balance: Decimal::from(500),
            total_spent: Decimal::from(18000),
            notes: Some("Destination weddings".into()),
            ..NewCustomer::new("Vikram Singh", "+91-9876543214")
        },
    ]
}

/// Events for the first three sample customers.
fn sample_events(customers: &[Customer]) -> Vec<NewEvent> {
    let specs = [
        (
            EventType::Wedding,
            ymd(2025, 2, 15),
            "Hotel Taj, Mumbai",
            EventStatus::Confirmed,
            75000,
            30000,
            "Amit Sharma",
            "Premium Wedding Package",
            "150 guests expected, 2-day event",
        ),
        (
            EventType::Birthday,
            ymd(2025, 1, 28),
            "Home - Pune",
            EventStatus::Shot,
            15000,
            15000,
            "Rahul Verma",
            "Birthday Special",
            "Kids birthday party",
        ),
        (
            EventType::Corporate,
            ymd(2025, 2, 8),
            "Conference Hall, Ahmedabad",
            EventStatus::Editing,
            25000,
            12500,
            "Neha Joshi",
            "Corporate Event Coverage",
            "Annual company meet",
        ),
    ];

    customers
        .iter()
        .zip(specs)
        .filter_map(
            |(customer, (event_type, date, venue, status, total, advance, photographer, package, notes))| {
                Some(NewEvent {
                    customer_name: customer.name.clone(),
                    venue: venue.into(),
                    status,
                    assigned_photographer: photographer.into(),
                    package_type: package.into(),
                    notes: Some(notes.into()),
                    ..NewEvent::new(&customer.id, event_type, date?)
                        .with_amounts(Decimal::from(total), Decimal::from(advance))
                })
            },
        )
        .collect()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::find_by_id;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seed_empty_studio() {
        let mut data = StudioData::default();

        assert!(seed_sample_data(&mut data).unwrap());

        assert_eq!(data.customers.len(), 5);
        assert_eq!(data.events.len(), 3);
        assert!(data.payments.is_empty());

        let wedding = &data.events[0];
        assert_eq!(wedding.customer_name, "Rajesh Kumar");
        assert_eq!(wedding.balance_due, dec!(45000));
        assert_eq!(wedding.status, EventStatus::Confirmed);
        assert!(find_by_id(&data.customers, &wedding.customer_id).is_some());

        assert_eq!(data.events[1].balance_due, dec!(0));
        assert_eq!(data.events[2].balance_due, dec!(12500));
    }

    #[test]
    fn test_seed_skips_populated_studio() {
        let mut data = StudioData::default();
        seed_sample_data(&mut data).unwrap();
        let seeded = data.clone();

        assert!(!seed_sample_data(&mut data).unwrap());
        assert_eq!(data, seeded);
    }
}
