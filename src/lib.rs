//! # studio-ledger
//!
//! Customer, booking, payment and messaging-credit ledger for a single
//! photography studio.
//!
//! ## Features
//!
//! - **One aggregate:** all studio state is a single [`StudioData`] value,
//!   loaded and saved whole under one storage key
//! - **Derived balances:** an event's balance due is always recomputed from
//!   its full payment history
//! - **Credit-priced messaging:** messages cost one credit per 160
//!   characters and are refused when the counter cannot cover them
//! - **Pluggable storage:** in-memory, file-system and Redis backends
//! - **Safe sharing:** [`StudioService`] serializes every load-mutate-save
//!   cycle, so concurrent tasks never lose updates
//!
//! ## Quick Start
//!
//! ```ignore
//! use studio_ledger::{
//!     backend::InMemoryBackend,
//!     category::{EventType, MessageType, PaymentMethod},
//!     ledger::{NewCustomer, NewEvent, NewPayment},
//!     messaging::SendRequest,
//!     StudioService,
//! };
//! use rust_decimal_macros::dec;
//!
//! let studio = StudioService::new(InMemoryBackend::new());
//!
//! // 1. Register a customer
//! let customer = studio
//!     .add_customer(NewCustomer::new("Priya Sharma", "+91-9876543211"))
//!     .await?;
//!
//! // 2. Book an event: balance due starts at total - advance
//! let event = studio
//!     .add_event(
//!         NewEvent::new(&customer.id, EventType::Birthday, event_date)
//!             .with_amounts(dec!(15000), dec!(5000)),
//!     )
//!     .await?;
//!
//! // 3. Record a payment: the event balance is recomputed in the same write
//! studio
//!     .add_payment(NewPayment::new(&event.id, dec!(10000), PaymentMethod::Upi, paid_on))
//!     .await?;
//!
//! // 4. Send a reminder, debiting message credits
//! studio
//!     .send_message(SendRequest::to_customer(
//!         &customer,
//!         MessageType::Reminder,
//!         "Hi {name}! See you on Saturday.",
//!     ))
//!     .await?;
//! ```
//!
//! ### Working on the aggregate directly
//!
//! The [`ledger`] and [`messaging`] functions take a `&mut StudioData`, for
//! callers that manage loading and saving themselves through a
//! [`StudioRepository`]:
//!
//! ```ignore
//! let repo = StudioRepository::new(FileBackend::new("/var/lib/studio"));
//! let mut data = repo.load().await?;
//! ledger::add_customer(&mut data, NewCustomer::new("Amit Patel", "+91-9876543212"))?;
//! repo.save(&data).await?;
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod category;
pub mod config;
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod key;
pub mod ledger;
pub mod messaging;
pub mod observability;
pub mod query;
pub mod repository;
pub mod sample;
pub mod serialization;
pub mod service;
pub mod studio;

// Re-exports for convenience
pub use backend::StorageBackend;
pub use config::StoreConfig;
pub use entity::StudioRecord;
pub use error::{Error, Result};
pub use repository::StudioRepository;
pub use service::StudioService;
pub use studio::{StudioData, StudioSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
