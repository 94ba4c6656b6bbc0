//! Shared handle over a studio store.
//!
//! Wraps a [`StudioRepository`] in `Arc` for easy sharing across tasks, and
//! runs every mutation as one load-mutate-save cycle under a single async
//! mutex. Two concurrent mutations through the same service (or any of its
//! clones) therefore never overwrite each other's changes.
//!
//! Separate services, or direct repository users, writing the same key do
//! not share the mutex and are back to last-writer-wins.

use crate::backend::StorageBackend;
use crate::category::{EventStatus, MessageType};
use crate::config::StoreConfig;
use crate::dashboard::{DashboardStats, Invoice, PaymentSummary};
use crate::entity::{find_by_id, CreditTransaction, Customer, Event, Payment, WhatsAppMessage};
use crate::error::Result;
use crate::ledger::{self, CustomerPatch, EventPatch, NewCustomer, NewEvent, NewPayment};
use crate::messaging::{self, CreditAudit, CreditPackage, SendRequest};
use crate::observability::StoreMetrics;
use crate::repository::StudioRepository;
use crate::sample::seed_sample_data;
use crate::serialization;
use crate::studio::StudioData;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Cloneable, thread-safe studio store.
///
/// # Example
///
/// ```no_run
/// use studio_ledger::backend::InMemoryBackend;
/// use studio_ledger::ledger::NewCustomer;
/// use studio_ledger::StudioService;
///
/// # async fn example() -> studio_ledger::Result<()> {
/// let studio = StudioService::new(InMemoryBackend::new());
///
/// let customer = studio
///     .add_customer(NewCustomer::new("Priya Sharma", "+91-9876543211"))
///     .await?;
///
/// // Clones share the store and the write lock
/// let handle = studio.clone();
/// tokio::spawn(async move { handle.purchase_credits(100, 120.into()).await });
/// # let _ = customer;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StudioService<B: StorageBackend> {
    inner: Arc<Inner<B>>,
}

struct Inner<B: StorageBackend> {
    repository: StudioRepository<B>,
    write_lock: Mutex<()>,
}

impl<B: StorageBackend> StudioService<B> {
    /// Create a service with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::from_repository(StudioRepository::new(backend))
    }

    /// Create a service with custom metrics.
    pub fn with_metrics(backend: B, metrics: Box<dyn StoreMetrics>) -> Self {
        Self::from_repository(StudioRepository::new(backend).with_metrics(metrics))
    }

    /// Create a service with a custom configuration.
    ///
    /// Seeds the demo records when `config.seed_sample_data` is set and the
    /// studio has no customers yet.
    ///
    /// # Errors
    /// - `Error::ConfigError`: invalid configuration
    /// - any load/save error raised while seeding
    pub async fn open(backend: B, config: StoreConfig) -> Result<Self> {
        let seed = config.seed_sample_data;
        let service = Self::from_repository(StudioRepository::with_config(backend, config)?);
        if seed {
            service.initialize_sample_data().await?;
        }
        Ok(service)
    }

    pub fn from_repository(repository: StudioRepository<B>) -> Self {
        StudioService {
            inner: Arc::new(Inner {
                repository,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn repository(&self) -> &StudioRepository<B> {
        &self.inner.repository
    }

    /// Load the current aggregate.
    ///
    /// # Errors
    /// Returns `Err` if the stored aggregate cannot be read.
    pub async fn snapshot(&self) -> Result<StudioData> {
        self.inner.repository.load().await
    }

    /// Run `f` on a freshly loaded aggregate and save the result.
    ///
    /// Nothing is saved when `f` fails.
    async fn mutate<T, F>(&self, operation: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut StudioData) -> Result<T>,
    {
        let _guard = self.inner.write_lock.lock().await;
        let timer = Instant::now();
        let metrics = self.inner.repository.metrics();

        let mut data = self.inner.repository.load().await?;
        let value = f(&mut data).inspect_err(|e| metrics.record_error(operation, &e.to_string()))?;

        self.inner.repository.save(&data).await?;
        metrics.record_mutation(operation, timer.elapsed());
        Ok(value)
    }

    /// Like [`Self::mutate`], but `Ok(None)` from `f` means "nothing to
    /// change" and skips the save.
    async fn mutate_if<T, F>(&self, operation: &str, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut StudioData) -> Result<Option<T>>,
    {
        let _guard = self.inner.write_lock.lock().await;
        let timer = Instant::now();
        let metrics = self.inner.repository.metrics();

        let mut data = self.inner.repository.load().await?;
        let Some(value) =
            f(&mut data).inspect_err(|e| metrics.record_error(operation, &e.to_string()))?
        else {
            return Ok(None);
        };

        self.inner.repository.save(&data).await?;
        metrics.record_mutation(operation, timer.elapsed());
        Ok(Some(value))
    }

    // ------------------------------------------------------------------
    // Customers
    // ------------------------------------------------------------------

    /// # Errors
    /// `Error::ValidationError` for a blank name or phone, or a storage error.
    pub async fn add_customer(&self, fields: NewCustomer) -> Result<Customer> {
        self.mutate("add_customer", |data| ledger::add_customer(data, fields))
            .await
    }

    /// `Ok(None)` when the customer does not exist; nothing is saved then.
    ///
    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn update_customer(&self, id: &str, patch: CustomerPatch) -> Result<Option<Customer>> {
        self.mutate_if("update_customer", |data| {
            Ok(ledger::update_customer(data, id, patch))
        })
        .await
    }

    /// `Ok(false)` when the customer does not exist.
    ///
    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn delete_customer(&self, id: &str) -> Result<bool> {
        let removed = self
            .mutate_if("delete_customer", |data| {
                Ok(ledger::delete_customer(data, id).then_some(()))
            })
            .await?;
        Ok(removed.is_some())
    }

    // ------------------------------------------------------------------
    // Events and payments
    // ------------------------------------------------------------------

    /// # Errors
    /// `Error::ValidationError` for a blank customer id, or a storage error.
    pub async fn add_event(&self, fields: NewEvent) -> Result<Event> {
        self.mutate("add_event", |data| ledger::add_event(data, fields))
            .await
    }

    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn update_event(&self, id: &str, patch: EventPatch) -> Result<Option<Event>> {
        self.mutate_if("update_event", |data| Ok(ledger::update_event(data, id, patch)))
            .await
    }

    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn set_event_status(&self, id: &str, status: EventStatus) -> Result<Option<Event>> {
        self.mutate_if("set_event_status", |data| {
            Ok(ledger::set_event_status(data, id, status))
        })
        .await
    }

    /// Record a payment; the payment and the owning event's new balance are
    /// saved in the same write.
    ///
    /// # Errors
    /// `Error::ValidationError` for a blank event id or non-positive amount,
    /// or a storage error.
    pub async fn add_payment(&self, fields: NewPayment) -> Result<Payment> {
        self.mutate("add_payment", |data| ledger::add_payment(data, fields))
            .await
    }

    // ------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------

    /// # Errors
    /// `Error::ValidationError`, `Error::InsufficientCredits`, or a storage error.
    pub async fn send_message(&self, request: SendRequest) -> Result<WhatsAppMessage> {
        self.mutate("send_message", |data| messaging::send_message(data, request))
            .await
    }

    /// # Errors
    /// `Error::ValidationError`, `Error::InsufficientCredits`, or a storage error.
    pub async fn send_bulk(
        &self,
        customer_ids: &[String],
        message_type: MessageType,
        template: &str,
    ) -> Result<Vec<WhatsAppMessage>> {
        self.mutate("send_bulk", |data| {
            messaging::send_bulk(data, customer_ids, message_type, template)
        })
        .await
    }

    /// # Errors
    /// `Error::ValidationError` for non-positive credits, or a storage error.
    pub async fn purchase_credits(&self, credits: i64, price: Decimal) -> Result<CreditTransaction> {
        self.mutate("purchase_credits", |data| {
            messaging::purchase_credits(data, credits, price)
        })
        .await
    }

    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn purchase_package(&self, package: &CreditPackage) -> Result<CreditTransaction> {
        self.mutate("purchase_package", |data| {
            messaging::purchase_package(data, package)
        })
        .await
    }

    /// Compare the credit counter against the logs, starting from the
    /// configured initial credits.
    ///
    /// # Errors
    /// Returns `Err` if the aggregate cannot be loaded.
    pub async fn audit_credits(&self) -> Result<CreditAudit> {
        let data = self.snapshot().await?;
        let opening = self.inner.repository.config().initial_credits;
        Ok(messaging::audit_credit_balance(&data, opening))
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// # Errors
    /// Returns `Err` if the aggregate cannot be loaded.
    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let data = self.snapshot().await?;
        Ok(DashboardStats::compute(&data, today))
    }

    /// # Errors
    /// Returns `Err` if the aggregate cannot be loaded.
    pub async fn payment_summary(&self, today: NaiveDate) -> Result<PaymentSummary> {
        let data = self.snapshot().await?;
        Ok(PaymentSummary::compute(&data, today))
    }

    /// Invoice for the payment `payment_id`; `Ok(None)` if the payment, its
    /// event or its customer is missing.
    ///
    /// # Errors
    /// Returns `Err` if the aggregate cannot be loaded.
    pub async fn invoice(&self, payment_id: &str) -> Result<Option<Invoice>> {
        let data = self.snapshot().await?;
        Ok(find_by_id(&data.payments, payment_id).and_then(|p| Invoice::for_payment(p, &data)))
    }

    // ------------------------------------------------------------------
    // Whole-store operations
    // ------------------------------------------------------------------

    /// Seed the demo customers and events if the studio has none.
    ///
    /// # Errors
    /// Returns `Err` on a storage error.
    pub async fn initialize_sample_data(&self) -> Result<bool> {
        let seeded = self
            .mutate_if("initialize_sample_data", |data| {
                Ok(seed_sample_data(data)?.then_some(()))
            })
            .await?;
        Ok(seeded.is_some())
    }

    /// Export the current aggregate as a versioned snapshot.
    ///
    /// # Errors
    /// Returns `Err` if the aggregate cannot be loaded or encoded.
    pub async fn export_snapshot(&self) -> Result<Vec<u8>> {
        let data = self.snapshot().await?;
        serialization::export_snapshot(&data)
    }

    /// Replace the stored aggregate with the one in `snapshot`.
    ///
    /// # Errors
    /// - `Error::InvalidSnapshot` / `Error::VersionMismatch` /
    ///   `Error::DeserializationError`: unusable snapshot; storage untouched
    /// - a storage error while saving
    pub async fn restore_snapshot(&self, snapshot: &[u8]) -> Result<StudioData> {
        let data = serialization::import_snapshot(snapshot)?;

        let _guard = self.inner.write_lock.lock().await;
        self.inner.repository.save(&data).await?;
        info!(
            "Snapshot restored: {} records, {} credits",
            data.record_count(),
            data.whatsapp_credits
        );
        Ok(data)
    }

    /// Remove the stored aggregate.
    ///
    /// # Errors
    /// Returns `Err` if the backend delete fails.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;
        self.inner.repository.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::category::{EventType, PaymentMethod};
    use crate::error::Error;
    use crate::messaging::CREDIT_PACKAGES;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_service_persists_mutations() {
        let backend = InMemoryBackend::new();
        let studio = StudioService::new(backend.clone());

        let customer = studio
            .add_customer(NewCustomer::new("A", "+91-9000000001"))
            .await
            .unwrap();

        // A second service over the same backend sees the write
        let other = StudioService::new(backend);
        let data = other.snapshot().await.unwrap();
        assert_eq!(data.customers, vec![customer]);
    }

    #[tokio::test]
    async fn test_service_booking_scenario() {
        let studio = StudioService::new(InMemoryBackend::new());
        let customer = studio
            .add_customer(NewCustomer::new("A", "+91-9000000001"))
            .await
            .unwrap();
        let event = studio
            .add_event(
                NewEvent::new(&customer.id, EventType::Wedding, date(2025, 3, 1))
                    .with_amounts(dec!(10000), dec!(2000)),
            )
            .await
            .unwrap();
        assert_eq!(event.balance_due, dec!(8000));

        for (amount, expected) in [(dec!(3000), dec!(5000)), (dec!(5000), dec!(0))] {
            studio
                .add_payment(NewPayment::new(
                    &event.id,
                    amount,
                    PaymentMethod::Cash,
                    date(2025, 2, 1),
                ))
                .await
                .unwrap();
            let data = studio.snapshot().await.unwrap();
            assert_eq!(data.events[0].balance_due, expected);
        }
    }

    #[tokio::test]
    async fn test_service_validation_saves_nothing() {
        let backend = InMemoryBackend::new();
        let studio = StudioService::new(backend.clone());

        let result = studio.add_customer(NewCustomer::new("", "1")).await;
        assert!(matches!(result, Err(Error::ValidationError(_))));
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_service_not_found_saves_nothing() {
        let backend = InMemoryBackend::new();
        let studio = StudioService::new(backend.clone());

        assert_eq!(
            studio
                .update_customer("missing", CustomerPatch::default())
                .await
                .unwrap(),
            None
        );
        assert!(!studio.delete_customer("missing").await.unwrap());
        assert!(studio
            .set_event_status("missing", EventStatus::Shot)
            .await
            .unwrap()
            .is_none());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_service_send_and_purchase() {
        let studio = StudioService::new(InMemoryBackend::new());
        let customer = studio
            .add_customer(NewCustomer::new("A", "+91-9000000001"))
            .await
            .unwrap();

        studio
            .send_message(SendRequest::to_customer(
                &customer,
                MessageType::Custom,
                "x".repeat(320),
            ))
            .await
            .unwrap();
        studio.purchase_package(&CREDIT_PACKAGES[0]).await.unwrap();

        let data = studio.snapshot().await.unwrap();
        assert_eq!(data.whatsapp_credits, 598);
        assert_eq!(data.messages.len(), 1);
        assert_eq!(data.credit_transactions.len(), 1);
        assert!(studio.audit_credits().await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn test_service_save_failure_surfaces() {
        let studio = StudioService::new(InMemoryBackend::with_quota(64));

        let result = studio
            .add_customer(NewCustomer::new("A", "+91-9000000001"))
            .await;
        assert!(matches!(result, Err(Error::QuotaExceeded { .. })));
        assert!(studio.snapshot().await.unwrap().customers.is_empty());
    }

    #[tokio::test]
    async fn test_service_concurrent_mutations_are_not_lost() {
        let studio = StudioService::new(InMemoryBackend::new());
        let mut handles = vec![];

        for i in 0..20 {
            let studio = studio.clone();
            handles.push(tokio::spawn(async move {
                studio
                    .add_customer(NewCustomer::new(format!("Customer {}", i), "1"))
                    .await
                    .expect("Failed to add customer");
                studio
                    .purchase_credits(10, dec!(12))
                    .await
                    .expect("Failed to purchase");
            }));
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        let data = studio.snapshot().await.unwrap();
        assert_eq!(data.customers.len(), 20);
        assert_eq!(data.credit_transactions.len(), 20);
        assert_eq!(data.whatsapp_credits, 700);
    }

    #[tokio::test]
    async fn test_service_open_seeds_sample_data() {
        let config = StoreConfig::default().with_sample_data(true);
        let studio = StudioService::open(InMemoryBackend::new(), config)
            .await
            .unwrap();

        let data = studio.snapshot().await.unwrap();
        assert_eq!(data.customers.len(), 5);
        assert_eq!(data.events.len(), 3);
        assert!(!studio.initialize_sample_data().await.unwrap());
    }

    #[tokio::test]
    async fn test_service_reports() {
        let studio = StudioService::new(InMemoryBackend::new());
        studio.initialize_sample_data().await.unwrap();
        let data = studio.snapshot().await.unwrap();
        let wedding = &data.events[0];

        let payment = studio
            .add_payment(NewPayment::new(
                &wedding.id,
                dec!(45000),
                PaymentMethod::BankTransfer,
                date(2025, 2, 10),
            ))
            .await
            .unwrap();

        let stats = studio.dashboard_stats(date(2025, 2, 15)).await.unwrap();
        assert_eq!(stats.todays_events, 1);
        assert_eq!(stats.monthly_revenue, dec!(45000));
        assert_eq!(stats.pending_payments, dec!(12500));

        let summary = studio.payment_summary(date(2025, 2, 15)).await.unwrap();
        assert_eq!(summary.pending_events, 1);

        let invoice = studio.invoice(&payment.id).await.unwrap().unwrap();
        assert_eq!(invoice.customer, "Rajesh Kumar");
        assert!(studio.invoice("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_service_snapshot_restore() {
        let studio = StudioService::new(InMemoryBackend::new());
        studio.initialize_sample_data().await.unwrap();
        let snapshot = studio.export_snapshot().await.unwrap();
        let original = studio.snapshot().await.unwrap();

        let restored = StudioService::new(InMemoryBackend::new());
        restored.restore_snapshot(&snapshot).await.unwrap();
        assert_eq!(restored.snapshot().await.unwrap(), original);

        assert!(restored.restore_snapshot(b"garbage").await.is_err());
        assert_eq!(restored.snapshot().await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_service_clear() {
        let studio = StudioService::new(InMemoryBackend::new());
        studio.initialize_sample_data().await.unwrap();

        studio.clear().await.unwrap();
        assert_eq!(studio.snapshot().await.unwrap(), StudioData::default());
    }

    #[test]
    fn test_service_clone() {
        let studio = StudioService::new(InMemoryBackend::new());
        let clone = studio.clone();
        assert!(Arc::ptr_eq(&studio.inner, &clone.inner));
    }
}
