//! Storage contract for medicines.

use async_trait::async_trait;
use jiff::civil::Date;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{
    data::{NewMedicine, Page, PageRequest, SearchCriteria},
    models::{Medicine, MedicineId},
};

/// Errors surfaced by a [`MedicineStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate medicine name")]
    DuplicateName,

    #[error("storage backend failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Durable keyed storage of medicines.
///
/// Any persistence engine satisfying this contract can back the service;
/// [`PgMedicineStore`](super::PgMedicineStore) and
/// [`InMemoryMedicineStore`](super::memory::InMemoryMedicineStore) are
/// provided.
#[automock]
#[async_trait]
pub trait MedicineStore: Send + Sync {
    /// Insert a new record. The store assigns the id and audit timestamps.
    async fn insert(&self, medicine: NewMedicine) -> Result<Medicine, StoreError>;

    async fn find_by_id(&self, id: MedicineId) -> Result<Option<Medicine>, StoreError>;

    /// Exact name lookup, case-insensitive.
    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Medicine>, StoreError>;

    async fn find_by_batch_number(
        &self,
        batch_number: &str,
    ) -> Result<Option<Medicine>, StoreError>;

    /// Persist every mutable field of an existing record and refresh its
    /// `updated_at` timestamp.
    async fn save(&self, medicine: Medicine) -> Result<Medicine, StoreError>;

    /// Returns the number of rows removed (zero when the id is unknown).
    async fn delete_by_id(&self, id: MedicineId) -> Result<u64, StoreError>;

    /// Delete every record whose expiry date is before `cutoff`; returns the
    /// number of rows removed.
    async fn delete_expired_before(&self, cutoff: Date) -> Result<u64, StoreError>;

    /// All records, sorted by name ascending.
    async fn find_all(&self) -> Result<Vec<Medicine>, StoreError>;

    async fn find_page(&self, request: PageRequest) -> Result<Page, StoreError>;

    async fn find_by_criteria(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Medicine>, StoreError>;

    async fn find_expired_before(&self, cutoff: Date) -> Result<Vec<Medicine>, StoreError>;

    /// Records whose expiry date lies in `[start, end]`, both inclusive.
    async fn find_expiring_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Medicine>, StoreError>;

    /// Records with stock strictly below `threshold`.
    async fn find_low_stock(&self, threshold: i32) -> Result<Vec<Medicine>, StoreError>;

    /// The `limit` records with the highest stock quantity, descending.
    async fn find_top_stocked(&self, limit: i64) -> Result<Vec<Medicine>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn count_expired_before(&self, cutoff: Date) -> Result<u64, StoreError>;

    async fn count_low_stock(&self, threshold: i32) -> Result<u64, StoreError>;

    /// Sum of price × stock quantity over all records; zero when empty.
    async fn total_inventory_value(&self) -> Result<Decimal, StoreError>;
}
