//! Medicines service.
//!
//! Holds every inventory business rule: field validation, case-insensitive
//! name uniqueness, stock arithmetic, the guarded sale transition and the
//! derived reports. The service is a stateless façade over a
//! [`MedicineStore`]; all durable state lives behind that contract.

use std::sync::Arc;

use jiff::{ToSpan, Zoned, civil::Date};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::{
    data::{MedicineUpdate, NewMedicine, Page, PageRequest, SearchCriteria},
    errors::{MedicinesServiceError, ValidationError},
    models::{Medicine, MedicineId},
    store::MedicineStore,
};

/// Threshold used by [`MedicinesService::inventory_summary`] callers that
/// have no better default.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

const TOP_STOCKED_LIMIT: i64 = 10;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_MANUFACTURER_LEN: usize = 100;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_BATCH_NUMBER_LEN: usize = 20;

/// Aggregate figures for the whole inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_medicines: u64,
    pub expired: u64,
    pub low_stock: u64,
    pub total_value: Decimal,
}

#[derive(Clone)]
pub struct MedicinesService {
    store: Arc<dyn MedicineStore>,
}

impl MedicinesService {
    #[must_use]
    pub fn new(store: Arc<dyn MedicineStore>) -> Self {
        Self { store }
    }

    /// Validates and inserts a new medicine. The store assigns the id and
    /// audit timestamps.
    #[tracing::instrument(name = "medicines.service.create", skip(self, medicine), err)]
    pub async fn create_medicine(
        &self,
        medicine: NewMedicine,
    ) -> Result<Medicine, MedicinesServiceError> {
        validate(&Candidate::from(&medicine), today())?;
        self.ensure_unique_name(&medicine.name, None).await?;

        let created = self.store.insert(medicine).await?;

        debug!(id = created.id, name = %created.name, "created medicine");

        Ok(created)
    }

    /// Fetches the record, overwrites every mutable field from `update`,
    /// re-validates the merged result and persists it. The store refreshes
    /// `updated_at`.
    pub async fn update_medicine(
        &self,
        id: MedicineId,
        update: MedicineUpdate,
    ) -> Result<Medicine, MedicinesServiceError> {
        let mut existing = self.get_medicine(id).await?;

        existing.name = update.name;
        existing.description = update.description;
        existing.manufacturer = update.manufacturer;
        existing.price = update.price;
        existing.stock_quantity = update.stock_quantity;
        existing.expiry_date = update.expiry_date;
        existing.category = update.category;
        existing.prescription_required = update.prescription_required;
        existing.batch_number = update.batch_number;

        validate(&Candidate::from(&existing), today())?;
        self.ensure_unique_name(&existing.name, Some(id)).await?;

        Ok(self.store.save(existing).await?)
    }

    /// Retrieve a single medicine.
    pub async fn get_medicine(&self, id: MedicineId) -> Result<Medicine, MedicinesServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(MedicinesServiceError::NotFound)
    }

    /// Retrieves all medicines, sorted by name ascending.
    pub async fn list_medicines(&self) -> Result<Vec<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// Retrieves one page of medicines with the caller's sort order.
    pub async fn list_medicines_paged(
        &self,
        request: PageRequest,
    ) -> Result<Page, MedicinesServiceError> {
        Ok(self.store.find_page(request).await?)
    }

    /// Deletes a medicine by id.
    pub async fn delete_medicine(&self, id: MedicineId) -> Result<(), MedicinesServiceError> {
        let rows_affected = self.store.delete_by_id(id).await?;

        if rows_affected == 0 {
            return Err(MedicinesServiceError::NotFound);
        }

        Ok(())
    }

    /// Exact name lookup, case-insensitive.
    pub async fn find_medicine_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_by_name_ci(name).await?)
    }

    /// Substring name search, case-insensitive.
    pub async fn search_medicines_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            name: Some(fragment.to_string()),
            ..SearchCriteria::default()
        })
        .await
    }

    pub async fn medicines_by_manufacturer(
        &self,
        manufacturer: &str,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            manufacturer: Some(manufacturer.to_string()),
            ..SearchCriteria::default()
        })
        .await
    }

    pub async fn medicines_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            category: Some(category.to_string()),
            ..SearchCriteria::default()
        })
        .await
    }

    /// Medicines priced within `[min, max]`, both inclusive.
    pub async fn medicines_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            min_price: Some(min),
            max_price: Some(max),
            ..SearchCriteria::default()
        })
        .await
    }

    pub async fn prescription_medicines(&self) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            prescription_required: Some(true),
            ..SearchCriteria::default()
        })
        .await
    }

    pub async fn over_the_counter_medicines(
        &self,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        self.search_medicines(&SearchCriteria {
            prescription_required: Some(false),
            ..SearchCriteria::default()
        })
        .await
    }

    /// Conjunctive criteria search. Unset criteria match every record, so
    /// the default criteria return the whole inventory.
    pub async fn search_medicines(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_by_criteria(criteria).await?)
    }

    pub async fn find_medicine_by_batch_number(
        &self,
        batch_number: &str,
    ) -> Result<Option<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_by_batch_number(batch_number).await?)
    }

    /// Applies a signed stock delta. A result below zero clamps to zero
    /// rather than failing; full validation does not run here.
    pub async fn adjust_stock(
        &self,
        id: MedicineId,
        delta: i32,
    ) -> Result<Medicine, MedicinesServiceError> {
        let mut medicine = self.get_medicine(id).await?;

        medicine.adjust_stock(delta);

        Ok(self.store.save(medicine).await?)
    }

    pub async fn increase_stock(
        &self,
        id: MedicineId,
        quantity: i32,
    ) -> Result<Medicine, MedicinesServiceError> {
        self.adjust_stock(id, quantity).await
    }

    pub async fn reduce_stock(
        &self,
        id: MedicineId,
        quantity: i32,
    ) -> Result<Medicine, MedicinesServiceError> {
        self.adjust_stock(id, quantity.saturating_neg()).await
    }

    /// Processes a sale of `quantity` units.
    ///
    /// Guards run in order with no mutation on failure: a medicine whose
    /// expiry date is on or before today cannot be sold, and a request
    /// exceeding the available stock is rejected outright. A sale never
    /// clamps the way [`Self::adjust_stock`] does.
    #[tracing::instrument(name = "medicines.service.process_sale", skip(self), err)]
    pub async fn process_sale(
        &self,
        id: MedicineId,
        quantity: i32,
    ) -> Result<Medicine, MedicinesServiceError> {
        let mut medicine = self.get_medicine(id).await?;

        if medicine.expiry_date <= today() {
            return Err(MedicinesServiceError::ExpiredMedicine {
                name: medicine.name,
            });
        }

        if quantity > medicine.stock_quantity {
            return Err(MedicinesServiceError::InsufficientStock {
                available: medicine.stock_quantity,
                requested: quantity,
            });
        }

        medicine.adjust_stock(quantity.saturating_neg());

        let sold = self.store.save(medicine).await?;

        debug!(id, quantity, stock = sold.stock_quantity, "processed sale");

        Ok(sold)
    }

    /// Whether `quantity` units could currently be sold; mirrors the
    /// [`Self::process_sale`] guards without mutating anything.
    pub async fn is_available(
        &self,
        id: MedicineId,
        quantity: i32,
    ) -> Result<bool, MedicinesServiceError> {
        let medicine = self.get_medicine(id).await?;

        Ok(medicine.expiry_date > today() && medicine.stock_quantity >= quantity)
    }

    /// Medicines whose expiry date is strictly before today.
    pub async fn expired_medicines(&self) -> Result<Vec<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_expired_before(today()).await?)
    }

    /// Medicines expiring within `[today, today + days]`, both inclusive.
    pub async fn medicines_expiring_within(
        &self,
        days: i32,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        let today = today();
        let end = today
            .checked_add(days.days())
            .map_err(|_| ValidationError::new("days", "expiry window is out of range"))?;

        Ok(self.store.find_expiring_between(today, end).await?)
    }

    /// Deletes every record whose expiry date is before today, returning how
    /// many were removed. The count is taken from the matching set before
    /// deletion so the two always agree.
    #[tracing::instrument(name = "medicines.service.purge_expired", skip(self), err)]
    pub async fn purge_expired(&self) -> Result<u64, MedicinesServiceError> {
        let cutoff = today();

        let expired = self.store.find_expired_before(cutoff).await?;
        let count = expired.len() as u64;

        self.store.delete_expired_before(cutoff).await?;

        debug!(count, "purged expired medicines");

        Ok(count)
    }

    /// Medicines with stock strictly below `threshold`.
    pub async fn low_stock_medicines(
        &self,
        threshold: i32,
    ) -> Result<Vec<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_low_stock(threshold).await?)
    }

    pub async fn medicine_count(&self) -> Result<u64, MedicinesServiceError> {
        Ok(self.store.count().await?)
    }

    pub async fn expired_count(&self) -> Result<u64, MedicinesServiceError> {
        Ok(self.store.count_expired_before(today()).await?)
    }

    pub async fn low_stock_count(&self, threshold: i32) -> Result<u64, MedicinesServiceError> {
        Ok(self.store.count_low_stock(threshold).await?)
    }

    /// Sum of price × stock quantity over the whole inventory; zero when the
    /// inventory is empty.
    pub async fn total_inventory_value(&self) -> Result<Decimal, MedicinesServiceError> {
        Ok(self.store.total_inventory_value().await?)
    }

    /// The ten medicines with the highest stock quantity.
    pub async fn top_stocked_medicines(&self) -> Result<Vec<Medicine>, MedicinesServiceError> {
        Ok(self.store.find_top_stocked(TOP_STOCKED_LIMIT).await?)
    }

    pub async fn medicine_exists(&self, id: MedicineId) -> Result<bool, MedicinesServiceError> {
        Ok(self.store.find_by_id(id).await?.is_some())
    }

    pub async fn medicine_exists_by_name(
        &self,
        name: &str,
    ) -> Result<bool, MedicinesServiceError> {
        Ok(self.store.find_by_name_ci(name).await?.is_some())
    }

    /// Aggregate dashboard figures: totals, expired and low-stock counts and
    /// the inventory value.
    pub async fn inventory_summary(
        &self,
        low_stock_threshold: i32,
    ) -> Result<InventorySummary, MedicinesServiceError> {
        Ok(InventorySummary {
            total_medicines: self.medicine_count().await?,
            expired: self.expired_count().await?,
            low_stock: self.low_stock_count(low_stock_threshold).await?,
            total_value: self.total_inventory_value().await?,
        })
    }

    async fn ensure_unique_name(
        &self,
        name: &str,
        current: Option<MedicineId>,
    ) -> Result<(), MedicinesServiceError> {
        if let Some(existing) = self.store.find_by_name_ci(name).await? {
            if current != Some(existing.id) {
                return Err(ValidationError::duplicate_name().into());
            }
        }

        Ok(())
    }
}

fn today() -> Date {
    Zoned::now().date()
}

/// Borrowed view of the fields the validation checks run over, so create and
/// update share one ordered check list.
struct Candidate<'a> {
    name: &'a str,
    description: Option<&'a str>,
    manufacturer: &'a str,
    price: Decimal,
    stock_quantity: i32,
    expiry_date: Date,
    category: Option<&'a str>,
    batch_number: Option<&'a str>,
}

impl<'a> From<&'a NewMedicine> for Candidate<'a> {
    fn from(medicine: &'a NewMedicine) -> Self {
        Self {
            name: &medicine.name,
            description: medicine.description.as_deref(),
            manufacturer: &medicine.manufacturer,
            price: medicine.price,
            stock_quantity: medicine.stock_quantity,
            expiry_date: medicine.expiry_date,
            category: medicine.category.as_deref(),
            batch_number: medicine.batch_number.as_deref(),
        }
    }
}

impl<'a> From<&'a Medicine> for Candidate<'a> {
    fn from(medicine: &'a Medicine) -> Self {
        Self {
            name: &medicine.name,
            description: medicine.description.as_deref(),
            manufacturer: &medicine.manufacturer,
            price: medicine.price,
            stock_quantity: medicine.stock_quantity,
            expiry_date: medicine.expiry_date,
            category: medicine.category.as_deref(),
            batch_number: medicine.batch_number.as_deref(),
        }
    }
}

/// Ordered fail-fast field checks; the first failure wins. Name uniqueness
/// is checked separately, after these, because it needs the store.
fn validate(candidate: &Candidate<'_>, today: Date) -> Result<(), ValidationError> {
    if candidate.name.trim().is_empty() {
        return Err(ValidationError::new("name", "medicine name is required"));
    }

    if candidate.price <= Decimal::ZERO {
        return Err(ValidationError::new(
            "price",
            "price must be greater than zero",
        ));
    }

    if candidate.stock_quantity < 0 {
        return Err(ValidationError::new(
            "stock_quantity",
            "stock quantity cannot be negative",
        ));
    }

    if candidate.expiry_date <= today {
        return Err(ValidationError::new(
            "expiry_date",
            "expiry date must be in the future",
        ));
    }

    if candidate.name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            "medicine name cannot exceed 100 characters",
        ));
    }

    if candidate.manufacturer.trim().is_empty() {
        return Err(ValidationError::new(
            "manufacturer",
            "manufacturer is required",
        ));
    }

    if candidate.manufacturer.chars().count() > MAX_MANUFACTURER_LEN {
        return Err(ValidationError::new(
            "manufacturer",
            "manufacturer name cannot exceed 100 characters",
        ));
    }

    if candidate
        .description
        .is_some_and(|description| description.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(ValidationError::new(
            "description",
            "description cannot exceed 500 characters",
        ));
    }

    if candidate
        .category
        .is_some_and(|category| category.chars().count() > MAX_CATEGORY_LEN)
    {
        return Err(ValidationError::new(
            "category",
            "category cannot exceed 50 characters",
        ));
    }

    if candidate
        .batch_number
        .is_some_and(|batch_number| batch_number.chars().count() > MAX_BATCH_NUMBER_LEN)
    {
        return Err(ValidationError::new(
            "batch_number",
            "batch number cannot exceed 20 characters",
        ));
    }

    if candidate.price.scale() > 2 {
        return Err(ValidationError::new(
            "price",
            "price cannot have more than two decimal places",
        ));
    }

    Ok(())
}
