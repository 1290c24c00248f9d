//! In-memory medicine store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;

use super::{
    data::{NewMedicine, Page, PageRequest, SearchCriteria, Sort, SortDirection, SortField},
    models::{Medicine, MedicineId},
    store::{MedicineStore, StoreError},
};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<MedicineId, Medicine>,
    next_id: MedicineId,
}

/// In-memory keyed store.
///
/// Intended for tests and local development. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryMedicineStore {
    inner: RwLock<Inner>,
}

impl InMemoryMedicineStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| poisoned())
    }

    fn sorted(&self, sort: Sort) -> Result<Vec<Medicine>, StoreError> {
        let mut medicines: Vec<Medicine> = self.read()?.rows.values().cloned().collect();
        medicines.sort_by(|a, b| compare(sort, a, b));
        Ok(medicines)
    }

    fn filtered<F>(&self, predicate: F) -> Result<Vec<Medicine>, StoreError>
    where
        F: Fn(&Medicine) -> bool,
    {
        let mut medicines: Vec<Medicine> = self
            .read()?
            .rows
            .values()
            .filter(|medicine| predicate(medicine))
            .cloned()
            .collect();
        medicines.sort_by(|a, b| compare(Sort::default(), a, b));
        Ok(medicines)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".into())
}

fn compare(sort: Sort, a: &Medicine, b: &Medicine) -> Ordering {
    let ordering = match sort.field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Price => a.price.cmp(&b.price),
        SortField::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
        SortField::ExpiryDate => a.expiry_date.cmp(&b.expiry_date),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };

    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

#[async_trait]
impl MedicineStore for InMemoryMedicineStore {
    async fn insert(&self, medicine: NewMedicine) -> Result<Medicine, StoreError> {
        let mut inner = self.write()?;

        inner.next_id += 1;
        let now = Timestamp::now();

        let created = Medicine {
            id: inner.next_id,
            name: medicine.name,
            description: medicine.description,
            manufacturer: medicine.manufacturer,
            price: medicine.price,
            stock_quantity: medicine.stock_quantity,
            expiry_date: medicine.expiry_date,
            category: medicine.category,
            prescription_required: medicine.prescription_required,
            batch_number: medicine.batch_number,
            created_at: now,
            updated_at: now,
        };

        inner.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: MedicineId) -> Result<Option<Medicine>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Medicine>, StoreError> {
        let name = name.to_lowercase();

        Ok(self
            .read()?
            .rows
            .values()
            .find(|medicine| medicine.name.to_lowercase() == name)
            .cloned())
    }

    async fn find_by_batch_number(
        &self,
        batch_number: &str,
    ) -> Result<Option<Medicine>, StoreError> {
        Ok(self
            .read()?
            .rows
            .values()
            .find(|medicine| medicine.batch_number.as_deref() == Some(batch_number))
            .cloned())
    }

    async fn save(&self, medicine: Medicine) -> Result<Medicine, StoreError> {
        let mut saved = medicine;
        saved.updated_at = Timestamp::now();

        self.write()?.rows.insert(saved.id, saved.clone());

        Ok(saved)
    }

    async fn delete_by_id(&self, id: MedicineId) -> Result<u64, StoreError> {
        Ok(u64::from(self.write()?.rows.remove(&id).is_some()))
    }

    async fn delete_expired_before(&self, cutoff: Date) -> Result<u64, StoreError> {
        let mut inner = self.write()?;
        let before = inner.rows.len();

        inner.rows.retain(|_, medicine| medicine.expiry_date >= cutoff);

        Ok((before - inner.rows.len()) as u64)
    }

    async fn find_all(&self) -> Result<Vec<Medicine>, StoreError> {
        self.sorted(Sort::default())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page, StoreError> {
        let medicines = self.sorted(request.sort)?;
        let total = medicines.len() as u64;

        let items = medicines
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.size as usize)
            .collect();

        Ok(Page {
            items,
            page: request.page,
            size: request.size,
            total,
        })
    }

    async fn find_by_criteria(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Medicine>, StoreError> {
        self.filtered(|medicine| criteria.matches(medicine))
    }

    async fn find_expired_before(&self, cutoff: Date) -> Result<Vec<Medicine>, StoreError> {
        self.filtered(|medicine| medicine.expiry_date < cutoff)
    }

    async fn find_expiring_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Medicine>, StoreError> {
        self.filtered(|medicine| medicine.expiry_date >= start && medicine.expiry_date <= end)
    }

    async fn find_low_stock(&self, threshold: i32) -> Result<Vec<Medicine>, StoreError> {
        self.filtered(|medicine| medicine.stock_quantity < threshold)
    }

    async fn find_top_stocked(&self, limit: i64) -> Result<Vec<Medicine>, StoreError> {
        let mut medicines = self.sorted(Sort {
            field: SortField::StockQuantity,
            direction: SortDirection::Descending,
        })?;

        medicines.truncate(usize::try_from(limit).unwrap_or_default());

        Ok(medicines)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.rows.len() as u64)
    }

    async fn count_expired_before(&self, cutoff: Date) -> Result<u64, StoreError> {
        Ok(self.find_expired_before(cutoff).await?.len() as u64)
    }

    async fn count_low_stock(&self, threshold: i32) -> Result<u64, StoreError> {
        Ok(self.find_low_stock(threshold).await?.len() as u64)
    }

    async fn total_inventory_value(&self) -> Result<Decimal, StoreError> {
        Ok(self
            .read()?
            .rows
            .values()
            .map(|medicine| medicine.price * Decimal::from(medicine.stock_quantity))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use jiff::{ToSpan, Zoned};
    use testresult::TestResult;

    use super::*;

    fn new_medicine(name: &str, stock_quantity: i32) -> NewMedicine {
        NewMedicine {
            name: name.to_string(),
            description: None,
            manufacturer: "Acme Pharma".to_string(),
            price: Decimal::new(10_00, 2),
            stock_quantity,
            expiry_date: Zoned::now().date().checked_add(180.days()).unwrap(),
            category: None,
            prescription_required: false,
            batch_number: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() -> TestResult {
        let store = InMemoryMedicineStore::new();

        let first = store.insert(new_medicine("Paracetamol", 10)).await?;
        let second = store.insert(new_medicine("Ibuprofen", 10)).await?;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        Ok(())
    }

    #[tokio::test]
    async fn save_refreshes_updated_at_but_not_created_at() -> TestResult {
        let store = InMemoryMedicineStore::new();

        let created = store.insert(new_medicine("Paracetamol", 10)).await?;
        let saved = store.save(created.clone()).await?;

        assert_eq!(saved.created_at, created.created_at);
        assert!(saved.updated_at >= created.updated_at);

        Ok(())
    }

    #[tokio::test]
    async fn delete_by_id_reports_rows_affected() -> TestResult {
        let store = InMemoryMedicineStore::new();

        let created = store.insert(new_medicine("Paracetamol", 10)).await?;

        assert_eq!(store.delete_by_id(created.id).await?, 1);
        assert_eq!(store.delete_by_id(created.id).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn find_all_sorts_by_name_ascending() -> TestResult {
        let store = InMemoryMedicineStore::new();

        store.insert(new_medicine("ibuprofen", 10)).await?;
        store.insert(new_medicine("Aspirin", 10)).await?;
        store.insert(new_medicine("Paracetamol", 10)).await?;

        let names: Vec<String> = store
            .find_all()
            .await?
            .into_iter()
            .map(|medicine| medicine.name)
            .collect();

        assert_eq!(names, ["Aspirin", "ibuprofen", "Paracetamol"]);

        Ok(())
    }

    #[tokio::test]
    async fn find_page_slices_and_reports_total() -> TestResult {
        let store = InMemoryMedicineStore::new();

        for name in ["Aspirin", "Ibuprofen", "Paracetamol", "Zinc"] {
            store.insert(new_medicine(name, 10)).await?;
        }

        let page = store
            .find_page(PageRequest {
                page: 1,
                size: 2,
                sort: Sort::default(),
            })
            .await?;

        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "Paracetamol");
        assert_eq!(page.items[1].name, "Zinc");

        Ok(())
    }

    #[tokio::test]
    async fn find_page_sorts_by_requested_field() -> TestResult {
        let store = InMemoryMedicineStore::new();

        store.insert(new_medicine("Aspirin", 5)).await?;
        store.insert(new_medicine("Ibuprofen", 50)).await?;
        store.insert(new_medicine("Paracetamol", 20)).await?;

        let page = store
            .find_page(PageRequest {
                page: 0,
                size: 10,
                sort: Sort {
                    field: SortField::StockQuantity,
                    direction: SortDirection::Descending,
                },
            })
            .await?;

        let stock: Vec<i32> = page
            .items
            .iter()
            .map(|medicine| medicine.stock_quantity)
            .collect();

        assert_eq!(stock, [50, 20, 5]);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_name_ci_ignores_case() -> TestResult {
        let store = InMemoryMedicineStore::new();

        store.insert(new_medicine("Paracetamol", 10)).await?;

        assert!(store.find_by_name_ci("PARACETAMOL").await?.is_some());
        assert!(store.find_by_name_ci("ibuprofen").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn delete_expired_before_keeps_the_cutoff_day() -> TestResult {
        let store = InMemoryMedicineStore::new();
        let today = Zoned::now().date();

        let mut expired = new_medicine("Expired", 10);
        expired.expiry_date = today.checked_sub(1.day()).unwrap();
        let mut expiring_today = new_medicine("Expiring", 10);
        expiring_today.expiry_date = today;

        store.insert(expired).await?;
        store.insert(expiring_today).await?;

        assert_eq!(store.delete_expired_before(today).await?, 1);
        assert_eq!(store.count().await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn total_inventory_value_sums_price_times_stock() -> TestResult {
        let store = InMemoryMedicineStore::new();

        let mut first = new_medicine("Paracetamol", 40);
        first.price = Decimal::new(10_00, 2);
        let mut second = new_medicine("Ibuprofen", 5);
        second.price = Decimal::new(20_00, 2);

        store.insert(first).await?;
        store.insert(second).await?;

        assert_eq!(store.total_inventory_value().await?, Decimal::from(500));

        Ok(())
    }

    #[tokio::test]
    async fn total_inventory_value_is_zero_when_empty() -> TestResult {
        let store = InMemoryMedicineStore::new();

        assert_eq!(store.total_inventory_value().await?, Decimal::ZERO);

        Ok(())
    }
}
