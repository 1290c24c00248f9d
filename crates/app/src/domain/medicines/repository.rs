//! PostgreSQL medicine store.

use async_trait::async_trait;
use jiff::civil::Date;
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use rust_decimal::Decimal;
use sqlx::{
    FromRow, Postgres, Row,
    error::{DatabaseError, ErrorKind},
    postgres::PgRow,
    query, query_as, query_scalar,
};

use crate::database::Db;

use super::{
    data::{NewMedicine, Page, PageRequest, SearchCriteria, SortDirection, SortField},
    models::{Medicine, MedicineId},
    store::{MedicineStore, StoreError},
};

const INSERT_MEDICINE_SQL: &str = include_str!("sql/insert_medicine.sql");
const GET_MEDICINE_SQL: &str = include_str!("sql/get_medicine.sql");
const FIND_BY_NAME_SQL: &str = include_str!("sql/find_by_name.sql");
const FIND_BY_BATCH_NUMBER_SQL: &str = include_str!("sql/find_by_batch_number.sql");
const SAVE_MEDICINE_SQL: &str = include_str!("sql/save_medicine.sql");
const DELETE_MEDICINE_SQL: &str = include_str!("sql/delete_medicine.sql");
const DELETE_EXPIRED_SQL: &str = include_str!("sql/delete_expired.sql");
const LIST_MEDICINES_SQL: &str = include_str!("sql/list_medicines.sql");
const PAGE_MEDICINES_SQL: &str = include_str!("sql/page_medicines.sql");
const SEARCH_MEDICINES_SQL: &str = include_str!("sql/search_medicines.sql");
const EXPIRED_MEDICINES_SQL: &str = include_str!("sql/expired_medicines.sql");
const EXPIRING_BETWEEN_SQL: &str = include_str!("sql/expiring_between.sql");
const LOW_STOCK_MEDICINES_SQL: &str = include_str!("sql/low_stock_medicines.sql");
const TOP_STOCKED_MEDICINES_SQL: &str = include_str!("sql/top_stocked_medicines.sql");
const COUNT_MEDICINES_SQL: &str = include_str!("sql/count_medicines.sql");
const COUNT_EXPIRED_SQL: &str = include_str!("sql/count_expired.sql");
const COUNT_LOW_STOCK_SQL: &str = include_str!("sql/count_low_stock.sql");
const TOTAL_INVENTORY_VALUE_SQL: &str = include_str!("sql/total_inventory_value.sql");

/// PostgreSQL-backed [`MedicineStore`].
#[derive(Debug, Clone)]
pub struct PgMedicineStore {
    db: Db,
}

impl PgMedicineStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MedicineStore for PgMedicineStore {
    async fn insert(&self, medicine: NewMedicine) -> Result<Medicine, StoreError> {
        let created = query_as::<Postgres, Medicine>(INSERT_MEDICINE_SQL)
            .bind(medicine.name)
            .bind(medicine.description)
            .bind(medicine.manufacturer)
            .bind(medicine.price)
            .bind(medicine.stock_quantity)
            .bind(SqlxDate::from(medicine.expiry_date))
            .bind(medicine.category)
            .bind(medicine.prescription_required)
            .bind(medicine.batch_number)
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: MedicineId) -> Result<Option<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(GET_MEDICINE_SQL)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(FIND_BY_NAME_SQL)
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn find_by_batch_number(
        &self,
        batch_number: &str,
    ) -> Result<Option<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(FIND_BY_BATCH_NUMBER_SQL)
            .bind(batch_number)
            .fetch_optional(self.db.pool())
            .await?)
    }

    async fn save(&self, medicine: Medicine) -> Result<Medicine, StoreError> {
        let saved = query_as::<Postgres, Medicine>(SAVE_MEDICINE_SQL)
            .bind(medicine.id)
            .bind(medicine.name)
            .bind(medicine.description)
            .bind(medicine.manufacturer)
            .bind(medicine.price)
            .bind(medicine.stock_quantity)
            .bind(SqlxDate::from(medicine.expiry_date))
            .bind(medicine.category)
            .bind(medicine.prescription_required)
            .bind(medicine.batch_number)
            .fetch_one(self.db.pool())
            .await?;

        Ok(saved)
    }

    async fn delete_by_id(&self, id: MedicineId) -> Result<u64, StoreError> {
        let rows_affected = query(DELETE_MEDICINE_SQL)
            .bind(id)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_expired_before(&self, cutoff: Date) -> Result<u64, StoreError> {
        let rows_affected = query(DELETE_EXPIRED_SQL)
            .bind(SqlxDate::from(cutoff))
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn find_all(&self) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(LIST_MEDICINES_SQL)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page, StoreError> {
        let mut tx = self.db.begin().await?;

        let total: i64 = query_scalar(COUNT_MEDICINES_SQL).fetch_one(&mut *tx).await?;

        let sql = format!(
            "{PAGE_MEDICINES_SQL} ORDER BY {} {} LIMIT $1 OFFSET $2",
            sort_column(request.sort.field),
            direction_sql(request.sort.direction),
        );

        let items = query_as::<Postgres, Medicine>(&sql)
            .bind(i64::from(request.size))
            .bind(offset_i64(request.offset())?)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Page {
            items,
            page: request.page,
            size: request.size,
            total: count_u64(total)?,
        })
    }

    async fn find_by_criteria(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(SEARCH_MEDICINES_SQL)
            .bind(criteria.name.as_deref())
            .bind(criteria.manufacturer.as_deref())
            .bind(criteria.category.as_deref())
            .bind(criteria.min_price)
            .bind(criteria.max_price)
            .bind(criteria.prescription_required)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_expired_before(&self, cutoff: Date) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(EXPIRED_MEDICINES_SQL)
            .bind(SqlxDate::from(cutoff))
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_expiring_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(EXPIRING_BETWEEN_SQL)
            .bind(SqlxDate::from(start))
            .bind(SqlxDate::from(end))
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_low_stock(&self, threshold: i32) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(LOW_STOCK_MEDICINES_SQL)
            .bind(threshold)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn find_top_stocked(&self, limit: i64) -> Result<Vec<Medicine>, StoreError> {
        Ok(query_as::<Postgres, Medicine>(TOP_STOCKED_MEDICINES_SQL)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = query_scalar(COUNT_MEDICINES_SQL)
            .fetch_one(self.db.pool())
            .await?;

        count_u64(count)
    }

    async fn count_expired_before(&self, cutoff: Date) -> Result<u64, StoreError> {
        let count: i64 = query_scalar(COUNT_EXPIRED_SQL)
            .bind(SqlxDate::from(cutoff))
            .fetch_one(self.db.pool())
            .await?;

        count_u64(count)
    }

    async fn count_low_stock(&self, threshold: i32) -> Result<u64, StoreError> {
        let count: i64 = query_scalar(COUNT_LOW_STOCK_SQL)
            .bind(threshold)
            .fetch_one(self.db.pool())
            .await?;

        count_u64(count)
    }

    async fn total_inventory_value(&self) -> Result<Decimal, StoreError> {
        Ok(query_scalar(TOTAL_INVENTORY_VALUE_SQL)
            .fetch_one(self.db.pool())
            .await?)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateName,
            _ => Self::Backend(Box::new(error)),
        }
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Name => "name",
        SortField::Price => "price",
        SortField::StockQuantity => "stock_quantity",
        SortField::ExpiryDate => "expiry_date",
        SortField::CreatedAt => "created_at",
    }
}

fn direction_sql(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

fn count_u64(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count).map_err(|error| StoreError::Backend(Box::new(error)))
}

fn offset_i64(offset: u64) -> Result<i64, StoreError> {
    i64::try_from(offset).map_err(|error| StoreError::Backend(Box::new(error)))
}

impl<'r> FromRow<'r, PgRow> for Medicine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("medicine_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            manufacturer: row.try_get("manufacturer")?,
            price: row.try_get("price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            expiry_date: row.try_get::<SqlxDate, _>("expiry_date")?.to_jiff(),
            category: row.try_get("category")?,
            prescription_required: row.try_get("prescription_required")?,
            batch_number: row.try_get("batch_number")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
