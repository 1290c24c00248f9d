//! Test context for service-level tests.
//!
//! Wires a [`MedicinesService`] over the in-memory store so tests exercise
//! the full service surface without external infrastructure.

use std::sync::Arc;

use jiff::civil::Date;

use crate::domain::medicines::{
    MedicinesService,
    memory::InMemoryMedicineStore,
    models::Medicine,
    store::{MedicineStore, StoreError},
};

use super::helpers::{days_from_today, new_medicine};

pub(crate) struct TestContext {
    pub(crate) store: Arc<InMemoryMedicineStore>,
    pub(crate) medicines: MedicinesService,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let store = Arc::new(InMemoryMedicineStore::new());

        Self {
            medicines: MedicinesService::new(store.clone()),
            store,
        }
    }

    /// Seed a record with an arbitrary expiry date directly through the
    /// store, bypassing write-time validation. This is how a stored record
    /// legitimately comes to hold a past expiry date.
    pub(crate) async fn seed_with_expiry(
        &self,
        name: &str,
        stock_quantity: i32,
        expiry_date: Date,
    ) -> Result<Medicine, StoreError> {
        let mut medicine = new_medicine(name);
        medicine.stock_quantity = stock_quantity;
        medicine.expiry_date = expiry_date;

        self.store.insert(medicine).await
    }

    /// Seed a record that expired a month ago.
    pub(crate) async fn seed_expired(
        &self,
        name: &str,
        stock_quantity: i32,
    ) -> Result<Medicine, StoreError> {
        self.seed_with_expiry(name, stock_quantity, days_from_today(-30))
            .await
    }
}
