//! Medicines service errors.

use thiserror::Error;

use super::store::StoreError;

/// A failed validation check, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub(crate) const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }

    pub(crate) const fn duplicate_name() -> Self {
        Self::new("name", "a medicine with this name already exists")
    }
}

#[derive(Debug, Error)]
pub enum MedicinesServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("medicine not found")]
    NotFound,

    #[error("cannot sell expired medicine: {name}")]
    ExpiredMedicine { name: String },

    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for MedicinesServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::DuplicateName => Self::Validation(ValidationError::duplicate_name()),
            backend @ StoreError::Backend(_) => Self::Store(backend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let error = MedicinesServiceError::from(StoreError::NotFound);

        assert!(matches!(error, MedicinesServiceError::NotFound));
    }

    #[test]
    fn store_duplicate_name_maps_to_validation() {
        let error = MedicinesServiceError::from(StoreError::DuplicateName);

        assert!(matches!(
            error,
            MedicinesServiceError::Validation(ValidationError { field: "name", .. })
        ));
    }
}
