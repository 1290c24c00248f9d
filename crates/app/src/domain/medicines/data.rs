//! Medicine input and query types.

use jiff::civil::Date;
use rust_decimal::Decimal;

use super::models::Medicine;

/// New Medicine input. The store assigns the id and audit timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub expiry_date: Date,
    pub category: Option<String>,
    pub prescription_required: bool,
    pub batch_number: Option<String>,
}

/// Full-field update input. Every mutable field of the existing record is
/// overwritten; id and creation timestamp are untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicineUpdate {
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub expiry_date: Date,
    pub category: Option<String>,
    pub prescription_required: bool,
    pub batch_number: Option<String>,
}

/// Conjunctive search filter. An unset criterion matches every record, so
/// the default value matches the whole inventory.
///
/// Name matching is substring, case-insensitive; manufacturer and category
/// are exact, case-insensitive; price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub prescription_required: Option<bool>,
}

impl SearchCriteria {
    pub(crate) fn matches(&self, medicine: &Medicine) -> bool {
        self.name.as_deref().is_none_or(|fragment| {
            medicine
                .name
                .to_lowercase()
                .contains(&fragment.to_lowercase())
        }) && self
            .manufacturer
            .as_deref()
            .is_none_or(|manufacturer| {
                medicine.manufacturer.to_lowercase() == manufacturer.to_lowercase()
            })
            && self.category.as_deref().is_none_or(|category| {
                medicine
                    .category
                    .as_deref()
                    .is_some_and(|value| value.to_lowercase() == category.to_lowercase())
            })
            && self.min_price.is_none_or(|min| medicine.price >= min)
            && self.max_price.is_none_or(|max| medicine.price <= max)
            && self
                .prescription_required
                .is_none_or(|required| medicine.prescription_required == required)
    }
}

/// Sort order for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    StockQuantity,
    ExpiryDate,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Page request. Pages are zero-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of medicines plus the total record count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Medicine>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan, Zoned};

    use super::*;

    fn medicine(name: &str, manufacturer: &str, price: Decimal) -> Medicine {
        Medicine {
            id: 1,
            name: name.to_string(),
            description: None,
            manufacturer: manufacturer.to_string(),
            price,
            stock_quantity: 10,
            expiry_date: Zoned::now().date().checked_add(90.days()).unwrap(),
            category: Some("Analgesic".to_string()),
            prescription_required: false,
            batch_number: None,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn default_criteria_match_everything() {
        let medicine = medicine("Paracetamol", "Acme", Decimal::new(10_00, 2));

        assert!(SearchCriteria::default().matches(&medicine));
    }

    #[test]
    fn name_criterion_is_substring_and_case_insensitive() {
        let medicine = medicine("Paracetamol", "Acme", Decimal::new(10_00, 2));

        let matching = SearchCriteria {
            name: Some("CETA".to_string()),
            ..SearchCriteria::default()
        };
        let missing = SearchCriteria {
            name: Some("ibuprofen".to_string()),
            ..SearchCriteria::default()
        };

        assert!(matching.matches(&medicine));
        assert!(!missing.matches(&medicine));
    }

    #[test]
    fn manufacturer_criterion_is_exact_case_insensitive() {
        let medicine = medicine("Paracetamol", "Acme Pharma", Decimal::new(10_00, 2));

        let exact = SearchCriteria {
            manufacturer: Some("acme pharma".to_string()),
            ..SearchCriteria::default()
        };
        let partial = SearchCriteria {
            manufacturer: Some("acme".to_string()),
            ..SearchCriteria::default()
        };

        assert!(exact.matches(&medicine));
        assert!(!partial.matches(&medicine));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let medicine = medicine("Paracetamol", "Acme", Decimal::new(10_00, 2));

        let bounds = SearchCriteria {
            min_price: Some(Decimal::new(10_00, 2)),
            max_price: Some(Decimal::new(10_00, 2)),
            ..SearchCriteria::default()
        };

        assert!(bounds.matches(&medicine));
    }

    #[test]
    fn page_request_offset_multiplies_page_by_size() {
        let request = PageRequest {
            page: 3,
            size: 25,
            sort: Sort::default(),
        };

        assert_eq!(request.offset(), 75);
    }
}
