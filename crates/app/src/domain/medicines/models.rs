//! Medicine Model

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::Serialize;

/// Medicine identifier, assigned by the store on creation.
pub type MedicineId = i64;

/// Medicine Model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub description: Option<String>,
    pub manufacturer: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub expiry_date: Date,
    pub category: Option<String>,
    pub prescription_required: bool,
    pub batch_number: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Medicine {
    /// Whether the medicine was past its expiry date on `today`.
    #[must_use]
    pub fn is_expired(&self, today: Date) -> bool {
        today > self.expiry_date
    }

    /// Whether the stock level is at or below `threshold`.
    #[must_use]
    pub fn is_low_stock(&self, threshold: i32) -> bool {
        self.stock_quantity <= threshold
    }

    /// Apply a signed stock delta. A result below zero clamps to zero.
    pub fn adjust_stock(&mut self, delta: i32) {
        self.stock_quantity = self.stock_quantity.saturating_add(delta).max(0);
    }
}

#[cfg(test)]
mod tests {
    use jiff::{ToSpan, Zoned};
    use rust_decimal::Decimal;

    use super::*;

    fn medicine(stock_quantity: i32, expiry_date: Date) -> Medicine {
        Medicine {
            id: 1,
            name: "Paracetamol".to_string(),
            description: None,
            manufacturer: "Acme Pharma".to_string(),
            price: Decimal::new(10_00, 2),
            stock_quantity,
            expiry_date,
            category: None,
            prescription_required: false,
            batch_number: None,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn adjust_stock_applies_positive_and_negative_deltas() {
        let today = Zoned::now().date();
        let mut medicine = medicine(50, today.checked_add(180.days()).unwrap());

        medicine.adjust_stock(25);
        assert_eq!(medicine.stock_quantity, 75);

        medicine.adjust_stock(-30);
        assert_eq!(medicine.stock_quantity, 45);
    }

    #[test]
    fn adjust_stock_clamps_below_zero_to_zero() {
        let today = Zoned::now().date();
        let mut medicine = medicine(10, today.checked_add(180.days()).unwrap());

        medicine.adjust_stock(-25);

        assert_eq!(medicine.stock_quantity, 0);
    }

    #[test]
    fn is_expired_is_strict_on_the_expiry_day() {
        let today = Zoned::now().date();
        let medicine = medicine(10, today);

        // Expiring today is not yet expired; only a past date is.
        assert!(!medicine.is_expired(today));
        assert!(medicine.is_expired(today.checked_add(1.day()).unwrap()));
    }

    #[test]
    fn is_low_stock_includes_the_threshold_itself() {
        let today = Zoned::now().date();
        let expiry = today.checked_add(180.days()).unwrap();

        assert!(medicine(5, expiry).is_low_stock(10));
        assert!(medicine(10, expiry).is_low_stock(10));
        assert!(!medicine(11, expiry).is_low_stock(10));
    }
}
