//! Test helpers.

use jiff::{ToSpan, Zoned, civil::Date};
use rust_decimal::Decimal;

use crate::domain::medicines::data::NewMedicine;

/// Today's date shifted by `days` (negative values land in the past).
pub(crate) fn days_from_today(days: i32) -> Date {
    Zoned::now()
        .date()
        .checked_add(days.days())
        .expect("date within calendar range")
}

/// A valid medicine input with the given name and sensible defaults.
pub(crate) fn new_medicine(name: &str) -> NewMedicine {
    NewMedicine {
        name: name.to_string(),
        description: None,
        manufacturer: "Acme Pharma".to_string(),
        price: Decimal::new(10_00, 2),
        stock_quantity: 50,
        expiry_date: days_from_today(180),
        category: None,
        prescription_required: false,
        batch_number: None,
    }
}
