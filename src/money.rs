use std::fmt;

use rust_decimal::Decimal;

/// Number of minor units (e.g. pence) in one major unit (e.g. pounds).
pub const MINOR_UNIT_DIVISOR: i64 = 100;

/// A quantity of a single currency, in major units.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Units {
    pub quantity: Decimal,
    pub currency: String,
}

impl Units {
    pub fn new<S: Into<String>>(quantity: Decimal, currency: S) -> Self {
        Self {
            quantity,
            currency: currency.into(),
        }
    }

    /// Converts an amount given in minor units into major units. The division
    /// is exact.
    pub fn from_minor<S: Into<String>>(minor: Decimal, currency: S) -> Self {
        Self::new(minor / Decimal::from(MINOR_UNIT_DIVISOR), currency)
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let mut quantity = self.quantity.normalize();
        if quantity.scale() < 2 {
            // Increasing the scale never loses precision.
            quantity.rescale(2);
        }
        write!(f, "{} {}", self.currency, quantity)
    }
}
