//! Value objects for the storefront domain

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object. The store trades in a single currency; amounts
/// accumulate at full precision and are rounded to two decimal places only
/// at presentation boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_negative(&self) -> bool { self.0.is_sign_negative() }
    pub fn add(&self, other: Money) -> Money { Money(self.0 + other.0) }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0 * Decimal::from(qty)) }
    /// Two-decimal presentation rounding.
    pub fn rounded(&self) -> Decimal { self.0.round_dp(2) }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self { Self(amount) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2}", self.0) }
}

/// Percentage discount off a product's base price. Valid range is 0-100;
/// out-of-range input is rejected at construction and at deserialization,
/// never clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sale(u8);

impl Sale {
    pub const NONE: Sale = Sale(0);

    pub fn new(percent: u8) -> Result<Self, SaleError> {
        if percent > 100 { return Err(SaleError::OutOfRange(percent)); }
        Ok(Self(percent))
    }
    pub fn percent(&self) -> u8 { self.0 }
    pub fn is_active(&self) -> bool { self.0 > 0 }
}

impl TryFrom<u8> for Sale {
    type Error = SaleError;
    fn try_from(percent: u8) -> Result<Self, Self::Error> { Self::new(percent) }
}

impl From<Sale> for u8 {
    fn from(sale: Sale) -> u8 { sale.0 }
}

#[derive(Debug, Clone)] pub enum SaleError { OutOfRange(u8) }
impl std::error::Error for SaleError {}
impl fmt::Display for SaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::OutOfRange(p) => write!(f, "sale percent out of range: {}", p) }
    }
}

/// Human-readable order identifier, e.g. `ORDER-8F3KQ0XW12`.
///
/// A fresh code is a random base-36 suffix; the order service checks each
/// candidate against the collection before use, so codes are unique even
/// though generation alone is only collision-resistant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    const PREFIX: &'static str = "ORDER-";
    const SUFFIX_LEN: usize = 10;
    const ALPHABET: &'static [u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())] as char)
            .collect();
        Self(format!("{}{}", Self::PREFIX, suffix))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_range() {
        assert_eq!(Sale::new(0).unwrap().percent(), 0);
        assert_eq!(Sale::new(100).unwrap().percent(), 100);
        assert!(Sale::new(101).is_err());
        assert!(!Sale::NONE.is_active());
    }

    #[test]
    fn test_sale_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Sale>("30").is_ok());
        assert!(serde_json::from_str::<Sale>("150").is_err());
    }

    #[test]
    fn test_money_presentation() {
        assert_eq!(Money::new(Decimal::from(230)).to_string(), "230.00");
        assert_eq!(Money::new(Decimal::new(23006, 2)).to_string(), "230.06");

        let m = Money::new(Decimal::new(230055, 3)); // 230.055
        assert_eq!(m.rounded(), Decimal::new(23006, 2));
        assert_eq!(m.amount(), Decimal::new(230055, 3)); // unrounded inside
    }

    #[test]
    fn test_order_code_shape() {
        let code = OrderCode::generate();
        let suffix = code.as_str().strip_prefix("ORDER-").unwrap();
        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(code, OrderCode::generate());
    }
}
