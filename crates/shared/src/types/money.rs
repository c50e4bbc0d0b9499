//! Decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere and are stored as `NUMERIC(19,4)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};

/// Number of fractional digits kept for money values.
pub const AMOUNT_SCALE: u32 = 4;

/// Formats an amount with four decimal places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.4}", amount.round_dp(AMOUNT_SCALE))
}

/// Whether `amount` can be stored without rounding.
///
/// Trailing zeros do not count, so `1.50000` fits but `1.00005` does not.
#[must_use]
pub fn fits_amount_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE
}

/// Serde adapter: writes `Decimal` as a four-place string, reads strings or numbers.
pub mod fixed4 {
    use super::{Decimal, Deserialize, Deserializer, Serializer, format_amount};

    /// Serializes as a four-place string.
    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_amount(*amount))
    }

    /// Deserializes from a JSON string or number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Serialize;

    #[test]
    fn test_format_amount_pads_and_rounds() {
        assert_eq!(format_amount(dec!(1500)), "1500.0000");
        assert_eq!(format_amount(dec!(-500.5)), "-500.5000");
        assert_eq!(format_amount(dec!(0.12345)), "0.1234");
        assert_eq!(format_amount(Decimal::ZERO), "0.0000");
    }

    #[test]
    fn test_fits_amount_scale() {
        assert!(fits_amount_scale(dec!(500.2500)));
        assert!(fits_amount_scale(dec!(1.50000)));
        assert!(fits_amount_scale(dec!(-0.0001)));
        assert!(!fits_amount_scale(dec!(1.00005)));
        assert!(!fits_amount_scale(dec!(0.00001)));
    }

    #[derive(Serialize, Deserialize)]
    struct Row {
        #[serde(with = "fixed4")]
        amount: Decimal,
    }

    #[test]
    fn test_fixed4_accepts_string_and_number() {
        let from_str: Row = serde_json::from_str(r#"{"amount":"250.10"}"#).unwrap();
        assert_eq!(from_str.amount, dec!(250.10));

        let from_int: Row = serde_json::from_str(r#"{"amount":300}"#).unwrap();
        assert_eq!(from_int.amount, dec!(300));

        assert!(serde_json::from_str::<Row>(r#"{"amount":"ten"}"#).is_err());

        let json = serde_json::to_string(&Row { amount: dec!(12.5) }).unwrap();
        assert_eq!(json, r#"{"amount":"12.5000"}"#);
    }
}
