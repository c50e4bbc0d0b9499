//! Directory rules that do not need storage.

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, AccountTypeId, fits_amount_scale};

use super::error::DirectoryError;
use super::types::{AccountSubType, BalanceVerification};

/// Pure directory validation and balance arithmetic.
pub struct DirectoryService;

impl DirectoryService {
    /// Trims a required text field, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::MissingField` if the value is empty after trimming.
    pub fn require_name(field: &'static str, value: &str) -> Result<String, DirectoryError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DirectoryError::MissingField(field));
        }
        Ok(trimmed.to_string())
    }

    /// Rejects money values that would be rounded on storage.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::AmountScale` past four decimal places.
    pub fn validate_amount(
        field: &'static str,
        amount: Decimal,
    ) -> Result<Decimal, DirectoryError> {
        if !fits_amount_scale(amount) {
            return Err(DirectoryError::AmountScale(field));
        }
        Ok(amount)
    }

    /// Checks that a sub-type belongs to the account type it is paired with.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::SubTypeMismatch` if the owning types differ.
    pub fn validate_classification(
        account_type_id: AccountTypeId,
        sub_type: &AccountSubType,
    ) -> Result<(), DirectoryError> {
        if sub_type.account_type_id != account_type_id {
            return Err(DirectoryError::SubTypeMismatch {
                sub_type: sub_type.id.into_inner(),
                account_type: account_type_id.into_inner(),
            });
        }
        Ok(())
    }

    /// Amount `current_balance` must move by when the opening balance changes.
    #[must_use]
    pub fn opening_balance_shift(old_opening: Decimal, new_opening: Decimal) -> Decimal {
        new_opening - old_opening
    }

    /// Recomputes a balance from history and compares it to the stored value.
    #[must_use]
    pub fn verify_balance(
        account_id: AccountId,
        opening_balance: Decimal,
        debit_total: Decimal,
        credit_total: Decimal,
        stored_balance: Decimal,
    ) -> BalanceVerification {
        let computed_balance = opening_balance + debit_total - credit_total;
        let difference = stored_balance - computed_balance;

        BalanceVerification {
            account_id,
            stored_balance,
            computed_balance,
            difference,
            is_consistent: difference.is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountSubTypeId;

    #[test]
    fn test_require_name_trims() {
        assert_eq!(DirectoryService::require_name("name", "  Cash ").unwrap(), "Cash");
        assert!(matches!(
            DirectoryService::require_name("name", "   "),
            Err(DirectoryError::MissingField("name"))
        ));
    }

    #[test]
    fn test_sub_type_must_match_type() {
        let assets = AccountTypeId::new();
        let income = AccountTypeId::new();
        let current_assets = AccountSubType {
            id: AccountSubTypeId::new(),
            sub_type_name: "Current Assets".to_string(),
            account_type_id: assets,
            description: None,
        };

        assert!(DirectoryService::validate_classification(assets, &current_assets).is_ok());
        assert!(matches!(
            DirectoryService::validate_classification(income, &current_assets),
            Err(DirectoryError::SubTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_amount_scale() {
        assert_eq!(
            DirectoryService::validate_amount("openingBalance", dec!(-1250.5)).unwrap(),
            dec!(-1250.5)
        );
        assert!(DirectoryService::validate_amount("openingBalance", dec!(10.00000)).is_ok());
        let err = DirectoryService::validate_amount("openingBalance", dec!(10.00001)).unwrap_err();
        assert_eq!((err.error_code(), err.http_status_code()), ("AMOUNT_SCALE", 400));
        assert_eq!(err.to_string(), "openingBalance has more than 4 decimal places");
    }

    #[test]
    fn test_opening_balance_shift() {
        assert_eq!(DirectoryService::opening_balance_shift(dec!(1000), dec!(1200)), dec!(200));
        assert_eq!(DirectoryService::opening_balance_shift(dec!(1000), dec!(0)), dec!(-1000));
    }

    #[test]
    fn test_verify_balance_consistent() {
        // Opening 1000, debit 500, credit 0 -> 1500
        let v = DirectoryService::verify_balance(
            AccountId::new(),
            dec!(1000),
            dec!(500),
            dec!(0),
            dec!(1500),
        );
        assert!(v.is_consistent);
        assert_eq!(v.computed_balance, dec!(1500));
        assert_eq!(v.difference, dec!(0));
    }

    #[test]
    fn test_verify_balance_drift() {
        let v = DirectoryService::verify_balance(
            AccountId::new(),
            dec!(0),
            dec!(0),
            dec!(500),
            dec!(-450),
        );
        assert!(!v.is_consistent);
        assert_eq!(v.computed_balance, dec!(-500));
        assert_eq!(v.difference, dec!(50));
    }
}
