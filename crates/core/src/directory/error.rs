//! Directory error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while maintaining the account directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required text field was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A money field has more fractional digits than money columns keep.
    #[error("{0} has more than 4 decimal places")]
    AmountScale(&'static str),

    /// Account type not found.
    #[error("Account type not found: {0}")]
    AccountTypeNotFound(Uuid),

    /// Account sub-type not found.
    #[error("Account sub-type not found: {0}")]
    AccountSubTypeNotFound(Uuid),

    /// Account category not found.
    #[error("Account category not found: {0}")]
    AccountCategoryNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Sub-type belongs to a different account type.
    #[error("Account sub-type {sub_type} does not belong to account type {account_type}")]
    SubTypeMismatch {
        /// The sub-type given.
        sub_type: Uuid,
        /// The account type given.
        account_type: Uuid,
    },

    /// Entity is still referenced and cannot be deleted.
    #[error("{entity} {id} is still referenced by {referenced_by}")]
    InUse {
        /// Kind of entity being deleted.
        entity: &'static str,
        /// Its ID.
        id: Uuid,
        /// What still points at it.
        referenced_by: &'static str,
    },

    /// A request body names a related entity that does not exist.
    #[error("{entity} {id} does not exist")]
    InvalidReference {
        /// Kind of entity referenced.
        entity: &'static str,
        /// Referenced ID.
        id: Uuid,
    },

    /// A name is already taken.
    #[error("{entity} '{name}' already exists")]
    Duplicate {
        /// Kind of entity.
        entity: &'static str,
        /// Conflicting name.
        name: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DirectoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::AmountScale(_) => "AMOUNT_SCALE",
            Self::AccountTypeNotFound(_) => "ACCOUNT_TYPE_NOT_FOUND",
            Self::AccountSubTypeNotFound(_) => "ACCOUNT_SUB_TYPE_NOT_FOUND",
            Self::AccountCategoryNotFound(_) => "ACCOUNT_CATEGORY_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::SubTypeMismatch { .. } => "SUB_TYPE_MISMATCH",
            Self::InUse { .. } => "IN_USE",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::Duplicate { .. } => "DUPLICATE_NAME",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingField(_)
            | Self::AmountScale(_)
            | Self::SubTypeMismatch { .. }
            | Self::InvalidReference { .. } => 400,
            Self::AccountTypeNotFound(_)
            | Self::AccountSubTypeNotFound(_)
            | Self::AccountCategoryNotFound(_)
            | Self::AccountNotFound(_) => 404,
            Self::InUse { .. } | Self::Duplicate { .. } => 409,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let err = DirectoryError::InUse {
            entity: "Account",
            id: Uuid::nil(),
            referenced_by: "transactions",
        };
        assert_eq!(err.error_code(), "IN_USE");
        assert_eq!(err.http_status_code(), 409);

        assert_eq!(DirectoryError::MissingField("accountName").http_status_code(), 400);
        assert_eq!(
            DirectoryError::AccountCategoryNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(DirectoryError::Database("x".into()).http_status_code(), 500);

        let err = DirectoryError::InvalidReference {
            entity: "Account category",
            id: Uuid::nil(),
        };
        assert_eq!((err.error_code(), err.http_status_code()), ("INVALID_REFERENCE", 400));

        let err = DirectoryError::Duplicate {
            entity: "Account type",
            name: "assets".into(),
        };
        assert_eq!((err.error_code(), err.http_status_code()), ("DUPLICATE_NAME", 409));
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::InUse {
            entity: "Account type",
            id: Uuid::nil(),
            referenced_by: "accounts",
        };
        assert_eq!(
            err.to_string(),
            "Account type 00000000-0000-0000-0000-000000000000 is still referenced by accounts"
        );
        assert_eq!(
            DirectoryError::MissingField("typeName").to_string(),
            "typeName is required"
        );
    }
}
