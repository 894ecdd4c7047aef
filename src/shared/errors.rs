use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    AlreadyExists(String),

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    /// Stable machine-readable code surfaced across the service boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists(_) => "conflict",
            Self::IncorrectPassword => "incorrect_password",
            Self::Internal(_) => "internal",
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Internal(format!("database error: {}", e))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::not_found("article", "slug", "x").code(), "not_found");
        assert_eq!(DomainError::AlreadyExists("dup".into()).code(), "conflict");
        assert_eq!(DomainError::IncorrectPassword.code(), "incorrect_password");
        assert_eq!(DomainError::Internal("boom".into()).code(), "internal");
        assert_eq!(DomainError::Validation("bad".into()).code(), "validation");
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = DomainError::not_found("user", "email", "a@b.c");
        assert_eq!(err.to_string(), "user not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn db_errors_become_internal() {
        let err: DomainError = sea_orm::DbErr::Custom("disk full".into()).into();
        assert_eq!(err.code(), "internal");
    }
}
