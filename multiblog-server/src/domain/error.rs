use thiserror::Error;

/// Closed classification of domain failures. Transport layers map on this,
/// never on the error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    Unauthenticated,
    Internal,
}

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is deactivated")]
    AccountDisabled,

    #[error("authentication required")]
    Unauthenticated,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::AlreadyExists(_) => ErrorKind::Conflict,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::InvalidCredentials
            | DomainError::AccountDisabled
            | DomainError::Unauthenticated => ErrorKind::Unauthenticated,
            DomainError::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(field: &'static str, message: &'static str) -> Self {
        DomainError::Validation { field, message }
    }
}

#[cfg(test)]
mod tests {
    use super::{DomainError, ErrorKind};

    #[test]
    fn kinds_cover_every_variant() {
        let cases = [
            (DomainError::validation("title", "bad"), ErrorKind::Validation),
            (DomainError::NotFound("post id: 1".into()), ErrorKind::NotFound),
            (DomainError::AlreadyExists("slug".into()), ErrorKind::Conflict),
            (DomainError::Forbidden("not the author"), ErrorKind::Forbidden),
            (DomainError::InvalidCredentials, ErrorKind::Unauthenticated),
            (DomainError::AccountDisabled, ErrorKind::Unauthenticated),
            (DomainError::Unauthenticated, ErrorKind::Unauthenticated),
            (DomainError::Unexpected("db".into()), ErrorKind::Internal),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }
}
