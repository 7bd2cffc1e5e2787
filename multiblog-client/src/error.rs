use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by `multiblog-client`.
pub enum BlogClientError {
    /// Transport failure or an undecodable response (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing, expired or rejected token, or wrong credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The resource does not exist or is not visible to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// Email, username or tag name already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Validation failure or any other rejected request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of `multiblog-client` operations.
pub type BlogClientResult<T> = Result<T, BlogClientError>;

impl BlogClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::CONFLICT => Self::Conflict(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::BlogClientError;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            BlogClientError::from_http_status(StatusCode::UNAUTHORIZED, None),
            BlogClientError::Unauthorized(_)
        ));
        assert!(matches!(
            BlogClientError::from_http_status(StatusCode::FORBIDDEN, None),
            BlogClientError::Forbidden(_)
        ));
        assert!(matches!(
            BlogClientError::from_http_status(StatusCode::CONFLICT, Some("email".into())),
            BlogClientError::Conflict(msg) if msg == "email"
        ));
        assert!(matches!(
            BlogClientError::from_http_status(StatusCode::REQUEST_TIMEOUT, None),
            BlogClientError::InvalidRequest(msg) if msg.contains("408")
        ));
    }
}
