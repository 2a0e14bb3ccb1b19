/*
 * Responsibility
 * - decision engine のエラー分類 (tagged enum, engine 側で網羅的に match する)
 * - エラー → HTTP status / log level の対応
 */
use axum::http::StatusCode;
use thiserror::Error;

/// Caller-attributable token problems. All of them deny with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl ValidationFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
        }
    }
}

/// Errors returned by a token validator.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    /// Not attributable to the caller's input (key material, crypto backend).
    #[error("token verification failed: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Not available header name: {}", names.join(", "))]
    SpoofedHeader { names: Vec<&'static str> },

    #[error("invalid token: {0}")]
    InvalidToken(ValidationFailure),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SpoofedHeader { .. } | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for logs and error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpoofedHeader { .. } => "spoofed_header",
            Self::InvalidToken(failure) => failure.as_str(),
            Self::Internal(_) => "internal",
        }
    }
}

impl From<TokenError> for CheckError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid(failure) => CheckError::InvalidToken(failure),
            TokenError::Internal(reason) => CheckError::Internal(reason),
        }
    }
}
