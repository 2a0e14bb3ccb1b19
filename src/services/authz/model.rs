/*
 * Responsibility
 * - decision engine の入出力型 (Request / Claims / Decision)
 * - wire version に依存しない内部モデル (protocol adapter だけが v2/v3 を知る)
 */
use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};

use super::headers::Headers;

/// One authorization check, built by a protocol adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Caller supplied id (not generated here).
    pub id: String,
    /// Opaque pass-through metadata.
    pub context: BTreeMap<String, String>,
    pub headers: Headers,

    // Request target, only used for logging.
    pub method: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: String,
}

/// Verified token payload.
///
/// Only the token validator can produce this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    subject: String,
    role: String,
    authorities: Vec<String>,
    expires_at: DateTime<Utc>,
}

impl Claims {
    pub(crate) fn new(
        subject: String,
        role: String,
        authorities: Vec<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            role,
            authorities,
            expires_at,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Outcome of a single check.
///
/// Invariants (held by the constructors):
/// - denied decisions never carry injected headers
/// - `200` iff allowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    allow: bool,
    status: StatusCode,
    injected_headers: Headers,
}

impl Decision {
    /// Allow without asserting any identity.
    pub fn allow() -> Self {
        Self::allow_with(Headers::new())
    }

    pub fn allow_with(injected_headers: Headers) -> Self {
        Self {
            allow: true,
            status: StatusCode::OK,
            injected_headers,
        }
    }

    /// Deny with a non-OK status.
    pub fn deny(status: StatusCode) -> Self {
        debug_assert!(status != StatusCode::OK, "denied decision with 200");
        Self {
            allow: false,
            status,
            injected_headers: Headers::new(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allow
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn injected_headers(&self) -> &Headers {
        &self.injected_headers
    }
}
