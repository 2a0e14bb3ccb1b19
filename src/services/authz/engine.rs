//! Decision engine: guard → credentials → token → identity headers.
//!
//! | path                       | decision              |
//! |----------------------------|-----------------------|
//! | reserved header present    | DENY 401              |
//! | no token / Basic scheme    | ALLOW 200, no headers |
//! | token rejected             | DENY 401              |
//! | token accepted             | ALLOW 200, identity   |
//! | verifier fault             | DENY 500              |
//!
//! The engine keeps no per-call state and never sees the wire version.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::credentials::{Credential, CredentialExtractor};
use super::error::CheckError;
use super::guard;
use super::identity::identity_headers;
use super::model::{Decision, Request};
use super::report::{ErrorReport, ErrorReporter};
use super::token::TokenVerifier;

/// Decision plus the error behind a denial, if any.
#[derive(Debug)]
pub struct CheckOutcome {
    pub decision: Decision,
    pub error: Option<CheckError>,
}

pub struct CheckService {
    extractor: CredentialExtractor,
    verifier: Arc<dyn TokenVerifier>,
    reporter: Arc<dyn ErrorReporter>,
}

impl std::fmt::Debug for CheckService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckService")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl CheckService {
    pub fn new(
        extractor: CredentialExtractor,
        verifier: Arc<dyn TokenVerifier>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            extractor,
            verifier,
            reporter,
        }
    }

    pub fn check(&self, request: &Request) -> CheckOutcome {
        info!(
            id = %request.id,
            method = %request.method,
            host = %request.host,
            path = %request.path,
            "checking request"
        );

        match self.decide(request) {
            Ok(decision) => CheckOutcome {
                decision,
                error: None,
            },
            Err(err) => {
                self.record(request, &err);
                CheckOutcome {
                    decision: Decision::deny(err.status()),
                    error: Some(err),
                }
            }
        }
    }

    fn decide(&self, request: &Request) -> Result<Decision, CheckError> {
        guard::reject_reserved_headers(&request.headers)?;

        let token = match self.extractor.extract(&request.headers) {
            Credential::Anonymous | Credential::Basic => return Ok(Decision::allow()),
            Credential::Token { token, .. } => token,
        };

        let claims = self.verifier.verify(&token)?;
        info!(
            id = %request.id,
            subject = claims.subject(),
            role = claims.role(),
            "request allowed with identity headers"
        );

        Ok(Decision::allow_with(identity_headers(&claims)))
    }

    fn record(&self, request: &Request, err: &CheckError) {
        let status = err.status().as_u16();
        match err {
            CheckError::SpoofedHeader { names } => {
                warn!(id = %request.id, status, headers = ?names, error = %err, "reserved headers on inbound request");
            }
            CheckError::InvalidToken(failure) => {
                info!(id = %request.id, status, reason = failure.as_str(), error = %err, "token rejected");
            }
            CheckError::Internal(_) => {
                error!(id = %request.id, status, error = %err, "authorization check failed");
            }
        }

        self.reporter.report(ErrorReport::new(&request.id, err));
    }
}
