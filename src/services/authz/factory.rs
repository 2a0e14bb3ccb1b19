/// Factory: build `CheckService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::authz::clock::SystemClock;
use crate::services::authz::credentials::CredentialExtractor;
use crate::services::authz::report::ErrorReporter;
use crate::services::authz::token::JwtVerifier;
use crate::services::authz::CheckService;

pub fn build_check_service(config: &Config, reporter: Arc<dyn ErrorReporter>) -> Arc<CheckService> {
    let verifier = JwtVerifier::new(
        config.jwt_secret.as_bytes(),
        config.token_leeway_seconds,
        Arc::new(SystemClock),
    );
    let extractor = CredentialExtractor::new(config.token_cookie_name.clone());

    Arc::new(CheckService::new(extractor, Arc::new(verifier), reporter))
}
