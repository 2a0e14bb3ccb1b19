use std::{fmt, sync::Arc};

use chrono::DateTime;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;

use super::clock::Clock;
use super::error::{TokenError, ValidationFailure};
use super::model::Claims;

/// Turns a raw token into verified [`Claims`].
///
/// Implementations must not do I/O: the engine calls this inline on the
/// request path.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

// Payload layout of the bearer tokens we accept.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    role: String,
    // `null` is accepted, hence Option rather than a defaulted Vec.
    #[serde(default)]
    authorities: Option<Vec<String>>,
    exp: i64,
}

/// HMAC (HS256/384/512) verifier bound to a shared secret.
///
/// - signature is checked by `jsonwebtoken`
/// - `exp` is checked here against the injected clock (expired at or after `exp + leeway`)
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("clock", &self.clock)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(secret: &[u8], leeway_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant keyed with the shared secret is accepted.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp presence is still required, its value is checked in `verify`.
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
            clock,
        }
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;
        let claims = data.claims;

        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(ValidationFailure::Malformed)?;

        if self.clock.now().timestamp() >= claims.exp.saturating_add(self.leeway_seconds) {
            return Err(ValidationFailure::Expired.into());
        }

        Ok(Claims::new(
            claims.sub,
            claims.role,
            claims.authorities.unwrap_or_default(),
            expires_at,
        ))
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => ValidationFailure::BadSignature.into(),
        ErrorKind::ExpiredSignature => ValidationFailure::Expired.into(),
        ErrorKind::InvalidToken
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => ValidationFailure::Malformed.into(),
        // Key format / crypto backend problems are ours, not the caller's.
        _ => TokenError::Internal(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::services::authz::clock::FixedClock;
    use crate::services::authz::testing::{SECRET, fixed_now, sign, student_claims, verifier};

    #[test]
    fn accepts_valid_token() {
        let now = fixed_now().timestamp();
        let token = sign(SECRET, &student_claims(now + 900));

        let claims = verifier().verify(&token).expect("valid token");

        assert_eq!(claims.subject(), "1");
        assert_eq!(claims.role(), "STU");
        assert_eq!(claims.authorities(), ["auth-1", "auth-2", "auth-3"]);
        assert_eq!(claims.expires_at().timestamp(), now + 900);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = sign(b"other-secret", &student_claims(fixed_now().timestamp() + 900));

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Invalid(ValidationFailure::BadSignature)
        ));
    }

    #[test]
    fn expired_at_exact_instant() {
        let token = sign(SECRET, &student_claims(fixed_now().timestamp()));

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(ValidationFailure::Expired)));
    }

    #[test]
    fn leeway_extends_expiry() {
        let now = fixed_now();
        let token = sign(SECRET, &student_claims(now.timestamp() - 10));
        let lenient = JwtVerifier::new(SECRET, 30, Arc::new(FixedClock(now)));

        assert!(lenient.verify(&token).is_ok());
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "not-a-jwt", "a.b.c"] {
            let err = verifier().verify(token).unwrap_err();
            assert!(
                matches!(err, TokenError::Invalid(ValidationFailure::Malformed)),
                "token {token:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn missing_exp_is_malformed() {
        let token = sign(SECRET, &json!({"sub": "1", "role": "STU"}));

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Invalid(ValidationFailure::Malformed)
        ));
    }

    #[test]
    fn optional_claims_default_to_empty() {
        let exp = fixed_now().timestamp() + 60;
        let token = sign(SECRET, &json!({"sub": "7", "authorities": null, "exp": exp}));

        let claims = verifier().verify(&token).expect("valid token");
        assert_eq!(claims.subject(), "7");
        assert_eq!(claims.role(), "");
        assert!(claims.authorities().is_empty());
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", verifier());

        assert!(!rendered.contains("qwerty"));
        assert!(rendered.contains("JwtVerifier"));
    }

    #[test]
    fn accepts_other_hmac_variants() {
        let claims = student_claims(fixed_now().timestamp() + 900);

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = jsonwebtoken::encode(
                &jsonwebtoken::Header::new(alg),
                &claims,
                &jsonwebtoken::EncodingKey::from_secret(SECRET),
            )
            .expect("sign test token");

            let verified = verifier().verify(&token).expect("valid token");
            assert_eq!(verified.subject(), "1", "alg {alg:?}");
        }
    }
}
