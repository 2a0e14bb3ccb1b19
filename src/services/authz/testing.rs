//! Test fixtures shared by the authz unit tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use super::clock::FixedClock;
use super::token::JwtVerifier;

pub(crate) const SECRET: &[u8] = b"qwertyuiopoiuytrewq";

pub(crate) fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

pub(crate) fn verifier() -> JwtVerifier {
    JwtVerifier::new(SECRET, 0, Arc::new(FixedClock(fixed_now())))
}

pub(crate) fn sign(secret: &[u8], claims: &Value) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("sign test token")
}

pub(crate) fn student_claims(exp: i64) -> Value {
    json!({
        "sub": "1",
        "role": "STU",
        "authorities": ["auth-1", "auth-2", "auth-3"],
        "exp": exp,
    })
}
