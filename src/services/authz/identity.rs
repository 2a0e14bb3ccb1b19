/*
 * Responsibility
 * - 検証済み Claims → upstream に渡す identity header
 * - Request-Id は判定ごとに新規発行 (inbound の request id とは無関係)
 */
use uuid::Uuid;

use super::headers::{
    Headers, REQUEST_ID, REQUEST_USER_AUTHORITIES, REQUEST_USER_ID, REQUEST_USER_ROLE,
};
use super::model::Claims;

pub fn identity_headers(claims: &Claims) -> Headers {
    let mut headers = Headers::new();

    headers.append(REQUEST_USER_ID, claims.subject());
    headers.append(REQUEST_USER_ROLE, claims.role());
    for authority in claims.authorities() {
        headers.append(REQUEST_USER_AUTHORITIES, authority.as_str());
    }
    headers.append(REQUEST_ID, Uuid::new_v4().to_string());

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authz::testing::fixed_now;

    fn claims(authorities: &[&str]) -> Claims {
        Claims::new(
            "1".to_string(),
            "STU".to_string(),
            authorities.iter().map(|s| s.to_string()).collect(),
            fixed_now(),
        )
    }

    #[test]
    fn maps_claims_to_headers() {
        let headers = identity_headers(&claims(&["auth-1", "auth-2", "auth-3"]));

        assert_eq!(headers.get_all(REQUEST_USER_ID), ["1"]);
        assert_eq!(headers.get_all(REQUEST_USER_ROLE), ["STU"]);
        assert_eq!(
            headers.get_all(REQUEST_USER_AUTHORITIES),
            ["auth-1", "auth-2", "auth-3"]
        );

        let request_id = headers.get_all(REQUEST_ID);
        assert_eq!(request_id.len(), 1);
        assert_eq!(request_id[0].len(), 36);
        assert!(Uuid::parse_str(&request_id[0]).is_ok());
    }

    #[test]
    fn no_authorities_means_no_authorities_header() {
        let headers = identity_headers(&claims(&[]));

        assert!(!headers.contains(REQUEST_USER_AUTHORITIES));
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn request_id_is_fresh_per_call() {
        let claims = claims(&["auth-1"]);

        let first = identity_headers(&claims);
        let second = identity_headers(&claims);
        assert_ne!(first.get(REQUEST_ID), second.get(REQUEST_ID));
    }
}
