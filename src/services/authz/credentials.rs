//! Credential lookup: `Authorization` header first, then the token cookie.
//!
//! A header that is missing or not made of exactly two parts is not an error
//! here. The engine lets such requests through without identity headers.

use super::headers::Headers;

const AUTHORIZATION: &str = "authorization";
const COOKIE: &str = "cookie";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Nothing usable was found.
    Anonymous,
    /// `Authorization: Basic ...`, passed through untouched.
    Basic,
    /// Any other scheme. The token still has to be validated.
    Token { scheme: String, token: String },
}

#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    cookie_name: Option<String>,
}

impl CredentialExtractor {
    /// `cookie_name = None` disables the cookie fallback.
    pub fn new(cookie_name: Option<String>) -> Self {
        Self {
            cookie_name: cookie_name.filter(|name| !name.is_empty()),
        }
    }

    pub fn extract(&self, headers: &Headers) -> Credential {
        if let Some((scheme, token)) = headers.get(AUTHORIZATION).and_then(split_authorization) {
            if scheme.eq_ignore_ascii_case("basic") {
                return Credential::Basic;
            }
            return Credential::Token {
                scheme: scheme.to_string(),
                token: token.to_string(),
            };
        }

        match self.cookie_token(headers) {
            Some(token) => Credential::Token {
                scheme: "Bearer".to_string(),
                token: token.to_string(),
            },
            None => Credential::Anonymous,
        }
    }

    fn cookie_token<'a>(&self, headers: &'a Headers) -> Option<&'a str> {
        let name = self.cookie_name.as_deref()?;

        headers
            .get_all(COOKIE)
            .iter()
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

// `<scheme> <token>`: exactly two parts separated by one space. Empty parts
// are kept so the token validator rejects them.
fn split_authorization(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => Some((scheme, token)),
        _ => None,
    }
}
