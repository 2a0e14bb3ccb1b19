/*
 * Responsibility
 * - 呼び出し側が identity header を詐称していないか確認する
 * - token 検証より先に実行する (upstream はこれらの header を無条件に信頼するため)
 */
use super::error::CheckError;
use super::headers::{Headers, REQUEST_USER_AUTHORITIES, REQUEST_USER_ID, REQUEST_USER_ROLE};

/// Headers only this service may set.
pub const RESERVED_HEADERS: [&str; 3] = [REQUEST_USER_ID, REQUEST_USER_ROLE, REQUEST_USER_AUTHORITIES];

/// Fail when any reserved header is already present, listing all of them.
pub fn reject_reserved_headers(headers: &Headers) -> Result<(), CheckError> {
    let names: Vec<&'static str> = RESERVED_HEADERS
        .into_iter()
        .filter(|name| headers.contains(name))
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(CheckError::SpoofedHeader { names })
    }
}
