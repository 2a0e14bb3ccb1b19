/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: check: CheckService (検証 secret は起動時に一度だけ注入)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::authz::CheckService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub check: Arc<CheckService>,
}

impl AppState {
    pub fn new(check: Arc<CheckService>) -> Self {
        Self { check }
    }
}
