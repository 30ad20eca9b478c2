/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - cas: CasClient (設定は不変。リクエスト間で共有しても lock 不要)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::cas::CasClient;
use crate::services::user_directory::UserDirectory;

#[derive(Clone, Debug)]
pub struct AppState {
    pub cas: Arc<CasClient<UserDirectory>>,
}

impl AppState {
    pub fn new(cas: Arc<CasClient<UserDirectory>>) -> Self {
        Self { cas }
    }
}
