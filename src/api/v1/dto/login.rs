/*
 * Responsibility
 * - CAS ログイン結果の response DTO
 */
use serde::Serialize;

use crate::services::user_directory::CasUser;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth: bool,
    pub user: CasUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}
