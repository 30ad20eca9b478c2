/*
 * Responsibility
 * - ドメインロジック (HTTP に依存しない)
 *   - cas: CAS プロトコルエンジン
 *   - user_directory: verify step (Principal → アプリのユーザー)
 */
pub mod cas;
pub mod user_directory;
