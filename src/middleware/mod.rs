/*
 * Responsibility
 * - middlware の公開インターフェース
 */
pub mod http;
