/*!
 * CAS request extractor
 *
 * Responsibility:
 * - HTTP リクエストから CAS エンジン用の RequestContext スナップショットを作る
 * - axum 依存は core に閉じ込める
 *
 * Public API:
 * - CasRequest
 */

mod core;

pub use core::CasRequest;
