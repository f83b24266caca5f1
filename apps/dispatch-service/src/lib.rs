//! # Dispatch Service ライブラリ
//!
//! 送信サービス、例外シンク、HTTP ハンドラを公開する。
//! 結合テスト用に内部モジュールへのアクセスを提供する。

pub mod config;
pub mod error;
pub mod handler;
pub mod telemetry;
pub mod usecase;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handler::{EmailState, health_check, send_email};
use tower_http::trace::TraceLayer;

// テストユーティリティ（内部実装、ドキュメントからは隠す）
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;

/// ルーターを構築する
pub fn router(email_state: Arc<EmailState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/internal/emails", post(send_email))
        .with_state(email_state)
        .layer(TraceLayer::new_for_http())
}
