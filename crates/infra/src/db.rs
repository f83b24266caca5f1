//! # PostgreSQL データベース接続管理
//!
//! 監査ログの保存先となる PostgreSQL への接続プールを作成する。
//!
//! テーブル定義（`email_audit_logs`）とマイグレーションはプラットフォーム本体が管理する。
//! このクレートは既存テーブルへの INSERT のみを行う。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use mailtrail_infra::db;
//!
//! let pool = db::create_pool("postgres://localhost/mailtrail").await?;
//! ```

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

/// PostgreSQL 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。
///
/// # 設定値
///
/// - `max_connections(10)`: 最大接続数。送信処理は 1 リクエストにつき INSERT 1 回
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト。超過時は監査ログ記録失敗として扱われる
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}
