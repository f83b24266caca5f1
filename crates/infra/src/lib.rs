//! # Mailtrail インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **メール送信**: SMTP / SES / Noop の送信アダプタと送信イベントバス
//! - **リポジトリ実装**: 監査ログの永続化
//!
//! ## 依存関係
//!
//! ```text
//! dispatch-service → infra → domain
//!          ↓
//!        shared
//! ```
//!
//! インフラ層は `domain` のみに依存する。ログ初期化やレスポンス型（`shared`）は
//! サービス側の責務。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`email`] - 送信アダプタと送信イベント
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `mock` - テスト用モック（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use mailtrail_infra::{
//!     db,
//!     email::{SmtpEmailTransport, TransportEventBus},
//!     repository::PostgresEmailAuditLogRepository,
//! };
//!
//! let pool = db::create_pool("postgres://localhost/mailtrail").await?;
//! let events = TransportEventBus::default();
//! let transport = Arc::new(SmtpEmailTransport::new("localhost", 1025, events.clone()));
//! let audit_repo = Arc::new(PostgresEmailAuditLogRepository::new(pool));
//! ```

pub mod db;
pub mod email;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
