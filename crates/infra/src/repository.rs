//! # リポジトリ実装
//!
//! 監査ログの永続化を担当するリポジトリを提供する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: サービス層はトレイト経由で依存し、テストではモックに差し替える
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化

pub mod email_audit_log_repository;

pub use email_audit_log_repository::{
    EmailAuditLogRepository,
    PostgresEmailAuditLogRepository,
};
