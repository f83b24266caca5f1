//! # EmailAuditLogRepository
//!
//! 送信監査ログの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **INSERT のみ**: 監査ログは作成後に更新も削除もしない
//! - **成功・失敗どちらも記録**: `status` カラムで区別する
//! - **テナント分離**: `tenant_id` カラムで分離
//!
//! テーブル定義はプラットフォーム本体のマイグレーションが管理する:
//!
//! ```sql
//! CREATE TABLE email_audit_logs (
//!     id            UUID PRIMARY KEY,
//!     tenant_id     BIGINT NOT NULL,
//!     category      TEXT NOT NULL,
//!     status        TEXT NOT NULL,
//!     content       JSONB NOT NULL,
//!     error_message TEXT,
//!     created_at    TIMESTAMPTZ NOT NULL
//! );
//! ```

use async_trait::async_trait;
use mailtrail_domain::email::EmailAuditLog;
use sqlx::PgPool;

use crate::error::InfraError;

/// 監査ログリポジトリトレイト
#[async_trait]
pub trait EmailAuditLogRepository: Send + Sync {
    /// 監査ログを挿入する
    async fn insert(&self, log: &EmailAuditLog) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の EmailAuditLogRepository
#[derive(Debug, Clone)]
pub struct PostgresEmailAuditLogRepository {
    pool: PgPool,
}

impl PostgresEmailAuditLogRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailAuditLogRepository for PostgresEmailAuditLogRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(tenant_id = log.tenant_id.as_i64()))]
    async fn insert(&self, log: &EmailAuditLog) -> Result<(), InfraError> {
        let status: &'static str = log.status.into();

        // テーブル定義が外部管理のため、コンパイル時検証の query! ではなく query を使う
        sqlx::query(
            r#"
            INSERT INTO email_audit_logs (
                id, tenant_id, category, status, content, error_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(log.id.as_uuid())
        .bind(log.tenant_id.as_i64())
        .bind(log.category.as_str())
        .bind(status)
        .bind(&log.content)
        .bind(log.error_message.as_deref())
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresEmailAuditLogRepository>();
    }
}
