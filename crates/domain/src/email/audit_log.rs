//! 送信監査ログ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::{Attribution, EmailCategory, OutboundMessage, TransportError, TransportReceipt};
use crate::tenant::TenantId;

define_uuid_id! {
    /// 監査ログ ID（一意識別子）
    ///
    /// email_audit_logs テーブルの主キー。UUID v7 を使用。
    pub struct EmailAuditLogId;
}

/// 送信結果ステータス
///
/// email_audit_logs テーブルの `status` カラムに格納される値。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailAuditStatus {
    /// 送信アダプタが成功を返した
    Sent,
    /// 送信アダプタが失敗を返した
    Error,
}

/// 送信監査ログ
///
/// 送信試行 1 回につきちょうど 1 件、送信アダプタの応答直後に作成される。
/// 作成後は更新も削除もしない（保持期間の管理は外部の責務）。
///
/// # 不変条件
///
/// - `status == Sent` ⇔ 送信アダプタが成功を返した
/// - `error_message` は `status == Error` のときだけ `Some`
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAuditLog {
    pub id:            EmailAuditLogId,
    pub category:      EmailCategory,
    pub tenant_id:     TenantId,
    pub status:        EmailAuditStatus,
    /// 実際に送信を試みたメッセージのスナップショット（JSON）
    pub content:       serde_json::Value,
    pub error_message: Option<String>,
    pub created_at:    DateTime<Utc>,
}

impl EmailAuditLog {
    /// 送信結果から監査ログを作成する
    ///
    /// # エラー
    ///
    /// メッセージのシリアライズに失敗した場合は `serde_json::Error` を返す。
    pub fn from_outcome(
        attribution: &Attribution,
        message: &OutboundMessage,
        outcome: &Result<TransportReceipt, TransportError>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let content = serde_json::to_value(message)?;
        let (status, error_message) = match outcome {
            Ok(_) => (EmailAuditStatus::Sent, None),
            Err(e) => (EmailAuditStatus::Error, Some(e.to_string())),
        };

        Ok(Self {
            id: EmailAuditLogId::new(),
            category: attribution.category().clone(),
            tenant_id: attribution.tenant_id(),
            status,
            content,
            error_message,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::email::{EmailAddress, Mailbox};

    fn make_message() -> OutboundMessage {
        let mailbox = |name: &str, address: &str| {
            Mailbox::new(name, EmailAddress::new(address).unwrap())
        };
        OutboundMessage {
            from:      mailbox("Mailtrail", "noreply@mailtrail.example.com"),
            to:        vec![mailbox("Acme", "ops@acme.example.com")],
            cc:        vec![mailbox("Support", "support@mailtrail.example.com")],
            subject:   "請求書のお知らせ".to_string(),
            text_body: "今月の請求書を発行しました。".to_string(),
        }
    }

    #[test]
    fn test_ステータスの文字列変換が正しい() {
        assert_eq!(EmailAuditStatus::Sent.to_string(), "sent");
        assert_eq!(EmailAuditStatus::Error.to_string(), "error");
        assert_eq!(
            EmailAuditStatus::from_str("sent").unwrap(),
            EmailAuditStatus::Sent
        );
        assert_eq!(
            EmailAuditStatus::from_str("error").unwrap(),
            EmailAuditStatus::Error
        );
        assert!(EmailAuditStatus::from_str("failed").is_err());
    }

    #[test]
    fn test_送信成功からsentの監査ログを作成する() {
        let attribution = Attribution::new("billing", 42).unwrap();
        let now = Utc::now();

        let log = EmailAuditLog::from_outcome(
            &attribution,
            &make_message(),
            &Ok(TransportReceipt::new(Some("msg-1".to_string()))),
            now,
        )
        .unwrap();

        assert_eq!(log.status, EmailAuditStatus::Sent);
        assert_eq!(log.error_message, None);
        assert_eq!(log.category.as_str(), "billing");
        assert_eq!(log.tenant_id.as_i64(), 42);
        assert_eq!(log.created_at, now);
    }

    #[test]
    fn test_送信失敗からerrorの監査ログを作成する() {
        let attribution = Attribution::new("alert", 7).unwrap();

        let log = EmailAuditLog::from_outcome(
            &attribution,
            &make_message(),
            &Err(TransportError::Rejected("550 mailbox unavailable".to_string())),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(log.status, EmailAuditStatus::Error);
        let error_message = log.error_message.expect("エラー詳細が記録されること");
        assert!(error_message.contains("550 mailbox unavailable"));
    }

    #[test]
    fn test_スナップショットは送信メッセージをそのまま保持する() {
        let attribution = Attribution::new("billing", 42).unwrap();

        let log = EmailAuditLog::from_outcome(
            &attribution,
            &make_message(),
            &Ok(TransportReceipt::default()),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            log.content,
            json!({
                "from": {"name": "Mailtrail", "address": "noreply@mailtrail.example.com"},
                "to": [{"name": "Acme", "address": "ops@acme.example.com"}],
                "cc": [{"name": "Support", "address": "support@mailtrail.example.com"}],
                "subject": "請求書のお知らせ",
                "text_body": "今月の請求書を発行しました。"
            })
        );
    }
}
