//! 送信アダプタとの境界で使う結果型

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 送信成功時の受領情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportReceipt {
    /// プロバイダが採番したメッセージ ID（SES の MessageId、SMTP 応答の先頭行など）
    pub provider_message_id: Option<String>,
}

impl TransportReceipt {
    pub fn new(provider_message_id: Option<String>) -> Self {
        Self {
            provider_message_id,
        }
    }
}

/// 送信エラー
///
/// メールがシステムから出ていかなかったことを表す。
/// 監査ログに `error` として記録され、呼び出し側へそのまま返される。
/// このサブシステムでは自動リトライしない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// アドレスが送信アダプタで受け付けられない
    #[error("メールアドレスが不正です: {0}")]
    InvalidAddress(String),

    /// メッセージの組み立てに失敗
    #[error("メッセージの構築に失敗: {0}")]
    MessageBuild(String),

    /// 送信プロバイダが受け付けを拒否
    #[error("送信プロバイダに拒否されました: {0}")]
    Rejected(String),

    /// 送信プロバイダとの通信に失敗（接続、TLS、タイムアウト）
    #[error("送信プロバイダとの通信に失敗: {0}")]
    Connection(String),
}

impl TransportError {
    /// 監査ログ・ログ出力用のエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "invalid_address",
            Self::MessageBuild(_) => "message_build",
            Self::Rejected(_) => "rejected",
            Self::Connection(_) => "connection",
        }
    }
}
