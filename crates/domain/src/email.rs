//! # メール送信と監査
//!
//! テナント向けトランザクションメールの送信・監査に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`OutboundMessage`] | 送信メッセージ | 送信 1 回分の正規化されたメール。永続化しない |
//! | [`Attribution`] | 帰属情報 | カテゴリ + テナント ID。すべての送信で必須 |
//! | [`EmailAuditLog`] | 監査ログ | 送信試行 1 回につきちょうど 1 件作成される不変の記録 |
//! | [`MailIdentities`] | 固定送信者情報 | 送信元と、全通知を確認するサポート窓口（cc） |
//!
//! ## 設計方針
//!
//! - **送信と記録の分離**: 送信結果（[`TransportError`]）と記録失敗
//!   （[`DispatchError::AuditPersistence`]）を別の型で表現し、どちらの信号も失わない
//! - **送信元・cc は設定値**: 呼び出しごとに変更できない。デプロイ単位で注入する

mod attribution;
mod audit_log;
mod error;
mod message;
mod transport;

pub use attribution::{Attribution, EmailCategory};
pub use audit_log::{EmailAuditLog, EmailAuditLogId, EmailAuditStatus};
pub use error::DispatchError;
pub use message::{MailIdentities, MessageBuilder, OutboundMessage, strip_line_breaks};
use serde::{Deserialize, Serialize};
pub use transport::{TransportError, TransportReceipt};

use crate::DomainError;

/// メールアドレス（値オブジェクト）
///
/// 生成時に最低限の構造検証を行い、不正な値の作成を防ぐ。
/// 厳密な RFC 5322 検証は送信アダプタ側（lettre / SES）に委ねる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式
    /// - 改行を含まない（ヘッダインジェクション防止）
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        };

        if local.is_empty() || domain.is_empty() || value.contains(['\r', '\n']) {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(address: EmailAddress) -> Self {
        address.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メールボックス（表示名 + アドレス）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// 表示名（空文字列の場合はアドレスのみで表示する）
    pub name:    String,
    pub address: EmailAddress,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, address: EmailAddress) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// 表示名を返す（空の場合は `None`）
    pub fn display_name(&self) -> Option<&str> {
        let name = self.name.trim();
        (!name.is_empty()).then_some(name)
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.display_name() {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}
