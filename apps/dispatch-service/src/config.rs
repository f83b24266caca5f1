//! # Dispatch Service 設定
//!
//! 環境変数から Dispatch Service サーバーの設定を読み込む。
//!
//! 必須項目の欠落や不正値は [`ConfigError`] として返し、パニックしない。

use std::env;

use mailtrail_domain::email::{EmailAddress, MailIdentities, Mailbox};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が設定されていない
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("{name} の値が不正です: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Dispatch Service サーバーの設定
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 送信バックエンド設定
    pub transport:    TransportConfig,
    /// 固定送信者情報
    pub identities:   MailIdentityConfig,
}

/// 送信バックエンド
///
/// `MAIL_TRANSPORT` 環境変数で切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `ses`: Amazon SES v2 経由で送信（本番）
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Noop,
    Smtp { host: String, port: u16 },
    Ses,
}

/// 固定送信者情報の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIdentityConfig {
    pub sender_name:     String,
    pub sender_address:  String,
    pub support_name:    String,
    pub support_address: String,
}

impl DispatchConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストではプロセスの環境変数を汚さずに検証するために使う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            host:         lookup("DISPATCH_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port:         parse_port(
                "DISPATCH_PORT",
                lookup("DISPATCH_PORT").ok_or(ConfigError::Missing("DISPATCH_PORT"))?,
            )?,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            transport:    TransportConfig::from_lookup(&lookup)?,
            identities:   MailIdentityConfig::from_lookup(&lookup),
        };

        // 起動時に検証し、不正な送信者情報のまま起動しない
        config.identities.to_identities()?;

        Ok(config)
    }
}

impl TransportConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = lookup("MAIL_TRANSPORT").unwrap_or_else(|| "noop".to_string());

        match backend.as_str() {
            "noop" => Ok(Self::Noop),
            "ses" => Ok(Self::Ses),
            "smtp" => Ok(Self::Smtp {
                host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_port(
                    "SMTP_PORT",
                    lookup("SMTP_PORT").unwrap_or_else(|| "1025".to_string()),
                )?,
            }),
            other => Err(ConfigError::Invalid {
                name:   "MAIL_TRANSPORT",
                reason: format!("未知のバックエンド: {other}（noop / smtp / ses のいずれか）"),
            }),
        }
    }

    /// ログ出力用のバックエンド名
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Smtp { .. } => "smtp",
            Self::Ses => "ses",
        }
    }
}

impl MailIdentityConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Self {
            sender_name:     get("MAIL_DEFAULT_SENDER_NAME", "Mailtrail"),
            sender_address:  get("MAIL_DEFAULT_SENDER_ADDRESS", "noreply@mailtrail.example.com"),
            support_name:    get("MAIL_SUPPORT_CC_NAME", "Mailtrail Support"),
            support_address: get("MAIL_SUPPORT_CC_ADDRESS", "support@mailtrail.example.com"),
        }
    }

    /// ドメインの [`MailIdentities`] に変換する
    pub fn to_identities(&self) -> Result<MailIdentities, ConfigError> {
        let address = |name: &'static str, value: &str| {
            EmailAddress::new(value).map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        };

        Ok(MailIdentities::new(
            Mailbox::new(
                &self.sender_name,
                address("MAIL_DEFAULT_SENDER_ADDRESS", &self.sender_address)?,
            ),
            Mailbox::new(
                &self.support_name,
                address("MAIL_SUPPORT_CC_ADDRESS", &self.support_address)?,
            ),
        ))
    }
}

fn parse_port(name: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("有効なポート番号ではありません: {value}"),
    })
}
