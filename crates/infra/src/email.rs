//! # メール送信
//!
//! メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `EmailTransport` trait で送信方法を抽象化
//! - **3 つの実装**: SMTP（Mailpit 開発用）、SES（本番用）、Noop（ローカル・テスト用）
//! - **環境変数切替**: `MAIL_TRANSPORT` でランタイム選択
//! - **送信イベント**: 各アダプタは送信の開始・終了・例外を [`TransportEventBus`] に発行する。
//!   購読者がいなくても送信には影響しない

mod events;
mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use events::{TransportEvent, TransportEventBus, event_name};
use mailtrail_domain::email::{OutboundMessage, TransportError, TransportReceipt};
pub use noop::NoopEmailTransport;
pub use ses::SesEmailTransport;
pub use smtp::SmtpEmailTransport;

/// メール送信トレイト
///
/// 送信 1 回分のメッセージをプロバイダに引き渡す。
/// 戻り値がそのまま監査ログの状態（`sent` / `error`）になる。
/// 実装はリトライしない。
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// メールを送信する
    async fn deliver(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError>;
}
