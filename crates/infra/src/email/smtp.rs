//! SMTP 送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use std::time::Instant;

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox as LettreMailbox, Message, header::ContentType},
    transport::smtp,
};
use mailtrail_domain::email::{Mailbox, OutboundMessage, TransportError, TransportReceipt};

use super::{EmailTransport, TransportEventBus};

const BACKEND: &str = "smtp";

/// SMTP 送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
/// Mailpit（開発）や SMTP リレー（テスト環境）で使用する。
pub struct SmtpEmailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    events:    TransportEventBus,
}

impl SmtpEmailTransport {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `events`: 送信イベントの発行先
    pub fn new(host: &str, port: u16, events: TransportEventBus) -> Self {
        // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self { transport, events }
    }

    async fn send_message(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError> {
        let email = build_message(message)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(classify_smtp_error)?;

        Ok(TransportReceipt::new(
            response.first_line().map(ToString::to_string),
        ))
    }
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError> {
        self.events.deliver_start(BACKEND, message);
        let started = Instant::now();

        let result = self.send_message(message).await;

        self.events.deliver_finished(BACKEND, started, &result);
        result
    }
}

/// ドメインの [`Mailbox`] を lettre の Mailbox に変換する
fn to_lettre_mailbox(mailbox: &Mailbox) -> Result<LettreMailbox, TransportError> {
    let address: Address = mailbox
        .address
        .as_str()
        .parse()
        .map_err(|e| TransportError::InvalidAddress(format!("{}: {e}", mailbox.address)))?;

    Ok(LettreMailbox::new(
        mailbox.display_name().map(ToString::to_string),
        address,
    ))
}

/// プレーンテキストのメッセージを組み立てる
fn build_message(message: &OutboundMessage) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(to_lettre_mailbox(&message.from)?)
        .subject(&message.subject)
        .header(ContentType::TEXT_PLAIN);

    for recipient in &message.to {
        builder = builder.to(to_lettre_mailbox(recipient)?);
    }
    for cc in &message.cc {
        builder = builder.cc(to_lettre_mailbox(cc)?);
    }

    builder
        .body(message.text_body.clone())
        .map_err(|e| TransportError::MessageBuild(e.to_string()))
}

/// SMTP エラーを分類する
///
/// サーバーが応答コードで拒否した場合（4xx / 5xx）は業務上の失敗、
/// それ以外（接続、TLS、タイムアウト）はインフラ障害として扱う。
fn classify_smtp_error(error: smtp::Error) -> TransportError {
    if error.is_permanent() || error.is_transient() {
        TransportError::Rejected(error.to_string())
    } else {
        TransportError::Connection(error.to_string())
    }
}
