//! Noop 送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ローカル開発や送信無効化時に使用する。

use std::time::Instant;

use async_trait::async_trait;
use mailtrail_domain::email::{OutboundMessage, TransportError, TransportReceipt};

use super::{EmailTransport, TransportEventBus};

const BACKEND: &str = "noop";

/// Noop 送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopEmailTransport {
    events: TransportEventBus,
}

impl NoopEmailTransport {
    pub fn new(events: TransportEventBus) -> Self {
        Self { events }
    }
}

#[async_trait]
impl EmailTransport for NoopEmailTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError> {
        self.events.deliver_start(BACKEND, message);
        let started = Instant::now();

        tracing::info!(
            to_count = message.to.len(),
            cc_count = message.cc.len(),
            subject = %message.subject,
            "Noop: メール送信をスキップ"
        );
        let result = Ok(TransportReceipt::default());

        self.events.deliver_finished(BACKEND, started, &result);
        result
    }
}
