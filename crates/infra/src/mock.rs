//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailtrail-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use mailtrail_domain::email::{
    EmailAuditLog,
    OutboundMessage,
    TransportError,
    TransportReceipt,
};

use crate::{
    email::{EmailTransport, TransportEventBus},
    error::InfraError,
    repository::EmailAuditLogRepository,
};

// ===== MockEmailTransport =====

/// 送信したメッセージを記録するモック送信
///
/// `Clone` は記録先を共有する。テストでは clone を Service に渡し、
/// 元のインスタンスで送信内容を検証する。
#[derive(Clone, Default)]
pub struct MockEmailTransport {
    sent:    Arc<Mutex<Vec<OutboundMessage>>>,
    failure: Option<TransportError>,
    events:  Option<TransportEventBus>,
    delay:   Option<Duration>,
}

impl MockEmailTransport {
    /// 常に成功するモックを作成する
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に指定したエラーを返すモックを作成する
    pub fn failing(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// 送信イベントを発行する
    pub fn with_events(mut self, events: TransportEventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// 応答までの遅延を設定する（並行送信のテスト用）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 送信されたメッセージの一覧
    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for MockEmailTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError> {
        if let Some(events) = &self.events {
            events.deliver_start("mock", message);
        }
        let started = Instant::now();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(message.clone());

        let result = match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(TransportReceipt::new(Some(format!(
                "mock-{}",
                self.sent.lock().unwrap().len()
            )))),
        };

        if let Some(events) = &self.events {
            events.deliver_finished("mock", started, &result);
        }
        result
    }
}

// ===== MockEmailAuditLogRepository =====

/// 挿入された監査ログを記録するモックリポジトリ
#[derive(Clone, Default)]
pub struct MockEmailAuditLogRepository {
    logs:    Arc<Mutex<Vec<EmailAuditLog>>>,
    failing: bool,
}

impl MockEmailAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に挿入に失敗するモックを作成する
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// 挿入された監査ログの一覧
    pub fn logs(&self) -> Vec<EmailAuditLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailAuditLogRepository for MockEmailAuditLogRepository {
    async fn insert(&self, log: &EmailAuditLog) -> Result<(), InfraError> {
        if self.failing {
            return Err(InfraError::unexpected("監査ログストアに接続できません"));
        }
        self.logs.lock().unwrap().push(log.clone());
        Ok(())
    }
}
