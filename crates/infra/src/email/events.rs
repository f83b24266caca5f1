//! # 送信イベントバス
//!
//! 送信アダプタが発行する計装イベント（開始・終了・例外）を
//! `tokio::sync::broadcast` で配信する。
//!
//! 発行側は購読者の有無や遅延を一切気にしない。`publish` は送信エラーを無視するため、
//! 購読者の不在や失敗が送信処理に波及することはない。

use std::time::Instant;

use chrono::{DateTime, Utc};
use mailtrail_domain::email::{OutboundMessage, TransportError, TransportReceipt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// イベント名
pub mod event_name {
    /// 送信開始
    pub const DELIVER_START: &str = "mailer.deliver.start";
    /// 送信終了（成功・業務的な失敗の両方）
    pub const DELIVER_STOP: &str = "mailer.deliver.stop";
    /// 送信中のインフラ障害（接続、TLS、タイムアウト）
    pub const DELIVER_EXCEPTION: &str = "mailer.deliver.exception";
}

/// バッファ容量のデフォルト値
const DEFAULT_CAPACITY: usize = 1024;

/// 送信計装イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportEvent {
    /// ドット区切りのイベント名（[`event_name`] のいずれか）
    pub name:        String,
    /// イベント固有のメタデータ
    pub metadata:    serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl TransportEvent {
    pub fn new(name: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            metadata,
            occurred_at: Utc::now(),
        }
    }

    /// 例外イベントかどうか
    pub fn is_exception(&self) -> bool {
        self.name == event_name::DELIVER_EXCEPTION
    }
}

/// 送信イベントバス
///
/// 送信アダプタと購読者（例外シンク等）で共有する。
/// `Clone` は同じチャネルへのハンドルを複製する。
///
/// ```
/// use mailtrail_infra::email::{TransportEvent, TransportEventBus, event_name};
///
/// let bus = TransportEventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(TransportEvent::new(event_name::DELIVER_START, serde_json::json!({})));
/// assert_eq!(rx.try_recv().unwrap().name, "mailer.deliver.start");
/// ```
#[derive(Debug, Clone)]
pub struct TransportEventBus {
    sender: broadcast::Sender<TransportEvent>,
}

impl TransportEventBus {
    /// 容量を指定してバスを作成する
    ///
    /// バッファが溢れると古いイベントから破棄され、
    /// 遅れた購読者は `RecvError::Lagged` を受け取る。
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// イベントを発行する
    ///
    /// 購読者がいない場合は黙って破棄する。
    pub fn publish(&self, event: TransportEvent) {
        let _ = self.sender.send(event);
    }

    /// 購読を開始する
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.sender.subscribe()
    }

    /// 送信開始イベントを発行する
    pub fn deliver_start(&self, backend: &str, message: &OutboundMessage) {
        self.publish(TransportEvent::new(
            event_name::DELIVER_START,
            serde_json::json!({
                "backend": backend,
                "subject": message.subject,
                "to_count": message.to.len(),
                "cc_count": message.cc.len(),
            }),
        ));
    }

    /// 送信結果に応じて終了イベントまたは例外イベントを発行する
    ///
    /// 例外イベントになるのは [`TransportError::Connection`] のみ。
    /// 拒否やアドレス不正は業務上の失敗として終了イベントで通知する。
    pub fn deliver_finished(
        &self,
        backend: &str,
        started: Instant,
        result: &Result<TransportReceipt, TransportError>,
    ) {
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let event = match result {
            Ok(receipt) => TransportEvent::new(
                event_name::DELIVER_STOP,
                serde_json::json!({
                    "backend": backend,
                    "result": "ok",
                    "provider_message_id": receipt.provider_message_id,
                    "duration_ms": duration_ms,
                }),
            ),
            Err(e @ TransportError::Connection(_)) => TransportEvent::new(
                event_name::DELIVER_EXCEPTION,
                serde_json::json!({
                    "backend": backend,
                    "kind": e.kind(),
                    "reason": e.to_string(),
                    "duration_ms": duration_ms,
                }),
            ),
            Err(e) => TransportEvent::new(
                event_name::DELIVER_STOP,
                serde_json::json!({
                    "backend": backend,
                    "result": "error",
                    "kind": e.kind(),
                    "duration_ms": duration_ms,
                }),
            ),
        };

        self.publish(event);
    }
}

impl Default for TransportEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_domain::email::{EmailAddress, Mailbox};

    use super::*;

    fn make_message() -> OutboundMessage {
        let mailbox = |name: &str, address: &str| {
            Mailbox::new(name, EmailAddress::new(address).unwrap())
        };
        OutboundMessage {
            from:      mailbox("Mailtrail", "noreply@mailtrail.example.com"),
            to:        vec![mailbox("Acme", "ops@acme.example.com")],
            cc:        vec![mailbox("Support", "support@mailtrail.example.com")],
            subject:   "請求書のお知らせ".to_string(),
            text_body: "本文".to_string(),
        }
    }

    #[test]
    fn test_購読者がいなくてもpublishはパニックしない() {
        let bus = TransportEventBus::default();

        bus.publish(TransportEvent::new(
            event_name::DELIVER_START,
            serde_json::json!({}),
        ));
    }

    #[test]
    fn test_deliver_startが宛先数を含む開始イベントを発行する() {
        let bus = TransportEventBus::default();
        let mut rx = bus.subscribe();

        bus.deliver_start("smtp", &make_message());

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, event_name::DELIVER_START);
        assert_eq!(event.metadata["backend"], "smtp");
        assert_eq!(event.metadata["to_count"], 1);
        assert_eq!(event.metadata["cc_count"], 1);
        assert!(!event.is_exception());
    }

    #[test]
    fn test_成功時は終了イベントを発行する() {
        let bus = TransportEventBus::default();
        let mut rx = bus.subscribe();
        let result = Ok(TransportReceipt::new(Some("msg-1".to_string())));

        bus.deliver_finished("ses", Instant::now(), &result);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, event_name::DELIVER_STOP);
        assert_eq!(event.metadata["result"], "ok");
        assert_eq!(event.metadata["provider_message_id"], "msg-1");
    }

    #[test]
    fn test_接続障害は例外イベントになる() {
        let bus = TransportEventBus::default();
        let mut rx = bus.subscribe();
        let result = Err(TransportError::Connection("timed out".to_string()));

        bus.deliver_finished("smtp", Instant::now(), &result);

        let event = rx.try_recv().unwrap();
        assert!(event.is_exception());
        assert_eq!(event.metadata["kind"], "connection");
        assert_eq!(
            event.metadata["reason"],
            "送信プロバイダとの通信に失敗: timed out"
        );
    }

    #[test]
    fn test_プロバイダの拒否は例外イベントにならない() {
        let bus = TransportEventBus::default();
        let mut rx = bus.subscribe();
        let result = Err(TransportError::Rejected("550 mailbox unavailable".to_string()));

        bus.deliver_finished("smtp", Instant::now(), &result);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.name, event_name::DELIVER_STOP);
        assert_eq!(event.metadata["result"], "error");
        assert_eq!(event.metadata["kind"], "rejected");
    }

    #[test]
    fn test_cloneしたバスは同じチャネルに発行する() {
        let bus = TransportEventBus::default();
        let mut rx = bus.subscribe();

        bus.clone().publish(TransportEvent::new(
            event_name::DELIVER_EXCEPTION,
            serde_json::json!({ "backend": "noop" }),
        ));

        assert!(rx.try_recv().unwrap().is_exception());
    }
}
