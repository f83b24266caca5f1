//! # 送信例外シンク
//!
//! 送信アダプタが発行する例外イベント（`mailer.deliver.exception`）を購読し、
//! 警告ログとして出力する帯域外の観測者。
//!
//! ## 設計方針
//!
//! - **送信処理から独立**: 専用タスクで [`TransportEventBus`] を購読する。
//!   シンクの遅延や停止は送信に影響しない
//! - **記録しない**: 監査ログは書かない。ログ出力のみ
//! - **明示的なライフサイクル**: 起動時に [`TransportExceptionSink::attach`] で 1 度だけ接続し、
//!   サーバー停止後に [`ExceptionSinkHandle::shutdown`] で取り外す

use mailtrail_infra::email::{TransportEvent, TransportEventBus};
use mailtrail_shared::event_log::error as log_error;
use tokio::{
    sync::{broadcast, oneshot},
    task::JoinHandle,
};

/// 送信例外シンク
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportExceptionSink;

impl TransportExceptionSink {
    /// 送信イベントを処理する
    ///
    /// 例外イベントなら警告ログを出力して `true` を返す。
    /// それ以外のイベントは無視して `false` を返す。
    pub fn on_transport_event(&self, event: &TransportEvent) -> bool {
        if !event.is_exception() {
            return false;
        }

        tracing::warn!(
            error.category = log_error::category::EXTERNAL_SERVICE,
            error.kind = log_error::kind::TRANSPORT_EXCEPTION,
            event.name = %event.name,
            metadata = %event.metadata,
            occurred_at = %event.occurred_at,
            "メール送信中に例外が発生"
        );
        true
    }

    /// イベントバスに接続し、購読タスクを起動する
    pub fn attach(bus: &TransportEventBus) -> ExceptionSinkHandle {
        let receiver = bus.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(TransportExceptionSink.run(receiver, shutdown_rx));

        tracing::debug!("送信例外シンクを接続しました");

        ExceptionSinkHandle { shutdown_tx, task }
    }

    /// 購読ループ
    ///
    /// 停止要求を受けたら、バッファ済みのイベントを処理してから終了する。
    /// バスが閉じられた場合もそこで終了する。
    async fn run(
        self,
        mut receiver: broadcast::Receiver<TransportEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> u64 {
        let mut logged = 0;

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    logged += self.drain(&mut receiver);
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        logged += u64::from(self.on_transport_event(&event));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "送信例外シンクが遅延し、イベントを取りこぼしました");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("送信イベントバスが閉じられたため、シンクを終了します");
                        break;
                    }
                },
            }
        }

        logged
    }

    /// バッファ済みのイベントを待たずに処理する
    fn drain(&self, receiver: &mut broadcast::Receiver<TransportEvent>) -> u64 {
        let mut logged = 0;

        loop {
            match receiver.try_recv() {
                Ok(event) => logged += u64::from(self.on_transport_event(&event)),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "送信例外シンクが遅延し、イベントを取りこぼしました");
                }
                Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                    return logged;
                }
            }
        }
    }
}

/// 起動済みシンクのハンドル
#[derive(Debug)]
pub struct ExceptionSinkHandle {
    shutdown_tx: oneshot::Sender<()>,
    task:        JoinHandle<u64>,
}

impl ExceptionSinkHandle {
    /// シンクを停止し、ログ出力した例外イベントの件数を返す
    pub async fn shutdown(self) -> u64 {
        // タスクが先に終了している場合は送信に失敗するが、結果の取得には影響しない
        let _ = self.shutdown_tx.send(());

        match self.task.await {
            Ok(logged) => {
                tracing::debug!(logged, "送信例外シンクを停止しました");
                logged
            }
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::INTERNAL,
                    error = %e,
                    "送信例外シンクのタスクが異常終了しました"
                );
                0
            }
        }
    }
}
