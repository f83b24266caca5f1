//! # メール送信サービス
//!
//! メッセージ送信 → 監査ログ記録を統合するサービス。
//!
//! ## 設計方針
//!
//! - **1 試行 1 記録**: 送信結果（成功・失敗）に関わらず、送信アダプタの応答後に
//!   ちょうど 1 件の監査ログを記録する
//! - **結果は素通し**: 送信アダプタの結果をそのまま呼び出し側に返す。リトライしない
//! - **記録失敗は致命的**: 監査ログを記録できなかった場合は送信結果に関わらず
//!   [`DispatchError::AuditPersistence`] を返す
//! - **依存性注入**: `EmailTransport` と `EmailAuditLogRepository` は trait で抽象化

use std::sync::Arc;

use mailtrail_domain::{
    clock::Clock,
    email::{
        Attribution,
        DispatchError,
        EmailAuditLog,
        Mailbox,
        MessageBuilder,
        OutboundMessage,
        TransportError,
        TransportReceipt,
    },
    organization::OrganizationProfile,
};
use mailtrail_infra::{email::EmailTransport, repository::EmailAuditLogRepository};
use mailtrail_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

/// メール送信サービス
///
/// 保持するのは `Arc` で共有された不変の協力オブジェクトのみで、
/// 送信ごとのロックは取らない。並行する送信は互いに独立する。
pub struct EmailDispatchService {
    transport:  Arc<dyn EmailTransport>,
    audit_repo: Arc<dyn EmailAuditLogRepository>,
    builder:    MessageBuilder,
    clock:      Arc<dyn Clock>,
}

impl EmailDispatchService {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        audit_repo: Arc<dyn EmailAuditLogRepository>,
        builder: MessageBuilder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            audit_repo,
            builder,
            clock,
        }
    }

    /// 共通メッセージを組み立てる
    ///
    /// [`MessageBuilder::build`] に委譲する。
    pub fn build_common_message(
        &self,
        organization: &OrganizationProfile,
        subject: &str,
        body: &str,
        recipient_override: Option<Mailbox>,
    ) -> OutboundMessage {
        self.builder
            .build(organization, subject, body, recipient_override)
    }

    /// メッセージを送信し、結果を監査ログに記録する
    ///
    /// ## 処理フロー
    ///
    /// 1. 宛先が空なら送信せずに [`DispatchError::NoRecipients`]（記録なし）
    /// 2. 送信アダプタの応答を待つ
    /// 3. 応答に応じて `sent` / `error` の監査ログを 1 件作成して記録
    /// 4. 送信アダプタの結果をそのまま返す
    ///
    /// 帰属情報は [`Attribution`] 型で受け取るため、欠落した状態では呼び出せない。
    #[tracing::instrument(
        skip_all,
        fields(
            tenant_id = %attribution.tenant_id(),
            category = %attribution.category(),
        )
    )]
    pub async fn send(
        &self,
        message: OutboundMessage,
        attribution: Attribution,
    ) -> Result<TransportReceipt, DispatchError> {
        if message.to.is_empty() {
            return Err(DispatchError::NoRecipients);
        }

        let outcome = self.transport.deliver(&message).await;

        self.record(&message, &attribution, &outcome).await?;
        log_outcome(&attribution, &outcome);

        outcome.map_err(DispatchError::Transport)
    }

    /// 監査ログを記録する
    async fn record(
        &self,
        message: &OutboundMessage,
        attribution: &Attribution,
        outcome: &Result<TransportReceipt, TransportError>,
    ) -> Result<(), DispatchError> {
        let persisted = match EmailAuditLog::from_outcome(
            attribution,
            message,
            outcome,
            self.clock.now(),
        ) {
            Ok(log) => self
                .audit_repo
                .insert(&log)
                .await
                .map_err(|e| (e.to_string(), Some(e))),
            Err(e) => Err((e.to_string(), None)),
        };

        if let Err((reason, infra_error)) = persisted {
            tracing::error!(
                error.category = log_error::category::INFRASTRUCTURE,
                error.kind = log_error::kind::AUDIT_PERSISTENCE,
                error = %reason,
                span_trace = ?infra_error.as_ref().map(|e| e.span_trace().to_string()),
                transport_succeeded = outcome.is_ok(),
                "監査ログの記録に失敗"
            );
            return Err(DispatchError::AuditPersistence(reason));
        }

        Ok(())
    }
}

fn log_outcome(attribution: &Attribution, outcome: &Result<TransportReceipt, TransportError>) {
    match outcome {
        Ok(receipt) => {
            log_business_event!(
                event.category = event::category::EMAIL,
                event.action = event::action::EMAIL_SENT,
                event.tenant_id = %attribution.tenant_id(),
                event.entity_type = event::entity_type::EMAIL_AUDIT_LOG,
                event.result = event::result::SUCCESS,
                email.category = %attribution.category(),
                email.provider_message_id = ?receipt.provider_message_id,
                "メール送信成功"
            );
        }
        Err(e) => {
            log_business_event!(
                event.category = event::category::EMAIL,
                event.action = event::action::EMAIL_FAILED,
                event.tenant_id = %attribution.tenant_id(),
                event.entity_type = event::entity_type::EMAIL_AUDIT_LOG,
                event.result = event::result::FAILURE,
                email.category = %attribution.category(),
                error = %e,
                "メール送信失敗"
            );
        }
    }
}
