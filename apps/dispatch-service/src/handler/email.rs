//! # メール送信ハンドラ
//!
//! 内部サービスからの送信依頼を受け付け、共通メッセージを組み立てて送信する。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /internal/emails
//! ```
//!
//! ## リクエスト例
//!
//! ```json
//! {
//!   "category": "billing",
//!   "tenant_id": 42,
//!   "organization": { "name": "Acme", "email": "ops@acme.example.com" },
//!   "subject": "請求書のお知らせ",
//!   "body": "今月の請求書を発行しました。",
//!   "recipient": { "name": "経理担当", "email": "billing@acme.example.com" }
//! }
//! ```

use std::sync::Arc;

use axum::{Json, extract::State};
use mailtrail_domain::{
    email::{Attribution, DispatchError, EmailAddress, Mailbox},
    organization::OrganizationProfile,
};
use mailtrail_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{error::DispatchServiceError, usecase::EmailDispatchService};

/// メール送信ハンドラの State
pub struct EmailState {
    pub service: EmailDispatchService,
}

/// 名前とアドレスの組
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxDto {
    pub name:  String,
    pub email: String,
}

/// 送信リクエスト
///
/// 帰属情報（`category` / `tenant_id`）の欠落は JSON の形式エラーではなく
/// 帰属情報エラーとして扱うため、`Option` で受け取る。
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub category:     Option<String>,
    pub tenant_id:    Option<i64>,
    pub organization: MailboxDto,
    pub subject:      String,
    pub body:         String,
    pub recipient:    Option<MailboxDto>,
}

/// 送信レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailResponse {
    pub status:              String,
    pub provider_message_id: Option<String>,
}

impl SendEmailRequest {
    fn attribution(&self) -> Result<Attribution, DispatchError> {
        let category = self
            .category
            .clone()
            .ok_or_else(|| DispatchError::AttributionMissing("カテゴリは必須です".to_string()))?;
        let tenant_id = self
            .tenant_id
            .ok_or_else(|| DispatchError::AttributionMissing("テナント ID は必須です".to_string()))?;

        Attribution::new(category, tenant_id)
    }
}

/// メールを送信する
///
/// ## エンドポイント
/// POST /internal/emails
///
/// ## 処理フロー
/// 1. 帰属情報とアドレスを検証（失敗時は送信も記録もしない）
/// 2. 共通メッセージを組み立て
/// 3. 送信して監査ログを記録
pub async fn send_email(
    State(state): State<Arc<EmailState>>,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<ApiResponse<SendEmailResponse>>, DispatchServiceError> {
    let attribution = req.attribution()?;

    let organization = OrganizationProfile::new(
        req.organization.name,
        EmailAddress::new(req.organization.email)?,
    );
    let recipient = req
        .recipient
        .map(|r| EmailAddress::new(r.email).map(|address| Mailbox::new(r.name, address)))
        .transpose()?;

    let message =
        state
            .service
            .build_common_message(&organization, &req.subject, &req.body, recipient);

    let receipt = state.service.send(message, attribution).await?;

    Ok(Json(ApiResponse::new(SendEmailResponse {
        status:              "sent".to_string(),
        provider_message_id: receipt.provider_message_id,
    })))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn request(category: Option<&str>, tenant_id: Option<i64>) -> SendEmailRequest {
        SendEmailRequest {
            category: category.map(ToString::to_string),
            tenant_id,
            organization: MailboxDto {
                name:  "Acme".to_string(),
                email: "ops@acme.example.com".to_string(),
            },
            subject: "件名".to_string(),
            body: "本文".to_string(),
            recipient: None,
        }
    }

    #[rstest]
    #[case::カテゴリなし(None, Some(1))]
    #[case::テナントなし(Some("billing"), None)]
    #[case::カテゴリが空(Some("  "), Some(1))]
    #[case::テナントが負(Some("billing"), Some(-1))]
    fn test_帰属情報が不足していればattribution_missing(
        #[case] category: Option<&str>,
        #[case] tenant_id: Option<i64>,
    ) {
        let result = request(category, tenant_id).attribution();

        assert!(matches!(result, Err(DispatchError::AttributionMissing(_))));
    }

    #[test]
    fn test_帰属情報がそろっていればattributionを返す() {
        let attribution = request(Some("billing"), Some(42)).attribution().unwrap();

        assert_eq!(attribution.category().as_str(), "billing");
        assert_eq!(attribution.tenant_id().as_i64(), 42);
    }
}
