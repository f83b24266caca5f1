//! メール送信 API 結合テスト
//!
//! ルーター全体（ハンドラ → 送信サービス → 送信アダプタ / 監査ログリポジトリ）を
//! `tower::ServiceExt::oneshot` で呼び出して検証する。
//! 送信アダプタとリポジトリはインメモリモックを使用する。
//!
//! ## テストケース
//!
//! - GET /health が healthy を返す
//! - 送信成功で 200 と sent の監査ログ
//! - 送信失敗で 502 と error の監査ログ
//! - 帰属情報の欠落で 400、送信も記録もしない
//! - 不正なアドレスで 400
//! - 監査ログの記録失敗で 500（詳細は隠す）
//! - 宛先の上書きと固定 CC
//! - 送信例外は例外シンクで数えられ、監査ログは 1 件のまま

use std::sync::Arc;

use axum::{Router, body::Body};
use chrono::{TimeZone, Utc};
use http::{Method, Request, StatusCode};
use mailtrail_dispatch_service::{
    handler::{EmailState, SendEmailResponse},
    router,
    telemetry::TransportExceptionSink,
    test_utils::test_identities,
    usecase::EmailDispatchService,
};
use mailtrail_domain::{
    clock::FixedClock,
    email::{EmailAuditStatus, MessageBuilder, TransportError},
};
use mailtrail_infra::{
    email::TransportEventBus,
    mock::{MockEmailAuditLogRepository, MockEmailTransport},
};
use mailtrail_shared::{ApiResponse, ErrorResponse, HealthResponse};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_app(transport: MockEmailTransport, audit_repo: MockEmailAuditLogRepository) -> Router {
    let service = EmailDispatchService::new(
        Arc::new(transport),
        Arc::new(audit_repo),
        MessageBuilder::new(test_identities()),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )),
    );
    router(Arc::new(EmailState { service }))
}

fn send_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/internal/emails")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> Value {
    json!({
        "category": "billing",
        "tenant_id": 42,
        "organization": { "name": "Acme", "email": "ops@acme.example.com" },
        "subject": "請求書のお知らせ",
        "body": "今月の請求書を発行しました。"
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ヘルスチェックがhealthyを返す() {
    let app = create_app(MockEmailTransport::new(), MockEmailAuditLogRepository::new());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = read_json(response).await;
    assert_eq!(body.status, "healthy");
}

#[tokio::test]
async fn test_送信成功で200とsentの監査ログを返す() {
    let transport = MockEmailTransport::new();
    let audit_repo = MockEmailAuditLogRepository::new();
    let app = create_app(transport.clone(), audit_repo.clone());

    let response = app.oneshot(send_request(valid_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<SendEmailResponse> = read_json(response).await;
    assert_eq!(
        body.data,
        SendEmailResponse {
            status:              "sent".to_string(),
            provider_message_id: Some("mock-1".to_string()),
        }
    );

    let logs = audit_repo.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, EmailAuditStatus::Sent);
    assert_eq!(logs[0].tenant_id.as_i64(), 42);
    assert_eq!(logs[0].category.as_str(), "billing");

    let sent = transport.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to[0].address.as_str(), "ops@acme.example.com");
    assert_eq!(sent[0].from.address.as_str(), "noreply@mailtrail.example.com");
    assert_eq!(sent[0].cc[0].address.as_str(), "support@mailtrail.example.com");
}

#[tokio::test]
async fn test_送信失敗で502とerrorの監査ログを返す() {
    let audit_repo = MockEmailAuditLogRepository::new();
    let app = create_app(
        MockEmailTransport::failing(TransportError::Rejected(
            "554 message rejected".to_string(),
        )),
        audit_repo.clone(),
    );

    let response = app.oneshot(send_request(valid_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(
        body.error_type,
        "https://mailtrail.example.com/errors/mail-transport-failed"
    );
    assert!(body.detail.contains("554 message rejected"));

    let logs = audit_repo.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, EmailAuditStatus::Error);
    assert!(logs[0].error_message.as_deref().unwrap().contains("554"));
}

#[tokio::test]
async fn test_帰属情報がないと400で送信も記録もしない() {
    let transport = MockEmailTransport::new();
    let audit_repo = MockEmailAuditLogRepository::new();
    let app = create_app(transport.clone(), audit_repo.clone());
    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("tenant_id");

    let response = app.oneshot(send_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(transport.sent_messages().is_empty());
    assert!(audit_repo.logs().is_empty());
}

#[tokio::test]
async fn test_不正なアドレスは400を返す() {
    let audit_repo = MockEmailAuditLogRepository::new();
    let app = create_app(MockEmailTransport::new(), audit_repo.clone());
    let mut body = valid_body();
    body["organization"]["email"] = json!("not-an-address");

    let response = app.oneshot(send_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(audit_repo.logs().is_empty());
}

#[tokio::test]
async fn test_監査ログの記録に失敗すると500で詳細を隠す() {
    let transport = MockEmailTransport::new();
    let app = create_app(transport.clone(), MockEmailAuditLogRepository::failing());

    let response = app.oneshot(send_request(valid_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.detail, "内部エラーが発生しました");
    assert_eq!(transport.sent_messages().len(), 1);
}

#[tokio::test]
async fn test_宛先を上書きしても件名の改行は除去されccは固定() {
    let transport = MockEmailTransport::new();
    let audit_repo = MockEmailAuditLogRepository::new();
    let app = create_app(transport.clone(), audit_repo.clone());
    let mut body = valid_body();
    body["subject"] = json!("Hi\nthere");
    body["recipient"] = json!({ "name": "経理担当", "email": "billing@acme.example.com" });

    let response = app.oneshot(send_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = transport.sent_messages();
    assert_eq!(sent[0].subject, "Hithere");
    assert_eq!(sent[0].to.len(), 1);
    assert_eq!(sent[0].to[0].name, "経理担当");
    assert_eq!(sent[0].to[0].address.as_str(), "billing@acme.example.com");
    assert_eq!(sent[0].cc[0].address.as_str(), "support@mailtrail.example.com");
    assert_eq!(audit_repo.logs()[0].content["subject"], "Hithere");
}

#[tokio::test]
async fn test_送信例外は例外シンクで数えられ監査ログは1件のまま() {
    let events = TransportEventBus::default();
    let sink = TransportExceptionSink::attach(&events);
    let audit_repo = MockEmailAuditLogRepository::new();
    let transport =
        MockEmailTransport::failing(TransportError::Connection("connection reset".to_string()))
            .with_events(events);
    let app = create_app(transport, audit_repo.clone());

    let response = app.oneshot(send_request(valid_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(audit_repo.logs().len(), 1);
    assert_eq!(sink.shutdown().await, 1);
}
