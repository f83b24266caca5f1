//! # Dispatch Service エラー定義
//!
//! Dispatch Service 固有のエラーと、HTTP レスポンスへの変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailtrail_domain::{DomainError, email::DispatchError};
use mailtrail_shared::ErrorResponse;
use thiserror::Error;

/// Dispatch Service で発生するエラー
#[derive(Debug, Error)]
pub enum DispatchServiceError {
    /// 不正なリクエスト（アドレス形式、テナント ID 等）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 送信処理のエラー
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl From<DomainError> for DispatchServiceError {
    fn from(error: DomainError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl DispatchServiceError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            Self::Dispatch(DispatchError::Transport(e)) => {
                ErrorResponse::mail_transport_failed(e.to_string())
            }
            Self::Dispatch(e @ (DispatchError::AttributionMissing(_) | DispatchError::NoRecipients)) => {
                ErrorResponse::validation_error(e.to_string())
            }
            Self::Dispatch(e @ DispatchError::AuditPersistence(_)) => {
                tracing::error!(error = %e, "監査ログの記録に失敗したためリクエストを失敗させます");
                ErrorResponse::internal_error()
            }
        }
    }
}

impl IntoResponse for DispatchServiceError {
    fn into_response(self) -> Response {
        let body = self.to_error_response();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_domain::email::TransportError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::送信失敗は502(
        DispatchError::Transport(TransportError::Connection("refused".to_string())).into(),
        StatusCode::BAD_GATEWAY
    )]
    #[case::帰属情報なしは400(
        DispatchError::AttributionMissing("カテゴリ".to_string()).into(),
        StatusCode::BAD_REQUEST
    )]
    #[case::宛先なしは400(DispatchError::NoRecipients.into(), StatusCode::BAD_REQUEST)]
    #[case::監査ログ失敗は500(
        DispatchError::AuditPersistence("db down".to_string()).into(),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::不正リクエストは400(
        DispatchServiceError::BadRequest("bad".to_string()),
        StatusCode::BAD_REQUEST
    )]
    fn test_エラー種別ごとのステータスコード(
        #[case] error: DispatchServiceError,
        #[case] expected: StatusCode,
    ) {
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }

    #[test]
    fn test_監査ログ失敗の詳細はレスポンスに含めない() {
        let error: DispatchServiceError =
            DispatchError::AuditPersistence("connection refused: 10.0.0.5".to_string()).into();

        let body = error.to_error_response();

        assert_eq!(body.detail, "内部エラーが発生しました");
    }

    #[test]
    fn test_送信失敗の原因はそのままdetailになる() {
        let error: DispatchServiceError =
            DispatchError::Transport(TransportError::Rejected("550 no such user".to_string()))
                .into();

        let body = error.to_error_response();

        assert_eq!(body.detail, "送信プロバイダに拒否されました: 550 no such user");
        assert_eq!(
            body.error_type,
            "https://mailtrail.example.com/errors/mail-transport-failed"
        );
    }
}
