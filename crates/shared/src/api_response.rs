//! # API レスポンスエンベロープ
//!
//! 内部 API の統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 内部 API の統一レスポンス型
///
/// Dispatch Service のハンドラが Serialize でレスポンスを返し、
/// 結合テストでは Deserialize でレスポンスを検証する。
///
/// ## 使用例
///
/// ```
/// use mailtrail_shared::ApiResponse;
///
/// let response = ApiResponse::new("sent");
/// assert_eq!(response.data, "sent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataキーでラップしてシリアライズする() {
        let response = ApiResponse::new(serde_json::json!({ "status": "sent" }));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "data": { "status": "sent" } }));
    }

    #[test]
    fn test_deserializeでjsonからオブジェクトに変換する() {
        let json = r#"{"data": "error"}"#;
        let response: ApiResponse<String> = serde_json::from_str(json).unwrap();

        assert_eq!(response.data, "error");
    }
}
