//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に検出される入力不正を表現するエラー型。
//!
//! 送信処理固有のエラー（送信失敗、帰属情報の欠落、監査ログ記録失敗）は
//! [`crate::email::DispatchError`] で別途定義する。
//!
//! ## 使用例
//!
//! ```rust
//! use mailtrail_domain::DomainError;
//!
//! fn validate_subject(subject: &str) -> Result<(), DomainError> {
//!     if subject.is_empty() {
//!         return Err(DomainError::Validation("件名は必須です".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 不正なフォーマット
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
