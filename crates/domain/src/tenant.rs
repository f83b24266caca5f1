//! # テナント
//!
//! プラットフォームを利用する独立した組織（テナント）の識別子。
//!
//! ## 設計判断
//!
//! ### Newtype パターンの採用
//!
//! `TenantId` は `i64` をラップした Newtype である。プラットフォーム本体の
//! 組織テーブルが整数の連番主キーを採用しているため、それに合わせている。
//!
//! - 型安全性: 他の整数値（件数、ポート番号など）との取り違えを防ぐ
//! - 不変条件: 負の値は生成時に拒否する
//!
//! ## 使用例
//!
//! ```rust
//! use mailtrail_domain::tenant::TenantId;
//!
//! let tenant_id = TenantId::new(42).unwrap();
//! assert_eq!(tenant_id.as_i64(), 42);
//! assert!(TenantId::new(-1).is_err());
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// テナントの一意識別子
///
/// 監査ログはすべてこの ID で帰属先テナントを記録する。
///
/// # 不変条件
///
/// - 0 以上
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[display("{_0}")]
#[serde(try_from = "i64", into = "i64")]
pub struct TenantId(i64);

impl TenantId {
    /// テナント ID を作成する
    ///
    /// # エラー
    ///
    /// 負の値の場合は `DomainError::Validation` を返す。
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::Validation(format!(
                "テナント ID は 0 以上である必要があります: {value}"
            )));
        }
        Ok(Self(value))
    }

    /// 内部の整数値を取得する
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TenantId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for i64 {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(i64::MAX)]
    fn test_0以上の値を受け入れる(#[case] value: i64) {
        let id = TenantId::new(value).unwrap();
        assert_eq!(id.as_i64(), value);
    }

    #[rstest]
    #[case(-1)]
    #[case(i64::MIN)]
    fn test_負の値を拒否する(#[case] value: i64) {
        assert!(matches!(
            TenantId::new(value),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_displayは数値をそのまま出力する() {
        let id = TenantId::new(7).unwrap();
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_デシリアライズ時にも負の値を拒否する() {
        assert!(serde_json::from_str::<TenantId>("-5").is_err());
        assert_eq!(
            serde_json::from_str::<TenantId>("5").unwrap(),
            TenantId::new(5).unwrap()
        );
    }
}
