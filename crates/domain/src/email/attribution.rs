//! 帰属情報（カテゴリ + テナント ID）

use super::DispatchError;
use crate::tenant::TenantId;

define_validated_string! {
    /// メールカテゴリ
    ///
    /// 送信理由を表す自由形式のタグ（例: `"billing"`, `"alert"`, `"onboarding"`）。
    /// 監査ログの集計キーとして使われる。
    pub struct EmailCategory {
        label: "カテゴリ",
        max_length: 64,
    }
}

/// 帰属情報
///
/// すべての送信呼び出しで必須。欠落は回復可能なエラーではなく
/// 呼び出し側の契約違反として扱い、送信前に拒否する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    category:  EmailCategory,
    tenant_id: TenantId,
}

impl Attribution {
    /// 生の値から帰属情報を作成する
    ///
    /// カテゴリが空、またはテナント ID が負の場合は
    /// [`DispatchError::AttributionMissing`] を返す。
    pub fn new(category: impl Into<String>, tenant_id: i64) -> Result<Self, DispatchError> {
        let category = EmailCategory::new(category)
            .map_err(|e| DispatchError::AttributionMissing(e.to_string()))?;
        let tenant_id =
            TenantId::new(tenant_id).map_err(|e| DispatchError::AttributionMissing(e.to_string()))?;

        Ok(Self::from_parts(category, tenant_id))
    }

    /// 検証済みの値から帰属情報を作成する
    pub fn from_parts(category: EmailCategory, tenant_id: TenantId) -> Self {
        Self {
            category,
            tenant_id,
        }
    }

    pub fn category(&self) -> &EmailCategory {
        &self.category
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
