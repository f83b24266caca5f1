//! 送信処理のエラー分類

use thiserror::Error;

use super::TransportError;

/// 送信処理で発生するエラー
///
/// | バリアント | 発生タイミング | 監査ログ |
/// |-----------|--------------|---------|
/// | `Transport` | 送信アダプタが失敗を返した | `error` として 1 件記録済み |
/// | `AttributionMissing` | 送信前（帰属情報の検証） | 記録しない |
/// | `NoRecipients` | 送信前（宛先の検証） | 記録しない |
/// | `AuditPersistence` | 送信完了後の記録時 | 記録できなかった |
///
/// `AuditPersistence` は回復不能なエラーであり、送信結果に関わらず
/// 呼び出し側に成功として返してはならない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// 送信失敗（送信アダプタの結果をそのまま保持する）
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 帰属情報（カテゴリ・テナント ID）が欠落または不正
    #[error("帰属情報が不足しています: {0}")]
    AttributionMissing(String),

    /// 宛先が 1 件もない
    #[error("宛先が指定されていません")]
    NoRecipients,

    /// 監査ログの記録に失敗
    #[error("監査ログの記録に失敗: {0}")]
    AuditPersistence(String),
}
