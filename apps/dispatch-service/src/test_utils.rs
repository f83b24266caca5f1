//! # テストユーティリティ
//!
//! ユニットテストと結合テストで共有するフィクスチャ。

use mailtrail_domain::{
    email::{EmailAddress, MailIdentities, Mailbox},
    organization::OrganizationProfile,
};

/// テスト用の固定送信者情報
pub fn test_identities() -> MailIdentities {
    MailIdentities::new(
        Mailbox::new(
            "Mailtrail",
            EmailAddress::new("noreply@mailtrail.example.com").unwrap(),
        ),
        Mailbox::new(
            "Mailtrail Support",
            EmailAddress::new("support@mailtrail.example.com").unwrap(),
        ),
    )
}

/// テスト用の組織プロファイル
pub fn test_organization() -> OrganizationProfile {
    OrganizationProfile::new("Acme", EmailAddress::new("ops@acme.example.com").unwrap())
}
