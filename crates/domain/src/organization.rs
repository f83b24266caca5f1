//! # 組織プロフィール
//!
//! 共通メッセージの既定の宛先となる組織（テナント）の名前とメールアドレス。
//! 組織レコード自体の作成・更新はプラットフォーム本体の責務であり、
//! このサブシステムは呼び出し側から受け取った値をそのまま使う。

use serde::{Deserialize, Serialize};

use crate::email::{EmailAddress, Mailbox};

/// 組織プロフィール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    /// 組織の表示名
    pub name:  String,
    /// 組織の代表メールアドレス
    pub email: EmailAddress,
}

impl OrganizationProfile {
    pub fn new(name: impl Into<String>, email: EmailAddress) -> Self {
        Self {
            name: name.into(),
            email,
        }
    }

    /// 組織を宛先とするメールボックスを返す
    pub fn mailbox(&self) -> Mailbox {
        Mailbox::new(self.name.clone(), self.email.clone())
    }
}
