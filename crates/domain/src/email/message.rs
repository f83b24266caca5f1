//! 送信メッセージと共通メッセージの組み立て

use serde::{Deserialize, Serialize};

use super::Mailbox;
use crate::organization::OrganizationProfile;

/// 送信メッセージ
///
/// 送信 1 回分の正規化されたメール。呼び出しごとに生成され、
/// 送信後は破棄される（永続化されるのは監査ログのスナップショットのみ）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// 送信元
    pub from:      Mailbox,
    /// 宛先
    pub to:        Vec<Mailbox>,
    /// CC
    pub cc:        Vec<Mailbox>,
    /// 件名（1 行）
    pub subject:   String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 固定の送信者情報
///
/// すべての通知メールの送信元と、各通知を独立して確認できるよう
/// 常に CC に加えるサポート窓口。呼び出しごとには変更できない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailIdentities {
    pub default_sender: Mailbox,
    pub support_cc:     Mailbox,
}

impl MailIdentities {
    pub fn new(default_sender: Mailbox, support_cc: Mailbox) -> Self {
        Self {
            default_sender,
            support_cc,
        }
    }
}

/// 共通メッセージビルダー
///
/// 組織プロフィール・件名・本文から [`OutboundMessage`] を組み立てる。
/// I/O を持たない純粋な変換。
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    identities: MailIdentities,
}

impl MessageBuilder {
    pub fn new(identities: MailIdentities) -> Self {
        Self { identities }
    }

    /// 共通メッセージを組み立てる
    ///
    /// - 件名から改行文字を取り除く
    /// - `recipient_override` がなければ組織の名前とアドレスを宛先にする
    /// - 送信元と CC は常に [`MailIdentities`] の値
    pub fn build(
        &self,
        organization: &OrganizationProfile,
        subject: &str,
        body: &str,
        recipient_override: Option<Mailbox>,
    ) -> OutboundMessage {
        let recipient = recipient_override.unwrap_or_else(|| organization.mailbox());

        OutboundMessage {
            from:      self.identities.default_sender.clone(),
            to:        vec![recipient],
            cc:        vec![self.identities.support_cc.clone()],
            subject:   strip_line_breaks(subject),
            text_body: body.to_string(),
        }
    }
}

/// 改行文字（`\r` / `\n`）をすべて取り除く
///
/// 送信アダプタは 1 行の件名しか受け付けない。
pub fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}
