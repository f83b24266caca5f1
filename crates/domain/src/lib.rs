//! # Mailtrail ドメイン層
//!
//! テナント向けトランザクションメールの送信と監査に関するドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **純粋性**: I/O を一切持たない。送信手段や監査ログの保存先はインフラ層の責務
//! - **型による契約**: 送信元・宛先・帰属情報（カテゴリ + テナント ID）を型で表現し、
//!   呼び出し側の契約違反を生成時に検出する
//! - **監査ログの不変性**: 監査ログは送信試行ごとにちょうど 1 件生成され、以後変更されない
//!
//! ## 依存関係の方向
//!
//! ```text
//! dispatch-service → infra → domain
//!          ↘                   ↑
//!            ─────────────────
//! ```
//!
//! ## モジュール構成
//!
//! - [`email`] - 送信メッセージ、帰属情報、監査ログ、送信エラー
//! - [`organization`] - 既定の宛先となる組織プロフィール
//! - [`tenant`] - テナント識別子
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mailtrail_domain::{
//!     email::{Attribution, EmailAddress, MailIdentities, Mailbox, MessageBuilder},
//!     organization::OrganizationProfile,
//! };
//!
//! let identities = MailIdentities::new(
//!     Mailbox::new("Mailtrail", EmailAddress::new("noreply@mailtrail.example.com")?),
//!     Mailbox::new("Support", EmailAddress::new("support@mailtrail.example.com")?),
//! );
//! let organization = OrganizationProfile::new("Acme", EmailAddress::new("ops@acme.example.com")?);
//!
//! let message = MessageBuilder::new(identities).build(&organization, "請求書\n発行", "本文", None);
//! assert_eq!(message.subject, "請求書発行");
//!
//! let attribution = Attribution::new("billing", 42)?;
//! assert_eq!(attribution.category().as_str(), "billing");
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod email;
pub mod error;
pub mod organization;
pub mod tenant;

pub use error::DomainError;
