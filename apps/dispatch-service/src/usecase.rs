//! # ユースケース層
//!
//! Dispatch Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信アダプタとリポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約

pub mod email_dispatch;

pub use email_dispatch::EmailDispatchService;
