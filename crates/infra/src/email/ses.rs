//! SES 送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。
//! 本番環境で使用する。

use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    error::{DisplayErrorContext, SdkError},
    types::{Body, Content, Destination, EmailContent, Message},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use mailtrail_domain::email::{Mailbox, OutboundMessage, TransportError, TransportReceipt};

use super::{EmailTransport, TransportEventBus};

const BACKEND: &str = "ses";

/// encoded-word 1 語に収める元データの最大バイト数
///
/// `=?UTF-8?B?` + Base64 60 文字 + `?=` で RFC 2047 の上限 75 文字に収まる。
const ENCODED_WORD_MAX_BYTES: usize = 45;

/// SES 送信
///
/// `aws_sdk_sesv2::Client` をラップする。
/// 本番環境で AWS SES を通じてメールを送信する。
pub struct SesEmailTransport {
    client: Client,
    events: TransportEventBus,
}

impl SesEmailTransport {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// 送信元アドレスはメッセージごとに指定する（SES で検証済みであること）。
    pub fn new(client: Client, events: TransportEventBus) -> Self {
        Self { client, events }
    }

    /// SDK のデフォルト設定でクライアントを作成する
    ///
    /// 認証情報とリージョンは SDK のデフォルトチェーン
    /// （`AWS_REGION` / `AWS_ACCESS_KEY_ID` / IAM ロール）で解決する。
    pub async fn from_env(events: TransportEventBus) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(Client::new(&config), events)
    }

    async fn send_message(
        &self,
        message: &OutboundMessage,
    ) -> Result<TransportReceipt, TransportError> {
        let content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(text_content(&message.subject, "件名")?)
                    .body(
                        Body::builder()
                            .text(text_content(&message.text_body, "本文")?)
                            .build(),
                    )
                    .build(),
            )
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(format_address(&message.from))
            .destination(build_destination(message))
            .content(content)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(TransportReceipt::new(
            output.message_id().map(ToString::to_string),
        ))
    }
}

#[async_trait]
impl EmailTransport for SesEmailTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<TransportReceipt, TransportError> {
        self.events.deliver_start(BACKEND, message);
        let started = Instant::now();

        let result = self.send_message(message).await;

        self.events.deliver_finished(BACKEND, started, &result);
        result
    }
}

fn text_content(data: &str, label: &str) -> Result<Content, TransportError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| TransportError::MessageBuild(format!("{label}構築失敗: {e}")))
}

/// SES に渡すアドレス文字列を組み立てる
///
/// SES はアドレスをヘッダにそのまま書き込むため、表示名はここで整形する。
/// ASCII のみの表示名は必要に応じて quoted-string（RFC 5322）に、
/// 非 ASCII を含む表示名は encoded-word（RFC 2047）にする。
fn format_address(mailbox: &Mailbox) -> String {
    match mailbox.display_name() {
        Some(name) if name.is_ascii() => format!("{} <{}>", quote_display_name(name), mailbox.address),
        Some(name) => format!("{} <{}>", encode_display_name(name), mailbox.address),
        None => mailbox.address.to_string(),
    }
}

fn is_atom_text(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b' ' || b"!#$%&'*+-/=?^_`{|}~".contains(&byte)
}

fn quote_display_name(name: &str) -> String {
    if name.bytes().all(is_atom_text) {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars().filter(|c| !c.is_ascii_control()) {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// 表示名を UTF-8 / Base64 の encoded-word に変換する
///
/// 長い表示名は文字境界で複数の encoded-word に分割する。
fn encode_display_name(name: &str) -> String {
    let mut words = Vec::new();
    let mut chunk = String::new();

    for c in name.chars().filter(|c| !c.is_control()) {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_MAX_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }

    words.join(" ")
}

fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", BASE64.encode(text))
}

fn mailbox_strings(mailboxes: &[Mailbox]) -> Vec<String> {
    mailboxes.iter().map(format_address).collect()
}

fn build_destination(message: &OutboundMessage) -> Destination {
    Destination::builder()
        .set_to_addresses(Some(mailbox_strings(&message.to)))
        .set_cc_addresses(Some(mailbox_strings(&message.cc)))
        .build()
}

/// SDK エラーを分類する
///
/// SES がリクエストを評価したうえで返したエラー（未検証アドレス、送信制限等）は
/// 業務上の失敗、リクエストが届かなかった場合はインフラ障害として扱う。
fn classify_sdk_error<E, R>(error: SdkError<E, R>) -> TransportError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&error).to_string();
    match error {
        SdkError::ServiceError(_) => TransportError::Rejected(detail),
        SdkError::ConstructionFailure(_) => TransportError::MessageBuild(detail),
        _ => TransportError::Connection(detail),
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_domain::email::EmailAddress;
    use pretty_assertions::assert_eq;

    use super::*;

    fn mailbox(name: &str, address: &str) -> Mailbox {
        Mailbox::new(name, EmailAddress::new(address).unwrap())
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesEmailTransport>();
    }

    #[test]
    fn 宛先とccが表示名付きで設定される() {
        let message = OutboundMessage {
            from:      mailbox("Mailtrail", "noreply@mailtrail.example.com"),
            to:        vec![mailbox("Acme", "ops@acme.example.com")],
            cc:        vec![mailbox("Mailtrail Support", "support@mailtrail.example.com")],
            subject:   "件名".to_string(),
            text_body: "本文".to_string(),
        };

        let destination = build_destination(&message);

        assert_eq!(destination.to_addresses(), ["Acme <ops@acme.example.com>"]);
        assert_eq!(
            destination.cc_addresses(),
            ["Mailtrail Support <support@mailtrail.example.com>"]
        );
    }

    #[test]
    fn カンマを含む表示名はクォートされる() {
        let formatted = format_address(&mailbox("Acme, Inc.", "ops@acme.example.com"));

        assert_eq!(formatted, r#""Acme, Inc." <ops@acme.example.com>"#);
        let parsed: lettre::message::Mailbox = formatted.parse().unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Acme, Inc."));
        assert_eq!(parsed.email.to_string(), "ops@acme.example.com");
    }

    #[test]
    fn 表示名のダブルクォートとバックスラッシュはエスケープされる() {
        let formatted = format_address(&mailbox(r#"Say "Hi" \ Co"#, "ops@acme.example.com"));

        assert_eq!(formatted, r#""Say \"Hi\" \\ Co" <ops@acme.example.com>"#);
    }

    #[test]
    fn 非asciiの表示名はencoded_wordになる() {
        let formatted = format_address(&mailbox("経理担当", "billing@acme.example.com"));

        assert!(formatted.is_ascii(), "{formatted}");
        let (word, address) = formatted.split_once(' ').unwrap();
        assert_eq!(address, "<billing@acme.example.com>");
        let encoded = word
            .strip_prefix("=?UTF-8?B?")
            .and_then(|w| w.strip_suffix("?="))
            .unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), "経理担当".as_bytes());
    }

    #[test]
    fn 長い非asciiの表示名は複数のencoded_wordに分割される() {
        let name = "株式会社テスト商事経理部請求書発行担当窓口".repeat(2);
        let formatted = format_address(&mailbox(&name, "billing@acme.example.com"));

        let words: Vec<&str> = formatted
            .strip_suffix(" <billing@acme.example.com>")
            .unwrap()
            .split(' ')
            .collect();
        assert!(words.len() > 1);
        let decoded: Vec<u8> = words
            .iter()
            .flat_map(|word| {
                assert!(word.len() <= 75, "{word}");
                let encoded = word
                    .strip_prefix("=?UTF-8?B?")
                    .and_then(|w| w.strip_suffix("?="))
                    .unwrap();
                BASE64.decode(encoded).unwrap()
            })
            .collect();
        assert_eq!(String::from_utf8(decoded).unwrap(), name);
    }

    #[test]
    fn 表示名が空ならアドレスのみになる() {
        assert_eq!(
            format_address(&mailbox("  ", "ops@acme.example.com")),
            "ops@acme.example.com"
        );
    }

    #[test]
    fn 本文コンテンツはutf8で構築される() {
        let content = text_content("こんにちは", "本文").unwrap();

        assert_eq!(content.data(), "こんにちは");
        assert_eq!(content.charset(), Some("UTF-8"));
    }
}
