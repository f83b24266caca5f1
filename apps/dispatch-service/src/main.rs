//! # Dispatch Service サーバー
//!
//! テナント向けトランザクションメールを送信し、すべての送信試行を監査ログに記録する内部サービス。
//!
//! ## 役割
//!
//! - **共通メッセージの組み立て**: 組織プロファイルから宛先を決め、固定の送信元と CC を付与
//! - **送信と記録**: 送信アダプタの結果に関わらず 1 試行につき 1 件の監査ログを記録
//! - **例外の観測**: 送信中のインフラ障害を警告ログとして出力
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DISPATCH_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `DISPATCH_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `MAIL_TRANSPORT` | No | `noop` / `smtp` / `ses`（デフォルト: `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP 接続先（デフォルト: `localhost:1025`） |
//! | `MAIL_DEFAULT_SENDER_NAME` / `MAIL_DEFAULT_SENDER_ADDRESS` | No | 送信元 |
//! | `MAIL_SUPPORT_CC_NAME` / `MAIL_SUPPORT_CC_ADDRESS` | No | 常に CC に加えるサポート窓口 |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `LOG_SPAN_TRACE` | No | `false` でエラーの SpanTrace 収集を無効化 |
//!
//! ## 起動方法
//!
//! ```bash
//! DISPATCH_PORT=3100 DATABASE_URL=postgres://... cargo run -p mailtrail-dispatch-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use mailtrail_dispatch_service::{
    config::{DispatchConfig, TransportConfig},
    handler::EmailState,
    router,
    telemetry::TransportExceptionSink,
    usecase::EmailDispatchService,
};
use mailtrail_domain::{clock::SystemClock, email::MessageBuilder};
use mailtrail_infra::{
    db,
    email::{
        EmailTransport,
        NoopEmailTransport,
        SesEmailTransport,
        SmtpEmailTransport,
        TransportEventBus,
    },
    repository::PostgresEmailAuditLogRepository,
};
use mailtrail_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// Dispatch Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("dispatch-service"));

    let config = DispatchConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Dispatch Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // 送信イベントバスと例外シンク（サーバー停止後に取り外す）
    let events = TransportEventBus::default();
    let sink = TransportExceptionSink::attach(&events);

    let transport = create_transport(&config.transport, events).await;
    tracing::info!(
        backend = config.transport.backend_name(),
        "送信バックエンドを初期化しました"
    );

    let service = EmailDispatchService::new(
        transport,
        Arc::new(PostgresEmailAuditLogRepository::new(pool)),
        MessageBuilder::new(config.identities.to_identities()?),
        Arc::new(SystemClock),
    );
    let app = router(Arc::new(EmailState { service }));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Dispatch Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let exceptions = sink.shutdown().await;
    tracing::info!(exceptions, "Dispatch Service サーバーを停止しました");

    Ok(())
}

/// 設定に応じた送信アダプタを作成する
async fn create_transport(
    config: &TransportConfig,
    events: TransportEventBus,
) -> Arc<dyn EmailTransport> {
    match config {
        TransportConfig::Noop => Arc::new(NoopEmailTransport::new(events)),
        TransportConfig::Smtp { host, port } => {
            Arc::new(SmtpEmailTransport::new(host, *port, events))
        }
        TransportConfig::Ses => Arc::new(SesEmailTransport::from_env(events).await),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "シグナルハンドラの登録に失敗しました");
        std::future::pending::<()>().await;
    }
    tracing::info!("停止シグナルを受信しました");
}
