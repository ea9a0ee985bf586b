//! Installment Collection Bot
//!
//! ```text
//! installment-automation          # 종료 신호까지 주기적으로 실행
//! installment-automation --once   # 한 사이클 실행 후 결과를 JSON으로 출력
//! ```
//!
//! 설정 에러 (RPC URL, 컨트랙트 주소, 서명 키 누락 등) 시 스케줄러를 시작하지 않고
//! non-zero exit code로 종료

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use installment_automation::{
    Automation, Config, CycleOutcome, EthersLoanRegistry, Scheduler, SystemClock,
    DEFAULT_LOG_FILTER,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // RUST_LOG=debug 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting installment collection bot");

    let run_once = std::env::args().skip(1).any(|arg| arg == "--once");

    // 설정 로드 (URL은 호스트만 출력, 경로의 API key 노출 방지)
    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        rpc_host = %config.rpc_host(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        due_buffer_secs = config.due_buffer_secs,
        "📋 Configuration loaded"
    );

    let registry = Arc::new(EthersLoanRegistry::new(&config).context("failed to build chain client")?);
    tracing::info!("🔗 Chain client initialized");

    let automation = Arc::new(Automation::from_config(&config, registry, Arc::new(SystemClock)));
    tracing::info!(discovery = %automation.discovery().describe(), "🤖 Automation ready");

    if run_once {
        return match automation.run_cycle().await {
            CycleOutcome::Completed(report) => {
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
            CycleOutcome::Skipped(err) => Err::<(), _>(err).context("cycle skipped"),
        };
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    let scheduler = Scheduler::new(automation, config.poll_interval, config.overlap_policy);
    scheduler.run(shutdown_rx).await;

    Ok(())
}

/// SIGINT 또는 SIGTERM 대기
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
