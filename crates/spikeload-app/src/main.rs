//! # spikeload
//!
//! 합성 메트릭 부하 생성기 바이너리 진입점.
//! 설정 로드 → 헬스 체크 → 부하 실행 → 요약/탐지기 비교.

use anyhow::{bail, Context, Result};
use clap::Parser;
use spikeload_app::lifecycle::Lifecycle;
use spikeload_app::runner::LoadRunner;
use spikeload_app::settings::{self, CliOverrides};
use spikeload_app::verify::verify_detector;
use spikeload_core::ports::transport::TargetProbe;
use spikeload_network::http_client::HttpIngestClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 이상 탐지 검증용 합성 메트릭 부하 생성기
///
/// 정상 rps 구간 사이에 10번째 호출마다 스파이크를 섞어 `/ingest`로 전송한다.
#[derive(Parser, Debug)]
#[command(name = "spikeload")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (json/toml/yaml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 수집 서버 URL (기본: http://localhost:8080)
    #[arg(long, short = 't')]
    target: Option<String>,

    /// 동시 사용자 수
    #[arg(long, short = 'u')]
    users: Option<usize>,

    /// 사용자당 전송 횟수
    #[arg(long, short = 'n')]
    iterations: Option<u64>,

    /// 전체 실행 시간 (초)
    #[arg(long, short = 'd')]
    duration_secs: Option<u64>,

    /// 재현용 시드
    #[arg(long)]
    seed: Option<u64>,

    /// 호출 간 최소 대기 (밀리초)
    #[arg(long)]
    wait_min_ms: Option<u64>,

    /// 호출 간 최대 대기 (밀리초)
    #[arg(long)]
    wait_max_ms: Option<u64>,

    /// 사용자 시작 분산 시간 (밀리초)
    #[arg(long)]
    ramp_up_ms: Option<u64>,

    /// 일시적 전송 실패 재시도 횟수
    #[arg(long)]
    max_retries: Option<u32>,

    /// 시작 전 /healthz 확인 생략
    #[arg(long)]
    no_health_check: bool,

    /// 종료 후 /analyze 탐지 결과 비교
    #[arg(long)]
    verify: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            target: self.target.clone(),
            users: self.users,
            iterations: self.iterations,
            duration_secs: self.duration_secs,
            seed: self.seed,
            wait_min_ms: self.wait_min_ms,
            wait_max_ms: self.wait_max_ms,
            ramp_up_ms: self.ramp_up_ms,
            max_retries: self.max_retries,
            no_health_check: self.no_health_check,
            verify: self.verify,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config =
        settings::load_config(args.config.as_deref()).context("설정 로드 실패")?;
    args.overrides().apply(&mut config);
    config.validate().context("설정 검증 실패")?;

    let client = Arc::new(
        HttpIngestClient::from_config(&config).context("HTTP 클라이언트 생성 실패")?,
    );

    if config.target.health_check {
        client
            .health()
            .await
            .with_context(|| format!("대상 서버 헬스 체크 실패: {}", config.target.base_url))?;
        info!("대상 서버 정상: {}", config.target.base_url);
    }

    if config.load.iterations_per_user.is_none() && config.load.duration_ms.is_none() {
        info!("종료 조건 없음, Ctrl+C로 중지");
    }

    let lifecycle = Arc::new(Lifecycle::new());
    let shutdown_rx = lifecycle.subscribe();
    let signal_lifecycle = Arc::clone(&lifecycle);
    let signal_task = tokio::spawn(async move {
        if let Err(e) = signal_lifecycle.wait_for_signal().await {
            error!("시그널 핸들러 등록 실패: {e}");
        }
    });

    let runner = LoadRunner::new(config.load.clone(), config.pattern, client.clone());
    let summary = runner.run(shutdown_rx).await;
    signal_task.abort();
    if lifecycle.is_shutting_down() {
        info!("종료 신호로 실행 중단");
    }
    summary.log();

    if config.target.verify_detector {
        if let Err(e) = verify_detector(client.as_ref(), &summary).await {
            warn!("탐지기 결과 조회 실패: {e}");
        }
    }

    if summary.all_failed() {
        bail!(
            "모든 전송 실패 ({}건), 대상 서버 {} 확인 필요",
            summary.failed,
            config.target.base_url
        );
    }

    Ok(())
}
