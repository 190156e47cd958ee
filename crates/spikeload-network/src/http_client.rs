//! HTTP 수집 클라이언트.
//!
//! `MetricTransport` + `TargetProbe` 포트 구현. 상태 코드별 에러 매핑 + 재시도 로직.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use spikeload_core::config::AppConfig;
use spikeload_core::error::CoreError;
use spikeload_core::models::detector::DetectorStats;
use spikeload_core::models::metric::Payload;
use spikeload_core::ports::transport::{MetricTransport, TargetProbe};
use std::time::Duration;
use tracing::{debug, warn};

/// 기본 수집 경로
pub const DEFAULT_INGEST_PATH: &str = "/ingest";

/// 429 응답에 Retry-After가 없을 때 대기 시간 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// 재시도 대기 상한
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// 기본 재시도 초기 대기
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// reqwest 에러 → 전송 에러 매핑
fn map_send_error(error: reqwest::Error, what: &str) -> CoreError {
    if error.is_timeout() {
        CoreError::Timeout(format!("{what}: {error}"))
    } else {
        CoreError::Network(format!("{what}: {error}"))
    }
}

/// 수집 엔드포인트 클라이언트
pub struct HttpIngestClient {
    client: reqwest::Client,
    base_url: String,
    ingest_path: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpIngestClient {
    /// 새 클라이언트 생성 (재시도 없음, 경로 `/ingest`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ingest_path: DEFAULT_INGEST_PATH.to_string(),
            max_retries: 0,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        })
    }

    /// 설정으로부터 생성
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Ok(Self::new(&config.target.base_url, config.request_timeout())?
            .with_ingest_path(&config.target.ingest_path)
            .with_max_retries(config.target.max_retries)
            .with_retry_base_delay(config.retry_base_delay()))
    }

    /// 수집 경로 설정
    pub fn with_ingest_path(mut self, path: &str) -> Self {
        self.ingest_path = path.to_string();
        self
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 재시도 초기 대기 설정
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    ///
    /// 수집 서버는 큐 포화 시 503, 검증 실패 시 400을 반환한다.
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        // 본문을 읽기 전에 헤더 파싱
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

        let status_code = status.as_u16();
        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status_code {
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after,
            }),
            503 => Err(CoreError::ServiceUnavailable(text.trim().to_string())),
            _ => Err(CoreError::Rejected {
                status: status_code,
                body: text.trim().to_string(),
            }),
        }
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: base → 2×base → 4×base (상한 5초)
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = self.retry_base_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_transient() || attempt >= self.max_retries {
                        return Err(e);
                    }

                    // RateLimit의 경우 서버 지정 대기 시간 사용
                    let wait = match &e {
                        CoreError::RateLimit { retry_after_secs } => {
                            Duration::from_secs(*retry_after_secs).min(MAX_RETRY_DELAY)
                        }
                        _ => delay,
                    };

                    warn!(
                        "요청 실패 (시도 {}/{}): {e}, {wait:?} 후 재시도",
                        attempt + 1,
                        self.max_retries + 1
                    );

                    tokio::time::sleep(wait).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl MetricTransport for HttpIngestClient {
    fn endpoint(&self) -> &str {
        &self.ingest_path
    }

    async fn send(&self, payload: &Payload) -> Result<(), CoreError> {
        let url = self.url(&self.ingest_path);

        self.execute_with_retry(|| async {
            let resp = self
                .client
                .post(&url)
                .json(payload)
                .send()
                .await
                .map_err(|e| map_send_error(e, "메트릭 전송 실패"))?;

            self.check_response(resp).await?;
            debug!(
                endpoint = %self.ingest_path,
                cpu = payload.cpu,
                rps = payload.rps,
                "메트릭 전송 성공"
            );
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl TargetProbe for HttpIngestClient {
    async fn health(&self) -> Result<(), CoreError> {
        let resp = self
            .client
            .get(self.url("/healthz"))
            .send()
            .await
            .map_err(|e| map_send_error(e, "헬스 체크 실패"))?;

        self.check_response(resp).await?;
        debug!("헬스 체크 성공: {}", self.base_url);
        Ok(())
    }

    async fn detector_stats(&self) -> Result<DetectorStats, CoreError> {
        let resp = self
            .client
            .get(self.url("/analyze"))
            .send()
            .await
            .map_err(|e| map_send_error(e, "탐지기 조회 실패"))?;

        let resp = self.check_response(resp).await?;
        resp.json::<DetectorStats>()
            .await
            .map_err(|e| CoreError::Internal(format!("탐지기 응답 파싱 실패: {e}")))
    }
}
