//! 애플리케이션 설정 구조체.
//!
//! 대상 서버, 부하 형태, 트래픽 패턴 설정을 정의한다.
//! 파일/환경변수 로드는 `spikeload-app`의 `settings` 모듈이 담당한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;
use crate::pattern::TrafficPattern;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 대상 서버 설정
    #[serde(default)]
    pub target: TargetConfig,
    /// 부하 설정
    #[serde(default)]
    pub load: LoadConfig,
    /// 트래픽 패턴
    #[serde(default)]
    pub pattern: TrafficPattern,
}

// ============================================================
// 대상 서버 설정
// ============================================================

/// 대상 서버 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// 수집 서버 기본 URL (예: "http://localhost:8080")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 수집 경로
    #[serde(default = "default_ingest_path")]
    pub ingest_path: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 일시적 전송 실패 재시도 횟수 (0 = 재시도 없음)
    #[serde(default)]
    pub max_retries: u32,
    /// 재시도 초기 대기 (밀리초, 매 시도마다 2배)
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// 시작 전 `/healthz` 확인
    #[serde(default = "default_true")]
    pub health_check: bool,
    /// 종료 후 `/analyze`로 탐지 결과 비교
    #[serde(default)]
    pub verify_detector: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ingest_path: default_ingest_path(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: 0,
            retry_base_delay_ms: default_retry_base_delay_ms(),
            health_check: true,
            verify_detector: false,
        }
    }
}

// ============================================================
// 부하 설정
// ============================================================

/// 부하 형태 설정
///
/// 종료 조건(`iterations_per_user`, `duration_ms`)이 모두 없으면
/// 종료 신호가 올 때까지 실행한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// 동시 사용자(세션) 수
    #[serde(default = "default_users")]
    pub users: usize,
    /// 사용자당 방출 횟수 상한
    #[serde(default)]
    pub iterations_per_user: Option<u64>,
    /// 전체 실행 시간 상한 (밀리초)
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// 호출 간 최소 대기 (밀리초)
    #[serde(default)]
    pub wait_min_ms: u64,
    /// 호출 간 최대 대기 (밀리초)
    #[serde(default = "default_wait_max_ms")]
    pub wait_max_ms: u64,
    /// 사용자 시작 분산 시간 (밀리초)
    #[serde(default)]
    pub ramp_up_ms: u64,
    /// 재현용 시드 (사용자 i는 seed + i)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            iterations_per_user: None,
            duration_ms: None,
            wait_min_ms: 0,
            wait_max_ms: default_wait_max_ms(),
            ramp_up_ms: 0,
            seed: None,
        }
    }
}

impl LoadConfig {
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    pub fn ramp_up(&self) -> Duration {
        Duration::from_millis(self.ramp_up_ms)
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 요청 타임아웃 Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.target.request_timeout_ms)
    }

    /// 재시도 초기 대기 Duration
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.target.retry_base_delay_ms)
    }

    /// 전체 설정 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.target.base_url.trim();
        if url.is_empty() {
            return Err(CoreError::validation("target.base_url", "비어 있음"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::validation(
                "target.base_url",
                format!("http(s) URL이어야 함: {url}"),
            ));
        }
        if !self.target.ingest_path.starts_with('/') {
            return Err(CoreError::validation(
                "target.ingest_path",
                "'/'로 시작해야 함",
            ));
        }
        if self.target.request_timeout_ms == 0 {
            return Err(CoreError::validation(
                "target.request_timeout_ms",
                "1 이상이어야 함",
            ));
        }
        if self.load.users == 0 {
            return Err(CoreError::validation("load.users", "1 이상이어야 함"));
        }
        if self.load.wait_min_ms > self.load.wait_max_ms {
            return Err(CoreError::validation(
                "load.wait_min_ms",
                format!(
                    "wait_min_ms({}) > wait_max_ms({})",
                    self.load.wait_min_ms, self.load.wait_max_ms
                ),
            ));
        }
        if self.load.iterations_per_user == Some(0) {
            return Err(CoreError::validation(
                "load.iterations_per_user",
                "1 이상이어야 함",
            ));
        }
        self.pattern.validate()
    }
}

fn default_true() -> bool {
    true
}

/// 수집 서버 기본 주소 (서버 HTTP_ADDR 기본값 :8080)
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_ingest_path() -> String {
    "/ingest".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_retry_base_delay_ms() -> u64 {
    200
}

fn default_users() -> usize {
    1
}

fn default_wait_max_ms() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.target.base_url, "http://localhost:8080");
        assert_eq!(config.target.ingest_path, "/ingest");
        assert_eq!(config.target.max_retries, 0);
        assert!(config.target.health_check);
        assert_eq!(config.load.users, 1);
        assert_eq!(config.load.wait_min_ms, 0);
        assert_eq!(config.load.wait_max_ms, 10);
        assert!(config.load.iterations_per_user.is_none());
        assert_eq!(config.pattern.anomaly_period, 10);
    }

    #[test]
    fn duration_conversions() {
        let mut config = AppConfig::default_config();
        config.load.duration_ms = Some(1_500);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_base_delay(), Duration::from_millis(200));
        assert_eq!(config.load.duration(), Some(Duration::from_millis(1_500)));
        assert_eq!(config.load.ramp_up(), Duration::ZERO);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.target.request_timeout_ms, 5_000);
        assert_eq!(config.load.wait_max_ms, 10);
    }

    #[test]
    fn rejects_bad_url() {
        let mut config = AppConfig::default_config();
        config.target.base_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());

        config.target.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_relative_ingest_path() {
        let mut config = AppConfig::default_config();
        config.target.ingest_path = "ingest".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_users() {
        let mut config = AppConfig::default_config();
        config.load.users = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("load.users"));
    }

    #[test]
    fn rejects_inverted_wait_range() {
        let mut config = AppConfig::default_config();
        config.load.wait_min_ms = 50;
        config.load.wait_max_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_iterations() {
        let mut config = AppConfig::default_config();
        config.load.iterations_per_user = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn pattern_errors_propagate() {
        let mut config = AppConfig::default_config();
        config.pattern.anomaly_period = 0;
        assert!(config.validate().is_err());
    }
}
