//! 부하 실행기.
//!
//! 사용자마다 tokio 태스크 하나를 띄우고, 각 태스크가 자기 세션 카운터로
//! 페이로드를 생성해 전송한다. 세션 간 공유 상태는 원자 카운터뿐이다.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use spikeload_core::config::LoadConfig;
use spikeload_core::models::metric::Regime;
use spikeload_core::pattern::TrafficPattern;
use spikeload_core::ports::transport::MetricTransport;
use spikeload_core::session::EmissionSession;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// 실행 ID 생성 (타임스탬프 + 난수)
pub fn generate_run_id() -> String {
    let ts = Utc::now().format("%Y%m%d%H%M%S");
    let rand_part: u32 = rand::rng().random();
    format!("run_{ts}_{rand_part:08x}")
}

/// 실행 중 누적 통계 (lock-free)
#[derive(Debug, Default)]
pub struct RunStats {
    emitted: AtomicU64,
    anomalous: AtomicU64,
    delivered: AtomicU64,
    anomalous_delivered: AtomicU64,
    failed: AtomicU64,
}

impl RunStats {
    fn record_emission(&self, regime: Regime) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        if regime.is_anomalous() {
            self.anomalous.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_delivery(&self, regime: Regime) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        if regime.is_anomalous() {
            self.anomalous_delivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// 실행 결과 요약
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    /// 집계 태그 (예: "/ingest")
    pub endpoint: String,
    pub users: usize,
    /// 생성된 페이로드 수 (전송 성공 여부 무관)
    pub emitted: u64,
    /// 이상 레짐으로 생성된 수
    pub anomalous: u64,
    /// 전송 성공 수
    pub delivered: u64,
    /// 전송 성공한 이상 페이로드 수
    pub anomalous_delivered: u64,
    /// 전송 실패 수
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn anomaly_ratio(&self) -> f64 {
        ratio(self.anomalous, self.emitted)
    }

    pub fn failure_ratio(&self) -> f64 {
        ratio(self.failed, self.emitted)
    }

    /// 한 건 이상 시도했고 전부 실패했는지
    pub fn all_failed(&self) -> bool {
        self.emitted > 0 && self.delivered == 0
    }

    /// 초당 전송 시도 수
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.emitted as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            endpoint = %self.endpoint,
            users = self.users,
            emitted = self.emitted,
            anomalous = self.anomalous,
            delivered = self.delivered,
            failed = self.failed,
            "실행 완료: {:.1}초, {:.1} req/s, 이상 비율 {:.3}, 실패 비율 {:.3}",
            self.elapsed.as_secs_f64(),
            self.throughput(),
            self.anomaly_ratio(),
            self.failure_ratio()
        );
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// 사용자 태스크 하나가 필요로 하는 값
struct UserTask {
    user_id: usize,
    start_delay: Duration,
    pattern: TrafficPattern,
    config: LoadConfig,
    deadline: Option<Instant>,
    transport: Arc<dyn MetricTransport>,
    stats: Arc<RunStats>,
    shutdown: watch::Receiver<bool>,
}

impl UserTask {
    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.user_id as u64)),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn should_stop(&self, session: &EmissionSession) -> bool {
        if *self.shutdown.borrow() {
            return true;
        }
        if let Some(max) = self.config.iterations_per_user {
            if session.counter() >= max {
                return true;
            }
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    /// 호출 간 대기 시간 (마이크로초 단위 균등 분포)
    fn next_wait(&self, rng: &mut StdRng) -> Duration {
        let min = self.config.wait_min_ms.saturating_mul(1_000);
        let max = self.config.wait_max_ms.saturating_mul(1_000);
        if max == 0 {
            return Duration::ZERO;
        }
        // min > max 설정은 고정 대기(min)로 취급
        if min >= max {
            return Duration::from_micros(min);
        }
        Duration::from_micros(rng.random_range(min..=max))
    }

    /// 대기. 종료 신호 수신 시 false
    async fn pause(&mut self, wait: Duration) -> bool {
        let wait = match self.deadline {
            Some(deadline) => wait.min(deadline.saturating_duration_since(Instant::now())),
            None => wait,
        };

        tokio::select! {
            _ = tokio::time::sleep(wait) => true,
            changed = self.shutdown.changed() => match changed {
                Ok(()) => !*self.shutdown.borrow(),
                Err(_) => {
                    // 송신 측 drop: 대기만 마저 한다
                    tokio::time::sleep(wait).await;
                    true
                }
            },
        }
    }

    async fn run(mut self) -> u64 {
        let mut rng = self.rng();
        let mut session = EmissionSession::new(self.user_id, self.pattern);

        if !self.start_delay.is_zero() && !self.pause(self.start_delay).await {
            return 0;
        }

        let endpoint = self.transport.endpoint().to_string();

        while !self.should_stop(&session) {
            let emission = session.next_emission(&mut rng);
            self.stats.record_emission(emission.regime);

            match self.transport.send(&emission.payload).await {
                Ok(()) => {
                    self.stats.record_delivery(emission.regime);
                    if emission.regime.is_anomalous() {
                        debug!(
                            endpoint = %endpoint,
                            user = self.user_id,
                            counter = emission.counter,
                            regime = %emission.regime,
                            rps = emission.payload.rps,
                            "이상 구간 방출"
                        );
                    }
                }
                Err(e) => {
                    self.stats.record_failure();
                    warn!(
                        endpoint = %endpoint,
                        user = self.user_id,
                        counter = emission.counter,
                        regime = %emission.regime,
                        "전송 실패: {e}"
                    );
                }
            }

            let wait = self.next_wait(&mut rng);
            if wait.is_zero() {
                tokio::task::yield_now().await;
            } else if !self.pause(wait).await {
                break;
            }
        }

        session.counter()
    }
}

/// 부하 실행기
pub struct LoadRunner {
    config: LoadConfig,
    pattern: TrafficPattern,
    transport: Arc<dyn MetricTransport>,
}

impl LoadRunner {
    /// `pattern`은 `TrafficPattern::validate`(또는 `AppConfig::validate`)를
    /// 통과한 값이어야 한다. 검증되지 않은 구간은 샘플링 중 panic할 수 있다.
    pub fn new(
        config: LoadConfig,
        pattern: TrafficPattern,
        transport: Arc<dyn MetricTransport>,
    ) -> Self {
        Self {
            config,
            pattern,
            transport,
        }
    }

    /// 사용자 i의 시작 지연 (ramp-up 구간에 균등 분산)
    fn start_delay(&self, user_id: usize) -> Duration {
        let users = self.config.users.max(1) as u32;
        self.config.ramp_up() * user_id as u32 / users
    }

    /// 모든 사용자가 종료될 때까지 실행
    ///
    /// 종료 조건: 종료 신호, 사용자당 반복 횟수, 실행 시간 중 먼저 도달한 것.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> RunSummary {
        let run_id = generate_run_id();
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = self.config.duration().map(|d| start + d);
        let stats = Arc::new(RunStats::default());

        info!(
            run_id = %run_id,
            endpoint = %self.transport.endpoint(),
            users = self.config.users,
            iterations_per_user = ?self.config.iterations_per_user,
            duration_ms = ?self.config.duration_ms,
            "부하 실행 시작"
        );

        let mut tasks = JoinSet::new();
        for user_id in 0..self.config.users {
            let task = UserTask {
                user_id,
                start_delay: self.start_delay(user_id),
                pattern: self.pattern,
                config: self.config.clone(),
                deadline,
                transport: Arc::clone(&self.transport),
                stats: Arc::clone(&stats),
                shutdown: shutdown.clone(),
            };
            tasks.spawn(task.run());
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(count) => debug!("사용자 태스크 종료: {count}회 방출"),
                Err(e) => error!("사용자 태스크 비정상 종료: {e}"),
            }
        }

        RunSummary {
            run_id,
            endpoint: self.transport.endpoint().to_string(),
            users: self.config.users,
            emitted: stats.emitted.load(Ordering::Relaxed),
            anomalous: stats.anomalous.load(Ordering::Relaxed),
            delivered: stats.delivered.load(Ordering::Relaxed),
            anomalous_delivered: stats.anomalous_delivered.load(Ordering::Relaxed),
            failed: stats.failed.load(Ordering::Relaxed),
            started_at,
            elapsed: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(emitted: u64, anomalous: u64, delivered: u64, failed: u64) -> RunSummary {
        RunSummary {
            run_id: "run_test".to_string(),
            endpoint: "/ingest".to_string(),
            users: 1,
            emitted,
            anomalous,
            delivered,
            anomalous_delivered: 0,
            failed,
            started_at: Utc::now(),
            elapsed: Duration::from_secs(2),
        }
    }

    #[test]
    fn run_id_format() {
        let id = generate_run_id();
        assert!(id.starts_with("run_"));
        assert_eq!(id.split('_').count(), 3);
    }

    #[test]
    fn summary_ratios() {
        let s = summary(20, 2, 18, 2);
        assert!((s.anomaly_ratio() - 0.1).abs() < f64::EPSILON);
        assert!((s.failure_ratio() - 0.1).abs() < f64::EPSILON);
        assert!((s.throughput() - 10.0).abs() < 1e-9);
        assert!(!s.all_failed());
    }

    #[test]
    fn empty_summary() {
        let s = summary(0, 0, 0, 0);
        assert_eq!(s.anomaly_ratio(), 0.0);
        assert_eq!(s.failure_ratio(), 0.0);
        assert!(!s.all_failed());
    }

    #[test]
    fn all_failed_when_nothing_delivered() {
        assert!(summary(5, 0, 0, 5).all_failed());
    }
}
