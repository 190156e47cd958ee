//! 트래픽 패턴 생성기.
//!
//! 카운터로 레짐을 결정하고, 레짐에 맞는 구간에서 균등 분포로
//! `cpu`/`rps` 값을 뽑는다. 이상 구간은 호출 10, 20, 30, ... 번째에
//! 정확히 나타난다 (확률 샘플링이 아님).

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::metric::{Payload, Regime};

/// 기본 이상 주기 (10번째 호출마다)
pub const DEFAULT_ANOMALY_PERIOD: u64 = 10;

/// 샘플링 가능한 최대 구간 폭
const MAX_BAND_WIDTH: f64 = f64::MAX / 2.0;

/// 닫힌 실수 구간 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBand {
    pub min: f64,
    pub max: f64,
}

impl ValueBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// 구간 내 균등 샘플
    pub fn sample<R: RngExt + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.min..=self.max)
    }

    fn validate(&self, field: &str) -> Result<(), CoreError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(CoreError::validation(field, "구간 경계는 유한한 값이어야 함"));
        }
        // 샘플러가 폭을 (1 - EPSILON)으로 나누므로 여유를 둔다
        let width = self.max - self.min;
        if !width.is_finite() || width > MAX_BAND_WIDTH {
            return Err(CoreError::validation(field, "구간 폭이 너무 큼"));
        }
        if self.min > self.max {
            return Err(CoreError::validation(
                field,
                format!("min({}) > max({})", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// 트래픽 패턴 정의
///
/// `Default`는 cpu `[5, 80]`, 정상 rps `[195, 205]`, 이상 rps `[330, 360]`,
/// 주기 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficPattern {
    /// CPU 사용률 구간 (레짐 무관)
    #[serde(default = "default_cpu_band")]
    pub cpu: ValueBand,
    /// 정상 레짐 rps 구간
    #[serde(default = "default_normal_rps_band")]
    pub normal_rps: ValueBand,
    /// 이상 레짐 rps 구간
    #[serde(default = "default_anomalous_rps_band")]
    pub anomalous_rps: ValueBand,
    /// 이상 주기 (`counter % anomaly_period == 0`이면 이상)
    #[serde(default = "default_anomaly_period")]
    pub anomaly_period: u64,
}

impl Default for TrafficPattern {
    fn default() -> Self {
        Self {
            cpu: default_cpu_band(),
            normal_rps: default_normal_rps_band(),
            anomalous_rps: default_anomalous_rps_band(),
            anomaly_period: DEFAULT_ANOMALY_PERIOD,
        }
    }
}

impl TrafficPattern {
    /// 패턴 유효성 검증
    ///
    /// 통과한 패턴으로는 생성이 실패하지 않는다.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.cpu.validate("pattern.cpu")?;
        self.normal_rps.validate("pattern.normal_rps")?;
        self.anomalous_rps.validate("pattern.anomalous_rps")?;

        if self.anomaly_period == 0 {
            return Err(CoreError::validation(
                "pattern.anomaly_period",
                "1 이상이어야 함",
            ));
        }
        if self.normal_rps.max >= self.anomalous_rps.min {
            return Err(CoreError::validation(
                "pattern.anomalous_rps",
                format!(
                    "정상 구간 상한({})이 이상 구간 하한({})보다 작아야 함",
                    self.normal_rps.max, self.anomalous_rps.min
                ),
            ));
        }
        Ok(())
    }

    /// 카운터의 레짐
    pub fn regime_for(&self, counter: u64) -> Regime {
        Regime::classify(counter, self.anomaly_period)
    }

    /// 레짐에 해당하는 rps 구간
    pub fn rps_band(&self, regime: Regime) -> ValueBand {
        match regime {
            Regime::Normal => self.normal_rps,
            Regime::Anomalous => self.anomalous_rps,
        }
    }

    /// 주어진 레짐으로 페이로드 샘플링
    pub fn sample<R: RngExt + ?Sized>(&self, regime: Regime, rng: &mut R) -> Payload {
        Payload {
            cpu: self.cpu.sample(rng),
            rps: self.rps_band(regime).sample(rng),
        }
    }

    /// 카운터로 레짐을 정하고 페이로드 생성
    ///
    /// 카운터는 읽기만 한다. 증가는 호출자(세션) 책임.
    pub fn generate<R: RngExt + ?Sized>(&self, counter: u64, rng: &mut R) -> Payload {
        self.sample(self.regime_for(counter), rng)
    }
}

/// 기본 패턴 + 스레드 RNG로 페이로드 생성
pub fn generate(counter: u64) -> Payload {
    TrafficPattern::default().generate(counter, &mut rand::rng())
}

fn default_cpu_band() -> ValueBand {
    ValueBand::new(5.0, 80.0)
}

fn default_normal_rps_band() -> ValueBand {
    ValueBand::new(195.0, 205.0)
}

fn default_anomalous_rps_band() -> ValueBand {
    ValueBand::new(330.0, 360.0)
}

fn default_anomaly_period() -> u64 {
    DEFAULT_ANOMALY_PERIOD
}
