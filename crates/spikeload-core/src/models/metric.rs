//! 합성 메트릭 모델.
//!
//! 수집 엔드포인트로 전송되는 페이로드와 레짐(정상/이상) 분류.

use serde::{Deserialize, Serialize};

/// 수집 엔드포인트로 전송되는 메트릭 한 건
///
/// JSON 직렬화 시 정확히 `cpu`, `rps` 두 개의 숫자 키만 가진다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// CPU 사용률 (레짐과 무관)
    pub cpu: f64,
    /// 초당 요청 수 (레짐에 따라 분포가 달라짐)
    pub rps: f64,
}

/// 트래픽 레짐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Regime {
    /// 평상시 트래픽
    Normal,
    /// 주기적 스파이크
    Anomalous,
}

impl Regime {
    /// 카운터로부터 레짐 결정
    ///
    /// `counter % period == 0`이면 `Anomalous`. 0도 여기에 해당한다.
    pub fn classify(counter: u64, period: u64) -> Self {
        if period != 0 && counter % period == 0 {
            Regime::Anomalous
        } else {
            Regime::Normal
        }
    }

    pub fn is_anomalous(self) -> bool {
        matches!(self, Regime::Anomalous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Regime::Normal => "normal",
            Regime::Anomalous => "anomalous",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 세션이 한 번 방출한 결과 (카운터 + 레짐 + 페이로드)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    /// 증가 후 카운터 값 (1부터 시작)
    pub counter: u64,
    pub regime: Regime,
    pub payload: Payload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_exactly_two_numeric_keys() {
        let payload = Payload {
            cpu: 42.5,
            rps: 201.25,
        };
        let value = serde_json::to_value(payload).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert!(obj["cpu"].is_number());
        assert!(obj["rps"].is_number());
        assert_eq!(obj["rps"].as_f64(), Some(201.25));
    }

    #[test]
    fn classify_every_tenth_call() {
        assert_eq!(Regime::classify(1, 10), Regime::Normal);
        assert_eq!(Regime::classify(9, 10), Regime::Normal);
        assert_eq!(Regime::classify(10, 10), Regime::Anomalous);
        assert_eq!(Regime::classify(11, 10), Regime::Normal);
        assert_eq!(Regime::classify(20, 10), Regime::Anomalous);
    }

    #[test]
    fn classify_zero_is_anomalous() {
        assert_eq!(Regime::classify(0, 10), Regime::Anomalous);
    }

    #[test]
    fn classify_zero_period_never_anomalous() {
        assert_eq!(Regime::classify(10, 0), Regime::Normal);
    }

    #[test]
    fn regime_serde_name() {
        let json = serde_json::to_string(&Regime::Anomalous).unwrap();
        assert_eq!(json, "\"ANOMALOUS\"");
        assert_eq!(Regime::Normal.to_string(), "normal");
    }
}
