//! 다운스트림 이상 탐지기 통계 모델.
//!
//! 수집 서버의 `GET /analyze` 응답 형식.

use serde::{Deserialize, Serialize};

/// 슬라이딩 윈도우 기반 탐지기 상태 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorStats {
    /// 윈도우 내 샘플 수
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub std_dev: f64,
    /// 마지막으로 수신한 rps 값
    #[serde(default)]
    pub last_value: f64,
    #[serde(default)]
    pub z_score: f64,
    /// 마지막 값이 이상치로 판정되었는지
    #[serde(default)]
    pub is_anomaly: bool,
    #[serde(default)]
    pub window_size: i64,
    /// 서버 기동 이후 누적 이상치 수
    #[serde(default)]
    pub anomaly_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_response() {
        let body = r#"{"count":50,"mean":213.4,"std_dev":40.1,"last_value":201.0,
            "z_score":0.3,"is_anomaly":false,"window_size":50,"anomaly_count":7}"#;
        let stats: DetectorStats = serde_json::from_str(body).unwrap();
        assert_eq!(stats.count, 50);
        assert_eq!(stats.window_size, 50);
        assert_eq!(stats.anomaly_count, 7);
        assert!(!stats.is_anomaly);
    }

    #[test]
    fn empty_window_response() {
        let stats: DetectorStats = serde_json::from_str(r#"{"window_size":50}"#).unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.anomaly_count, 0);
    }
}
