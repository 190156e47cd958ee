//! 다운스트림 탐지기 결과 비교.
//!
//! 실행 후 `/analyze`의 누적 `anomaly_count`를 전송 성공한 이상 페이로드 수와 비교한다.
//! 서버 카운터는 서버 기동 이후 누적값이므로 깨끗한 서버에서 실행했을 때만 의미가 있다.

use spikeload_core::error::CoreError;
use spikeload_core::models::detector::DetectorStats;
use spikeload_core::ports::transport::TargetProbe;
use tracing::{info, warn};

use crate::runner::RunSummary;

/// 탐지 비교 결과
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    /// 전송 성공한 이상 페이로드 수
    pub expected_spikes: u64,
    /// 탐지기가 보고한 누적 이상치 수
    pub detected_spikes: u64,
    pub window_size: i64,
}

impl DetectionReport {
    pub fn from_stats(summary: &RunSummary, stats: &DetectorStats) -> Self {
        Self {
            expected_spikes: summary.anomalous_delivered,
            detected_spikes: stats.anomaly_count.max(0) as u64,
            window_size: stats.window_size,
        }
    }

    /// 탐지율 (상한 없음, 오탐이 많으면 1을 넘는다)
    pub fn detection_ratio(&self) -> f64 {
        if self.expected_spikes == 0 {
            return 0.0;
        }
        self.detected_spikes as f64 / self.expected_spikes as f64
    }

    pub fn missed(&self) -> u64 {
        self.expected_spikes.saturating_sub(self.detected_spikes)
    }
}

/// 탐지기 통계를 조회해 비교 결과 생성 + 로그
pub async fn verify_detector(
    probe: &dyn TargetProbe,
    summary: &RunSummary,
) -> Result<DetectionReport, CoreError> {
    let stats = probe.detector_stats().await?;
    let report = DetectionReport::from_stats(summary, &stats);

    if report.missed() > 0 {
        warn!(
            expected = report.expected_spikes,
            detected = report.detected_spikes,
            window_size = report.window_size,
            "탐지기가 이상 구간 {}건을 놓침",
            report.missed()
        );
    } else {
        info!(
            expected = report.expected_spikes,
            detected = report.detected_spikes,
            "탐지율 {:.3}",
            report.detection_ratio()
        );
    }
    Ok(report)
}
