//! 메트릭 전송 포트.
//!
//! 구현: `spikeload-network` crate (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::detector::DetectorStats;
use crate::models::metric::Payload;

/// 페이로드를 수집 엔드포인트로 전송하는 협력자
///
/// 전송 실패는 전송 계층 에러로 그대로 반환한다.
#[async_trait]
pub trait MetricTransport: Send + Sync {
    /// 집계용 엔드포인트 이름 (예: "/ingest")
    fn endpoint(&self) -> &str;

    /// 페이로드 한 건 전송
    async fn send(&self, payload: &Payload) -> Result<(), CoreError>;
}

/// 대상 서버 상태 조회
#[async_trait]
pub trait TargetProbe: Send + Sync {
    /// 헬스 체크 (`GET /healthz`)
    async fn health(&self) -> Result<(), CoreError>;

    /// 이상 탐지기 통계 조회 (`GET /analyze`)
    async fn detector_stats(&self) -> Result<DetectorStats, CoreError>;
}
