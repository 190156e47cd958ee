//! # spikeload-app
//!
//! 부하 실행 오케스트레이션. 바이너리(`spikeload`)와 통합 테스트가 공유한다.
//!
//! - [`runner`]: 사용자 태스크 실행 + 통계 집계
//! - [`lifecycle`]: 종료 신호, OS 시그널
//! - [`settings`]: 파일/환경변수/CLI 설정 로드
//! - [`verify`]: 탐지기 결과 비교

pub mod lifecycle;
pub mod runner;
pub mod settings;
pub mod verify;
