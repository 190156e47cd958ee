//! # spikeload-core
//!
//! 합성 메트릭 부하 생성기의 도메인 모델, 트래픽 패턴 생성기, 포트(trait), 에러 타입.
//!
//! ## 구조
//!
//! - [`pattern`]: 레짐 결정 + 균등 분포 페이로드 생성 (순수 함수)
//! - [`session`]: 사용자별 방출 카운터
//! - [`models`]: 페이로드/탐지기 응답 구조체 (serde)
//! - [`ports`]: 전송 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체

pub mod config;
pub mod error;
pub mod models;
pub mod pattern;
pub mod ports;
pub mod session;
