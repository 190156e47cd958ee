//! spikeload 도메인 모델.
//!
//! 전송 페이로드와 탐지기 응답 구조체. 모든 모델은 `serde`를 구현한다.

pub mod detector;
pub mod metric;
