//! 포트 인터페이스 (trait).
//!
//! 어댑터 crate(`spikeload-network`)가 구현하고
//! `spikeload-app`에서 `Arc<dyn T>`로 와이어링한다.
//! async trait은 object safety를 위해 `async_trait` 매크로를 사용한다.

pub mod transport;
