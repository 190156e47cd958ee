//! # spikeload-network
//!
//! HTTP 네트워크 어댑터.
//! `MetricTransport`/`TargetProbe` 포트를 reqwest로 구현한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use spikeload_network::http_client::HttpIngestClient;
//!
//! let client = HttpIngestClient::from_config(&config)?;
//! client.send(&payload).await?;
//! ```

pub mod http_client;
