//! 설정 로드.
//!
//! 우선순위: 기본값 → 설정 파일 → 환경변수(`SPIKELOAD_`) → CLI 인자.
//! 파일 형식은 확장자로 결정된다 (json, toml, yaml).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use spikeload_core::config::AppConfig;
use spikeload_core::error::CoreError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 환경변수 접두사 (예: `SPIKELOAD_TARGET__BASE_URL`)
pub const ENV_PREFIX: &str = "SPIKELOAD";

/// 기본 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "spikeload.json";

fn config_error(e: config::ConfigError) -> CoreError {
    CoreError::Config(e.to_string())
}

/// 플랫폼별 기본 설정 파일 경로
///
/// - macOS: `~/Library/Application Support/dev.spikeload.spikeload/spikeload.json`
/// - Linux: `~/.config/spikeload/spikeload.json`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "spikeload", "spikeload")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// 설정 로드
///
/// `path`가 주어지면 해당 파일이 반드시 있어야 한다. 없으면 기본 경로의
/// 파일을 있을 때만 읽는다. 검증은 CLI 오버라이드 적용 후 호출자가 한다.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CoreError> {
    let defaults = Config::try_from(&AppConfig::default_config()).map_err(config_error)?;
    let mut builder = Config::builder().add_source(defaults);

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CoreError::Config(format!(
                    "설정 파일 없음: {}",
                    path.display()
                )));
            }
            info!("설정 파일 로드: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            if let Some(default_path) = default_config_path().filter(|p| p.exists()) {
                info!("기본 설정 파일 로드: {}", default_path.display());
                builder = builder.add_source(File::from(default_path).required(false));
            } else {
                debug!("설정 파일 없음, 기본값 + 환경변수 사용");
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(config_error)?
        .try_deserialize::<AppConfig>()
        .map_err(config_error)
}

/// CLI 인자 오버라이드
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub target: Option<String>,
    pub users: Option<usize>,
    pub iterations: Option<u64>,
    pub duration_secs: Option<u64>,
    pub seed: Option<u64>,
    pub wait_min_ms: Option<u64>,
    pub wait_max_ms: Option<u64>,
    pub ramp_up_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub no_health_check: bool,
    pub verify: bool,
}

impl CliOverrides {
    /// 지정된 값만 덮어쓴다
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(target) = &self.target {
            config.target.base_url = target.clone();
        }
        if let Some(users) = self.users {
            config.load.users = users;
        }
        if let Some(iterations) = self.iterations {
            config.load.iterations_per_user = Some(iterations);
        }
        if let Some(secs) = self.duration_secs {
            config.load.duration_ms = Some(secs.saturating_mul(1_000));
        }
        if let Some(seed) = self.seed {
            config.load.seed = Some(seed);
        }
        if let Some(ms) = self.wait_min_ms {
            config.load.wait_min_ms = ms;
        }
        if let Some(ms) = self.wait_max_ms {
            config.load.wait_max_ms = ms;
        }
        if let Some(ms) = self.ramp_up_ms {
            config.load.ramp_up_ms = ms;
        }
        if let Some(retries) = self.max_retries {
            config.target.max_retries = retries;
        }
        if self.no_health_check {
            config.target.health_check = false;
        }
        if self.verify {
            config.target.verify_detector = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn json_file_overrides_defaults() {
        let file = write_temp(
            ".json",
            r#"{
                "target": { "base_url": "http://collector:9000", "max_retries": 2 },
                "load": { "users": 4, "iterations_per_user": 100 },
                "pattern": { "anomaly_period": 5 }
            }"#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.target.base_url, "http://collector:9000");
        assert_eq!(config.target.max_retries, 2);
        assert_eq!(config.target.ingest_path, "/ingest");
        assert_eq!(config.load.users, 4);
        assert_eq!(config.load.iterations_per_user, Some(100));
        assert_eq!(config.load.wait_max_ms, 10);
        assert_eq!(config.pattern.anomaly_period, 5);
        assert_eq!(config.pattern.anomalous_rps.min, 330.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_file_is_supported() {
        let file = write_temp(
            ".toml",
            r#"
                [load]
                users = 3
                seed = 42

                [pattern.normal_rps]
                min = 90.0
                max = 110.0
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.load.users, 3);
        assert_eq!(config.load.seed, Some(42));
        assert_eq!(config.pattern.normal_rps.min, 90.0);
        assert_eq!(config.pattern.normal_rps.max, 110.0);
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let result = load_config(Some(Path::new("/nonexistent/spikeload.json")));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn malformed_file_is_error() {
        let file = write_temp(".json", "{ not json");
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn overrides_apply_only_given_values() {
        let mut config = AppConfig::default_config();
        let overrides = CliOverrides {
            target: Some("http://127.0.0.1:9999".to_string()),
            users: Some(8),
            duration_secs: Some(30),
            no_health_check: true,
            ..CliOverrides::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.target.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.load.users, 8);
        assert_eq!(config.load.duration_ms, Some(30_000));
        assert!(!config.target.health_check);
        assert!(!config.target.verify_detector);
        assert_eq!(config.load.wait_max_ms, 10);
        assert!(config.load.iterations_per_user.is_none());
    }

    #[test]
    fn default_path_has_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
