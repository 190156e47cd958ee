//! 환경변수 설정 계층 테스트.
//!
//! 프로세스 환경을 바꾸므로 별도 테스트 바이너리에 테스트 하나만 둔다.

use spikeload_app::settings::{load_config, CliOverrides, ENV_PREFIX};
use std::io::Write;

#[test]
fn env_overrides_file_and_cli_overrides_env() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        br#"
            [target]
            base_url = "http://file-host:8080"
            max_retries = 1

            [load]
            users = 2
            wait_max_ms = 20

            [pattern]
            anomaly_period = 7
        "#,
    )
    .unwrap();
    file.flush().unwrap();

    std::env::set_var(format!("{ENV_PREFIX}_LOAD__USERS"), "4");
    std::env::set_var(format!("{ENV_PREFIX}_TARGET__BASE_URL"), "http://collector:9000");
    std::env::set_var(format!("{ENV_PREFIX}_PATTERN__ANOMALY_PERIOD"), "5");

    let mut config = load_config(Some(file.path())).unwrap();

    assert_eq!(config.load.users, 4);
    assert_eq!(config.target.base_url, "http://collector:9000");
    assert_eq!(config.pattern.anomaly_period, 5);
    // 환경변수가 없는 값은 파일 값 유지
    assert_eq!(config.target.max_retries, 1);
    assert_eq!(config.load.wait_max_ms, 20);
    assert!(config.validate().is_ok());

    CliOverrides {
        users: Some(9),
        ..CliOverrides::default()
    }
    .apply(&mut config);
    assert_eq!(config.load.users, 9);
    assert_eq!(config.target.base_url, "http://collector:9000");

    std::env::remove_var(format!("{ENV_PREFIX}_LOAD__USERS"));
    std::env::remove_var(format!("{ENV_PREFIX}_TARGET__BASE_URL"));
    std::env::remove_var(format!("{ENV_PREFIX}_PATTERN__ANOMALY_PERIOD"));
}
