//! Environment overrides, kept in their own test binary since they mutate the process env

use atv_config::{ConfigManager, ConfigManagerTrait};
use atv_remote::LogLevel;

#[test]
fn test_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "avada_kedavra_app_amount = 8\nlog_level = \"warn\"\n").unwrap();

    std::env::set_var("ATV_BRIDGE_ENV_TEST_AVADA_KEDAVRA_APP_AMOUNT", "12");
    std::env::set_var("ATV_BRIDGE_ENV_TEST_DISCOVER__MULTICAST", "false");

    let mut manager = ConfigManager::with_path(path).with_env_prefix("ATV_BRIDGE_ENV_TEST");
    let result = manager.load_config();

    std::env::remove_var("ATV_BRIDGE_ENV_TEST_AVADA_KEDAVRA_APP_AMOUNT");
    std::env::remove_var("ATV_BRIDGE_ENV_TEST_DISCOVER__MULTICAST");

    // Multicast off without unicast hosts is rejected by validation
    assert!(result.is_err());

    std::env::set_var("ATV_BRIDGE_ENV_TEST_AVADA_KEDAVRA_APP_AMOUNT", "12");
    let config = manager.load_config().unwrap();
    std::env::remove_var("ATV_BRIDGE_ENV_TEST_AVADA_KEDAVRA_APP_AMOUNT");

    assert_eq!(config.avada_kedavra_app_amount, 12);
    assert_eq!(config.log_level, LogLevel::Warn);
}
