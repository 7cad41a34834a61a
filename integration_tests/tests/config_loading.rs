mod common;

use core_server::distance_config::DISTANCE_CONFIG_ENV;
use core_server::load_distance_config_from_env;

/// Env-driven loading is process-global state, so the override and the
/// fallback are exercised in sequence within a single test.
#[test]
fn env_override_and_fallback() {
    let path = common::fixture_path("test_distance_config.json");
    std::env::set_var(DISTANCE_CONFIG_ENV, &path);
    let config = load_distance_config_from_env();
    assert_eq!(config.min_view_distance, 2);
    assert_eq!(config.max_view_distance, 6);
    assert_eq!(config.min_simulation_distance, 1);
    assert_eq!(config.max_simulation_distance, 4);
    assert_eq!(config.adjust_interval_ticks, 10);
    assert!(!config.log_adjustments);

    // A broken override falls back to the builtin configuration.
    std::env::set_var(DISTANCE_CONFIG_ENV, "/nonexistent/distance_config.json");
    let config = load_distance_config_from_env();
    assert_eq!(config.min_view_distance, 5);
    assert_eq!(config.max_view_distance, 15);

    std::env::remove_var(DISTANCE_CONFIG_ENV);
    let config = load_distance_config_from_env();
    assert_eq!(config.min_view_distance, 5);
}

#[test]
fn fixture_config_validates() -> anyhow::Result<()> {
    let path = common::fixture_path("test_distance_config.json");
    let contents = std::fs::read_to_string(path)?;
    let config = core_server::DistanceControlConfig::from_json_str(&contents)?;
    config.validate()?;
    Ok(())
}
