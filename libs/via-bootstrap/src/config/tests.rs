use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.timeout_sec, 0);

    let logging = config.logging.as_ref().unwrap();
    assert_eq!(logging["default"].console_level, "info");

    assert!(config.settings.is_empty());
}

#[test]
fn test_yaml_serialization() {
    let config = AppConfig::default();
    let yaml = config.to_yaml().expect("Failed to serialize to YAML");

    assert!(yaml.contains("server:"));
    assert!(yaml.contains("logging:"));
    assert!(yaml.contains("settings:"));
}

#[test]
fn test_layered_loading_yaml_only() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("test-config.yaml");
    let home = temp_dir.path().join("home");

    let yaml_content = format!(
        r#"
server:
  host: "0.0.0.0"
  port: 9999
  home_dir: "{}"
  timeout_sec: 60

settings:
  VIA_ROUTES_MODULE: "site.routes"
  SECRET_KEY: "dev"
"#,
        home.to_string_lossy().replace('\\', "/")
    );
    fs::write(&config_path, yaml_content).expect("Failed to write config file");

    let config = AppConfig::load_layered(&config_path).expect("Failed to load config");

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.timeout_sec, 60);
    assert!(Path::new(&config.server.home_dir).is_absolute());
    assert!(config.logging.is_none());
    assert_eq!(
        config.setting("VIA_ROUTES_MODULE"),
        Some(&serde_json::json!("site.routes"))
    );
}

#[test]
fn test_layered_loading_env_overrides_yaml() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("env-config.yaml");

    let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 8080
  home_dir: ""
settings:
  VIA_ENV_PROBE: "from_yaml"
"#;
    fs::write(&config_path, yaml_content).expect("Failed to write config file");

    // Unique key so parallel tests are unaffected.
    std::env::set_var("APP__SETTINGS__VIA_ENV_PROBE", "from_env");
    let config = AppConfig::load_layered(&config_path);
    std::env::remove_var("APP__SETTINGS__VIA_ENV_PROBE");

    let config = config.expect("Failed to load config");
    assert_eq!(
        config.settings.get("VIA_ENV_PROBE"),
        Some(&serde_json::json!("from_env"))
    );
}

#[test]
fn test_unknown_top_level_section_rejected() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("bad.yaml");
    fs::write(
        &config_path,
        "server:\n  host: \"x\"\n  port: 1\n  home_dir: \"\"\nbogus: 1\n",
    )
    .unwrap();

    assert!(AppConfig::load_layered(&config_path).is_err());
}

#[test]
fn test_setting_lookup_is_case_insensitive_fallback() {
    let mut config = AppConfig::default();
    config
        .settings
        .insert("via_routes_module".into(), serde_json::json!("lower"));
    assert_eq!(
        config.setting("VIA_ROUTES_MODULE"),
        Some(&serde_json::json!("lower"))
    );
    assert_eq!(config.setting("MISSING"), None);
}

#[test]
fn test_cli_overrides() {
    let mut config = AppConfig::default();
    config
        .settings
        .insert("via_routes_module".into(), serde_json::json!("old.routes"));

    let args = CliArgs {
        port: Some(3000),
        verbose: 2,
        routes_module: Some("new.routes".into()),
        ..Default::default()
    };
    config.apply_cli_overrides(&args);

    assert_eq!(config.server.port, 3000);
    assert_eq!(
        config.setting(ROUTES_MODULE_SETTING),
        Some(&serde_json::json!("new.routes"))
    );
    assert_eq!(config.settings.len(), 1);
    assert_eq!(
        config.logging.as_ref().unwrap()["default"].console_level,
        "trace"
    );
}

#[test]
fn test_load_or_default_without_path() {
    let config = AppConfig::load_or_default::<&Path>(None).unwrap();
    assert!(Path::new(&config.server.home_dir).is_absolute());
    assert!(config.logging.is_some());
}
