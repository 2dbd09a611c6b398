//! 配置功能测试

use rinth::infrastructure::config::{load_config_from, save_config_to, Config, TOKEN_ENV};
use rinth::presentation::theme::parse_hex_color;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.token, None);
    assert_eq!(config.language, "en");
    assert_eq!(config.theme, "dark");
    assert_eq!(config.accent_color, "#30B27C");
    assert_eq!(config.api.base_url, "https://api.modrinth.com/v2");
    assert_eq!(config.api.base_url_v3, "https://api.modrinth.com/v3");
    assert_eq!(config.api.cache_ttl_ms, 5000);
    assert!(config.logging.enable);
    assert_eq!(config.logging.level, "WARN");
}

#[test]
fn test_partial_toml_fills_defaults() {
    // 只写部分字段，其余取默认值
    let toml_content = r#"
token = "mrp_abc"
theme = "light"

[api]
cache_ttl_ms = 0

[logging]
path = "/tmp/rinth.log"
level = "DEBUG"
"#;

    let config: Config = toml::from_str(toml_content).unwrap();
    assert_eq!(config.token.as_deref(), Some("mrp_abc"));
    assert_eq!(config.theme, "light");
    assert_eq!(config.language, "en");
    assert_eq!(config.api.cache_ttl_ms, 0);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.logging.path.as_deref(), Some("/tmp/rinth.log"));
    assert_eq!(config.logging.level, "DEBUG");
    assert!(config.logging.enable);
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.token = Some("mrp_abc".to_string());
    config.set("language", "ru").unwrap();
    config.set("accent_color", "#FF8800").unwrap();

    save_config_to(&path, &config).unwrap();
    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_or_broken_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let missing = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(missing, Config::default());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "theme = [unclosed").unwrap();
    assert_eq!(load_config_from(&broken).unwrap(), Config::default());
}

#[test]
fn test_set_rejects_bad_values() {
    let mut config = Config::default();

    assert!(config.set("language", "de").is_err());
    assert!(config.set("theme", "solarized").is_err());
    assert!(config.set("accent_color", "green").is_err());
    assert!(config.set("volume", "11").is_err());
    assert_eq!(config, Config::default());

    config.set("theme", "light").unwrap();
    assert_eq!(config.theme, "light");
}

#[test]
fn test_parse_hex_color() {
    assert_eq!(parse_hex_color("#30B27C"), Some((0x30, 0xB2, 0x7C)));
    assert_eq!(parse_hex_color("#30b27c"), Some((0x30, 0xB2, 0x7C)));
    assert_eq!(parse_hex_color("30B27C"), Some((0x30, 0xB2, 0x7C)));
    assert_eq!(parse_hex_color("#30B27"), None);
    assert_eq!(parse_hex_color("#GGGGGG"), None);
}

#[test]
fn test_token_resolution() {
    // 唯一读写环境变量的测试
    let mut config = Config::default();
    std::env::remove_var(TOKEN_ENV);
    assert_eq!(config.resolve_token(), None);

    config.token = Some("   ".to_string());
    assert_eq!(config.resolve_token(), None);

    config.token = Some("stored".to_string());
    assert_eq!(config.resolve_token().as_deref(), Some("stored"));

    std::env::set_var(TOKEN_ENV, "from-env");
    assert_eq!(config.resolve_token().as_deref(), Some("from-env"));
    std::env::remove_var(TOKEN_ENV);
}
