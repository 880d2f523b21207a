use smartreply_config::SmartReplyConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_with_env_placeholders() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
cookie_string: "${SMARTPLACE_COOKIES}"
browser:
  webdriver_url: "http://localhost:9515"
  headless: true
site:
  base_url: "https://new.smartplace.naver.com"
pacing:
  navigation_timeout_secs: 30
  settle_delay_ms: 2000
  load_more_rounds: 3
  bulk_delay_ms: 5000
"#;
    let p = write_yaml(&tmp, "smartreply.yaml", file_yaml);

    temp_env::with_var("SMARTPLACE_COOKIES", Some("NID_AUT=abc; NID_SES=def"), || {
        let config = SmartReplyConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load system config");

        assert_eq!(
            config.cookie_string.as_deref(),
            Some("NID_AUT=abc; NID_SES=def")
        );
        assert_eq!(config.pacing.load_more_rounds, 3);
        assert!(config.browser.headless);
    });
}

#[test]
#[serial]
fn defaults_apply_when_sections_missing() {
    let config = SmartReplyConfigLoader::new()
        .with_yaml_str("version: \"0.1\"")
        .load()
        .expect("load minimal config");

    assert_eq!(config.browser.webdriver_url, "http://localhost:9515");
    assert_eq!(config.site.base_url, "https://new.smartplace.naver.com");
    assert_eq!(config.site.cookie_domain, ".naver.com");
    assert_eq!(config.pacing.navigation_timeout_secs, 30);
    assert!(config.cookie_string.is_none());
}
