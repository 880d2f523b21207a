//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Configuration comes from an optional `smartreply.yaml` plus
//! `SMARTREPLY_`-prefixed environment variables, with `${VAR}` placeholders
//! expanded recursively before deserialization.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level runtime configuration for the smartreply workspace.
#[derive(Debug, Deserialize)]
pub struct SmartReplyConfig {
    pub version: Option<String>,
    /// Raw cookie string captured from an authenticated browser session.
    /// Usually injected via `${SMARTPLACE_COOKIES}`.
    #[serde(default)]
    pub cookie_string: Option<String>,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

/// WebDriver endpoint and process options.
#[derive(Debug, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }
}

/// Remote surface the automation drives.
#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Registrable domain injected cookies are scoped to.
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_domain: default_cookie_domain(),
        }
    }
}

/// Time bounds and anti-detection pacing.
#[derive(Debug, Deserialize)]
pub struct PacingConfig {
    /// Upper bound on any single navigation. There is no retry on timeout.
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// Fixed settle delay after navigation, covering late rendering.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Maximum "load more" expansion rounds per listing.
    #[serde(default = "default_load_more_rounds")]
    pub load_more_rounds: u32,
    /// Wait between successive bulk reply submissions.
    #[serde(default = "default_bulk_delay_ms")]
    pub bulk_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            load_more_rounds: default_load_more_rounds(),
            bulk_delay_ms: default_bulk_delay_ms(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_headless() -> bool {
    true
}
fn default_base_url() -> String {
    "https://new.smartplace.naver.com".into()
}
fn default_cookie_domain() -> String {
    ".naver.com".into()
}
fn default_navigation_timeout_secs() -> u64 {
    30
}
fn default_settle_delay_ms() -> u64 {
    2000
}
fn default_load_more_rounds() -> u32 {
    3
}
fn default_bulk_delay_ms() -> u64 {
    5000
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct SmartReplyConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SmartReplyConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SmartReplyConfigLoader {
    /// Start with sensible defaults: YAML file + `SMARTREPLY_` env overrides.
    ///
    /// ```
    /// use smartreply_config::SmartReplyConfigLoader;
    ///
    /// let config = SmartReplyConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.browser.headless);
    /// assert_eq!(config.pacing.navigation_timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("SMARTREPLY").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use smartreply_config::SmartReplyConfigLoader;
    ///
    /// let cfg = SmartReplyConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// browser:
    ///   webdriver_url: "http://localhost:4444"
    ///   headless: false
    /// pacing:
    ///   bulk_delay_ms: 8000
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.browser.webdriver_url, "http://localhost:4444");
    /// assert!(!cfg.browser.headless);
    /// assert_eq!(cfg.pacing.bulk_delay_ms, 8000);
    /// assert_eq!(cfg.site.cookie_domain, ".naver.com");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config, expanding `${VAR}` placeholders first.
    pub fn load(self) -> Result<SmartReplyConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SmartReplyConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("NID_COOKIES", Some("NID_AUT=a; NID_SES=b"), || {
            let mut v = json!("${NID_COOKIES}");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("NID_AUT=a; NID_SES=b"));
        });
    }

    #[test]
    fn expands_nested_objects() {
        temp_env::with_vars([("WD_HOST", Some("driver")), ("WD_PORT", Some("9515"))], || {
            let mut v = json!({
                "browser": { "webdriver_url": "http://${WD_HOST}:${WD_PORT}" },
                "pacing": { "bulk_delay_ms": 5000 }
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v["browser"]["webdriver_url"],
                json!("http://driver:9515")
            );
        });
    }

    #[test]
    fn expansion_terminates_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("cookie=${A}");
            expand_env_in_value(&mut v);
            // Depth cap stops the loop; the unresolved placeholder stays.
            assert!(v.as_str().unwrap().contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("x-${NOT_SET_ANYWHERE}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("x-${NOT_SET_ANYWHERE}"));
    }
}
