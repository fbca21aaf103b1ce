use std::{fs::read_to_string, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::catalog::retry::RetryPolicy;

pub const DEFAULT_API_HOST: &str = "https://vector.appsci-production.aws.descarteslabs.com";

/// Settings of the catalog client. Read from an optional YAML file, then overridden from the
/// environment.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub api_host: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            token: None,
            timeout_secs: 300,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
            user_agent: format!("vector-catalog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Load the configuration file if given, then apply the `VECTOR_*` environment variables.
    pub fn load(config_filepath: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match config_filepath {
            Some(filepath) => Self::from_file(filepath)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(filepath: &Path) -> anyhow::Result<Self> {
        if !filepath.exists() {
            return Err(anyhow!("Config file {:?} not found", filepath));
        }
        let config_contents = read_to_string(filepath)?;
        serde_yaml::from_str(&config_contents)
            .with_context(|| format!("Parsing config file {:?}", filepath))
    }

    /// Apply overrides from a variable lookup, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_host) = lookup("VECTOR_API_HOST") {
            self.api_host = api_host;
        }
        if let Some(token) = lookup("VECTOR_API_TOKEN") {
            self.token = Some(token);
        }
        if let Some(timeout) = lookup("VECTOR_TIMEOUT") {
            self.timeout_secs = timeout
                .parse()
                .with_context(|| format!("VECTOR_TIMEOUT must be a number of seconds, got {timeout:?}"))?;
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs, time::Duration};

    use testdir::testdir;

    use super::{ClientConfig, DEFAULT_API_HOST};

    #[test]
    fn test_load_without_file_uses_defaults() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(DEFAULT_API_HOST, config.api_host);
        assert_eq!(None, config.token);
        assert_eq!(3, config.retry_policy().max_attempts);
    }

    #[test]
    fn test_from_file_merges_with_defaults() {
        let test_dir = testdir!();
        let config_filepath = test_dir.join("config.yaml");
        fs::write(
            &config_filepath,
            "api_host: http://localhost:8000\nmax_attempts: 1\nretry_base_delay_ms: 10\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(&config_filepath).unwrap();
        assert_eq!("http://localhost:8000", config.api_host);
        assert_eq!(300, config.timeout_secs);
        let policy = config.retry_policy();
        assert_eq!(1, policy.max_attempts);
        assert_eq!(Duration::from_millis(10), policy.base_delay);
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let test_dir = testdir!();
        let config_filepath = test_dir.join("config.yaml");
        fs::write(&config_filepath, "api_hots: http://localhost:8000\n").unwrap();
        assert!(ClientConfig::from_file(&config_filepath).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let test_dir = testdir!();
        let err = ClientConfig::from_file(&test_dir.join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_environment_overrides() {
        let env = HashMap::from([
            ("VECTOR_API_HOST", "https://example.test"),
            ("VECTOR_API_TOKEN", "secret"),
            ("VECTOR_TIMEOUT", "12"),
        ]);
        let mut config = ClientConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!("https://example.test", config.api_host);
        assert_eq!(Some("secret".to_string()), config.token);
        assert_eq!(12, config.timeout_secs);
    }

    #[test]
    fn test_invalid_timeout_override() {
        let mut config = ClientConfig::default();
        assert!(config
            .apply_overrides(|key| (key == "VECTOR_TIMEOUT").then(|| "soon".to_string()))
            .is_err());
    }
}
