use std::path::{Path, PathBuf};
use std::time::Duration;

use inference::{DEFAULT_API_BASE, GenerationParams};
use portal::DEFAULT_TESTIMONIALS_API;
use proto::ConfigError;
use serde::{Deserialize, Serialize};
use session::{ChatSettings, DEFAULT_DEMO_MESSAGE_LIMIT};
use tracing::debug;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Proxy and portal endpoints.
    #[serde(default)]
    pub api: ApiConfig,

    /// Chat tunables shared by the demo and dashboard.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Where keys, tour state and the auth session live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Key supplied through `GENAI_API_KEY`. Never written back to disk.
    #[serde(skip)]
    pub api_key_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the inference proxy and account API.
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// Base URL of the testimonials API.
    #[serde(default = "default_testimonials_base")]
    pub testimonials_url: String,

    /// Whole-request timeout for inference calls. Unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_testimonials_base() -> String {
    DEFAULT_TESTIMONIALS_API.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            testimonials_url: default_testimonials_base(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_demo_message_limit")]
    pub demo_message_limit: usize,
    #[serde(default = "default_generation_delay_ms")]
    pub generation_delay_ms: u64,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_demo_message_limit() -> usize {
    DEFAULT_DEMO_MESSAGE_LIMIT
}

fn default_generation_delay_ms() -> u64 {
    1500
}

fn default_max_length() -> u32 {
    GenerationParams::default().max_length
}

fn default_temperature() -> f32 {
    GenerationParams::default().temperature
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            demo_message_limit: default_demo_message_limit(),
            generation_delay_ms: default_generation_delay_ms(),
            max_length: default_max_length(),
            temperature: default_temperature(),
        }
    }
}

impl ChatConfig {
    /// Settings handed to the demo and dashboard controllers.
    pub fn settings(&self) -> ChatSettings {
        ChatSettings {
            demo_message_limit: self.demo_message_limit,
            generation_delay: Duration::from_millis(self.generation_delay_ms),
            params: GenerationParams {
                max_length: self.max_length,
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// State directory. Defaults to `~/.genai`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn effective_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(genai_home)
    }
}

/// `$GENAI_HOME`, else `~/.genai`, falling back to `./.genai` when `HOME` is
/// unset.
pub fn genai_home() -> PathBuf {
    if let Ok(dir) = std::env::var("GENAI_HOME")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".genai")
}

impl Config {
    /// Default file location: `config.toml` under [`genai_home`].
    pub fn default_path() -> PathBuf {
        genai_home().join("config.toml")
    }

    /// Loads configuration from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).or_else(|| {
            let cwd = std::env::current_dir().ok()?.join("genai.toml");
            if cwd.exists() {
                return Some(cwd);
            }
            let home_config = Self::default_path();
            home_config.exists().then_some(home_config)
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        config.apply_env();
        config.validate()?;
        debug!(
            base_url = %config.api.base_url,
            storage = %config.storage.effective_dir().display(),
            "Config loaded"
        );
        Ok(config)
    }

    /// Defaults with the environment overrides applied, for when the config
    /// file cannot be used.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("GENAI_API_URL")
            && !url.trim().is_empty()
        {
            self.api.base_url = url;
        }
        if let Ok(key) = std::env::var("GENAI_API_KEY")
            && !key.trim().is_empty()
        {
            self.api_key_override = Some(key);
        }
        if let Ok(dir) = std::env::var("GENAI_HOME")
            && !dir.trim().is_empty()
        {
            self.storage.dir = Some(PathBuf::from(dir));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "chat.temperature".to_string(),
                reason: format!("{} is outside 0.0..=2.0", self.chat.temperature),
            });
        }
        if self.chat.max_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chat.max_length".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Persists to [`Config::default_path`].
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Toml(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EnvGuard, with_locked_env};

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write config");
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = Config::default();
        assert_eq!(cfg.api.base_url, "http://localhost:5000/api");
        assert_eq!(cfg.api.testimonials_url, "http://localhost:3001/api");
        assert_eq!(cfg.api.request_timeout(), None);
        assert_eq!(cfg.chat.demo_message_limit, 3);
        assert_eq!(cfg.chat.generation_delay_ms, 1500);
        assert_eq!(cfg.chat.max_length, 500);
        assert!((cfg.chat.temperature - 0.7).abs() < f32::EPSILON);
        assert!(cfg.api_key_override.is_none());
    }

    #[test]
    fn load_reads_explicit_file_path() {
        with_locked_env(|| {
            let _env = EnvGuard::clear(&["GENAI_API_URL", "GENAI_API_KEY", "GENAI_HOME"]);
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("genai.toml");
            write_file(
                &config_path,
                r#"
[api]
base_url = "https://proxy.example.com/api"
request_timeout_secs = 30

[chat]
demo_message_limit = 5
generation_delay_ms = 0
temperature = 1.1

[storage]
dir = "/tmp/genai-test"
"#,
            );
            let cfg = Config::load(Some(&config_path)).expect("config should parse");
            assert_eq!(cfg.api.base_url, "https://proxy.example.com/api");
            assert_eq!(cfg.api.request_timeout(), Some(Duration::from_secs(30)));
            assert_eq!(cfg.chat.demo_message_limit, 5);
            assert_eq!(cfg.chat.max_length, 500, "unset fields keep defaults");
            assert_eq!(cfg.storage.effective_dir(), PathBuf::from("/tmp/genai-test"));

            let settings = cfg.chat.settings();
            assert_eq!(settings.demo_message_limit, 5);
            assert_eq!(settings.generation_delay, Duration::ZERO);
            assert!((settings.params.temperature - 1.1).abs() < f32::EPSILON);
        });
    }

    #[test]
    fn load_returns_toml_error_for_invalid_content() {
        with_locked_env(|| {
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("genai.toml");
            write_file(&config_path, "[api\nbase_url = \"broken\"");
            let err = Config::load(Some(&config_path)).expect_err("invalid toml must fail");
            assert!(err.to_string().contains("TOML parse error"));
        });
    }

    #[test]
    fn load_rejects_out_of_range_temperature() {
        with_locked_env(|| {
            let _env = EnvGuard::clear(&["GENAI_API_URL"]);
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("genai.toml");
            write_file(&config_path, "[chat]\ntemperature = 3.5\n");
            let err = Config::load(Some(&config_path)).expect_err("temperature too high");
            assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "chat.temperature"));
        });
    }

    #[test]
    fn load_applies_env_overrides() {
        with_locked_env(|| {
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("genai.toml");
            write_file(&config_path, "");

            let mut env = EnvGuard::clear(&[]);
            env.set("GENAI_API_URL", "http://env-proxy/api");
            env.set("GENAI_API_KEY", "hf_from_environment");
            env.set("GENAI_HOME", "/tmp/genai-env-home");

            let cfg = Config::load(Some(&config_path)).expect("config load");
            assert_eq!(cfg.api.base_url, "http://env-proxy/api");
            assert_eq!(cfg.api_key_override.as_deref(), Some("hf_from_environment"));
            assert_eq!(
                cfg.storage.effective_dir(),
                PathBuf::from("/tmp/genai-env-home")
            );
        });
    }

    #[test]
    fn genai_home_moves_config_path_and_state_dir() {
        with_locked_env(|| {
            let mut env = EnvGuard::clear(&["GENAI_HOME"]);
            env.set("GENAI_HOME", "/tmp/genai-moved");
            assert_eq!(genai_home(), PathBuf::from("/tmp/genai-moved"));
            assert_eq!(
                Config::default_path(),
                PathBuf::from("/tmp/genai-moved/config.toml")
            );
            assert_eq!(
                Config::default().storage.effective_dir(),
                PathBuf::from("/tmp/genai-moved")
            );
        });
    }

    #[test]
    fn from_env_keeps_overrides_when_file_is_unusable() {
        with_locked_env(|| {
            let tmp = tempfile::tempdir().expect("tempdir");
            let config_path = tmp.path().join("genai.toml");
            write_file(&config_path, "[chat]\ntemperature = 9.0\n");

            let mut env = EnvGuard::clear(&[]);
            env.set("GENAI_API_URL", "http://env-proxy/api");
            env.set("GENAI_API_KEY", "hf_from_environment");
            assert!(Config::load(Some(&config_path)).is_err());

            let cfg = Config::from_env();
            assert_eq!(cfg.api.base_url, "http://env-proxy/api");
            assert_eq!(cfg.api_key_override.as_deref(), Some("hf_from_environment"));
            assert!((cfg.chat.temperature - 0.7).abs() < f32::EPSILON);
        });
    }

    #[test]
    fn save_writes_to_default_path() {
        with_locked_env(|| {
            let tmp = tempfile::tempdir().expect("tempdir");
            let mut env = EnvGuard::clear(&["GENAI_API_URL", "GENAI_API_KEY"]);
            env.set("GENAI_HOME", &tmp.path().display().to_string());

            let path = Config::default().save().expect("save");
            assert_eq!(path, tmp.path().join("config.toml"));
            assert!(Config::load(Some(&path)).is_ok());
        });
    }

    #[test]
    fn save_to_round_trips_without_env_key() {
        with_locked_env(|| {
            let _env = EnvGuard::clear(&["GENAI_API_URL", "GENAI_API_KEY", "GENAI_HOME"]);
            let tmp = tempfile::tempdir().expect("tempdir");
            let path = tmp.path().join("nested").join("config.toml");

            let mut cfg = Config::default();
            cfg.api.base_url = "http://saved/api".to_string();
            cfg.api_key_override = Some("hf_secret_value".to_string());
            cfg.save_to(&path).expect("save");

            let written = std::fs::read_to_string(&path).expect("read back");
            assert!(!written.contains("hf_secret_value"));

            let loaded = Config::load(Some(&path)).expect("reload");
            assert_eq!(loaded.api.base_url, "http://saved/api");
        });
    }
}
