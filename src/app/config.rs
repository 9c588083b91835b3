use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::fs;
use tracing::info;
use url::Url;

use crate::chat::types::{SessionOptions, DEFAULT_FAILURE_NOTICE};
use crate::error::{Error, Result};
use crate::models::canned::PLACEHOLDER_REPLY;
use crate::platform::AppPaths;

/// Environment overrides use this prefix with `__` between keys,
/// e.g. `LAUNCHPAD__GEMINI__MODEL=gemini-1.5-pro`.
pub const ENV_PREFIX: &str = "LAUNCHPAD";

const KNOWN_THEMES: [&str; 3] = ["dark", "light", "matrix"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderSection,
    pub gemini: GeminiConfig,
    pub backend: BackendConfig,
    pub canned: CannedConfig,
    pub chat: ChatConfig,
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub kind: ProviderKind,
}

/// Which reply provider answers chat messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Canned,
    Gemini,
    Backend,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Canned => "canned",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Backend => "backend",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canned" => Ok(ProviderKind::Canned),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "backend" => Ok(ProviderKind::Backend),
            other => Err(Error::validation(format!(
                "Unknown provider '{}', expected canned, gemini or backend",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_seconds: 60,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub chat_path: String,
    pub timeout_seconds: u64,
}

impl BackendConfig {
    /// `path` resolved under `base_url`, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = Url::parse(self.base_url.trim())?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/chat".to_string(),
            // Mentor search scrapes several pages per query
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CannedConfig {
    pub reply: String,
}

impl Default for CannedConfig {
    fn default() -> Self {
        Self {
            reply: PLACEHOLDER_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub greeting: Option<String>,
    pub failure_notice: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: Some("Hello! How can I help you today?".to_string()),
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UIConfig {
    pub theme: String,
    pub tick_rate_ms: u64,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            tick_rate_ms: 250,
        }
    }
}

impl AppConfig {
    /// Load `config.toml`, writing the defaults first if it does not exist,
    /// then apply `LAUNCHPAD__*` environment overrides and validate.
    pub async fn load(paths: &AppPaths) -> Result<Self> {
        let config_file = paths.config_file();

        if !config_file.exists() {
            info!("Config file not found, creating default configuration");
            Self::default().save(paths).await?;
        }

        info!("Loading configuration from: {:?}", config_file);

        let config: AppConfig = Config::builder()
            .add_source(File::from(config_file.as_path()).format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub async fn save(&self, paths: &AppPaths) -> Result<()> {
        let config_file = paths.config_file();

        info!("Saving configuration to: {:?}", config_file);

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent).await?;
        }

        let config_content =
            toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))?;

        fs::write(&config_file, config_content).await?;

        info!("Configuration saved successfully");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.gemini.model.trim().is_empty() {
            return Err(Error::validation("Gemini model must not be empty"));
        }
        if self.gemini.base_url.trim().is_empty() {
            return Err(Error::validation("Gemini base_url must not be empty"));
        }
        if self.gemini.api_key_env.trim().is_empty() {
            return Err(Error::validation("Gemini api_key_env must name an environment variable"));
        }
        if self.gemini.timeout_seconds == 0 {
            return Err(Error::validation("Gemini timeout_seconds must be greater than 0"));
        }
        if let Some(temperature) = self.gemini.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::validation("Gemini temperature must be between 0 and 2"));
            }
        }

        if self.backend.base_url.trim().is_empty() {
            return Err(Error::validation("Backend base_url must not be empty"));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(Error::validation("Backend timeout_seconds must be greater than 0"));
        }

        if self.chat.failure_notice.trim().is_empty() {
            return Err(Error::validation("Chat failure_notice must not be empty"));
        }

        if !KNOWN_THEMES.contains(&self.ui.theme.as_str()) {
            return Err(Error::validation(format!(
                "Unknown theme '{}', expected one of {}",
                self.ui.theme,
                KNOWN_THEMES.join(", ")
            )));
        }
        if self.ui.tick_rate_ms == 0 {
            return Err(Error::validation("UI tick_rate_ms must be greater than 0"));
        }

        Ok(())
    }

    pub fn to_session_options(&self) -> SessionOptions {
        SessionOptions {
            greeting: self.chat.greeting.clone(),
            failure_notice: self.chat.failure_notice.clone(),
        }
    }
}
