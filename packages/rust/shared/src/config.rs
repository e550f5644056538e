//! Application configuration for pageforge.
//!
//! User config lives at `~/.pageforge/pageforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PageForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pageforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pageforge";

// ---------------------------------------------------------------------------
// Config structs (matching pageforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where config data, templates and output live.
    #[serde(default)]
    pub paths: PathsConfig,

    /// AI delegate settings.
    #[serde(default)]
    pub ai: AiSettings,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fixed page copy used by the rule-based renderer.
    #[serde(default)]
    pub content: ContentConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the three JSON data files.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Directory holding page templates (and `components/`).
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Default directory for converted pages.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            templates_dir: default_templates_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    "config".into()
}
fn default_templates_dir() -> PathBuf {
    "templates".into()
}
fn default_output_dir() -> PathBuf {
    "output".into()
}

/// `[ai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Set to `false` to always use the rule-based path.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model id sent with each completion request.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; `/v1/messages` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Completion token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Characters of input HTML included in the prompt.
    #[serde(default = "default_input_char_limit")]
    pub input_char_limit: usize,

    /// Characters of the page template included in the prompt.
    #[serde(default = "default_template_char_limit")]
    pub template_char_limit: usize,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            input_char_limit: default_input_char_limit(),
            template_char_limit: default_template_char_limit(),
        }
    }
}

impl AiSettings {
    /// Read the API key from the configured env var. Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}
fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_input_char_limit() -> usize {
    5000
}
fn default_template_char_limit() -> usize {
    3000
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    3000
}
fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

/// `[content]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Small print under every call-to-action button.
    #[serde(default = "default_cta_note")]
    pub cta_note: String,

    /// Filler for page sections the document has no content for.
    #[serde(default = "default_coming_soon")]
    pub coming_soon: String,

    /// Caption of the quick-facts table.
    #[serde(default = "default_quick_facts_caption")]
    pub quick_facts_caption: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            cta_note: default_cta_note(),
            coming_soon: default_coming_soon(),
            quick_facts_caption: default_quick_facts_caption(),
        }
    }
}

fn default_cta_note() -> String {
    "18+ Only • BeGambleAware.org • T&amp;Cs Apply".into()
}
fn default_coming_soon() -> String {
    "Content coming soon...".into()
}
fn default_quick_facts_caption() -> String {
    "Quick Facts".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pageforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PageForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pageforge/pageforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PageForgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PageForgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PageForgeError::output(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PageForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PageForgeError::output(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
