use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::fingerprint::{FingerprintProfile, DEFAULT_USER_AGENT};

/// Fingerprint overrides (optional `[fingerprint]` section in config.toml).
/// Unset fields fall back to the built-in profile defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FingerprintConfig {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub screen_width: Option<u32>,
    #[serde(default)]
    pub screen_height: Option<u32>,
    #[serde(default)]
    pub color_depth: Option<u32>,
}

/// Global configuration loaded from `~/.config/mcc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MccConfig {
    /// Base URL of the conversion service.
    pub service_url: String,
    /// Audio quality (kbit/s) sent with requests; None = server default.
    #[serde(default)]
    pub default_quality: Option<u32>,
    /// Where fetched files land; None = current directory at submit time.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Overall request timeout in seconds; None = wait until the call
    /// settles, like the page this client replaces.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Optional fingerprint-profile overrides.
    #[serde(default)]
    pub fingerprint: Option<FingerprintConfig>,
}

impl Default for MccConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:5000".to_string(),
            default_quality: None,
            download_dir: None,
            request_timeout_secs: None,
            fingerprint: None,
        }
    }
}

impl MccConfig {
    /// Resolves the configured overrides into a full fingerprint profile.
    pub fn fingerprint_profile(&self) -> FingerprintProfile {
        let base = FingerprintProfile::default();
        let Some(overrides) = &self.fingerprint else {
            return base;
        };
        FingerprintProfile {
            user_agent: overrides
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            language: overrides.language.clone(),
            timezone: overrides.timezone.clone(),
            screen_width: overrides.screen_width.unwrap_or(base.screen_width),
            screen_height: overrides.screen_height.unwrap_or(base.screen_height),
            color_depth: overrides.color_depth.unwrap_or(base.color_depth),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mcc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MccConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MccConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MccConfig = toml::from_str(&data)?;
    Ok(cfg)
}
