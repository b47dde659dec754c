//! TOML configuration: repository URL, HTTP client settings and viewport size.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use reqwest::Url;
use serde::Deserialize;
use tracing::warn;

use crate::viewport::LayoutMetrics;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "personctl";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub base_url: Option<Url>,
    /// Category attached to pictures added without an explicit one
    pub photo_category: Option<String>,
    pub http: HttpConfig,
    pub viewport: ViewportConfig,
}

// =============================================================================
// HTTP Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// `None` disables the request timeout
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Repositories commonly run with self-signed certificates
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

// =============================================================================
// Viewport Configuration
// =============================================================================

/// Window size reported by the terminal page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

impl ViewportConfig {
    pub fn layout(&self) -> LayoutMetrics {
        LayoutMetrics::fixed(self.width, self.height)
    }
}

impl Config {
    fn defaults(config_path: PathBuf) -> Self {
        Self {
            config_path,
            base_url: None,
            photo_category: None,
            http: HttpConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }

    /// Base URL from the command line, falling back to the config file.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<Url> {
        if let Some(raw) = cli_override {
            return parse_base_url(raw);
        }
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => bail!(
                "no repository URL configured; set `base_url` in {} or pass --base-url",
                self.config_path.display()
            ),
        }
    }
}

// =============================================================================
// File format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: Option<String>,
    photo_category: Option<String>,
    http: HttpFile,
    viewport: ViewportFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HttpFile {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewportFile {
    width: Option<u32>,
    height: Option<u32>,
}

impl From<HttpFile> for HttpConfig {
    fn from(file: HttpFile) -> Self {
        let defaults = HttpConfig::default();
        let timeout_secs = match file.timeout_secs {
            Some(0) => None,
            Some(secs) => Some(secs),
            None => defaults.timeout_secs,
        };
        let user_agent = file
            .user_agent
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or(defaults.user_agent);
        Self {
            timeout_secs,
            user_agent,
            accept_invalid_certs: file.accept_invalid_certs.unwrap_or(false),
        }
    }
}

impl From<ViewportFile> for ViewportConfig {
    fn from(file: ViewportFile) -> Self {
        let defaults = ViewportConfig::default();
        Self {
            width: file.width.filter(|w| *w > 0).unwrap_or(defaults.width),
            height: file.height.filter(|h| *h > 0).unwrap_or(defaults.height),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid repository URL: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("repository URL must use http or https: {raw}");
    }
    Ok(url)
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    let dir = base.config_dir().join(APP_NAME);
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load the configuration. A missing file yields the defaults.
pub fn load(path_override: Option<&Path>) -> Result<Config> {
    let path = match path_override {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        return Ok(Config::defaults(path));
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    parse(&raw, path)
}

/// Parse configuration text; `path` is only recorded for messages.
pub fn parse(raw: &str, path: PathBuf) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let base_url = cfg_file
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_base_url)
        .transpose()?;

    let photo_category = cfg_file
        .photo_category
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    Ok(Config {
        config_path: path,
        base_url,
        photo_category,
        http: cfg_file.http.into(),
        viewport: cfg_file.viewport.into(),
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut unknown = Vec::new();
    let Some(table) = value.as_table() else {
        return unknown;
    };

    for (key, inner) in table {
        match key.as_str() {
            "base_url" | "photo_category" => {}
            "http" => collect_unknown(
                inner,
                "http",
                &["timeout_secs", "user_agent", "accept_invalid_certs"],
                &mut unknown,
            ),
            "viewport" => collect_unknown(inner, "viewport", &["width", "height"], &mut unknown),
            other => unknown.push(other.to_string()),
        }
    }
    unknown
}

fn collect_unknown(value: &toml::Value, context: &str, known: &[&str], out: &mut Vec<String>) {
    if let Some(table) = value.as_table() {
        for key in table.keys() {
            if !known.contains(&key.as_str()) {
                out.push(format!("{context}.{key}"));
            }
        }
    }
}

fn warn_unknown_keys(value: &toml::Value) {
    for key in unknown_keys(value) {
        warn!("unknown configuration key `{}` ignored", key);
    }
}
