//! Parser limits configuration.
//!
//! Limits come from a preset, then from a TOML file, then from `DOCQL_*`
//! environment variables (a `.env` file next to the config is loaded first):
//!
//! ```toml
//! preset = "strict"
//!
//! [limits]
//! max_predicates = 128
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use docql_core::QueryLimits;

pub const ENV_PRESET: &str = "DOCQL_PRESET";
pub const ENV_MAX_QUERY_LENGTH: &str = "DOCQL_MAX_QUERY_LENGTH";
pub const ENV_MAX_PREDICATES: &str = "DOCQL_MAX_PREDICATES";
pub const ENV_MAX_VALUE_DEPTH: &str = "DOCQL_MAX_VALUE_DEPTH";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Default,
    Strict,
    Relaxed,
}

impl Preset {
    pub fn limits(&self) -> QueryLimits {
        match self {
            Preset::Default => QueryLimits::default(),
            Preset::Strict => QueryLimits::strict(),
            Preset::Relaxed => QueryLimits::relaxed(),
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Preset::Default),
            "strict" => Some(Preset::Strict),
            "relaxed" => Some(Preset::Relaxed),
            _ => None,
        }
    }
}

/// Individual limits that override the preset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_query_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_predicates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preset: Preset,
    pub limits: LimitOverrides,
}

impl Config {
    /// Load from a TOML file, then apply environment overrides.
    ///
    /// A `.env` file in the same directory is loaded first if present.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = path.parent() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
            }
        }

        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Empty or unparsable values are
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(preset) = lookup(ENV_PRESET).and_then(|p| Preset::from_name(&p)) {
            self.preset = preset;
        }

        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());

        if let Some(n) = number(ENV_MAX_QUERY_LENGTH) {
            self.limits.max_query_length = Some(n);
        }
        if let Some(n) = number(ENV_MAX_PREDICATES) {
            self.limits.max_predicates = Some(n);
        }
        if let Some(n) = number(ENV_MAX_VALUE_DEPTH) {
            self.limits.max_value_depth = Some(n);
        }
    }

    /// Effective limits: the preset with individual overrides on top
    pub fn query_limits(&self) -> QueryLimits {
        let base = self.preset.limits();
        QueryLimits {
            max_query_length: self.limits.max_query_length.unwrap_or(base.max_query_length),
            max_predicates: self.limits.max_predicates.unwrap_or(base.max_predicates),
            max_value_depth: self.limits.max_value_depth.unwrap_or(base.max_value_depth),
        }
    }
}
