use super::Config;
use crate::core::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration loader that layers several sources.
pub struct ConfigLoader {
    /// Directory relative base dirs are resolved against.
    root: Option<PathBuf>,
    /// Path to the TOML configuration file.
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self {
            root: None,
            config_file: None,
        }
    }

    /// Resolve a relative `base-dir` against this directory instead of the
    /// config file's directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the TOML configuration file.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Load configuration from all sources.
    ///
    /// Priority (later sources override earlier):
    /// 1. Default values
    /// 2. TOML file
    /// 3. Profile overlay (`REPORT_RECONCILER_PROFILE`)
    /// 4. Individual env var overrides (`REPORT_RECONCILER_*`)
    pub fn load(self) -> Result<Config> {
        let mut config = Config::default();
        let mut profiles: HashMap<String, serde_json::Value> = HashMap::new();

        if let Some(ref config_path) = self.config_file {
            let (file_config, file_profiles) = load_toml_file(config_path)?;
            config = file_config;
            profiles = file_profiles;
        }

        if let Some(profile_name) = super::env::get_profile_name() {
            let profile_value = profiles.get(&profile_name).ok_or_else(|| {
                let mut available: Vec<&str> = profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                if available.is_empty() {
                    Error::config(format!(
                        "profile '{}' not found (no profiles defined)",
                        profile_name,
                    ))
                } else {
                    Error::config(format!(
                        "profile '{}' not found. Available profiles: {}",
                        profile_name,
                        available.join(", "),
                    ))
                }
            })?;

            let mut base_value = serde_json::to_value(&config)
                .map_err(|e| Error::config(format!("failed to serialize config: {}", e)))?;
            deep_merge(&mut base_value, profile_value);
            config = serde_json::from_value(base_value).map_err(|e| {
                Error::config(format!("failed to apply profile '{}': {}", profile_name, e))
            })?;
            tracing::debug!(profile = %profile_name, "applied configuration profile");
        }

        super::env::apply_env_overrides(&mut config);

        let root = self.root.clone().or_else(|| {
            self.config_file
                .as_ref()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
        });
        if let Some(root) = root {
            if config.base_dir.is_relative() {
                config.base_dir = root.join(&config.base_dir);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a TOML file into a config plus its `[profiles.*]` overlays.
fn load_toml_file(path: &Path) -> Result<(Config, HashMap<String, serde_json::Value>)> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;

    let raw: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("failed to parse TOML config: {}", e)))?;
    let raw = serde_json::to_value(raw)?;

    let mut profiles = HashMap::new();
    extract_profiles(&raw, &mut profiles);

    let config: Config = serde_json::from_value(raw)
        .map_err(|e| Error::config(format!("invalid config file {}: {}", path.display(), e)))?;
    Ok((config, profiles))
}

/// Profiles live at `value["profiles"]` as `{ name: { ...config fields... } }`.
fn extract_profiles(
    value: &serde_json::Value,
    profiles: &mut HashMap<String, serde_json::Value>,
) {
    if let Some(serde_json::Value::Object(map)) = value.get("profiles") {
        for (name, profile_value) in map {
            profiles.insert(name.clone(), profile_value.clone());
        }
    }
}

/// Recursively deep-merge `overlay` into `base`.
///
/// - Objects: keys are merged recursively (overlay keys win for conflicts).
/// - Scalars and arrays: overlay replaces base entirely.
pub(crate) fn deep_merge(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let entry = base_map
                    .entry(key.clone())
                    .or_insert(serde_json::Value::Null);
                deep_merge(entry, overlay_val);
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
