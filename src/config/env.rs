//! Environment variable processing for runtime configuration overrides.
//!
//! Env var prefix: `REPORT_RECONCILER_`
//!
//! - `REPORT_RECONCILER_PROFILE`: select a configuration profile
//! - `REPORT_RECONCILER_BASE_DIR`: override the scan base directory
//! - `REPORT_RECONCILER_KEY_FIELD`: override the key custom field
//! - `REPORT_RECONCILER_VERBOSE`: enable verbose output (1/true/yes)
//! - `REPORT_RECONCILER_BUILD_NAME`: override the build executions go to
//! - `REPORT_RECONCILER_PLATFORM`: override the execution platform
//! - `REPORT_RECONCILER_INCLUDE_NOTES`: enable/disable generated notes
//! - `REPORT_RECONCILER_ATTACH_REPORTS`: attach report files for every seeker

use super::Config;
use std::path::PathBuf;

const PREFIX: &str = "REPORT_RECONCILER_";

/// Read the active profile name from `REPORT_RECONCILER_PROFILE`.
pub fn get_profile_name() -> Option<String> {
    env_str("PROFILE")
}

/// Apply individual env var overrides to a config.
///
/// Each override is applied only if the env var is set and parses correctly.
/// Invalid values are silently ignored.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(val) = env_str("BASE_DIR") {
        config.base_dir = PathBuf::from(val);
    }

    if let Some(val) = env_str("KEY_FIELD") {
        if !val.trim().is_empty() {
            config.key_field = val.trim().to_string();
        }
    }

    if let Some(val) = env_bool("VERBOSE") {
        config.verbose = val;
    }

    if let Some(val) = env_str("BUILD_NAME") {
        config.dispatch.build_name = Some(val);
    }

    if let Some(val) = env_str("PLATFORM") {
        config.dispatch.platform = Some(val);
    }

    if let Some(val) = env_bool("INCLUDE_NOTES") {
        config.include_notes = val;
    }

    if let Some(val) = env_bool("ATTACH_REPORTS") {
        for seeker in &mut config.seekers {
            seeker.attach_report = val;
        }
    }
}

/// Summarize which env var overrides are currently active.
///
/// Returns a list of `(env_var_name, value)` pairs for display in `check`.
pub fn detect_active_overrides() -> Vec<(String, String)> {
    let keys = [
        "PROFILE",
        "BASE_DIR",
        "KEY_FIELD",
        "VERBOSE",
        "BUILD_NAME",
        "PLATFORM",
        "INCLUDE_NOTES",
        "ATTACH_REPORTS",
    ];

    keys.iter()
        .filter_map(|key| {
            let full = format!("{PREFIX}{key}");
            env_str(key).map(|val| (full, val))
        })
        .collect()
}

// --- helpers ---

fn env_str(suffix: &str) -> Option<String> {
    std::env::var(format!("{PREFIX}{suffix}"))
        .ok()
        .filter(|s| !s.is_empty())
}

/// Only recognised spellings count; anything else leaves the setting alone.
fn env_bool(suffix: &str) -> Option<bool> {
    env_str(suffix).and_then(|s| match s.to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}

// Env vars are process-global, so every test that mutates them takes this.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run a closure with specific env vars set (or removed, for `None`), then
/// restore the previous values.
#[cfg(test)]
pub(crate) fn with_env_vars<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut old: Vec<(&str, Option<String>)> = Vec::new();
    for &(k, v) in vars {
        old.push((k, std::env::var(k).ok()));
        // SAFETY: tests are serialized via ENV_LOCK
        match v {
            Some(v) => unsafe { std::env::set_var(k, v) },
            None => unsafe { std::env::remove_var(k) },
        }
    }
    f();
    for (k, prev) in old {
        // SAFETY: tests are serialized via ENV_LOCK
        match prev {
            Some(v) => unsafe { std::env::set_var(k, v) },
            None => unsafe { std::env::remove_var(k) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeekerConfig, SeekerKind};

    #[test]
    fn test_profile_name() {
        with_env_vars(&[("REPORT_RECONCILER_PROFILE", Some("ci"))], || {
            assert_eq!(get_profile_name().as_deref(), Some("ci"));
        });
        with_env_vars(&[("REPORT_RECONCILER_PROFILE", Some(""))], || {
            assert_eq!(get_profile_name(), None);
        });
    }

    #[test]
    fn test_apply_overrides() {
        let vars = [
            ("REPORT_RECONCILER_BASE_DIR", Some("/tmp/reports")),
            ("REPORT_RECONCILER_KEY_FIELD", Some("TAP File")),
            ("REPORT_RECONCILER_VERBOSE", Some("yes")),
            ("REPORT_RECONCILER_BUILD_NAME", Some("nightly-7")),
            ("REPORT_RECONCILER_PLATFORM", Some("arm64")),
            ("REPORT_RECONCILER_INCLUDE_NOTES", Some("0")),
            ("REPORT_RECONCILER_ATTACH_REPORTS", Some("true")),
        ];
        with_env_vars(&vars, || {
            let mut config = Config::default();
            config.seekers.push(SeekerConfig::new(SeekerKind::TapFileName, "*.tap"));
            apply_env_overrides(&mut config);

            assert_eq!(config.base_dir, PathBuf::from("/tmp/reports"));
            assert_eq!(config.key_field, "TAP File");
            assert!(config.verbose);
            assert_eq!(config.dispatch.build_name.as_deref(), Some("nightly-7"));
            assert_eq!(config.dispatch.platform.as_deref(), Some("arm64"));
            assert!(!config.include_notes);
            assert!(config.seekers[0].attach_report);
        });
    }

    #[test]
    fn test_invalid_bool_is_ignored() {
        with_env_vars(
            &[
                ("REPORT_RECONCILER_VERBOSE", Some("maybe")),
                ("REPORT_RECONCILER_INCLUDE_NOTES", Some("sometimes")),
            ],
            || {
                let mut config = Config::default();
                apply_env_overrides(&mut config);
                assert!(!config.verbose);
                assert!(config.include_notes);
            },
        );
    }

    #[test]
    fn test_detect_active_overrides() {
        with_env_vars(
            &[
                ("REPORT_RECONCILER_PLATFORM", Some("linux")),
                ("REPORT_RECONCILER_VERBOSE", None),
                ("REPORT_RECONCILER_PROFILE", None),
            ],
            || {
                let active = detect_active_overrides();
                assert!(active.contains(&(
                    "REPORT_RECONCILER_PLATFORM".to_string(),
                    "linux".to_string()
                )));
                assert!(!active.iter().any(|(k, _)| k == "REPORT_RECONCILER_VERBOSE"));
            },
        );
    }
}
