use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::options::ContextOptions;

/// File name of the project config, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "nestview.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub context: ContextOptions,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Node attribute used to order siblings.
    #[serde(default = "default_sort_key")]
    pub sort_key: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            sort_key: default_sort_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Load the project config.
///
/// An explicit `path` must exist. Without one, `nestview.toml` in `cwd` is
/// used when present, and defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_project_config(path: Option<&Path>, cwd: &Path) -> Result<ProjectConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let candidate = cwd.join(PROJECT_CONFIG_FILE);
            if !candidate.exists() {
                return Ok(ProjectConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Path of the per-user config file, if a config directory exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nestview/config.toml"))
}

/// Load the per-user config, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Combine project config, user config, environment and CLI flags.
///
/// # Errors
///
/// Returns an error if either config file is malformed.
pub fn resolve_config(
    config_path: Option<&Path>,
    cwd: &Path,
    cli_format: Option<&str>,
) -> Result<EffectiveConfig> {
    let project = load_project_config(config_path, cwd)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(
        cli_format,
        user.output.as_deref(),
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    );

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Output mode precedence: CLI flag, then `FORMAT`, then user config, then
/// pretty on a TTY and text otherwise. Unknown values are skipped.
fn resolve_output(
    cli_format: Option<&str>,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    [cli_format, env_format, user_output]
        .into_iter()
        .flatten()
        .find_map(normalize_output_mode)
        .unwrap_or(if is_tty { "pretty" } else { "text" })
        .to_string()
}

fn default_sort_key() -> String {
    "reference".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("tempdir");
        let cfg = load_project_config(None, root.path()).expect("load should succeed");
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.navigation.sort_key, "reference");
        assert!(cfg.context.reduce_edges);
    }

    #[test]
    fn project_config_overrides_context_options() {
        let root = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            root.path().join(PROJECT_CONFIG_FILE),
            "[context]\nsuccessor_radius = 0\ninclude_parents = false\n\n[navigation]\nsort_key = \"name\"\n",
        )
        .expect("write config");

        let cfg = load_project_config(None, root.path()).expect("load");
        assert_eq!(cfg.context.successor_radius, 0);
        assert!(!cfg.context.include_parents);
        assert_eq!(cfg.context.predecessor_radius, 1);
        assert_eq!(cfg.navigation.sort_key, "name");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let root = tempfile::tempdir().expect("tempdir");
        let missing = root.path().join("other.toml");
        assert!(load_project_config(Some(&missing), root.path()).is_err());
    }

    #[test]
    fn malformed_config_reports_path() {
        let root = tempfile::tempdir().expect("tempdir");
        let path = root.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "[context\n").expect("write config");
        let err = load_project_config(None, root.path()).expect_err("parse error");
        assert!(format!("{err:#}").contains("nestview.toml"));
    }

    #[test]
    fn cli_format_overrides_env_and_config() {
        let output = resolve_output(Some("json"), Some("pretty"), Some("text"), true);
        assert_eq!(output, "json");
    }

    #[test]
    fn env_beats_user_config() {
        assert_eq!(resolve_output(None, Some("json"), Some("text"), true), "text");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        assert_eq!(resolve_output(None, Some("table"), Some("human"), false), "pretty");
        assert_eq!(resolve_output(None, Some("human"), Some("table"), true), "text");
    }

    #[test]
    fn tty_decides_when_nothing_is_set() {
        assert_eq!(resolve_output(None, None, Some("bogus"), true), "pretty");
        assert_eq!(resolve_output(None, None, None, false), "text");
    }
}
