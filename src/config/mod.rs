use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::stats::consensus::DEFAULT_CONTROVERSIAL_LIMIT;

pub const FILMS_ENV: &str = "CLUBSTATS_FILMS";
pub const MEMBERS_ENV: &str = "CLUBSTATS_MEMBERS";

/// Top-level clubstats config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ClubConfig {
    /// Catalog file, directory or glob.
    pub films: Option<String>,
    pub members: Option<PathBuf>,
    pub controversial_limit: Option<usize>,
}

impl ClubConfig {
    /// Load config from ~/.clubstats/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(ClubConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ClubConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
        Ok(config)
    }

    pub fn controversial_limit(&self) -> usize {
        self.controversial_limit
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CONTROVERSIAL_LIMIT)
    }

    /// Render the effective settings, one `key = value` line each.
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref films) = self.films {
            lines.push(format!("films = \"{films}\""));
        }
        if let Some(ref members) = self.members {
            lines.push(format!("members = \"{}\"", members.display()));
        }
        lines.push(format!("controversial_limit = {}", self.controversial_limit()));
        lines.join("\n")
    }
}

/// Resolve a dataset location through the chain: CLI flag > env var > config key > default.
pub fn resolve_location(
    cli_flag: Option<&str>,
    env_var_name: &str,
    configured: Option<&str>,
    default: impl FnOnce() -> Result<String>,
) -> Result<String> {
    // 1. CLI flag
    if let Some(value) = cli_flag {
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }

    // 2. Environment variable
    if let Ok(val) = std::env::var(env_var_name) {
        if !val.is_empty() {
            return Ok(val);
        }
    }

    // 3. Config file
    if let Some(value) = configured {
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }

    // 4. ~/.clubstats default
    default()
}

/// Directory holding config and default data files: ~/.clubstats
pub fn home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".clubstats"))
}

/// Path to the config file: ~/.clubstats/config.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("config.toml"))
}

pub fn default_films_path() -> Result<String> {
    Ok(home_dir()?.join("films.json").display().to_string())
}

pub fn default_members_path() -> Result<String> {
    Ok(home_dir()?.join("members.json").display().to_string())
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.clubstats/config.toml
# Path resolution order: CLI flag > env var > this file > ~/.clubstats/

# Catalog: a JSON/YAML file, a directory of them, or a glob
# films = "/path/to/films.json"

# Member list (JSON or YAML): name, title, queue
# members = "/path/to/members.yaml"

# How many controversial films `clubstats member` shows
# controversial_limit = 4
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_everything() {
        let resolved = resolve_location(
            Some("cli.json"),
            "CLUBSTATS_TEST_UNSET_A",
            Some("config.json"),
            || Ok("default.json".to_string()),
        )
        .unwrap();
        assert_eq!(resolved, "cli.json");
    }

    #[test]
    fn config_then_default() {
        let from_config = resolve_location(
            Some(""),
            "CLUBSTATS_TEST_UNSET_B",
            Some("config.json"),
            || Ok("default.json".to_string()),
        )
        .unwrap();
        assert_eq!(from_config, "config.json");

        let fallback =
            resolve_location(None, "CLUBSTATS_TEST_UNSET_B", None, || Ok("default.json".to_string()))
                .unwrap();
        assert_eq!(fallback, "default.json");
    }

    #[test]
    fn template_parses_to_defaults() {
        let config: ClubConfig = toml::from_str(default_config_template()).unwrap();
        assert!(config.films.is_none());
        assert_eq!(config.controversial_limit(), DEFAULT_CONTROVERSIAL_LIMIT);
    }

    #[test]
    fn reads_configured_values() {
        let config: ClubConfig = toml::from_str(
            "films = \"~/club/*.json\"\nmembers = \"/srv/members.yaml\"\ncontroversial_limit = 6\n",
        )
        .unwrap();
        assert_eq!(config.films.as_deref(), Some("~/club/*.json"));
        assert_eq!(config.controversial_limit(), 6);
        assert!(config.display().contains("controversial_limit = 6"));
    }
}
