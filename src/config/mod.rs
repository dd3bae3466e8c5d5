pub mod init;
mod schema;

pub use schema::{Config, LeagueConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::scoring::{validate_season, SeasonConfig};

/// Get the config directory path (~/.config/fairway/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("fairway"))
        .unwrap_or_else(|| PathBuf::from(".fairway"))
}

/// Get the default config file path (~/.config/fairway/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/fairway/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `fairway init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = serde_saphyr::from_str(content)?;
    Ok(config)
}

/// A league selected from the config, with its settings fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLeague {
    pub name: String,
    pub ledger_path: PathBuf,
    pub season: SeasonConfig,
}

impl Config {
    /// Pick a league by name (ASCII case-insensitive), or the first one.
    pub fn resolve_league(&self, name: Option<&str>) -> Result<ResolvedLeague> {
        let league = match name {
            Some(name) => self
                .leagues
                .iter()
                .find(|l| l.name.eq_ignore_ascii_case(name))
                .with_context(|| format!("League '{}' is not configured", name))?,
            None => self
                .leagues
                .first()
                .context("No leagues configured. Add one under `leagues:` in the config file")?,
        };

        let global = self.season.clone().unwrap_or_default();
        Ok(ResolvedLeague {
            name: league.name.clone(),
            ledger_path: league
                .ledger
                .clone()
                .unwrap_or_else(|| crate::ledger::get_ledger_path(&league.name)),
            season: global.merged_with(league.season.as_ref()),
        })
    }

    /// Validate all season blocks at startup.
    /// Returns every error, prefixed with the league it came from.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(ref season) = self.season {
            if let Err(errs) = validate_season(season) {
                errors.extend(errs);
            }
        }

        for (i, league) in self.leagues.iter().enumerate() {
            if league.name.trim().is_empty() {
                errors.push(format!("leagues[{}].name: must not be empty", i));
            }
            if self.leagues[..i]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&league.name))
            {
                errors.push(format!("leagues[{}].name: duplicate league '{}'", i, league.name));
            }
            if let Some(ref season) = league.season {
                if let Err(errs) = validate_season(season) {
                    errors.extend(errs.into_iter().map(|e| format!("leagues[{}].{}", i, e)));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
season:
  k_factor: 0.5
  change_cap: 2.0
leagues:
  - name: tuesday-night
    ledger: /tmp/tuesday.json
  - name: seniors
    season:
      change_cap: 1.0
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.leagues.len(), 2);
        assert_eq!(config.season, Some(SeasonConfig::default()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_default_league() {
        let config = parse_config(SAMPLE).unwrap();
        let league = config.resolve_league(None).unwrap();
        assert_eq!(league.name, "tuesday-night");
        assert_eq!(league.ledger_path, PathBuf::from("/tmp/tuesday.json"));
        assert_eq!(league.season, SeasonConfig::default());
    }

    #[test]
    fn test_resolve_league_override() {
        let config = parse_config(SAMPLE).unwrap();
        let league = config.resolve_league(Some("SENIORS")).unwrap();
        assert_eq!(league.season.k_factor, Some(0.5));
        assert_eq!(league.season.change_cap, Some(1.0));
        assert!(league.ledger_path.ends_with("seniors.json"));
    }

    #[test]
    fn test_resolve_unknown_league() {
        let config = parse_config(SAMPLE).unwrap();
        let err = config.resolve_league(Some("sundays")).unwrap_err();
        assert!(err.to_string().contains("'sundays' is not configured"));
    }

    #[test]
    fn test_no_leagues() {
        let config = parse_config("{}").unwrap();
        assert!(config.resolve_league(None).is_err());
    }

    #[test]
    fn test_validate_collects_league_errors() {
        let yaml = r#"
season:
  k_factor: -1
leagues:
  - name: a
    season:
      change_cap: 0
  - name: A
"#;
        let config = parse_config(yaml).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("season.k_factor"));
        assert!(errors[1].starts_with("leagues[0].season.change_cap"));
        assert!(errors[2].contains("duplicate league 'A'"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config("leagues: []\nqueries: []\n").is_err());
    }
}
