use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, LeagueConfig};
use crate::scoring::{SeasonConfig, DEFAULT_CHANGE_CAP, DEFAULT_K_FACTOR};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a strictly positive, finite number.
fn parse_positive(input: &str) -> Result<f64, String> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(_) => Err("must be a number".to_string()),
    }
}

fn prompt_positive(message: &str, default: f64) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match parse_positive(&input) {
            Ok(v) => return Ok(v),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

/// Starter config for a single league.
fn build_config(league: String, season: SeasonConfig) -> Config {
    Config {
        season: Some(season),
        leagues: vec![LeagueConfig {
            name: league,
            ledger: None,
            season: None,
        }],
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Fairway Configuration Wizard");
    println!("============================");
    println!();

    let league = loop {
        let name = prompt_with_default("League name", "my-league")?;
        if !name.trim().is_empty() {
            break name;
        }
        println!("  League name is required.");
    };

    println!();
    println!("Handicaps are recalculated monthly: the average over-par for the month");
    println!("is multiplied by the k-factor and the result is capped in both directions.");
    let configure_season = prompt_yes_no("Configure season? (n accepts defaults)", false)?;
    let season = if configure_season {
        SeasonConfig {
            k_factor: Some(prompt_positive("k-factor", DEFAULT_K_FACTOR)?),
            change_cap: Some(prompt_positive("Monthly change cap", DEFAULT_CHANGE_CAP)?),
        }
    } else {
        SeasonConfig::default()
    };

    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let config = build_config(league, season);
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Add more leagues under `leagues:`; each may override the season block.");
    println!("Run `fairway player add <name>` to get started.");

    Ok(())
}
