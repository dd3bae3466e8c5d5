use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::SeasonConfig;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Global season settings; leagues may override individual fields.
    #[serde(default)]
    pub season: Option<SeasonConfig>,
    #[serde(default)]
    pub leagues: Vec<LeagueConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeagueConfig {
    pub name: String,
    /// Ledger file; defaults to `<config dir>/<name>.json`
    #[serde(default)]
    pub ledger: Option<PathBuf>,
    #[serde(default)]
    pub season: Option<SeasonConfig>,
}
