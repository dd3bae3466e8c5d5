use anyhow::{anyhow, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_K_FACTOR: f64 = 0.5;
pub const DEFAULT_CHANGE_CAP: f64 = 2.0;

/// Season configuration for monthly handicap recalculation.
///
/// Each field is optional so a league can override only what differs from the
/// global season block.
///
/// Example YAML:
/// ```yaml
/// season:
///   k_factor: 0.5
///   change_cap: 2.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeasonConfig {
    /// Multiplier applied to the average monthly over-par (default: 0.5)
    #[serde(default)]
    pub k_factor: Option<f64>,

    /// Largest allowed month-over-month handicap swing, either direction (default: 2.0)
    #[serde(default)]
    pub change_cap: Option<f64>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            k_factor: Some(DEFAULT_K_FACTOR),
            change_cap: Some(DEFAULT_CHANGE_CAP),
        }
    }
}

impl SeasonConfig {
    /// Layer a league-specific override on top of this config, field by field.
    pub fn merged_with(&self, overrides: Option<&SeasonConfig>) -> SeasonConfig {
        match overrides {
            Some(o) => SeasonConfig {
                k_factor: o.k_factor.or(self.k_factor),
                change_cap: o.change_cap.or(self.change_cap),
            },
            None => self.clone(),
        }
    }

    /// Resolve to exact decimal parameters, filling in defaults.
    ///
    /// Run `validate_season` first; this only fails on non-finite values.
    pub fn params(&self) -> Result<SeasonParams> {
        let k = self.k_factor.unwrap_or(DEFAULT_K_FACTOR);
        let cap = self.change_cap.unwrap_or(DEFAULT_CHANGE_CAP);
        Ok(SeasonParams {
            k_factor: Decimal::from_f64(k)
                .ok_or_else(|| anyhow!("season.k_factor: {} is not representable", k))?,
            change_cap: Decimal::from_f64(cap)
                .ok_or_else(|| anyhow!("season.change_cap: {} is not representable", cap))?,
        })
    }
}

/// Validated recalculation parameters handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonParams {
    pub k_factor: Decimal,
    pub change_cap: Decimal,
}
