use super::config::SeasonConfig;
use super::engine::HOLES;
use thiserror::Error;

pub const MIN_HOLE_SCORE: u8 = 1;
pub const MAX_HOLE_SCORE: u8 = 10;

/// Validate season configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_season(config: &SeasonConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(k) = config.k_factor {
        if !k.is_finite() || k <= 0.0 {
            errors.push(format!("season.k_factor: must be greater than zero (got {})", k));
        }
    }

    if let Some(cap) = config.change_cap {
        if !cap.is_finite() || cap <= 0.0 {
            errors.push(format!("season.change_cap: must be greater than zero (got {})", cap));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A rejected per-hole score card, before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreInputError {
    #[error("expected 18 hole scores, got {0}")]
    ScoreCount(usize),
    #[error("expected 18 hole pars, got {0}")]
    ParCount(usize),
    #[error("hole {hole}: score must be between 1 and 10 (got {score})")]
    ScoreOutOfRange { hole: usize, score: u8 },
    #[error("hole {hole}: par must be 3, 4 or 5 (got {par})")]
    InvalidPar { hole: usize, par: u8 },
}

/// Validate a submitted card and convert it to fixed-size arrays.
///
/// Hole numbers in errors are 1-based.
pub fn validate_round_input(
    raw_scores: &[u8],
    hole_pars: &[u8],
) -> Result<([u8; HOLES], [u8; HOLES]), Vec<ScoreInputError>> {
    let mut errors = Vec::new();

    if raw_scores.len() != HOLES {
        errors.push(ScoreInputError::ScoreCount(raw_scores.len()));
    }
    if hole_pars.len() != HOLES {
        errors.push(ScoreInputError::ParCount(hole_pars.len()));
    }

    for (i, &score) in raw_scores.iter().enumerate() {
        if !(MIN_HOLE_SCORE..=MAX_HOLE_SCORE).contains(&score) {
            errors.push(ScoreInputError::ScoreOutOfRange { hole: i + 1, score });
        }
    }
    for (i, &par) in hole_pars.iter().enumerate() {
        if !is_valid_par(par) {
            errors.push(ScoreInputError::InvalidPar { hole: i + 1, par });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Lengths were checked above, so both conversions succeed.
    let scores: Result<[u8; HOLES], _> = raw_scores.try_into();
    let pars: Result<[u8; HOLES], _> = hole_pars.try_into();
    match (scores, pars) {
        (Ok(scores), Ok(pars)) => Ok((scores, pars)),
        _ => Err(vec![ScoreInputError::ScoreCount(raw_scores.len())]),
    }
}

pub fn is_valid_par(par: u8) -> bool {
    (3..=5).contains(&par)
}
