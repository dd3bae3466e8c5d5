pub mod config;
pub mod course_handicap;
pub mod engine;
pub mod validation;

pub use config::*;
pub use course_handicap::course_handicap;
pub use engine::{
    cap_score, compute_monthly_handicap_delta, compute_round_totals, unchanged_handicap,
    HandicapChange, RoundTotals, HOLES,
};
pub use validation::{validate_round_input, validate_season, ScoreInputError};
