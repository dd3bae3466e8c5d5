use rust_decimal::{Decimal, RoundingStrategy};

/// Slope of a course of standard difficulty.
pub const STANDARD_SLOPE: u32 = 113;

/// Adjust a player's handicap for the course being played.
///
/// With both slope and rating known this is
/// `handicap * slope / 113 + (rating - par)`, rounded half-up to one decimal.
/// Without them the player's handicap is used as-is.
pub fn course_handicap(
    handicap: u32,
    slope: Option<u32>,
    rating: Option<Decimal>,
    par_total: u32,
) -> Decimal {
    match (slope, rating) {
        (Some(slope), Some(rating)) => {
            let scaled = Decimal::from(handicap) * Decimal::from(slope) / Decimal::from(STANDARD_SLOPE);
            let adjusted = scaled + (rating - Decimal::from(par_total));
            let mut rounded = adjusted.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(1);
            rounded
        }
        _ => Decimal::from(handicap),
    }
}
