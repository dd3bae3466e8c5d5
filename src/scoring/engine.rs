use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Holes in a regulation round.
pub const HOLES: usize = 18;

/// Strokes over par at which a single hole is capped.
pub const CAP_OVER_PAR: u8 = 2;

/// Cap a single hole score at par + 2.
///
/// Callers are expected to have validated the inputs already
/// (`raw_score` in 1..=10, `hole_par` in 3..=5).
pub fn cap_score(raw_score: u8, hole_par: u8) -> u8 {
    raw_score.min(hole_par + CAP_OVER_PAR)
}

/// Derived totals for one completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTotals {
    pub capped_scores: [u8; HOLES],
    pub gross_capped: u32,
    pub net: Decimal,
    /// Signed, one decimal place.
    pub over_par: Decimal,
}

pub fn compute_round_totals(
    raw_scores: &[u8; HOLES],
    hole_pars: &[u8; HOLES],
    course_par_total: u32,
    course_handicap: Decimal,
) -> RoundTotals {
    let mut capped_scores = [0u8; HOLES];
    for (capped, (raw, par)) in capped_scores
        .iter_mut()
        .zip(raw_scores.iter().zip(hole_pars.iter()))
    {
        *capped = cap_score(*raw, *par);
    }

    let gross_capped: u32 = capped_scores.iter().map(|&s| u32::from(s)).sum();
    let net = Decimal::from(gross_capped) - course_handicap;

    let mut over_par = Decimal::from(i64::from(gross_capped) - i64::from(course_par_total));
    over_par.rescale(1);

    debug!(gross_capped, %net, %over_par, "computed round totals");

    RoundTotals {
        capped_scores,
        gross_capped,
        net,
        over_par,
    }
}

/// Outcome of one month's handicap adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandicapChange {
    pub raw_delta: Decimal,
    /// `raw_delta` clamped to `[-change_cap, +change_cap]`.
    pub delta: Decimal,
    pub new_handicap: u32,
}

/// Compute the bounded monthly handicap adjustment.
///
/// `new_handicap = max(0, round_half_up(prev_handicap + clamp(avg * k, -cap, cap)))`.
/// `k_factor` and `change_cap` must be positive; the caller validates that.
/// A result beyond `u32::MAX` saturates.
pub fn compute_monthly_handicap_delta(
    prev_handicap: u32,
    avg_monthly_over_par: Decimal,
    k_factor: Decimal,
    change_cap: Decimal,
) -> HandicapChange {
    let raw_delta = avg_monthly_over_par * k_factor;
    let delta = raw_delta.clamp(-change_cap, change_cap);

    let new_handicap = (Decimal::from(prev_handicap) + delta)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX);

    HandicapChange {
        raw_delta,
        delta,
        new_handicap,
    }
}

/// Adjustment for a player who posted no rounds in the period.
pub fn unchanged_handicap(prev_handicap: u32) -> HandicapChange {
    HandicapChange {
        raw_delta: Decimal::ZERO,
        delta: Decimal::ZERO,
        new_handicap: prev_handicap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_cap_score_below_cap_unchanged() {
        assert_eq!(cap_score(4, 4), 4);
        assert_eq!(cap_score(6, 4), 6);
        assert_eq!(cap_score(1, 3), 1);
    }

    #[test]
    fn test_cap_score_above_cap() {
        assert_eq!(cap_score(7, 4), 6);
        assert_eq!(cap_score(10, 3), 5);
        assert_eq!(cap_score(10, 5), 7);
    }

    #[test]
    fn test_round_totals_all_fives_on_par_fours() {
        let totals = compute_round_totals(&[5; HOLES], &[4; HOLES], 72, Decimal::from(10));

        assert_eq!(totals.capped_scores, [5; HOLES]);
        assert_eq!(totals.gross_capped, 90);
        assert_eq!(totals.net, Decimal::from(80));
        assert_eq!(totals.over_par, dec("18.0"));
        assert_eq!(totals.over_par.to_string(), "18.0");
    }

    #[test]
    fn test_round_totals_caps_blowup_hole() {
        let mut raw = [4u8; HOLES];
        raw[0] = 10; // par 4 blowup, capped to 6
        let totals = compute_round_totals(&raw, &[4; HOLES], 72, Decimal::ZERO);

        assert_eq!(totals.capped_scores[0], 6);
        assert_eq!(totals.gross_capped, 74);
        assert_eq!(totals.over_par, dec("2.0"));
    }

    #[test]
    fn test_round_totals_under_par_is_negative() {
        let totals = compute_round_totals(&[3; HOLES], &[4; HOLES], 72, Decimal::from(2));
        assert_eq!(totals.gross_capped, 54);
        assert_eq!(totals.over_par, dec("-18.0"));
        assert_eq!(totals.net, Decimal::from(52));
    }

    #[test]
    fn test_round_totals_fractional_handicap_not_rounded() {
        let totals = compute_round_totals(&[5; HOLES], &[4; HOLES], 72, dec("12.7"));
        assert_eq!(totals.net, dec("77.3"));
    }

    #[test]
    fn test_delta_clamped_up() {
        let change = compute_monthly_handicap_delta(10, dec("10"), dec("0.5"), dec("2.0"));
        assert_eq!(change.raw_delta, dec("5.0"));
        assert_eq!(change.delta, dec("2.0"));
        assert_eq!(change.new_handicap, 12);
    }

    #[test]
    fn test_delta_clamped_down() {
        let change = compute_monthly_handicap_delta(5, dec("-8"), dec("0.5"), dec("2.0"));
        assert_eq!(change.raw_delta, dec("-4.0"));
        assert_eq!(change.delta, dec("-2.0"));
        assert_eq!(change.new_handicap, 3);
    }

    #[test]
    fn test_delta_within_cap_rounds_half_up() {
        // 7 + 1.5 = 8.5 -> 9
        let change = compute_monthly_handicap_delta(7, dec("3"), dec("0.5"), dec("2.0"));
        assert_eq!(change.delta, dec("1.5"));
        assert_eq!(change.new_handicap, 9);

        // 7 + 0.4 = 7.4 -> 7
        let change = compute_monthly_handicap_delta(7, dec("0.8"), dec("0.5"), dec("2.0"));
        assert_eq!(change.new_handicap, 7);
    }

    #[test]
    fn test_new_handicap_floors_at_zero() {
        let change = compute_monthly_handicap_delta(1, dec("-20"), dec("0.5"), dec("2.0"));
        assert_eq!(change.delta, dec("-2.0"));
        assert_eq!(change.new_handicap, 0);
    }

    #[test]
    fn test_new_handicap_saturates() {
        let change = compute_monthly_handicap_delta(u32::MAX, dec("10.0"), dec("0.5"), dec("2.0"));
        assert_eq!(change.new_handicap, u32::MAX);
    }

    #[test]
    fn test_unchanged_handicap() {
        let change = unchanged_handicap(14);
        assert_eq!(change.delta, Decimal::ZERO);
        assert_eq!(change.new_handicap, 14);
    }

    fn arb_hole() -> impl Strategy<Value = (u8, u8)> {
        (1u8..=10, 3u8..=5)
    }

    proptest! {
        #[test]
        fn prop_cap_never_exceeds_par_plus_two((raw, par) in arb_hole()) {
            let capped = cap_score(raw, par);
            if raw <= par + 2 {
                prop_assert_eq!(capped, raw);
            } else {
                prop_assert_eq!(capped, par + 2);
            }
        }

        #[test]
        fn prop_gross_never_exceeds_raw_sum(
            holes in prop::collection::vec(arb_hole(), HOLES),
            handicap in 0i64..=540,
        ) {
            let mut raw = [0u8; HOLES];
            let mut pars = [0u8; HOLES];
            for (i, (r, p)) in holes.iter().enumerate() {
                raw[i] = *r;
                pars[i] = *p;
            }
            let par_total: u32 = pars.iter().map(|&p| u32::from(p)).sum();
            let handicap = Decimal::new(handicap, 1);

            let totals = compute_round_totals(&raw, &pars, par_total, handicap);
            let raw_sum: u32 = raw.iter().map(|&r| u32::from(r)).sum();

            prop_assert!(totals.gross_capped <= raw_sum);
            prop_assert_eq!(totals.net, Decimal::from(totals.gross_capped) - handicap);
        }

        #[test]
        fn prop_new_handicap_matches_rounded_clamped_delta(
            prev in 0u32..=54,
            avg_tenths in -400i64..=400,
            k_tenths in 1i64..=30,
            cap_tenths in 1i64..=50,
        ) {
            let avg = Decimal::new(avg_tenths, 1);
            let k = Decimal::new(k_tenths, 1);
            let cap = Decimal::new(cap_tenths, 1);

            let change = compute_monthly_handicap_delta(prev, avg, k, cap);

            prop_assert!(change.delta >= -cap && change.delta <= cap);

            // Same computation in integer hundredths, rounding half-up by hand.
            let cap_hundredths = cap_tenths * 10;
            let delta_hundredths = (avg_tenths * k_tenths).clamp(-cap_hundredths, cap_hundredths);
            let total = i64::from(prev) * 100 + delta_hundredths;
            let expected = (total + 50).div_euclid(100).max(0);

            prop_assert_eq!(change.delta, Decimal::new(delta_hundredths, 2));
            prop_assert_eq!(i64::from(change.new_handicap), expected);
        }
    }
}
