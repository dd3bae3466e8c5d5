use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use super::types::{HandicapSnapshot, Month, Round};
use crate::ledger::{Ledger, LedgerError};
use crate::scoring::{compute_monthly_handicap_delta, unchanged_handicap, SeasonParams};

/// Mean rounded half-up to one decimal place, or `None` for no values.
pub fn average_tenths<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut sum = Decimal::ZERO;
    let mut count: u32 = 0;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let mut mean = (sum / Decimal::from(count))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    mean.rescale(1);
    Some(mean)
}

/// Recalculate every player's handicap for `month`.
///
/// Each player gets exactly one snapshot per month, including players who
/// posted no rounds. Players that already have a snapshot for the month are
/// left alone; if every player does, the call is rejected. Months must be
/// processed in order.
pub fn recalculate_month(
    ledger: &mut Ledger,
    month: Month,
    params: SeasonParams,
) -> Result<Vec<HandicapSnapshot>, LedgerError> {
    if let Some(latest) = ledger.latest_snapshot_month() {
        if latest > month {
            return Err(LedgerError::OutOfOrder {
                requested: month,
                latest,
            });
        }
    }

    let mut player_ids: Vec<_> = ledger
        .players
        .iter()
        .filter(|p| !ledger.has_snapshot(p.id, month))
        .map(|p| p.id)
        .collect();
    player_ids.sort_unstable();

    if player_ids.is_empty() && !ledger.players.is_empty() {
        return Err(LedgerError::AlreadyRecalculated(month));
    }

    let recorded_at = Utc::now();
    let mut written = Vec::with_capacity(player_ids.len());

    for player_id in player_ids {
        let Some(player) = ledger.player(player_id) else {
            continue;
        };
        let previous_handicap = player.handicap;

        let month_rounds: Vec<&Round> = ledger
            .rounds
            .iter()
            .filter(|r| r.player_id == player_id && month.contains(r.played_on))
            .collect();
        let rounds_counted = month_rounds.len() as u32;

        let (avg_over_par, change) = match average_tenths(month_rounds.iter().map(|r| r.over_par)) {
            Some(avg) => (
                avg,
                compute_monthly_handicap_delta(
                    previous_handicap,
                    avg,
                    params.k_factor,
                    params.change_cap,
                ),
            ),
            None => (Decimal::new(0, 1), unchanged_handicap(previous_handicap)),
        };

        debug!(
            player = %player.name,
            %month,
            rounds_counted,
            %avg_over_par,
            raw_delta = %change.raw_delta,
            delta = %change.delta,
            previous_handicap,
            new_handicap = change.new_handicap,
            "recalculated handicap"
        );

        let snapshot = HandicapSnapshot {
            player_id,
            month,
            previous_handicap,
            rounds_counted,
            avg_over_par,
            delta: change.delta,
            new_handicap: change.new_handicap,
            recorded_at,
        };

        ledger.set_handicap(player_id, change.new_handicap);
        ledger.snapshots.push(snapshot.clone());
        written.push(snapshot);
    }

    info!(%month, snapshots = written.len(), "monthly handicap recalculation complete");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::tests::{date, sample_ledger};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn params() -> SeasonParams {
        SeasonParams {
            k_factor: dec("0.5"),
            change_cap: dec("2.0"),
        }
    }

    fn month(s: &str) -> Month {
        s.parse().unwrap()
    }

    #[test]
    fn test_average_tenths() {
        assert_eq!(average_tenths(Vec::<Decimal>::new()), None);
        assert_eq!(average_tenths(vec![dec("18.0"), dec("3.0")]), Some(dec("10.5")));
        // 1/3 = 0.333.. -> 0.3
        assert_eq!(
            average_tenths(vec![dec("1.0"), dec("0.0"), dec("0.0")]),
            Some(dec("0.3"))
        );
        // -0.25 -> -0.3 (away from zero on the midpoint)
        assert_eq!(average_tenths(vec![dec("-0.5"), dec("0.0")]), Some(dec("-0.3")));
    }

    #[test]
    fn test_recalculate_applies_capped_delta() {
        let mut ledger = sample_ledger();
        // Alice: two rounds at +18 and +2 -> avg 10 -> raw 5 -> capped +2
        ledger.record_round(1, 1, date("2026-05-02"), &[5; 18]).unwrap();
        let mut card = [4u8; 18];
        card[0] = 6;
        ledger.record_round(1, 1, date("2026-05-20"), &card).unwrap();
        // Outside the month, ignored
        ledger.record_round(1, 1, date("2026-06-01"), &[3; 18]).unwrap();

        let snapshots = recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        assert_eq!(snapshots.len(), 2);

        let alice = &snapshots[0];
        assert_eq!(alice.player_id, 1);
        assert_eq!(alice.previous_handicap, 10);
        assert_eq!(alice.rounds_counted, 2);
        assert_eq!(alice.avg_over_par, dec("10.0"));
        assert_eq!(alice.delta, dec("2.0"));
        assert_eq!(alice.new_handicap, 12);
        assert_eq!(ledger.player(1).unwrap().handicap, 12);
    }

    #[test]
    fn test_zero_rounds_still_snapshotted() {
        let mut ledger = sample_ledger();
        let snapshots = recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();

        let bob = snapshots.iter().find(|s| s.player_id == 2).unwrap();
        assert_eq!(bob.rounds_counted, 0);
        assert_eq!(bob.delta, Decimal::ZERO);
        assert_eq!(bob.new_handicap, 5);
        assert_eq!(bob.avg_over_par.to_string(), "0.0");
        assert_eq!(ledger.snapshots.len(), 2);
    }

    #[test]
    fn test_under_par_month_lowers_handicap() {
        let mut ledger = sample_ledger();
        // Bob shoots 54 on a par 72: -18 -> raw -9 -> capped -2
        ledger.record_round(2, 1, date("2026-05-02"), &[3; 18]).unwrap();
        recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        assert_eq!(ledger.player(2).unwrap().handicap, 3);
    }

    #[test]
    fn test_rerun_rejected() {
        let mut ledger = sample_ledger();
        recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        let err = recalculate_month(&mut ledger, month("2026-05"), params()).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyRecalculated(month("2026-05")));
        assert_eq!(ledger.snapshots.len(), 2);
    }

    #[test]
    fn test_late_player_joins_month() {
        let mut ledger = sample_ledger();
        recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        ledger.add_player("Carol", None, 20, false).unwrap();

        let snapshots = recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].player_id, 3);
    }

    #[test]
    fn test_round_for_settled_month_rejected() {
        let mut ledger = sample_ledger();
        recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();

        let err = ledger
            .record_round(2, 1, date("2026-05-20"), &[3; 18])
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::MonthClosed {
                player: "Bob".to_string(),
                month: month("2026-05"),
            }
        );
        assert!(ledger.rounds_for(2).is_empty());

        // The next month is still open and its rounds are counted.
        ledger.record_round(2, 1, date("2026-06-03"), &[3; 18]).unwrap();
        recalculate_month(&mut ledger, month("2026-06"), params()).unwrap();
        let counted: u32 = ledger
            .snapshots_for(2)
            .iter()
            .map(|s| s.rounds_counted)
            .sum();
        assert_eq!(counted as usize, ledger.rounds_for(2).len());
    }

    #[test]
    fn test_round_before_latest_month_rejected() {
        let mut ledger = sample_ledger();
        recalculate_month(&mut ledger, month("2026-06"), params()).unwrap();
        let carol = ledger.add_player("Carol", None, 20, false).unwrap();

        // May can no longer be recalculated, so Carol's May round would never count.
        let err = ledger
            .record_round(carol, 1, date("2026-05-15"), &[5; 18])
            .unwrap_err();
        assert!(matches!(err, LedgerError::MonthClosed { .. }));
        assert!(ledger.record_round(carol, 1, date("2026-06-15"), &[5; 18]).is_ok());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut ledger = sample_ledger();
        recalculate_month(&mut ledger, month("2026-06"), params()).unwrap();
        let err = recalculate_month(&mut ledger, month("2026-05"), params()).unwrap_err();
        assert!(matches!(err, LedgerError::OutOfOrder { .. }));
    }

    #[test]
    fn test_consecutive_months_chain() {
        let mut ledger = sample_ledger();
        ledger.record_round(1, 1, date("2026-05-02"), &[5; 18]).unwrap();
        ledger.record_round(1, 1, date("2026-06-02"), &[5; 18]).unwrap();

        recalculate_month(&mut ledger, month("2026-05"), params()).unwrap();
        let june = recalculate_month(&mut ledger, month("2026-06"), params()).unwrap();

        assert_eq!(june[0].previous_handicap, 12);
        assert_eq!(june[0].new_handicap, 14);
        assert_eq!(ledger.snapshots_for(1).len(), 2);
    }
}
