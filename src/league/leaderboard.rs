use rust_decimal::Decimal;
use std::cmp::Ordering;

use super::recalc::average_tenths;
use super::types::{Month, PlayerId, Round};
use crate::ledger::Ledger;

/// Time window a leaderboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Season,
    Month(Month),
}

impl Period {
    fn includes(&self, round: &Round) -> bool {
        match self {
            Period::Season => true,
            Period::Month(m) => m.contains(round.played_on),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// Competition rank (1, 2, 2, 4); `None` for players with no rounds.
    pub rank: Option<u32>,
    pub tied: bool,
    pub player_id: PlayerId,
    pub name: String,
    pub rounds: u32,
    pub best_gross: Option<u32>,
    pub avg_net: Option<Decimal>,
    pub avg_over_par: Option<Decimal>,
    pub handicap: u32,
}

impl LeaderboardRow {
    /// Position as shown on a board: "1", "T2", or "-" when unranked.
    pub fn position_label(&self) -> String {
        match (self.rank, self.tied) {
            (Some(rank), true) => format!("T{}", rank),
            (Some(rank), false) => rank.to_string(),
            (None, _) => "-".to_string(),
        }
    }
}

/// Rank players by average net score (lower is better).
///
/// Ties on the displayed average share a rank. Order within a tie is more
/// rounds first, then name.
pub fn build_leaderboard(ledger: &Ledger, period: Period) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = ledger
        .players
        .iter()
        .map(|player| {
            let rounds: Vec<&Round> = ledger
                .rounds
                .iter()
                .filter(|r| r.player_id == player.id && period.includes(r))
                .collect();
            LeaderboardRow {
                rank: None,
                tied: false,
                player_id: player.id,
                name: player.name.clone(),
                rounds: rounds.len() as u32,
                best_gross: rounds.iter().map(|r| r.gross_capped).min(),
                avg_net: average_tenths(rounds.iter().map(|r| r.net)),
                avg_over_par: average_tenths(rounds.iter().map(|r| r.over_par)),
                handicap: player.handicap,
            }
        })
        .collect();

    rows.sort_by(compare_rows);

    let ranked: Vec<Decimal> = rows.iter().filter_map(|r| r.avg_net).collect();
    for row in rows.iter_mut() {
        if let Some(avg) = row.avg_net {
            let better = ranked.iter().filter(|&&other| other < avg).count() as u32;
            let same = ranked.iter().filter(|&&other| other == avg).count();
            row.rank = Some(better + 1);
            row.tied = same > 1;
        }
    }

    rows
}

fn compare_rows(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    match (a.avg_net, b.avg_net) {
        (Some(x), Some(y)) => x
            .cmp(&y)
            .then_with(|| b.rounds.cmp(&a.rounds))
            .then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}
