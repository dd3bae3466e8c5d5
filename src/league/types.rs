use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scoring::{compute_round_totals, HOLES};

pub type PlayerId = u32;
pub type CourseId = u32;
pub type RoundId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    /// Current handicap, never below zero.
    pub handicap: u32,
    #[serde(default)]
    pub is_admin: bool,
}

/// A completed, scored round. Derived fields are computed at submission and
/// only change through an admin correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub player_id: PlayerId,
    pub course_id: CourseId,
    pub played_on: NaiveDate,
    pub raw_scores: [u8; HOLES],
    pub capped_scores: [u8; HOLES],
    pub gross_capped: u32,
    pub course_handicap: Decimal,
    pub net: Decimal,
    pub over_par: Decimal,
    #[serde(default)]
    pub corrected_at: Option<DateTime<Utc>>,
}

impl Round {
    #[allow(clippy::too_many_arguments)]
    pub fn score(
        id: RoundId,
        player_id: PlayerId,
        course_id: CourseId,
        played_on: NaiveDate,
        raw_scores: [u8; HOLES],
        hole_pars: &[u8; HOLES],
        par_total: u32,
        course_handicap: Decimal,
    ) -> Self {
        let totals = compute_round_totals(&raw_scores, hole_pars, par_total, course_handicap);
        Self {
            id,
            player_id,
            course_id,
            played_on,
            raw_scores,
            capped_scores: totals.capped_scores,
            gross_capped: totals.gross_capped,
            course_handicap,
            net: totals.net,
            over_par: totals.over_par,
            corrected_at: None,
        }
    }

    /// Replace the raw scores and recompute every derived field.
    /// The course handicap recorded at time of play is kept.
    pub fn correct(&mut self, raw_scores: [u8; HOLES], hole_pars: &[u8; HOLES], par_total: u32) {
        let totals = compute_round_totals(&raw_scores, hole_pars, par_total, self.course_handicap);
        self.raw_scores = raw_scores;
        self.capped_scores = totals.capped_scores;
        self.gross_capped = totals.gross_capped;
        self.net = totals.net;
        self.over_par = totals.over_par;
        self.corrected_at = Some(Utc::now());
    }

    pub fn raw_total(&self) -> u32 {
        self.raw_scores.iter().map(|&s| u32::from(s)).sum()
    }
}

/// Audit row written once per player per month by the recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandicapSnapshot {
    pub player_id: PlayerId,
    pub month: Month,
    pub previous_handicap: u32,
    pub rounds_counted: u32,
    pub avg_over_par: Decimal,
    pub delta: Decimal,
    pub new_handicap: u32,
    pub recorded_at: DateTime<Utc>,
}

/// A calendar month, written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid month '{}': bad year", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month '{}': bad month", s))?;
        Month::new(year, month).ok_or_else(|| format!("Invalid month '{}': month must be 1-12", s))
    }
}

impl TryFrom<String> for Month {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(month: Month) -> Self {
        month.to_string()
    }
}
