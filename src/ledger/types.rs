use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use tracing::info;

use crate::league::course::{Course, CourseError, NewCourse};
use crate::league::types::{CourseId, HandicapSnapshot, Month, Player, PlayerId, Round, RoundId};
use crate::scoring::{course_handicap, validate_round_input, ScoreInputError};

pub const LEDGER_VERSION: u32 = 1;

/// Rejections raised by ledger mutations. These are caller mistakes, not I/O
/// failures, and leave the ledger untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("no player named '{0}'")]
    UnknownPlayer(String),
    #[error("no player with id {0}")]
    UnknownPlayerId(PlayerId),
    #[error("no course '{0}'")]
    UnknownCourse(String),
    #[error("no course with id {0}")]
    UnknownCourseId(CourseId),
    #[error("no round with id {0}")]
    UnknownRound(RoundId),
    #[error("player '{0}' already exists")]
    DuplicatePlayer(String),
    #[error("course '{0}' already exists")]
    DuplicateCourse(String),
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("invalid course: {}", join_errors(.0))]
    InvalidCourse(Vec<CourseError>),
    #[error("invalid scores: {}", join_errors(.0))]
    InvalidScores(Vec<ScoreInputError>),
    #[error("'{0}' is not an admin")]
    NotAdmin(String),
    #[error("handicaps for {0} were already recalculated")]
    AlreadyRecalculated(Month),
    #[error("cannot recalculate {requested}: {latest} has already been recorded")]
    OutOfOrder { requested: Month, latest: Month },
    #[error("handicap for '{player}' is already settled for {month}; rounds can no longer be added to it")]
    MonthClosed { player: String, month: Month },
}

fn join_errors<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIds {
    pub player: PlayerId,
    pub course: CourseId,
    pub round: RoundId,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            player: 1,
            course: 1,
            round: 1,
        }
    }
}

/// Everything persisted for one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub version: u32,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub snapshots: Vec<HandicapSnapshot>,
    #[serde(default)]
    pub next_ids: NextIds,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new("")
    }
}

impl Ledger {
    /// Create a new empty ledger at the current version
    pub fn new(league: &str) -> Self {
        Self {
            version: LEDGER_VERSION,
            league: league.to_string(),
            players: Vec::new(),
            courses: Vec::new(),
            rounds: Vec::new(),
            snapshots: Vec::new(),
            next_ids: NextIds::default(),
        }
    }

    pub fn add_player(
        &mut self,
        name: &str,
        contact: Option<String>,
        handicap: u32,
        is_admin: bool,
    ) -> Result<PlayerId, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyPlayerName);
        }
        if self.player_by_name(name).is_some() {
            return Err(LedgerError::DuplicatePlayer(name.to_string()));
        }

        let id = self.next_ids.player;
        self.next_ids.player += 1;
        self.players.push(Player {
            id,
            name: name.to_string(),
            contact,
            handicap,
            is_admin,
        });
        info!(player = name, id, handicap, "added player");
        Ok(id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Player lookup by name, ignoring ASCII case.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn require_player(&self, name: &str) -> Result<&Player, LedgerError> {
        self.player_by_name(name)
            .ok_or_else(|| LedgerError::UnknownPlayer(name.to_string()))
    }

    fn require_admin(&self, acting: PlayerId) -> Result<(), LedgerError> {
        match self.player(acting) {
            Some(p) if p.is_admin => Ok(()),
            Some(p) => Err(LedgerError::NotAdmin(p.name.clone())),
            None => Err(LedgerError::UnknownPlayerId(acting)),
        }
    }

    pub fn set_admin(
        &mut self,
        acting: PlayerId,
        target: PlayerId,
        is_admin: bool,
    ) -> Result<(), LedgerError> {
        self.require_admin(acting)?;
        let player = self
            .player_mut(target)
            .ok_or(LedgerError::UnknownPlayerId(target))?;
        player.is_admin = is_admin;
        info!(player = %player.name, is_admin, "changed admin flag");
        Ok(())
    }

    pub fn add_course(&mut self, new_course: NewCourse) -> Result<CourseId, LedgerError> {
        new_course.validate().map_err(LedgerError::InvalidCourse)?;
        if self
            .course_by_name(&new_course.name, Some(&new_course.tee))
            .is_some()
        {
            return Err(LedgerError::DuplicateCourse(format!(
                "{} ({})",
                new_course.name.trim(),
                new_course.tee.trim()
            )));
        }

        let id = self.next_ids.course;
        self.next_ids.course += 1;
        let course = new_course.into_course(id);
        info!(course = %course.label(), id, "added course");
        self.courses.push(course);
        Ok(id)
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Course lookup by name and, optionally, tee. Without a tee the first
    /// course with that name wins.
    pub fn course_by_name(&self, name: &str, tee: Option<&str>) -> Option<&Course> {
        let name = name.trim();
        self.courses.iter().find(|c| {
            c.name.eq_ignore_ascii_case(name)
                && tee.map_or(true, |t| c.tee.eq_ignore_ascii_case(t.trim()))
        })
    }

    /// Score and store a submitted round.
    ///
    /// Rounds dated in a month that can no longer be recalculated for the
    /// player (already snapshotted, or older than the latest recorded month)
    /// are rejected, so every stored round is counted exactly once.
    /// The course handicap is derived from the player's current handicap and
    /// the course's slope and rating at the time of submission.
    pub fn record_round(
        &mut self,
        player_id: PlayerId,
        course_id: CourseId,
        played_on: NaiveDate,
        raw_scores: &[u8],
    ) -> Result<RoundId, LedgerError> {
        let player = self
            .player(player_id)
            .ok_or(LedgerError::UnknownPlayerId(player_id))?;
        let course = self
            .course(course_id)
            .ok_or(LedgerError::UnknownCourseId(course_id))?;

        let month = Month::of(played_on);
        let superseded = self
            .latest_snapshot_month()
            .is_some_and(|latest| latest > month);
        if superseded || self.has_snapshot(player_id, month) {
            return Err(LedgerError::MonthClosed {
                player: player.name.clone(),
                month,
            });
        }

        let (scores, pars) = validate_round_input(raw_scores, &course.hole_pars())
            .map_err(LedgerError::InvalidScores)?;
        let handicap = course_handicap(player.handicap, course.slope, course.rating, course.par_total);

        let id = self.next_ids.round;
        let round = Round::score(
            id,
            player_id,
            course_id,
            played_on,
            scores,
            &pars,
            course.par_total,
            handicap,
        );
        info!(
            round = id,
            player = %player.name,
            course = %course.label(),
            gross = round.gross_capped,
            net = %round.net,
            "recorded round"
        );

        self.next_ids.round += 1;
        self.rounds.push(round);
        Ok(id)
    }

    /// Admin correction of a stored round's raw scores.
    pub fn correct_round(
        &mut self,
        acting: PlayerId,
        round_id: RoundId,
        raw_scores: &[u8],
    ) -> Result<(), LedgerError> {
        self.require_admin(acting)?;

        let course_id = self
            .round(round_id)
            .ok_or(LedgerError::UnknownRound(round_id))?
            .course_id;
        let course = self
            .course(course_id)
            .ok_or(LedgerError::UnknownCourseId(course_id))?;
        let (scores, pars) = validate_round_input(raw_scores, &course.hole_pars())
            .map_err(LedgerError::InvalidScores)?;
        let par_total = course.par_total;

        let round = self
            .rounds
            .iter_mut()
            .find(|r| r.id == round_id)
            .ok_or(LedgerError::UnknownRound(round_id))?;
        round.correct(scores, &pars, par_total);
        info!(round = round_id, gross = round.gross_capped, "corrected round");
        Ok(())
    }

    pub fn round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    /// Rounds for a player, oldest first.
    pub fn rounds_for(&self, player_id: PlayerId) -> Vec<&Round> {
        let mut rounds: Vec<&Round> = self
            .rounds
            .iter()
            .filter(|r| r.player_id == player_id)
            .collect();
        rounds.sort_by_key(|r| (r.played_on, r.id));
        rounds
    }

    pub fn snapshots_for(&self, player_id: PlayerId) -> Vec<&HandicapSnapshot> {
        let mut snapshots: Vec<&HandicapSnapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.player_id == player_id)
            .collect();
        snapshots.sort_by_key(|s| s.month);
        snapshots
    }

    pub fn has_snapshot(&self, player_id: PlayerId, month: Month) -> bool {
        self.snapshots
            .iter()
            .any(|s| s.player_id == player_id && s.month == month)
    }

    /// Most recent month with any recorded snapshot.
    pub fn latest_snapshot_month(&self) -> Option<Month> {
        self.snapshots.iter().map(|s| s.month).max()
    }

    pub(crate) fn set_handicap(&mut self, player_id: PlayerId, handicap: u32) {
        if let Some(player) = self.player_mut(player_id) {
            player.handicap = handicap;
        }
    }
}
