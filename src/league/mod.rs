pub mod course;
pub mod leaderboard;
pub mod recalc;
pub mod types;

pub use course::{Course, CourseError, Hole, NewCourse};
pub use leaderboard::{build_leaderboard, LeaderboardRow, Period};
pub use recalc::{average_tenths, recalculate_month};
pub use types::{CourseId, HandicapSnapshot, Month, Player, PlayerId, Round, RoundId};
