pub mod formatter;

pub use formatter::{
    format_course_list, format_leaderboard, format_leaderboard_tsv, format_player_list,
    format_round_list, format_scorecard, format_signed, format_snapshot_history,
    should_use_colors,
};
