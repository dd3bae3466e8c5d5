use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::league::{Course, HandicapSnapshot, LeaderboardRow, Player, Round};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Signed decimal with explicit plus sign: "+2.0", "-1.5", "0.0"
pub fn format_signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn format_opt(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Format the leaderboard as a table.
/// Columns: Pos, Player, Rnds, Best, Avg Net, Avg +/-, Hcp
pub fn format_leaderboard(rows: &[LeaderboardRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No players found.".to_string();
    }

    // Pos(4) Rnds(5) Best(5) AvgNet(8) AvgOver(8) Hcp(4) plus separators
    let fixed_width = 4 + 5 + 5 + 8 + 8 + 4 + 2 * 6;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(24),
        Some(_) => 10,
        None => rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(6).max(6),
    };

    let header = format!(
        "{:>4}  {:<name_width$}  {:>5}  {:>5}  {:>8}  {:>8}  {:>4}",
        "Pos", "Player", "Rnds", "Best", "Avg Net", "Avg +/-", "Hcp",
        name_width = name_width
    );

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });

    for row in rows {
        let name = truncate_name(&row.name, name_width);
        let best = row
            .best_gross
            .map_or_else(|| "-".to_string(), |g| g.to_string());
        let over = row
            .avg_over_par
            .map_or_else(|| "-".to_string(), format_signed);
        let line = format!(
            "{:>4}  {:<name_width$}  {:>5}  {:>5}  {:>8}  {:>8}  {:>4}",
            row.position_label(),
            name,
            row.rounds,
            best,
            format_opt(row.avg_net),
            over,
            row.handicap,
            name_width = name_width
        );
        let line = if !use_colors {
            line
        } else if row.rank == Some(1) {
            line.green().to_string()
        } else if row.rank.is_none() {
            line.dimmed().to_string()
        } else {
            line
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format the leaderboard as tab-separated values for scripting
/// Columns: position, player, rounds, best, avg_net, avg_over_par, handicap (no headers, no colors)
pub fn format_leaderboard_tsv(rows: &[LeaderboardRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.position_label(),
                row.name,
                row.rounds,
                row.best_gross.map(|g| g.to_string()).unwrap_or_default(),
                row.avg_net.map(|v| v.to_string()).unwrap_or_default(),
                row.avg_over_par.map(|v| v.to_string()).unwrap_or_default(),
                row.handicap
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a round as a scorecard: hole numbers, par, raw and capped rows,
/// followed by the totals.
pub fn format_scorecard(round: &Round, course: &Course, player: &Player, use_colors: bool) -> String {
    let pars = course.hole_pars();

    let mut hole_row = String::from("Hole  ");
    let mut par_row = String::from("Par   ");
    let mut raw_row = String::from("Score ");
    let mut cap_row = String::from("Adj   ");

    for (i, par) in pars.iter().enumerate() {
        let raw = round.raw_scores[i];
        let capped = round.capped_scores[i];
        hole_row.push_str(&format!("{:>3}", i + 1));
        par_row.push_str(&format!("{:>3}", par));
        let raw_cell = format!("{:>3}", raw);
        raw_row.push_str(&if use_colors && raw < *par {
            raw_cell.green().to_string()
        } else if use_colors && raw != capped {
            raw_cell.red().to_string()
        } else {
            raw_cell
        });
        cap_row.push_str(&format!("{:>3}", capped));
    }

    let title = format!(
        "Round #{}: {} at {} on {}",
        round.id,
        player.name,
        course.label(),
        round.played_on
    );
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };
    let corrected = match round.corrected_at {
        Some(at) => format!("\n  (corrected {})", at.format("%Y-%m-%d %H:%M UTC")),
        None => String::new(),
    };

    format!(
        "{}\n{}\n{}\n{}\n{}\n  Gross (raw): {}  Gross (adjusted): {}  Course handicap: {}  Net: {}  Over par: {}{}",
        title,
        hole_row,
        par_row,
        raw_row,
        cap_row,
        round.raw_total(),
        round.gross_capped,
        round.course_handicap,
        round.net,
        format_signed(round.over_par),
        corrected
    )
}

/// Format a player's rounds one per line, oldest first.
pub fn format_round_list(rounds: &[&Round], courses: &[Course]) -> String {
    if rounds.is_empty() {
        return "No rounds recorded.".to_string();
    }
    rounds
        .iter()
        .map(|r| {
            let course = courses
                .iter()
                .find(|c| c.id == r.course_id)
                .map_or_else(|| format!("course #{}", r.course_id), |c| c.label());
            format!(
                "{:>4}. {}  {}  gross {}  net {}  {}",
                r.id,
                r.played_on,
                course,
                r.gross_capped,
                r.net,
                format_signed(r.over_par)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a handicap snapshot history, one month per line.
pub fn format_snapshot_history(snapshots: &[&HandicapSnapshot], use_colors: bool) -> String {
    if snapshots.is_empty() {
        return "No handicap history yet.".to_string();
    }

    snapshots
        .iter()
        .map(|s| {
            let change = format!("{:>3} -> {:<3}", s.previous_handicap, s.new_handicap);
            let change = if !use_colors {
                change
            } else if s.new_handicap > s.previous_handicap {
                change.red().to_string()
            } else if s.new_handicap < s.previous_handicap {
                change.green().to_string()
            } else {
                change
            };
            format!(
                "{}  {}  rounds {:>2}  avg {:>6}  delta {:>5}",
                s.month,
                change,
                s.rounds_counted,
                format_signed(s.avg_over_par),
                format_signed(s.delta)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_player_list(players: &[Player]) -> String {
    if players.is_empty() {
        return "No players found.".to_string();
    }
    players
        .iter()
        .map(|p| {
            let mut line = format!("{:>4}. {}  (hcp {})", p.id, p.name, p.handicap);
            if p.is_admin {
                line.push_str("  [admin]");
            }
            if let Some(ref contact) = p.contact {
                line.push_str(&format!("  <{}>", contact));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_course_list(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "No courses found.".to_string();
    }
    courses
        .iter()
        .map(|c| {
            let rating = format_opt(c.rating);
            let slope = c.slope.map_or_else(|| "-".to_string(), |s| s.to_string());
            format!(
                "{:>4}. {}  par {}  rating {}  slope {}",
                c.id,
                c.label(),
                c.par_total,
                rating,
                slope
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
