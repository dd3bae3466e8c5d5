use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fairway::config::ResolvedLeague;
use fairway::league::{build_leaderboard, recalculate_month, Month, NewCourse, Period, RoundId};
use fairway::ledger::{Ledger, LedgerError};
use fairway::scoring::{validate_season, SeasonParams};

const EXIT_SUCCESS: i32 = 0;
const EXIT_IO: i32 = 2;
const EXIT_INPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a config file interactively
    Init,
    /// Manage players
    #[command(subcommand)]
    Player(PlayerCommand),
    /// Manage courses
    #[command(subcommand)]
    Course(CourseCommand),
    /// Record, correct and view rounds
    #[command(subcommand)]
    Round(RoundCommand),
    /// Monthly handicap recalculation and history
    #[command(subcommand)]
    Handicap(HandicapCommand),
    /// Show the league leaderboard
    Leaderboard {
        /// Limit to one month (YYYY-MM); defaults to the whole season
        #[arg(long)]
        month: Option<Month>,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PlayerCommand {
    /// Add a player
    Add {
        name: String,
        /// Starting handicap
        #[arg(long, default_value_t = 0)]
        handicap: u32,
        /// Contact details (email, phone)
        #[arg(long)]
        contact: Option<String>,
        /// Make the player a league admin
        #[arg(long)]
        admin: bool,
    },
    /// List players
    List,
    /// Grant or revoke admin rights
    Admin {
        name: String,
        /// Admin performing the change
        #[arg(long = "as", value_name = "ADMIN")]
        acting: String,
        #[arg(long)]
        revoke: bool,
    },
    /// List a player's rounds
    Rounds { name: String },
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    /// Add a course from a YAML definition
    Add { file: PathBuf },
    /// List courses
    List,
}

#[derive(Subcommand, Debug)]
enum RoundCommand {
    /// Record a completed round
    Add {
        player: String,
        course: String,
        /// Tee, when the course has more than one
        #[arg(long)]
        tee: Option<String>,
        /// Date played (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// 18 hole scores, comma-separated
        #[arg(value_delimiter = ',', num_args = 1.., required = true)]
        scores: Vec<u8>,
    },
    /// Replace the scores of a recorded round (admins only)
    Correct {
        round: RoundId,
        #[arg(long = "as", value_name = "ADMIN")]
        acting: String,
        #[arg(value_delimiter = ',', num_args = 1.., required = true)]
        scores: Vec<u8>,
    },
    /// Show a round's scorecard
    Show { round: RoundId },
}

#[derive(Subcommand, Debug)]
enum HandicapCommand {
    /// Recalculate every player's handicap for a month (YYYY-MM)
    Recalc { month: Month },
    /// Show a player's monthly handicap history
    History { player: String },
}

#[derive(Parser, Debug)]
#[command(name = "fairway")]
#[command(about = "Golf league scorekeeping and handicaps", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/fairway/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// League to operate on (defaults to the first configured league)
    #[arg(short, long, global = true)]
    league: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    fairway::logging::init(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = cli.command {
        if let Err(e) = fairway::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_IO);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match fairway::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config.validate() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let league = match config.resolve_league(cli.league.as_deref()) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Catches an invalid global season that a league override leaves in effect
    let params = match validate_season(&league.season)
        .map_err(|errors| errors.join("; "))
        .and_then(|_| league.season.params().map_err(|e| e.to_string()))
    {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    tracing::debug!(
        league = %league.name,
        ledger = %league.ledger_path.display(),
        k_factor = %params.k_factor,
        change_cap = %params.change_cap,
        "resolved league"
    );

    let mut ledger = match fairway::ledger::load_ledger(&league.ledger_path, &league.name) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Ledger error: {:#}", e);
            std::process::exit(EXIT_IO);
        }
    };

    let use_colors = fairway::output::should_use_colors();

    match execute(cli.command, &mut ledger, params, use_colors) {
        Ok(true) => {
            if let Err(e) = fairway::ledger::save_ledger(&league.ledger_path, &ledger) {
                eprintln!("Ledger error: {:#}", e);
                std::process::exit(EXIT_IO);
            }
        }
        Ok(false) => {}
        Err(e) => {
            report_failure(&league, &e);
            std::process::exit(exit_code_for(&e));
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn report_failure(league: &ResolvedLeague, err: &anyhow::Error) {
    if let Some(ledger_err) = err.downcast_ref::<LedgerError>() {
        eprintln!("{}: {}", league.name, ledger_err);
    } else {
        eprintln!("Error: {:#}", err);
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<LedgerError>().is_some() {
        EXIT_INPUT
    } else {
        EXIT_IO
    }
}

/// Run a subcommand against the loaded ledger.
/// Returns whether the ledger changed and must be saved.
fn execute(
    command: Commands,
    ledger: &mut Ledger,
    params: SeasonParams,
    use_colors: bool,
) -> Result<bool> {
    match command {
        Commands::Init => Ok(false),

        Commands::Player(PlayerCommand::Add {
            name,
            handicap,
            contact,
            admin,
        }) => {
            let id = ledger.add_player(&name, contact, handicap, admin)?;
            println!("Added player #{}: {} (hcp {})", id, name.trim(), handicap);
            Ok(true)
        }
        Commands::Player(PlayerCommand::List) => {
            println!("{}", fairway::output::format_player_list(&ledger.players));
            Ok(false)
        }
        Commands::Player(PlayerCommand::Admin {
            name,
            acting,
            revoke,
        }) => {
            let acting_id = ledger.require_player(&acting)?.id;
            let target_id = ledger.require_player(&name)?.id;
            ledger.set_admin(acting_id, target_id, !revoke)?;
            let verb = if revoke { "Revoked" } else { "Granted" };
            println!("{} admin for {}", verb, name);
            Ok(true)
        }
        Commands::Player(PlayerCommand::Rounds { name }) => {
            let player_id = ledger.require_player(&name)?.id;
            let rounds = ledger.rounds_for(player_id);
            println!(
                "{}",
                fairway::output::format_round_list(&rounds, &ledger.courses)
            );
            Ok(false)
        }

        Commands::Course(CourseCommand::Add { file }) => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read course file {}", file.display()))?;
            let new_course = NewCourse::from_yaml(&content)
                .map_err(|e| LedgerError::InvalidCourse(vec![e]))?;
            let id = ledger.add_course(new_course)?;
            if let Some(course) = ledger.course(id) {
                println!("Added course #{}: {}", id, course.label());
            }
            Ok(true)
        }
        Commands::Course(CourseCommand::List) => {
            println!("{}", fairway::output::format_course_list(&ledger.courses));
            Ok(false)
        }

        Commands::Round(RoundCommand::Add {
            player,
            course,
            tee,
            date,
            scores,
        }) => {
            let player_id = ledger.require_player(&player)?.id;
            let course_id = ledger
                .course_by_name(&course, tee.as_deref())
                .map(|c| c.id)
                .ok_or_else(|| LedgerError::UnknownCourse(course.clone()))?;
            let played_on = date.unwrap_or_else(|| Local::now().date_naive());

            let id = ledger.record_round(player_id, course_id, played_on, &scores)?;
            if let (Some(round), Some(course), Some(player)) = (
                ledger.round(id),
                ledger.course(course_id),
                ledger.player(player_id),
            ) {
                println!(
                    "{}",
                    fairway::output::format_scorecard(round, course, player, use_colors)
                );
            }
            Ok(true)
        }
        Commands::Round(RoundCommand::Correct {
            round,
            acting,
            scores,
        }) => {
            let acting_id = ledger.require_player(&acting)?.id;
            ledger.correct_round(acting_id, round, &scores)?;
            println!("Corrected round #{}", round);
            Ok(true)
        }
        Commands::Round(RoundCommand::Show { round }) => {
            let r = ledger.round(round).ok_or(LedgerError::UnknownRound(round))?;
            let course = ledger
                .course(r.course_id)
                .ok_or(LedgerError::UnknownCourseId(r.course_id))?;
            let player = ledger
                .player(r.player_id)
                .ok_or(LedgerError::UnknownPlayerId(r.player_id))?;
            println!(
                "{}",
                fairway::output::format_scorecard(r, course, player, use_colors)
            );
            Ok(false)
        }

        Commands::Handicap(HandicapCommand::Recalc { month }) => {
            let snapshots = recalculate_month(ledger, month, params)?;
            for snapshot in &snapshots {
                let name = ledger
                    .player(snapshot.player_id)
                    .map_or("?", |p| p.name.as_str());
                println!(
                    "{:<20} {:>3} -> {:<3} ({} rounds, avg {}, delta {})",
                    name,
                    snapshot.previous_handicap,
                    snapshot.new_handicap,
                    snapshot.rounds_counted,
                    fairway::output::format_signed(snapshot.avg_over_par),
                    fairway::output::format_signed(snapshot.delta)
                );
            }
            println!("Recorded {} snapshots for {}", snapshots.len(), month);
            Ok(!snapshots.is_empty())
        }
        Commands::Handicap(HandicapCommand::History { player }) => {
            let player = ledger.require_player(&player)?;
            println!("{} (current hcp {})", player.name, player.handicap);
            println!(
                "{}",
                fairway::output::format_snapshot_history(
                    &ledger.snapshots_for(player.id),
                    use_colors
                )
            );
            Ok(false)
        }

        Commands::Leaderboard { month, tsv } => {
            let period = month.map_or(Period::Season, Period::Month);
            let rows = build_leaderboard(ledger, period);
            if tsv {
                println!("{}", fairway::output::format_leaderboard_tsv(&rows));
            } else {
                if let Some(month) = month {
                    println!("Leaderboard for {}", month);
                }
                println!("{}", fairway::output::format_leaderboard(&rows, use_colors));
            }
            Ok(false)
        }
    }
}
