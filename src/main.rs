/// Command line entry point for the habit engine
///
/// A thin CLI over the engine operations: provision habits, log and delete
/// completions, and inspect streaks and goal periods. Responses are
/// printed as JSON so the output can be piped into other tooling.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use tracing::info;

use habit_engine::{EngineError, EventId, GoalType, HabitEngine, HabitId};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_engine");
            p
        }),
        // 2. User's home directory
        dirs::home_dir().map(|mut p| {
            p.push(".habit_engine");
            p
        }),
        // 3. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_engine");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                let mut db_path = potential_path.clone();
                db_path.push("habits.db");
                return Ok(db_path);
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_engine");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the habit engine CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's data directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a habit with its goal configuration
    AddHabit {
        name: String,
        /// Goal target value; 0 means no goal
        #[arg(long, default_value_t = 0)]
        goal: u32,
        /// Goal type: streak, count, weekly or monthly
        #[arg(long, default_value = "streak")]
        goal_type: String,
        /// Allow more than one completion per calendar day
        #[arg(long)]
        multiple: bool,
    },
    /// List all habits
    Habits,
    /// Delete a habit and all of its history
    RemoveHabit { habit_id: String },
    /// Log a completion for a habit
    Log {
        habit_id: String,
        /// Completion instant (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a single completion event
    Unlog { habit_id: String, event_id: String },
    /// Completion history for a habit
    History { habit_id: String },
    /// Current and longest streaks for a habit
    Streaks { habit_id: String },
    /// Check whether the current goal period is satisfied
    CheckGoal { habit_id: String },
    /// Credit the current goal period if it is satisfied and uncredited
    RecordGoal {
        habit_id: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Un-credit the current goal period and restart its accounting
    ResetGoal { habit_id: String },
    /// Goal completion history for a habit
    GoalHistory { habit_id: String },
}

fn parse_habit_id(s: &str) -> Result<HabitId, Box<dyn std::error::Error>> {
    Ok(HabitId::from_string(s).map_err(|_| format!("Invalid habit ID: {}", s))?)
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|_| format!("Invalid RFC 3339 timestamp: {}", s))?
        .with_timezone(&Utc))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(engine: &HabitEngine, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::AddHabit { name, goal, goal_type, multiple } => {
            let goal_type = GoalType::parse(&goal_type)
                .ok_or_else(|| format!(
                    "Invalid goal type '{}'. Valid options: streak, count, weekly, monthly",
                    goal_type
                ))?;
            let habit = engine.create_habit(name, goal, goal_type, multiple)?;
            print_json(&habit)?;
        }
        Command::Habits => {
            print_json(&engine.list_habits()?)?;
        }
        Command::RemoveHabit { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            engine.delete_habit(&habit_id)?;
            println!("Deleted habit {}", habit_id);
        }
        Command::Log { habit_id, at, note } => {
            let habit_id = parse_habit_id(&habit_id)?;
            let at = at.as_deref().map(parse_instant).transpose()?;
            let event = engine.record_completion(&habit_id, at, note)?;
            print_json(&event)?;
        }
        Command::Unlog { habit_id, event_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            let event_id = EventId::from_string(&event_id)
                .map_err(|_| format!("Invalid event ID: {}", event_id))?;
            engine.delete_completion(&habit_id, &event_id)?;
            println!("Deleted event {}", event_id);
        }
        Command::History { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            print_json(&engine.list_completions(&habit_id)?)?;
        }
        Command::Streaks { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            print_json(&engine.get_streaks(&habit_id)?)?;
        }
        Command::CheckGoal { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            print_json(&engine.check_goal(&habit_id)?)?;
        }
        Command::RecordGoal { habit_id, note } => {
            let habit_id = parse_habit_id(&habit_id)?;
            let status = engine.check_goal(&habit_id)?;
            if !status.needs_renewal {
                return Err("Goal is not completed for the current period, or is already recorded".into());
            }
            // needs_renewal guarantees a periodic goal with a resolved window
            let (Some(start), Some(end), Some(count)) =
                (status.period_start, status.period_end, status.actual_count)
            else {
                return Err("Goal status did not include a period window".into());
            };
            let record = engine.record_goal_completion(&habit_id, start, end, count, note)?;
            print_json(&record)?;
        }
        Command::ResetGoal { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            print_json(&engine.reset_goal(&habit_id)?)?;
        }
        Command::GoalHistory { habit_id } => {
            let habit_id = parse_habit_id(&habit_id)?;
            print_json(&engine.goal_history(&habit_id)?)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_engine={}", log_level))
        .with_writer(std::io::stderr) // Logs to stderr, JSON output to stdout
        .init();

    // Determine database path
    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let engine = HabitEngine::open(db_path)?;

    if let Err(e) = run(&engine, args.command) {
        // Engine errors carry a precise message; print it without a backtrace
        if let Some(engine_err) = e.downcast_ref::<EngineError>() {
            eprintln!("Error: {}", engine_err);
            std::process::exit(1);
        }
        return Err(e);
    }

    Ok(())
}
