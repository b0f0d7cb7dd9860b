mod commands;
mod config;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use crate::commands::{
    Session, cmd_backup, cmd_dashboard, cmd_entries, cmd_goal_set, cmd_goal_show, cmd_meal_day,
    cmd_meal_delete, cmd_meal_log, cmd_meal_macros, cmd_meal_update, cmd_metric_delete,
    cmd_metric_log, cmd_metric_summary, cmd_metric_trend, cmd_metric_update, cmd_register,
    cmd_restore, cmd_workout_delete, cmd_workout_log, cmd_workout_records, cmd_workout_update,
    cmd_workout_week,
};
use crate::config::Config;
use stride_core::Tracker;

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "A local-first fitness tracker: workouts, meals, and body metrics"
)]
struct Cli {
    /// Directory holding data/ and backups/ (default: platform data dir)
    #[arg(long, global = true, env = "STRIDE_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Account email
    #[arg(long, global = true, env = "STRIDE_EMAIL")]
    email: Option<String>,
    /// Account PIN (4-6 digits)
    #[arg(long, global = true, env = "STRIDE_PIN", hide_env_values = true)]
    pin: Option<String>,
    /// Run the command without saving any changes (backup and restore refuse to run)
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account using --email and --pin
    Register {
        /// Display name
        #[arg(long, default_value = "")]
        name: String,
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// Activity level: low, moderate, high (default: moderate)
        #[arg(long)]
        activity: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change your goal
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Log and review workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Log and review meals
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Log and review body metrics
    Metric {
        #[command(subcommand)]
        command: MetricCommands,
    },
    /// Today at a glance: workouts, calories, goal progress
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your entries with their IDs (for update/delete)
    Entries {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy the current data files to the backups directory
    Backup {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore the newest backup of each data file
    Restore {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Change goal fields (unset fields keep their current value)
    Set {
        /// Goal type: weight_loss, muscle_gain, endurance, maintenance
        #[arg(long = "type")]
        goal_type: Option<String>,
        /// Target weight in kg
        #[arg(long)]
        target: Option<f64>,
        /// Daily calorie goal
        #[arg(long)]
        calories: Option<f64>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD, empty to clear)
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show your goal and progress toward it
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// Log a workout
    Log {
        /// Workout type: strength, cardio, flexibility
        #[arg(long = "type")]
        workout_type: String,
        /// Duration in minutes
        #[arg(short, long)]
        duration: f64,
        /// Exercise, repeatable: "name,sets,reps,kg" (strength), "name,km,min" (cardio),
        /// "name,minutes" (flexibility)
        #[arg(short, long = "exercise")]
        exercises: Vec<String>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Notes
        #[arg(long)]
        notes: Option<String>,
        /// Accept a date in the future
        #[arg(long)]
        allow_future: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a workout
    Update {
        /// Workout ID
        id: String,
        /// New date (YYYY-MM-DD or today/yesterday)
        #[arg(long)]
        date: Option<String>,
        /// New type
        #[arg(long = "type")]
        workout_type: Option<String>,
        /// New duration in minutes
        #[arg(short, long)]
        duration: Option<f64>,
        /// New notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals for the seven days starting at --start
    Week {
        /// First day of the week (default: this week's Monday)
        #[arg(long)]
        start: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Heaviest lift and fastest pace
    Records {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal
    Log {
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(long = "type")]
        meal_type: String,
        /// Total calories
        #[arg(short, long)]
        calories: f64,
        /// Protein in grams
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbs in grams
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat in grams
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Food item, repeatable: "name:grams"
        #[arg(short, long = "item")]
        items: Vec<String>,
        /// Time eaten ("YYYY-MM-DD HH:MM", default: now)
        #[arg(long)]
        at: Option<String>,
        /// Accept a timestamp in the future
        #[arg(long)]
        allow_future: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a meal
    Update {
        /// Meal ID
        id: String,
        /// New time ("YYYY-MM-DD HH:MM")
        #[arg(long)]
        at: Option<String>,
        /// New meal type
        #[arg(long = "type")]
        meal_type: Option<String>,
        /// New calorie total
        #[arg(short, long)]
        calories: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal
    Delete {
        /// Meal ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Calories for one day, by meal type
    Day {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Calorie and macro totals over a date range
    Macros {
        /// First day (default: 6 days ago)
        #[arg(long)]
        from: Option<String>,
        /// Last day (default: today)
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MetricCommands {
    /// Log a metric
    Log {
        /// Metric type: weight_kg, sleep_hours, water_l, mood, waist_cm, chest_cm
        metric_type: String,
        /// Value (mood is clamped to 1-10)
        value: f64,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Accept a date in the future
        #[arg(long)]
        allow_future: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a metric
    Update {
        /// Metric ID
        id: String,
        /// New date
        #[arg(long)]
        date: Option<String>,
        /// New value
        #[arg(long)]
        value: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a metric
    Delete {
        /// Metric ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count, min, max and average over a date range
    Summary {
        /// Metric type
        metric_type: String,
        /// First day (default: 29 days ago)
        #[arg(long)]
        from: Option<String>,
        /// Last day (default: today)
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recent weights with a moving average and chart
    Trend {
        /// Moving average window in entries
        #[arg(short, long, default_value = "7")]
        window: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    // STRIDE_LOG, then RUST_LOG, default warn
    let log_env = std::env::var("STRIDE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Backup and restore write files themselves rather than through the final save.
fn check_dry_run(cli: &Cli) -> Result<()> {
    if cli.dry_run {
        match cli.command {
            Commands::Backup { .. } => bail!("backup writes files and cannot run with --dry-run"),
            Commands::Restore { .. } => {
                bail!("restore overwrites data files and cannot run with --dry-run")
            }
            _ => {}
        }
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    check_dry_run(&cli)?;
    let config = Config::load(cli.data_dir)?;
    let tracker = Tracker::open(&config.data_dir)?;
    tracing::debug!(dir = %config.data_dir.display(), "Opened data directory");
    let mut session = Session::new(tracker, cli.email, cli.pin);

    match cli.command {
        Commands::Register {
            name,
            age,
            height,
            weight,
            activity,
            json,
        } => cmd_register(&mut session, name, age, height, weight, activity, json),
        Commands::Goal { command } => match command {
            GoalCommands::Set {
                goal_type,
                target,
                calories,
                start,
                end,
                json,
            } => cmd_goal_set(&mut session, goal_type, target, calories, start, end, json),
            GoalCommands::Show { json } => cmd_goal_show(&session, json),
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::Log {
                workout_type,
                duration,
                exercises,
                date,
                notes,
                allow_future,
                json,
            } => cmd_workout_log(
                &mut session,
                workout_type,
                duration,
                &exercises,
                date,
                notes,
                allow_future,
                json,
            ),
            WorkoutCommands::Update {
                id,
                date,
                workout_type,
                duration,
                notes,
                json,
            } => cmd_workout_update(
                &mut session,
                &id,
                date,
                workout_type.as_deref(),
                duration,
                notes,
                json,
            ),
            WorkoutCommands::Delete { id, json } => cmd_workout_delete(&mut session, &id, json),
            WorkoutCommands::Week { start, json } => cmd_workout_week(&session, start, json),
            WorkoutCommands::Records { json } => cmd_workout_records(&session, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Log {
                meal_type,
                calories,
                protein,
                carbs,
                fat,
                items,
                at,
                allow_future,
                json,
            } => cmd_meal_log(
                &mut session,
                meal_type,
                calories,
                (protein, carbs, fat),
                &items,
                at,
                allow_future,
                json,
            ),
            MealCommands::Update {
                id,
                at,
                meal_type,
                calories,
                json,
            } => cmd_meal_update(
                &mut session,
                &id,
                at.as_deref(),
                meal_type.as_deref(),
                calories,
                json,
            ),
            MealCommands::Delete { id, json } => cmd_meal_delete(&mut session, &id, json),
            MealCommands::Day { date, json } => cmd_meal_day(&session, date, json),
            MealCommands::Macros { from, to, json } => cmd_meal_macros(&session, from, to, json),
        },
        Commands::Metric { command } => match command {
            MetricCommands::Log {
                metric_type,
                value,
                date,
                allow_future,
                json,
            } => cmd_metric_log(&mut session, metric_type, value, date, allow_future, json),
            MetricCommands::Update {
                id,
                date,
                value,
                json,
            } => cmd_metric_update(&mut session, &id, date, value, json),
            MetricCommands::Delete { id, json } => cmd_metric_delete(&mut session, &id, json),
            MetricCommands::Summary {
                metric_type,
                from,
                to,
                json,
            } => cmd_metric_summary(&session, &metric_type, from, to, json),
            MetricCommands::Trend { window, json } => cmd_metric_trend(&session, window, json),
        },
        Commands::Dashboard { json } => cmd_dashboard(&session, json),
        Commands::Entries { json } => cmd_entries(&session, json),
        Commands::Backup { json } => cmd_backup(&session, json),
        Commands::Restore { json } => cmd_restore(&mut session, json),
    }?;

    if session.tracker.is_dirty() {
        if cli.dry_run {
            eprintln!("Dry run: changes not saved");
        } else {
            session.tracker.save()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workout_log() {
        let cli = Cli::try_parse_from([
            "stride",
            "--email",
            "a@b.c",
            "--pin",
            "1234",
            "workout",
            "log",
            "--type",
            "strength",
            "-d",
            "45",
            "-e",
            "Bench Press,3,5,60",
            "-e",
            "Squat,5,5,100",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.email.as_deref(), Some("a@b.c"));
        let Commands::Workout {
            command:
                WorkoutCommands::Log {
                    exercises, json, ..
                },
        } = cli.command
        else {
            panic!("expected workout log");
        };
        assert_eq!(exercises.len(), 2);
        assert!(json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stride", "dashboard", "--dry-run", "--data-dir", "/tmp/x"])
            .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_dry_run_refuses_backup_and_restore() {
        for command in ["backup", "restore"] {
            let cli = Cli::try_parse_from(["stride", command, "--dry-run"]).unwrap();
            assert!(check_dry_run(&cli).is_err());
            let cli = Cli::try_parse_from(["stride", command]).unwrap();
            assert!(check_dry_run(&cli).is_ok());
        }
        let cli = Cli::try_parse_from(["stride", "dashboard", "--dry-run"]).unwrap();
        assert!(check_dry_run(&cli).is_ok());
    }
}
