//! Habit CLI - Command-line interface for Habit Heat
//!
//! Commands:
//! - dashboard: Compute the full dashboard snapshot
//! - heatmap: Render the calendar heatmap as text
//! - rate: Print the rolling completion rate
//! - today: List which habits are done on the evaluation day
//! - stats: Per-habit lifetime completion figures
//! - range: Day-by-day check-in counts for an explicit date range
//! - validate: Check store records for orphans and duplicates

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use habit_heat::date_key::{format_date_key, local_today, parse_date_key, CalendarDay};
use habit_heat::grid::MAX_WINDOW_DAYS;
use habit_heat::intensity::Intensity;
use habit_heat::rate::rolling_rate_with_mode;
use habit_heat::types::{CheckinEvent, HabitSummary, HeatmapView};
use habit_heat::{
    ComputeError, DashboardEngine, EngineConfig, RateMode, StoreAdapter, ENGINE_VERSION,
};

/// Habit - heatmaps and completion rates from habit check-ins
#[derive(Parser)]
#[command(name = "habit")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Derive habit dashboards from store exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct StoreArgs {
    /// Habits file (use - for stdin)
    #[arg(long)]
    habits: PathBuf,

    /// Check-ins file (use - for stdin)
    #[arg(long)]
    checkins: PathBuf,

    /// Input format for both files
    #[arg(long, default_value = "json")]
    input_format: InputFormat,
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Evaluation day (YYYY-MM-DD); defaults to today in the local time zone
    #[arg(long)]
    today: Option<String>,

    /// Load engine configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rolling rate window in days
    #[arg(long)]
    window_days: Option<u32>,

    /// Heatmap window in days
    #[arg(long)]
    heatmap_days: Option<u32>,

    /// Count at most one completion per habit per day in the rate
    #[arg(long)]
    distinct: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full dashboard snapshot
    Dashboard {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Render the calendar heatmap as text
    Heatmap {
        /// Check-ins file (use - for stdin)
        #[arg(long)]
        checkins: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        #[command(flatten)]
        engine: EngineArgs,

        /// Use ASCII glyphs even on a terminal
        #[arg(long)]
        ascii: bool,
    },

    /// Print the rolling completion rate
    Rate {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List which habits are done on the evaluation day
    Today {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Per-habit lifetime completion figures
    Stats {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Day-by-day check-in counts for an explicit date range
    Range {
        /// Check-ins file (use - for stdin)
        #[arg(long)]
        checkins: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: String,
    },

    /// Check store records for orphans and duplicates
    Validate {
        #[command(flatten)]
        store: StoreArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HabitCliError> {
    match cli.command {
        Commands::Dashboard {
            store,
            engine,
            output,
            output_format,
        } => cmd_dashboard(&store, &engine, &output, output_format),

        Commands::Heatmap {
            checkins,
            input_format,
            engine,
            ascii,
        } => cmd_heatmap(&checkins, input_format, &engine, ascii),

        Commands::Rate { store, engine } => cmd_rate(&store, &engine),

        Commands::Today { store, engine } => cmd_today(&store, &engine),

        Commands::Stats {
            store,
            engine,
            json,
        } => cmd_stats(&store, &engine, json),

        Commands::Range {
            checkins,
            input_format,
            from,
            to,
        } => cmd_range(&checkins, input_format, &from, &to),

        Commands::Validate { store, json } => cmd_validate(&store, json),
    }
}

fn cmd_dashboard(
    store: &StoreArgs,
    engine_args: &EngineArgs,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), HabitCliError> {
    let (habits, checkins) = load_store(store)?;
    let engine = build_engine(engine_args)?;
    let day = evaluation_day(engine_args)?;

    let snapshot = engine.compute(&habits, &checkins, day);
    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&snapshot)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&snapshot)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
        info!(path = %output.display(), "wrote dashboard");
    }

    Ok(())
}

fn cmd_heatmap(
    checkins_path: &Path,
    input_format: InputFormat,
    engine_args: &EngineArgs,
    ascii: bool,
) -> Result<(), HabitCliError> {
    let input = read_input(checkins_path)?;
    let checkins = parse_checkins(&input, &input_format)?;
    let engine = build_engine(engine_args)?;
    let day = evaluation_day(engine_args)?;

    let view = engine.heatmap(&checkins, day);
    let glyphs = if ascii || !atty::is(atty::Stream::Stdout) {
        ASCII_GLYPHS
    } else {
        BLOCK_GLYPHS
    };

    print!("{}", render_heatmap(&view, glyphs));
    Ok(())
}

fn cmd_rate(store: &StoreArgs, engine_args: &EngineArgs) -> Result<(), HabitCliError> {
    let (habits, checkins) = load_store(store)?;
    let engine = build_engine(engine_args)?;
    let day = evaluation_day(engine_args)?;
    let config = engine.config();

    if habits.is_empty() {
        println!("- (no habits tracked)");
        return Ok(());
    }

    let rate = rolling_rate_with_mode(
        config.rate_mode,
        &checkins,
        habits.len(),
        config.rolling_window_days,
        day,
    );
    println!(
        "{}% over the last {} days ending {}",
        rate,
        config.rolling_window_days,
        format_date_key(day)
    );
    Ok(())
}

fn cmd_today(store: &StoreArgs, engine_args: &EngineArgs) -> Result<(), HabitCliError> {
    let (habits, checkins) = load_store(store)?;
    let engine = build_engine(engine_args)?;
    let day = evaluation_day(engine_args)?;

    let snapshot = engine.compute(&habits, &checkins, day);

    println!(
        "{}: {} / {} done",
        format_date_key(day),
        snapshot.done_today_count,
        snapshot.total_habits
    );
    for habit in &snapshot.habits {
        let mark = if habit.done_today { "[x]" } else { "[ ]" };
        println!("  {} {} ({}d streak)", mark, habit.name, habit.current_streak);
    }
    if snapshot.best_current_streak > 0 {
        println!("Best active streak: {} days", snapshot.best_current_streak);
    }
    Ok(())
}

fn cmd_stats(store: &StoreArgs, engine_args: &EngineArgs, json: bool) -> Result<(), HabitCliError> {
    let (habits, checkins) = load_store(store)?;
    let engine = build_engine(engine_args)?;
    let day = evaluation_day(engine_args)?;

    let stats = engine.stats(&habits, &checkins, day);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    for (habit, entry) in habits.iter().zip(&stats) {
        println!(
            "{}: {} check-ins over {} days ({:.1}%), streak {}",
            habit.name,
            entry.total_completed,
            entry.days_tracked.max(0),
            entry.completion_percentage,
            entry.current_streak
        );
    }
    Ok(())
}

fn cmd_range(
    checkins_path: &Path,
    input_format: InputFormat,
    from: &str,
    to: &str,
) -> Result<(), HabitCliError> {
    let input = read_input(checkins_path)?;
    let checkins = parse_checkins(&input, &input_format)?;
    let from = parse_date_key(from)?;
    let to = parse_date_key(to)?;

    let counts = DashboardEngine::new().range_counts(&checkins, from, to)?;
    for entry in &counts {
        println!(
            "{} {:>3} {}",
            format_date_key(entry.date),
            entry.count,
            entry.intensity.token()
        );
    }
    Ok(())
}

fn cmd_validate(store: &StoreArgs, json: bool) -> Result<(), HabitCliError> {
    let (habits, checkins) = load_store(store)?;
    let issues = StoreAdapter::validate_checkins(&habits, &checkins);

    let report = ValidationReport {
        total_habits: habits.len(),
        total_checkins: checkins.len(),
        issues: issues.len(),
        details: issues.iter().map(|issue| issue.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Habits:    {}", report.total_habits);
        println!("Check-ins: {}", report.total_checkins);
        println!("Issues:    {}", report.issues);

        if !report.details.is_empty() {
            println!("\nIssues:");
            for detail in &report.details {
                println!("  - {}", detail);
            }
        }
    }

    if report.issues > 0 {
        Err(HabitCliError::ValidationFailed(report.issues))
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(path: &Path) -> Result<String, HabitCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn parse_checkins(input: &str, format: &InputFormat) -> Result<Vec<CheckinEvent>, HabitCliError> {
    Ok(match format {
        InputFormat::Json => StoreAdapter::parse_checkins(input)?,
        InputFormat::Ndjson => StoreAdapter::parse_checkins_ndjson(input)?,
    })
}

fn load_store(store: &StoreArgs) -> Result<(Vec<HabitSummary>, Vec<CheckinEvent>), HabitCliError> {
    if store.habits.to_string_lossy() == "-" && store.checkins.to_string_lossy() == "-" {
        return Err(HabitCliError::StdinTwice);
    }

    let habits_input = read_input(&store.habits)?;
    let checkins_input = read_input(&store.checkins)?;

    let habits = match store.input_format {
        InputFormat::Json => StoreAdapter::parse_habits(&habits_input)?,
        InputFormat::Ndjson => StoreAdapter::parse_habits_ndjson(&habits_input)?,
    };
    let checkins = parse_checkins(&checkins_input, &store.input_format)?;

    debug!(habits = habits.len(), checkins = checkins.len(), "loaded store");
    Ok((habits, checkins))
}

fn build_engine(args: &EngineArgs) -> Result<DashboardEngine, HabitCliError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    if let Some(days) = args.window_days {
        config.rolling_window_days = days;
    }
    if let Some(days) = args.heatmap_days {
        config.heatmap_days = days;
    }
    if args.distinct {
        config.rate_mode = RateMode::Distinct;
    }

    Ok(DashboardEngine::with_config(config)?)
}

fn evaluation_day(args: &EngineArgs) -> Result<CalendarDay, HabitCliError> {
    match &args.today {
        Some(key) => Ok(parse_date_key(key)?),
        None => Ok(local_today()),
    }
}

/// Glyphs for intensity levels 0 through 4, plus padding
struct Glyphs {
    levels: [char; 5],
    padding: char,
}

const ASCII_GLYPHS: Glyphs = Glyphs {
    levels: ['.', '-', '+', '*', '#'],
    padding: ' ',
};

const BLOCK_GLYPHS: Glyphs = Glyphs {
    levels: ['·', '░', '▒', '▓', '█'],
    padding: ' ',
};

fn render_heatmap(view: &HeatmapView, glyphs: Glyphs) -> String {
    let row_label_width = view
        .weekday_labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        + 1;

    // Month header: each label starts over its column and may run right
    let mut header: Vec<char> = vec![' '; row_label_width + view.grid.len()];
    for (column, label) in view.month_labels.labeled() {
        for (offset, ch) in label.chars().enumerate() {
            if let Some(slot) = header.get_mut(row_label_width + column + offset) {
                *slot = ch;
            }
        }
    }

    let mut out = String::new();
    out.push_str(header.iter().collect::<String>().trim_end());
    out.push('\n');

    for (row, label) in view.weekday_labels.iter().enumerate() {
        out.push_str(&format!("{:<width$}", label, width = row_label_width));
        for (week, levels) in view.grid.weeks.iter().zip(&view.intensities) {
            let glyph = if week[row].is_empty() {
                glyphs.padding
            } else {
                glyphs.levels[usize::from(levels[row].level())]
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    let legend: String = [
        Intensity::None,
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::Max,
    ]
    .iter()
    .map(|level| glyphs.levels[usize::from(level.level())])
    .collect();
    out.push_str(&format!("Less {} More\n", legend));
    out
}

// Error types

#[derive(Debug)]
enum HabitCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    StdinTwice,
    ValidationFailed(usize),
}

impl From<io::Error> for HabitCliError {
    fn from(e: io::Error) -> Self {
        HabitCliError::Io(e)
    }
}

impl From<ComputeError> for HabitCliError {
    fn from(e: ComputeError) -> Self {
        HabitCliError::Compute(e)
    }
}

impl From<serde_json::Error> for HabitCliError {
    fn from(e: serde_json::Error) -> Self {
        HabitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HabitCliError> for CliError {
    fn from(e: HabitCliError) -> Self {
        match e {
            HabitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HabitCliError::Compute(e @ ComputeError::InvalidDateKey(_)) => CliError {
                code: "INVALID_DATE".to_string(),
                message: e.to_string(),
                hint: Some("Dates must be zero-padded YYYY-MM-DD".to_string()),
            },
            HabitCliError::Compute(e @ ComputeError::InvalidRange(_)) => CliError {
                code: "INVALID_RANGE".to_string(),
                message: e.to_string(),
                hint: Some("Pass --from on or before --to".to_string()),
            },
            HabitCliError::Compute(e @ ComputeError::ConfigError(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!(
                    "Window lengths must be between 1 and {} days",
                    MAX_WINDOW_DAYS
                )),
            },
            HabitCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input matches the habit store record format".to_string()),
            },
            HabitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HabitCliError::StdinTwice => CliError {
                code: "STDIN_TWICE".to_string(),
                message: "Habits and check-ins cannot both be read from stdin".to_string(),
                hint: Some("Pass at least one of --habits/--checkins as a file".to_string()),
            },
            HabitCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} check-ins failed validation", count),
                hint: Some("Fix the reported records and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_habits: usize,
    total_checkins: usize,
    issues: usize,
    details: Vec<String>,
}
