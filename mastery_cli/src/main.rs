use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use mastery_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mastery")]
#[command(about = "Lesson progression and review analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override curriculum file
    #[arg(long, global = true)]
    curriculum: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show lesson statuses and module mastery (default)
    Status {
        /// Mastery rule to report
        #[arg(long, value_enum)]
        rule: Option<RuleArg>,
    },

    /// Show card states and review activity
    Stats,

    /// Record a learner interaction with a lesson
    Record {
        lesson_id: String,

        /// locked, available, in-progress, completed or mastered
        status: String,
    },

    /// Log a review and store the card state reported by the scheduler
    Review {
        card_id: String,

        /// new, learning, review or relearning
        #[arg(long)]
        state: String,

        /// Next due date (RFC 3339)
        #[arg(long)]
        due: Option<String>,
    },

    /// Archive the review log to CSV
    Rollup {
        /// Remove processed logs after archiving
        #[arg(long)]
        cleanup: bool,
    },

    /// Check the curriculum file for errors
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleArg {
    Detailed,
    Coarse,
}

impl From<RuleArg> for MasteryRule {
    fn from(arg: RuleArg) -> Self {
        match arg {
            RuleArg::Detailed => MasteryRule::Detailed,
            RuleArg::Coarse => MasteryRule::Coarse,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    mastery_core::logging::init_with_level(&config.logging.level);

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let curriculum_path = cli
        .curriculum
        .unwrap_or_else(|| config.curriculum_path(&data_dir));
    let store = FileStore::new(data_dir);

    tracing::debug!("Using data dir {:?}", store.data_dir());

    match cli.command {
        Some(Commands::Status { rule }) => {
            let rule = rule.map(MasteryRule::from).unwrap_or(config.mastery.rule);
            cmd_status(&store, &curriculum_path, rule)
        }
        Some(Commands::Stats) => cmd_stats(&store, &curriculum_path, config.mastery.rule),
        Some(Commands::Record { lesson_id, status }) => {
            cmd_record(&store, &curriculum_path, &lesson_id, &status)
        }
        Some(Commands::Review {
            card_id,
            state,
            due,
        }) => cmd_review(&store, &curriculum_path, &card_id, &state, due.as_deref()),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&store, cleanup),
        Some(Commands::Validate) => cmd_validate(&curriculum_path),
        None => cmd_status(&store, &curriculum_path, config.mastery.rule),
    }
}

fn cmd_status(store: &FileStore, curriculum_path: &Path, rule: MasteryRule) -> Result<()> {
    let curriculum = Curriculum::load_from(curriculum_path)?;
    let dashboard = build_dashboard(&curriculum, store, &Local::now(), rule)?;

    print_warnings(&dashboard);

    for module in curriculum.ordered_modules() {
        let level = dashboard
            .modules
            .iter()
            .find(|m| m.module_id == module.id)
            .map(|m| m.level)
            .unwrap_or(MasteryLevel::New);

        println!("\n╭─────────────────────────────────────────╮");
        println!(
            "│  {} [{}]",
            module.title.as_deref().unwrap_or(&module.id),
            level
        );
        println!("╰─────────────────────────────────────────╯");

        for entry in dashboard.lessons.iter().filter(|e| e.module_id == module.id) {
            let marker = if entry.persisted { "" } else { " (default)" };
            println!("  {:<12} {}{}", entry.status, entry.lesson_id, marker);
        }
    }

    println!();
    Ok(())
}

fn cmd_stats(store: &FileStore, curriculum_path: &Path, rule: MasteryRule) -> Result<()> {
    let curriculum = Curriculum::load_from(curriculum_path)?;
    let dashboard = build_dashboard(&curriculum, store, &Local::now(), rule)?;

    print_warnings(&dashboard);

    let cards = &dashboard.card_states;
    println!("Cards ({} total)", cards.total());
    println!("  new:        {}", cards.new);
    println!("  learning:   {}", cards.learning);
    println!("  review:     {}", cards.review);
    println!("  relearning: {}", cards.relearning);
    println!();

    if dashboard.heatmap.is_empty() {
        println!("No review activity in the last 28 days");
        return Ok(());
    }

    println!("This week ({} reviews)", dashboard.weekly.total());
    for day in &dashboard.weekly.days {
        println!("  {} {}  {}", day.day_label, day.date, day.count);
    }
    println!();

    println!("Last 28 days: {} reviews", dashboard.heatmap.total());
    let cells: String = dashboard
        .heatmap
        .days
        .iter()
        .map(|d| match d.count {
            0 => '·',
            1..=4 => '░',
            5..=9 => '▒',
            _ => '█',
        })
        .collect();
    println!("  {}", cells);

    Ok(())
}

fn cmd_record(
    store: &FileStore,
    curriculum_path: &Path,
    lesson_id: &str,
    status: &str,
) -> Result<()> {
    let curriculum = Curriculum::load_from(curriculum_path)?;
    if !curriculum.contains_lesson(lesson_id) {
        return Err(Error::UnknownLesson(lesson_id.to_string()));
    }

    let status: LessonStatus = status.parse()?;
    ProgressSnapshot::record(&store.progress_path(), lesson_id, status, Utc::now())?;

    println!("✓ {} marked {}", lesson_id, status);
    Ok(())
}

fn cmd_review(
    store: &FileStore,
    curriculum_path: &Path,
    card_id: &str,
    state: &str,
    due: Option<&str>,
) -> Result<()> {
    let curriculum = Curriculum::load_from(curriculum_path)?;
    if !curriculum.card_ids().contains(card_id) {
        return Err(Error::Other(format!("Unknown card: {}", card_id)));
    }

    let state: CardState = state.parse()?;
    let due = due
        .map(|d| {
            DateTime::parse_from_rfc3339(d)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Other(format!("Invalid due date: {}", e)))
        })
        .transpose()?;

    // Card state before the log entry
    CardStateTable::record(
        &store.cards_path(),
        CardStateRecord {
            card_id: card_id.to_string(),
            state,
            due,
        },
    )?;

    let entry = ReviewLogEntry {
        id: uuid::Uuid::new_v4(),
        card_id: card_id.to_string(),
        timestamp: Utc::now(),
    };
    JsonlReviewLog::new(store.log_path()).append(&entry)?;

    println!("✓ Review logged for {}", card_id);
    Ok(())
}

fn cmd_rollup(store: &FileStore, cleanup: bool) -> Result<()> {
    let log_path = store.log_path();
    let csv_path = store.archive_path();

    if !log_path.exists() {
        println!("No review log found - nothing to roll up.");
        return Ok(());
    }

    let count = mastery_core::log_archive::archive_log_to_csv(&log_path, &csv_path)?;

    println!("✓ Rolled up {} reviews to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = mastery_core::log_archive::cleanup_processed_logs(&store.log_dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed review logs", cleaned);
        }
    }

    Ok(())
}

fn cmd_validate(curriculum_path: &Path) -> Result<()> {
    let curriculum = Curriculum::load_from(curriculum_path)?;
    println!(
        "✓ Curriculum OK: {} modules, {} lessons, {} cards",
        curriculum.modules.len(),
        curriculum.lesson_count(),
        curriculum.card_ids().len()
    );
    Ok(())
}

fn print_warnings(dashboard: &Dashboard) {
    for warning in &dashboard.warnings {
        eprintln!("warning: {}", warning);
    }
}
