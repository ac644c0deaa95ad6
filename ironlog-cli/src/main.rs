use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;

use ironlog::analytics::AnalyticsService;
use ironlog::config::{DataServiceConfig, DataSource};
use ironlog::model::{Exercise, ExportBundle, WorkoutSession, WorkoutSet};
use ironlog::service::DataService;
use ironlog::store::db::open_pool;
use ironlog::store::{LocalStore, RemoteStore};

#[derive(Parser, Debug)]
#[command(version, about = "IronLog - Workout Tracker CLI", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log a workout: one exercise with identical sets
    Log {
        #[arg(short, long)]
        exercise: String,
        #[arg(short, long)]
        category: String,
        #[arg(short, long)]
        reps: i32,
        /// Weight in kg
        #[arg(short, long)]
        weight: f64,
        /// Number of sets
        #[arg(short, long, default_value_t = 3)]
        sets: u32,
        /// Session date, defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List workout sessions
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Only sessions containing this exercise
        #[arg(short, long)]
        exercise: Option<String>,
    },
    /// Show one session in full
    Show { id: String },
    /// Delete a session
    Delete { id: String },
    /// Suggest exercises for today
    Suggest,
    /// Weekly stats, or per-exercise stats with --exercise
    Stats {
        #[arg(short, long)]
        exercise: Option<String>,
    },
    /// Export everything as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a previously exported JSON file
    Import { input: PathBuf },
    /// Wipe all stored data
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
    /// Local storage usage
    Storage,
    /// Replay queued writes against the remote store
    Sync,
}

#[derive(Debug, PartialEq)]
enum ListFilter {
    All,
    DateRange(NaiveDate, NaiveDate),
    Exercise(String),
}

/// Resolve the `list` flags into one filter; conflicting or incomplete
/// combinations are errors rather than silently dropped flags.
fn list_filter(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    exercise: Option<String>,
) -> Result<ListFilter> {
    match (from, to, exercise) {
        (None, None, None) => Ok(ListFilter::All),
        (Some(from), Some(to), None) => Ok(ListFilter::DateRange(from, to)),
        (None, None, Some(name)) => Ok(ListFilter::Exercise(name)),
        (_, _, Some(_)) => bail!("--exercise cannot be combined with --from/--to"),
        _ => bail!("--from and --to must be given together"),
    }
}

async fn build_service() -> Result<DataService> {
    let mut config = DataServiceConfig::from_env();
    let db_path = env::var("IRONLOG_DB_PATH").unwrap_or_else(|_| "ironlog.db".to_string());
    let pool = open_pool(&db_path).await?;
    let local = LocalStore::new(pool);

    let remote = match env::var("IRONLOG_REMOTE_URL") {
        Ok(url) => RemoteStore::new_http(url),
        Err(_) => {
            if config.data_source != DataSource::Local {
                info!("IRONLOG_REMOTE_URL not set, using the local store only");
                config.data_source = DataSource::Local;
            }
            RemoteStore::new_http("http://localhost:0")
        }
    };

    Ok(DataService::new(config, local, remote))
}

fn print_session(session: &WorkoutSession, verbose: bool) {
    println!(
        "{}  {}  {:>8.1} kg total",
        session.date,
        session.id,
        session.total_volume()
    );
    if !verbose {
        return;
    }
    for exercise in &session.exercises {
        println!("  {} ({})", exercise.name, exercise.category);
        for set in &exercise.sets {
            println!("    {}", set);
        }
    }
    if let Some(notes) = &session.notes {
        println!("  notes: {}", notes);
    }
    if let Some(duration) = session.duration {
        println!("  duration: {} min", duration);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();
    let service = build_service().await?;

    match args.command {
        Commands::Log {
            exercise,
            category,
            reps,
            weight,
            sets,
            date,
            notes,
        } => {
            let mut session = WorkoutSession::start(date.unwrap_or_else(|| Utc::now().date_naive()));
            session.notes = notes;
            let mut performed = Exercise::new(exercise, category);
            for _ in 0..sets {
                performed.sets.push(WorkoutSet::new(reps, weight)?);
            }
            session.exercises.push(performed);

            let stored = service.save_workout_session(&session).await?;
            println!("Logged session {}", stored.id);
            print_session(&stored, true);
        }
        Commands::List { from, to, exercise } => {
            let sessions = match list_filter(from, to, exercise)? {
                ListFilter::All => service.get_workout_sessions().await?,
                ListFilter::DateRange(from, to) => {
                    service.get_sessions_by_date_range(from, to).await?
                }
                ListFilter::Exercise(name) => service.get_sessions_by_exercise(&name).await?,
            };
            if sessions.is_empty() {
                println!("No sessions found");
            }
            for session in &sessions {
                print_session(session, false);
            }
        }
        Commands::Show { id } => match service.get_workout_session(&id).await? {
            Some(session) => print_session(&session, true),
            None => bail!("no session with id {}", id),
        },
        Commands::Delete { id } => {
            service.delete_workout_session(&id).await?;
            println!("Deleted session {}", id);
        }
        Commands::Suggest => {
            let analytics = AnalyticsService::new();
            analytics.update_cache(&service).await?;
            for suggestion in analytics.suggest_todays_exercises() {
                let mut line = format!(
                    "[{:?}] {} ({}) - {}",
                    suggestion.priority,
                    suggestion.exercise.name,
                    suggestion.exercise.category,
                    suggestion.reason
                );
                if let Some(weight) = suggestion.suggested_weight {
                    line.push_str(&format!(", try {:.0} kg", weight));
                }
                if let Some(reps) = suggestion.suggested_reps {
                    line.push_str(&format!(" x {} reps", reps));
                }
                println!("{}", line);
            }
        }
        Commands::Stats { exercise } => {
            let analytics = AnalyticsService::new();
            analytics.update_cache(&service).await?;
            match exercise {
                Some(name) => match analytics.exercise_stats(&name) {
                    Some(stats) => {
                        println!("{} ({})", stats.exercise_name, stats.category);
                        println!("  max weight:   {:.1} kg", stats.max_weight);
                        println!("  total volume: {:.1} kg", stats.total_volume);
                        println!("  last done:    {}", stats.last_performed);
                        println!("  trend:        {:?}", stats.progress_trend);
                    }
                    None => bail!("no recorded sessions for {}", name),
                },
                None => {
                    let stats = analytics.weekly_stats();
                    println!("Last 7 days:");
                    println!("  workouts: {}", stats.total_workouts);
                    println!("  volume:   {:.1} kg", stats.total_volume);
                    if let Some(category) = &stats.most_trained_category {
                        println!("  focus:    {}", category);
                    }
                    println!("  streak:   {} day(s)", stats.streak);
                }
            }
        }
        Commands::Export { output } => {
            let bundle = service.export_data().await?;
            let json = serde_json::to_string_pretty(&bundle)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { input } => {
            let json = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let bundle: ExportBundle = serde_json::from_str(&json)?;
            let sessions = bundle.workout_sessions.len();
            service.import_data(&bundle).await?;
            println!("Imported {} session(s) from {}", sessions, input.display());
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to wipe all data without --yes");
            }
            service.clear_all_data().await?;
            println!("All data cleared");
        }
        Commands::Storage => {
            let info = service.storage_info().await?;
            println!(
                "{} / {} bytes used ({:.1}%)",
                info.used,
                info.total,
                info.used as f64 / info.total as f64 * 100.0
            );
        }
        Commands::Sync => {
            let pending = service.pending_sync_count().await?;
            if pending == 0 {
                println!("Nothing queued");
                return Ok(());
            }
            let outcome = service.sync_now().await?;
            println!(
                "Replayed {} action(s), {} still queued",
                outcome.replayed, outcome.failed
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn list_flags_resolve_to_one_filter() {
        assert_eq!(list_filter(None, None, None).unwrap(), ListFilter::All);
        assert_eq!(
            list_filter(Some(day("2026-08-01")), Some(day("2026-08-20")), None).unwrap(),
            ListFilter::DateRange(day("2026-08-01"), day("2026-08-20"))
        );
        assert_eq!(
            list_filter(None, None, Some("Squat".into())).unwrap(),
            ListFilter::Exercise("Squat".into())
        );
    }

    #[test]
    fn list_rejects_exercise_combined_with_a_date_range() {
        let err = list_filter(
            Some(day("2026-08-01")),
            Some(day("2026-08-20")),
            Some("Squat".into()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("--exercise"));
    }

    #[test]
    fn list_rejects_a_half_open_date_range() {
        assert!(list_filter(Some(day("2026-08-01")), None, None).is_err());
        assert!(list_filter(None, Some(day("2026-08-20")), None).is_err());
    }
}
