pub mod clock;
pub mod db;
pub mod engine;
pub mod metrics;
pub mod models;
pub mod reporting;
pub mod sensing;
pub mod session;
pub mod settings;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use clock::SystemClock;
use db::Database;
use engine::{CompletedSession, MoodEngine};
use sensing::RandomPerception;
use session::{recover_interrupted_sessions, EngineEvent, SessionController};
use settings::SettingsStore;

pub use clock::{Clock, ManualClock};
pub use engine::{EngineConfig, EngineError};
pub use models::{FrameObservation, LogEntry, Mood, PerceptionReading};
pub use reporting::{build_report, MoodReport};

/// Entry point of the `moodlog` binary: runs one demo session against the
/// synthetic perception source and prints the completed session as JSON.
///
/// The first argument, if any, is the settings file path.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    let level = if settings::debug_mode_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    info!("moodlog starting up...");

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("moodlog.json"));
    let store = SettingsStore::new(settings_path)?;
    let mut settings = store.settings();
    settings.apply_env_overrides();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let completed = runtime.block_on(async move {
        let database = match &settings.database_path {
            Some(path) => Database::new(path.clone())?,
            None => Database::in_memory()?,
        };

        let recovered = recover_interrupted_sessions(&database).await?;
        if recovered > 0 {
            warn!("{recovered} interrupted session(s) recovered");
        }

        let engine = MoodEngine::new(settings.engine, Arc::new(SystemClock::new()));
        let controller = SessionController::new(engine, Some(database));

        let source = match settings.demo.seed {
            Some(seed) => RandomPerception::seeded(settings.demo.identities.clone(), seed),
            None => RandomPerception::new(settings.demo.identities.clone()),
        };

        let mut events = controller.subscribe();
        let printer = tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if let EngineEvent::LogEntry { entry, .. } = event {
                    println!("{}", entry.display_line());
                }
            }
        });

        controller.start_monitoring(Box::new(source)).await?;
        controller.start_session().await?;
        tokio::time::sleep(std::time::Duration::from_secs(settings.demo.session_secs)).await;

        let completed = controller
            .shutdown()
            .await?
            .context("demo session was not running at shutdown")?;
        let unsaved = controller.unsaved_count().await;
        if unsaved > 0 {
            warn!("{unsaved} session(s) could not be written to the database");
        }
        drop(controller);
        let _ = printer.await;

        Ok::<CompletedSession, anyhow::Error>(completed)
    })?;

    println!("{}", serde_json::to_string_pretty(&completed.report)?);
    Ok(())
}
