mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Mode, Tuning};
use log::{debug, info, warn};
use onbeat_core::{AnalysisSession, Command, PollOutcome};
use onbeat_domain_grid::SurfaceSize;
use onbeat_infra_audio_hound::HoundAudioSource;
use onbeat_infra_source_fs::{FsNoteSource, FsSourceLocator};
use onbeat_infra_storage_fs::FsStorage;
use onbeat_ports::storage::{SessionSettingsDto, StorageError, StoragePort};
use onbeat_ports::transport::DetachedTransport;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SCENE_WIDTH: f32 = 1200.0;
const SCENE_HEIGHT: f32 = 400.0;

/// Stored settings, written back only with `--save`.
struct RunStorage {
    inner: FsStorage,
    persist: bool,
}

impl StoragePort for RunStorage {
    fn load_settings(&self) -> Result<SessionSettingsDto, StorageError> {
        self.inner.load_settings()
    }

    fn save_settings(&self, s: &SessionSettingsDto) -> Result<(), StorageError> {
        if self.persist {
            self.inner.save_settings(s)
        } else {
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let storage = RunStorage {
        inner: FsStorage::default(),
        persist: cli.tuning.save,
    };
    let mut session = AnalysisSession::new(
        Box::new(FsNoteSource),
        Box::new(HoundAudioSource),
        Box::new(FsSourceLocator),
        Box::new(DetachedTransport),
        Some(Box::new(storage)),
    );
    apply_tuning(&mut session, &cli.tuning)?;

    match cli.mode {
        Mode::Analyze {
            reference,
            performance,
        } => run_analyze(&mut session, &cli.tuning, &reference, &performance),
        Mode::Watch {
            reference,
            dir,
            interval_ms,
        } => run_watch(&mut session, &cli.tuning, &reference, dir, interval_ms),
    }
}

fn apply_tuning(session: &mut AnalysisSession, tuning: &Tuning) -> Result<()> {
    let mut commands = Vec::new();
    if let Some(bpm) = tuning.bpm {
        commands.push(Command::SetManualTempo { bpm });
        commands.push(Command::SetUseManualTempo { enabled: true });
    }
    if let Some(ms) = tuning.threshold_ms {
        commands.push(Command::SetOnTimeThreshold { ms });
    }
    if let Some(subdivisions) = tuning.subdivisions {
        commands.push(Command::SetSubdivisions { subdivisions });
    }
    if let Some(measure) = tuning.record_start {
        commands.push(Command::SetRecordStartMeasure { measure });
    }
    if let Some(db) = tuning.db_threshold {
        commands.push(Command::SetOnsetThresholdDb { db });
    }
    if let Some(ms) = tuning.hit_distance_ms {
        commands.push(Command::SetHitDistanceMs { ms });
    }
    if tuning.audio {
        commands.push(Command::SetAnalyzeAudio { enabled: true });
    }

    for cmd in commands {
        let label = format!("{cmd:?}");
        session
            .handle_command(cmd)
            .with_context(|| format!("applying {label}"))?;
    }
    log_events(session);
    Ok(())
}

fn run_analyze(
    session: &mut AnalysisSession,
    tuning: &Tuning,
    reference: &Path,
    performance: &Path,
) -> Result<()> {
    session
        .load_reference(reference)
        .with_context(|| format!("loading reference '{}'", reference.display()))?;
    session
        .analyze_file(performance)
        .with_context(|| format!("analysing '{}'", performance.display()))?;
    log_events(session);

    print!("{}", session.report());
    write_outputs(session, tuning)
}

fn run_watch(
    session: &mut AnalysisSession,
    tuning: &Tuning,
    reference: &Path,
    dir: PathBuf,
    interval_ms: Option<u64>,
) -> Result<()> {
    session
        .load_reference(reference)
        .with_context(|| format!("loading reference '{}'", reference.display()))?;
    session.handle_command(Command::SetSourceDirectory {
        path: Some(dir.clone()),
    })?;
    session.handle_command(Command::SetWatchEnabled { enabled: true })?;
    log_events(session);

    let interval_ms = interval_ms
        .unwrap_or(session.settings().poll_interval_ms)
        .max(1);
    let interval = Duration::from_millis(interval_ms);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        warn!("Ctrl-C received, stopping watch");
        flag.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    info!("watching '{}' every {interval_ms} ms", dir.display());
    while running.load(Ordering::SeqCst) {
        match session.poll() {
            Ok(PollOutcome::Analyzed(path)) => {
                println!("== {} ==", path.display());
                print!("{}", session.report());
                if let Err(err) = write_outputs(session, tuning) {
                    warn!("{err:#}");
                }
            }
            Ok(outcome) => debug!("poll: {outcome:?}"),
            Err(err) => warn!("{err}"),
        }
        log_events(session);
        thread::sleep(interval);
    }
    Ok(())
}

fn write_outputs(session: &mut AnalysisSession, tuning: &Tuning) -> Result<()> {
    if let Some(path) = &tuning.scene_json {
        let scene = session.project(SurfaceSize::new(SCENE_WIDTH, SCENE_HEIGHT))?;
        let file = File::create(path)
            .with_context(|| format!("creating scene file '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &scene)?;
        info!(
            "wrote {} grid lines and {} markers to '{}'",
            scene.lines.len(),
            scene.markers.len(),
            path.display()
        );
    }
    if let Some(dir) = &tuning.export {
        session
            .export(dir)
            .with_context(|| format!("exporting to '{}'", dir.display()))?;
        info!("exported analysis to '{}'", dir.display());
    }
    Ok(())
}

// Status messages are already logged by the session.
fn log_events(session: &mut AnalysisSession) {
    for event in session.drain_events() {
        debug!("event: {event:?}");
    }
}
