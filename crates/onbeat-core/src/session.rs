use crate::export::export_analysis;
use crate::ipc::{Command, Event};
use crate::report::{analysis_report, reference_report, summary_line};
use crate::transport::{resolve_tempo, resolve_time_signature};
use crate::watcher::SourceWatcher;
use log::{debug, info, warn};
use onbeat_domain_eval::{
    align, detect_onsets, AlignmentConfig, AlignmentOutcome, OnsetConfig, OnsetError,
    RejectedEvent, TimingSummary,
};
use onbeat_domain_grid::{project, DisplayError, DisplayWindow, GridScene, SurfaceSize};
use onbeat_domain_score::{
    millis_to_ticks, AnalyzedEvent, NoteEvent, ReferenceError, ReferenceSet,
};
use onbeat_ports::source::{
    AudioSourcePort, DecodedAudio, DecodedNoteSequence, NoteSourcePort, SourceError, SourceKind,
    SourceLocatorPort,
};
use onbeat_ports::storage::{SessionSettingsDto, StorageError, StoragePort};
use onbeat_ports::transport::HostTransportPort;
use onbeat_ports::types::{Bpm, Millis, TempoError, TimeSignature, DEFAULT_QUARTER_NOTE_TICKS};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("please set a quantized reference file first")]
    NoReference,
    #[error("invalid tempo: {0}")]
    InvalidTempo(#[from] TempoError),
    #[error("audio is {seconds:.1} s long, the limit is {max_seconds:.1} s")]
    UnsupportedDuration { seconds: f64, max_seconds: f64 },
    #[error("setting rejected: {0}")]
    Display(#[from] DisplayError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<SourceError> for SessionError {
    fn from(err: SourceError) -> Self {
        SessionError::InvalidInput(err.to_string())
    }
}

impl From<ReferenceError> for SessionError {
    fn from(err: ReferenceError) -> Self {
        SessionError::InvalidInput(err.to_string())
    }
}

impl From<OnsetError> for SessionError {
    fn from(err: OnsetError) -> Self {
        SessionError::InvalidInput(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The host is recording; analysis must not touch the source yet.
    Recording,
    Disabled,
    NoChange,
    Analyzed(PathBuf),
}

/// The last analysed take, kept so setting changes can re-align it.
#[derive(Clone, Debug, PartialEq)]
enum Performance {
    Notes(Vec<NoteEvent>),
    /// Onset times in real time; their beat positions depend on the tempo.
    Onsets(Vec<Millis>),
}

impl Performance {
    fn events(&self, bpm: Bpm) -> Vec<NoteEvent> {
        match self {
            Performance::Notes(notes) => notes.clone(),
            Performance::Onsets(times) => times
                .iter()
                .map(|&ms| {
                    NoteEvent::onset(
                        millis_to_ticks(ms, bpm, DEFAULT_QUARTER_NOTE_TICKS),
                        DEFAULT_QUARTER_NOTE_TICKS,
                    )
                })
                .collect(),
        }
    }
}

/// Owns the reference set, the latest analysis and the display window.
///
/// Every operation either completes or leaves the previous state in place.
pub struct AnalysisSession {
    notes: Box<dyn NoteSourcePort>,
    audio: Box<dyn AudioSourcePort>,
    locator: Box<dyn SourceLocatorPort>,
    transport: Box<dyn HostTransportPort>,
    storage: Option<Box<dyn StoragePort>>,
    settings: SessionSettingsDto,
    window: DisplayWindow,
    reference: Option<ReferenceSet>,
    performance: Option<Performance>,
    outcome: AlignmentOutcome,
    analyzed_source: Option<PathBuf>,
    watcher: SourceWatcher,
    report: String,
    events: VecDeque<Event>,
}

impl AnalysisSession {
    pub fn new(
        notes: Box<dyn NoteSourcePort>,
        audio: Box<dyn AudioSourcePort>,
        locator: Box<dyn SourceLocatorPort>,
        transport: Box<dyn HostTransportPort>,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Self {
        let settings = match storage.as_ref().map(|s| s.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                warn!("could not load settings, using defaults: {err}");
                SessionSettingsDto::default()
            }
            None => SessionSettingsDto::default(),
        };
        let window = window_from_settings(&settings);

        Self {
            notes,
            audio,
            locator,
            transport,
            storage,
            settings,
            window,
            reference: None,
            performance: None,
            outcome: AlignmentOutcome::default(),
            analyzed_source: None,
            watcher: SourceWatcher::new(),
            report: String::new(),
            events: VecDeque::new(),
        }
    }

    /// Runs `cmd`. Failures are also published as a status message.
    pub fn handle_command(&mut self, cmd: Command) -> Result<(), SessionError> {
        let result = self.dispatch(cmd);
        if let Err(err) = &result {
            self.emit_status(err.to_string());
        }
        result
    }

    fn dispatch(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::LoadReference { path } => self.load_reference(&path),
            Command::ReloadReference => self.reload_reference(),
            Command::AnalyzeFile { path } => self.analyze_file(&path),
            Command::AnalyzeNewest => self.analyze_newest().map(|_| ()),
            Command::Poll => self.poll().map(|_| ()),
            Command::ClearAnalysis => {
                self.clear_analysis();
                Ok(())
            }
            Command::SetOnTimeThreshold { ms } => self.set_on_time_threshold(ms),
            Command::SetSubdivisions { subdivisions } => self.set_subdivisions(subdivisions),
            Command::SetRecordStartMeasure { measure } => self.set_record_start_measure(measure),
            Command::SetRecordOffsetBeats { beats } => self.set_record_offset_beats(beats),
            Command::SetMeasureRange {
                measure_start,
                length,
            } => self.set_measure_range(measure_start, length),
            Command::SetDisplayBeats { beat_start, length } => {
                self.set_display_beats(beat_start, length)
            }
            Command::SetManualTempo { bpm } => self.set_manual_tempo(bpm),
            Command::SetUseManualTempo { enabled } => self.set_use_manual_tempo(enabled),
            Command::SetOnsetThresholdDb { db } => self.set_onset_threshold_db(db),
            Command::SetHitDistanceMs { ms } => self.set_hit_distance_ms(ms),
            Command::SetAnalyzeAudio { enabled } => {
                self.settings.analyze_audio = enabled;
                self.watcher.reset();
                self.settings_changed();
                Ok(())
            }
            Command::SetSourceDirectory { path } => {
                self.settings.source_directory = path.map(|p| p.display().to_string());
                self.watcher.reset();
                self.settings_changed();
                Ok(())
            }
            Command::SetWatchEnabled { enabled } => {
                self.settings.watch_enabled = enabled;
                self.settings_changed();
                Ok(())
            }
            Command::SetRhythmNames { enabled } => {
                self.settings.rhythm_instrument_names = enabled;
                self.refresh_report()?;
                self.settings_changed();
                Ok(())
            }
            Command::SetLockAnalyzed { enabled } => {
                self.settings.lock_analyzed = enabled;
                self.settings_changed();
                Ok(())
            }
            Command::ExportAnalysis { dir } => self.export(&dir),
        }
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn settings(&self) -> &SessionSettingsDto {
        &self.settings
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    pub fn reference(&self) -> Option<&ReferenceSet> {
        self.reference.as_ref()
    }

    pub fn analyzed(&self) -> &[AnalyzedEvent] {
        &self.outcome.analyzed
    }

    pub fn rejected(&self) -> &[RejectedEvent] {
        &self.outcome.rejected
    }

    pub fn analyzed_source(&self) -> Option<&Path> {
        self.analyzed_source.as_deref()
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    /// `None` until a take has been analysed; a take without hits still has a summary.
    pub fn summary(&self) -> Option<TimingSummary> {
        self.performance.as_ref()?;
        Some(TimingSummary::from_analyzed(
            &self.outcome.analyzed,
            self.outcome.rejected.len(),
            self.window.on_time_threshold_ms(),
        ))
    }

    pub fn tempo(&self) -> Result<Bpm, TempoError> {
        resolve_tempo(&self.transport.snapshot(), &self.settings)
    }

    pub fn time_signature(&self) -> TimeSignature {
        resolve_time_signature(&self.transport.snapshot())
    }

    pub fn load_reference(&mut self, path: &Path) -> Result<(), SessionError> {
        let sequence = self.notes.read_notes(path)?;
        let reference = ReferenceSet::build(&sequence)?;
        let bpm = self.tempo()?;

        info!(
            "loaded reference '{}': {} notes over {} beats",
            path.display(),
            reference.len(),
            reference.total_beat_span()
        );
        self.report = reference_report(&reference, bpm, self.settings.rhythm_instrument_names);
        self.events.push_back(Event::ReferenceLoaded {
            count: reference.len(),
            beat_span: reference.total_beat_span(),
        });
        self.emit_status(format!("Loaded {} reference notes", reference.len()));
        self.reference = Some(reference);
        self.clear_performance();

        self.settings.reference_path = Some(path.display().to_string());
        self.settings_changed();
        Ok(())
    }

    pub fn reload_reference(&mut self) -> Result<(), SessionError> {
        let Some(path) = self.settings.reference_path.clone() else {
            return Err(SessionError::InvalidInput(
                "no reference file has been set".to_string(),
            ));
        };
        self.load_reference(Path::new(&path))
    }

    pub fn analyze_file(&mut self, path: &Path) -> Result<(), SessionError> {
        self.require_reference()?;
        let kind = SourceKind::from_path(path).ok_or_else(|| {
            SessionError::InvalidInput(format!("unsupported file type: {}", path.display()))
        })?;

        match kind {
            SourceKind::Midi => {
                let sequence = self.notes.read_notes(path)?;
                self.analyze_notes(&sequence)?;
            }
            SourceKind::Audio => {
                let audio = self.audio.read_audio(path)?;
                self.analyze_audio(&audio)?;
            }
        }
        self.analyzed_source = Some(path.to_path_buf());
        Ok(())
    }

    pub fn analyze_notes(&mut self, sequence: &DecodedNoteSequence) -> Result<(), SessionError> {
        self.require_reference()?;
        if sequence.notes.is_empty() {
            return Err(SessionError::InvalidInput(
                "performance contains no notes".to_string(),
            ));
        }
        // Left unvalidated so malformed notes are reported per event by the aligner.
        let notes = sequence
            .notes
            .iter()
            .map(|note| NoteEvent {
                pitch: note.pitch,
                tick_start: note.start_tick,
                tick_end: note.end_tick,
                quarter_note_ticks: sequence.quarter_note_ticks,
            })
            .collect();
        self.run_alignment(Performance::Notes(notes))
    }

    pub fn analyze_audio(&mut self, audio: &DecodedAudio) -> Result<(), SessionError> {
        self.require_reference()?;
        let seconds = audio.duration_seconds();
        let max_seconds = self.settings.max_audio_seconds;
        if seconds > max_seconds {
            return Err(SessionError::UnsupportedDuration {
                seconds,
                max_seconds,
            });
        }

        let bpm = self.tempo()?;
        let cfg = OnsetConfig {
            threshold_db: self.settings.onset_threshold_db,
            hit_distance_ms: self.settings.hit_distance_ms,
            bpm,
            quarter_note_ticks: DEFAULT_QUARTER_NOTE_TICKS,
        };
        let onsets = detect_onsets(audio, cfg)?;
        if onsets.is_empty() {
            warn!(
                "no onsets above {} dB in {:.1} s of audio",
                cfg.threshold_db, seconds
            );
        }
        let times = onsets
            .iter()
            .map(|onset| onset.start_beat() * bpm.ms_per_beat())
            .collect();
        self.run_alignment(Performance::Onsets(times))
    }

    /// Analyses the newest file in the source directory right away.
    pub fn analyze_newest(&mut self) -> Result<PathBuf, SessionError> {
        self.require_reference()?;
        let dir = self.source_directory()?;
        let newest = self
            .locator
            .newest_source(&dir, &self.accepted_kinds(), self.reference_path())?
            .ok_or_else(|| {
                SessionError::InvalidInput(format!("no source files detected in {}", dir.display()))
            })?;

        self.analyze_file(&newest.path)?;
        self.watcher.mark_analyzed(&newest);
        Ok(newest.path)
    }

    /// One tick of the watch timer.
    pub fn poll(&mut self) -> Result<PollOutcome, SessionError> {
        if self.transport.snapshot().is_recording {
            debug!("host is recording, skipping poll");
            return Ok(PollOutcome::Recording);
        }
        if !self.settings.watch_enabled || self.settings.lock_analyzed {
            return Ok(PollOutcome::Disabled);
        }
        let Ok(dir) = self.source_directory() else {
            return Ok(PollOutcome::Disabled);
        };

        let newest = self
            .locator
            .newest_source(&dir, &self.accepted_kinds(), self.reference_path())?;
        let Some(file) = self.watcher.observe(newest.as_ref()) else {
            return Ok(PollOutcome::NoChange);
        };

        info!("analysing new source '{}'", file.path.display());
        match self.analyze_file(&file.path) {
            Ok(()) => {
                self.watcher.mark_analyzed(&file);
                Ok(PollOutcome::Analyzed(file.path))
            }
            // Retried once a reference is loaded.
            Err(SessionError::NoReference) => Err(SessionError::NoReference),
            Err(err) => {
                self.watcher.mark_analyzed(&file);
                Err(err)
            }
        }
    }

    pub fn clear_analysis(&mut self) {
        self.clear_performance();
        self.events.push_back(Event::AnalysisCleared);
    }

    /// Projects the current state onto a drawing surface of `surface` size.
    pub fn project(&mut self, surface: SurfaceSize) -> Result<GridScene, SessionError> {
        let bpm = self.tempo()?;
        let time_signature = self.time_signature();
        let reference = self.reference.as_ref().ok_or(SessionError::NoReference)?;
        self.window.set_bpm(bpm);
        Ok(project(
            &mut self.window,
            reference,
            &self.outcome.analyzed,
            time_signature,
            surface,
        ))
    }

    pub fn export(&self, dir: &Path) -> Result<(), SessionError> {
        export_analysis(
            dir,
            &self.settings,
            self.reference.as_ref(),
            &self.outcome,
            &self.report,
        )?;
        Ok(())
    }

    pub fn set_on_time_threshold(&mut self, ms: f64) -> Result<(), SessionError> {
        self.window.set_on_time_threshold_ms(ms)?;
        self.settings.on_time_threshold_ms = ms;
        self.refresh_report()?;
        self.settings_changed();
        Ok(())
    }

    pub fn set_subdivisions(&mut self, subdivisions: u32) -> Result<(), SessionError> {
        self.window.set_beat_subdivisions(subdivisions)?;
        self.settings.beat_subdivisions = subdivisions;
        self.settings_changed();
        Ok(())
    }

    pub fn set_record_start_measure(&mut self, measure: f64) -> Result<(), SessionError> {
        let mut window = self.window;
        window.set_record_start_measure(measure, self.time_signature())?;
        self.apply_record_offset(window)
    }

    pub fn set_record_offset_beats(&mut self, beats: f64) -> Result<(), SessionError> {
        let mut window = self.window;
        window.set_record_offset_beats(beats)?;
        self.apply_record_offset(window)
    }

    pub fn set_measure_range(&mut self, measure_start: f64, length: f64) -> Result<(), SessionError> {
        self.window
            .set_measure_range(measure_start, length, self.time_signature())?;
        self.store_display_range();
        Ok(())
    }

    pub fn set_display_beats(&mut self, beat_start: f64, length: f64) -> Result<(), SessionError> {
        self.window.set_beat_range(beat_start, beat_start + length)?;
        self.store_display_range();
        Ok(())
    }

    pub fn set_manual_tempo(&mut self, bpm: f64) -> Result<(), SessionError> {
        Bpm::new(bpm)?;
        let previous = self.settings.manual_bpm;
        self.settings.manual_bpm = bpm;
        if let Err(err) = self.realign() {
            self.settings.manual_bpm = previous;
            return Err(err);
        }
        self.settings_changed();
        Ok(())
    }

    pub fn set_use_manual_tempo(&mut self, enabled: bool) -> Result<(), SessionError> {
        let previous = self.settings.use_manual_bpm;
        self.settings.use_manual_bpm = enabled;
        if let Err(err) = self.realign() {
            self.settings.use_manual_bpm = previous;
            return Err(err);
        }
        self.settings_changed();
        Ok(())
    }

    pub fn set_onset_threshold_db(&mut self, db: f32) -> Result<(), SessionError> {
        if !db.is_finite() {
            return Err(SessionError::InvalidInput(format!("dB threshold {db}")));
        }
        self.settings.onset_threshold_db = db;
        self.settings_changed();
        Ok(())
    }

    pub fn set_hit_distance_ms(&mut self, ms: f64) -> Result<(), SessionError> {
        if !ms.is_finite() || ms < 0.0 {
            return Err(SessionError::InvalidInput(format!("hit distance {ms} ms")));
        }
        self.settings.hit_distance_ms = ms;
        self.settings_changed();
        Ok(())
    }

    fn apply_record_offset(&mut self, window: DisplayWindow) -> Result<(), SessionError> {
        let previous = self.window;
        self.window = window;
        if let Err(err) = self.realign() {
            self.window = previous;
            return Err(err);
        }
        self.settings.record_offset_beats = self.window.record_offset_beats();
        self.settings_changed();
        Ok(())
    }

    fn store_display_range(&mut self) {
        self.settings.display_beat_start = self.window.beat_start();
        self.settings.display_beat_length = self.window.beat_end() - self.window.beat_start();
        self.settings_changed();
    }

    fn run_alignment(&mut self, performance: Performance) -> Result<(), SessionError> {
        let reference = self.reference.as_ref().ok_or(SessionError::NoReference)?;
        let bpm = self.tempo()?;
        let cfg = AlignmentConfig {
            bpm,
            record_offset_beats: self.window.record_offset_beats(),
        };
        let outcome = align(reference, &performance.events(bpm), cfg);

        let threshold = self.window.on_time_threshold_ms();
        let summary =
            TimingSummary::from_analyzed(&outcome.analyzed, outcome.rejected.len(), threshold);
        self.report = analysis_report(&outcome, threshold, self.settings.rhythm_instrument_names);
        self.performance = Some(performance);
        self.outcome = outcome;

        self.emit_status(summary_line(&summary));
        self.events.push_back(Event::AnalysisCompleted { summary });
        Ok(())
    }

    fn realign(&mut self) -> Result<(), SessionError> {
        if self.reference.is_none() {
            return Ok(());
        }
        match self.performance.clone() {
            Some(performance) => self.run_alignment(performance),
            None => Ok(()),
        }
    }

    fn refresh_report(&mut self) -> Result<(), SessionError> {
        let rhythm = self.settings.rhythm_instrument_names;
        if self.performance.is_some() {
            self.report = analysis_report(&self.outcome, self.window.on_time_threshold_ms(), rhythm);
        } else if let Some(reference) = self.reference.as_ref() {
            self.report = reference_report(reference, self.tempo()?, rhythm);
        }
        Ok(())
    }

    fn clear_performance(&mut self) {
        self.performance = None;
        self.outcome = AlignmentOutcome::default();
        self.analyzed_source = None;
    }

    fn require_reference(&self) -> Result<&ReferenceSet, SessionError> {
        self.reference.as_ref().ok_or(SessionError::NoReference)
    }

    fn source_directory(&self) -> Result<PathBuf, SessionError> {
        self.settings
            .source_directory
            .as_ref()
            .map(PathBuf::from)
            .ok_or_else(|| SessionError::InvalidInput("no source directory set".to_string()))
    }

    fn accepted_kinds(&self) -> Vec<SourceKind> {
        if self.settings.analyze_audio {
            vec![SourceKind::Audio]
        } else {
            vec![SourceKind::Midi]
        }
    }

    fn reference_path(&self) -> Option<&Path> {
        self.settings.reference_path.as_deref().map(Path::new)
    }

    fn emit_status(&mut self, message: String) {
        info!("{message}");
        self.events.push_back(Event::StatusChanged { message });
    }

    fn settings_changed(&mut self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                warn!("could not save settings: {err}");
            }
        }
        self.events.push_back(Event::SettingsChanged {
            settings: self.settings.clone(),
        });
    }
}

fn window_from_settings(settings: &SessionSettingsDto) -> DisplayWindow {
    let mut window = DisplayWindow::default();
    let applied = [
        window.set_beat_subdivisions(settings.beat_subdivisions),
        window.set_on_time_threshold_ms(settings.on_time_threshold_ms),
        window.set_record_offset_beats(settings.record_offset_beats),
        window.set_beat_range(
            settings.display_beat_start,
            settings.display_beat_start + settings.display_beat_length,
        ),
    ];
    for err in applied.into_iter().filter_map(Result::err) {
        warn!("ignoring stored display setting: {err}");
    }
    window
}
