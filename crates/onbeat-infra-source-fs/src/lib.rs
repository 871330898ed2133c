use log::debug;
use onbeat_domain_score::decode_midi_bytes;
use onbeat_ports::source::{
    DecodedNoteSequence, NoteSourcePort, SourceError, SourceFile, SourceKind, SourceLocatorPort,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads standard MIDI files from disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsNoteSource;

impl NoteSourcePort for FsNoteSource {
    fn read_notes(&self, path: &Path) -> Result<DecodedNoteSequence, SourceError> {
        let data =
            fs::read(path).map_err(|e| SourceError::Io(format!("{}: {e}", path.display())))?;
        let sequence = decode_midi_bytes(&data)
            .map_err(|e| SourceError::Decode(format!("{}: {e}", path.display())))?;
        debug!(
            "read {} notes from '{}' at {} ticks per quarter",
            sequence.notes.len(),
            path.display(),
            sequence.quarter_note_ticks
        );
        Ok(sequence)
    }
}

/// Finds the most recently modified source file in a directory. Subdirectories are not searched.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSourceLocator;

impl SourceLocatorPort for FsSourceLocator {
    fn newest_source(
        &self,
        dir: &Path,
        kinds: &[SourceKind],
        exclude: Option<&Path>,
    ) -> Result<Option<SourceFile>, SourceError> {
        let excluded = exclude.map(canonical);
        let entries =
            fs::read_dir(dir).map_err(|e| SourceError::Io(format!("{}: {e}", dir.display())))?;

        let mut newest: Option<SourceFile> = None;
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::Io(e.to_string()))?;
            let path = entry.path();
            let Some(kind) = SourceKind::from_path(&path) else {
                continue;
            };
            if !kinds.contains(&kind) {
                continue;
            }
            // Files can vanish between listing and stat while a host is writing.
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            if excluded.as_deref() == Some(canonical(&path).as_path()) {
                debug!("skipping excluded '{}'", path.display());
                continue;
            }

            let candidate = SourceFile {
                path,
                kind,
                size_bytes: metadata.len(),
                modified: metadata.modified().ok(),
            };
            if is_newer(&candidate, newest.as_ref()) {
                newest = Some(candidate);
            }
        }

        if let Some(file) = &newest {
            debug!("newest source in '{}' is '{}'", dir.display(), file.path.display());
        }
        Ok(newest)
    }
}

// Paths that cannot be resolved are compared as given.
fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// Ties on modification time go to the lexically greater path so the choice is stable.
fn is_newer(candidate: &SourceFile, current: Option<&SourceFile>) -> bool {
    match current {
        None => true,
        Some(current) => {
            (candidate.modified, &candidate.path) > (current.modified, &current.path)
        }
    }
}
