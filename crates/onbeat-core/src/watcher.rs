use onbeat_ports::source::SourceFile;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Fingerprint {
    path: PathBuf,
    size_bytes: u64,
    modified: Option<SystemTime>,
}

impl From<&SourceFile> for Fingerprint {
    fn from(file: &SourceFile) -> Self {
        Self {
            path: file.path.clone(),
            size_bytes: file.size_bytes,
            modified: file.modified,
        }
    }
}

/// Decides when the newest file in the watched directory should be analysed.
///
/// A file is handed out once its size has stayed the same across two polls, and
/// never twice unless it changes.
#[derive(Clone, Debug, Default)]
pub struct SourceWatcher {
    last_analyzed: Option<Fingerprint>,
    pending: Option<Fingerprint>,
}

impl SourceWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, newest: Option<&SourceFile>) -> Option<SourceFile> {
        let Some(file) = newest else {
            self.pending = None;
            return None;
        };
        let seen = Fingerprint::from(file);
        if self.last_analyzed.as_ref() == Some(&seen) {
            self.pending = None;
            return None;
        }

        let settled = self
            .pending
            .as_ref()
            .is_some_and(|p| p.path == seen.path && p.size_bytes == seen.size_bytes);
        if settled {
            self.pending = None;
            return Some(file.clone());
        }
        self.pending = Some(seen);
        None
    }

    pub fn mark_analyzed(&mut self, file: &SourceFile) {
        self.last_analyzed = Some(Fingerprint::from(file));
        self.pending = None;
    }

    pub fn reset(&mut self) {
        self.last_analyzed = None;
        self.pending = None;
    }
}
