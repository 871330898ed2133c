use onbeat_core::SourceWatcher;
use onbeat_ports::source::{SourceFile, SourceKind};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

fn file(name: &str, size_bytes: u64, modified_secs: u64) -> SourceFile {
    SourceFile {
        path: PathBuf::from(name),
        kind: SourceKind::Midi,
        size_bytes,
        modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(modified_secs)),
    }
}

#[test]
fn nothing_to_observe_yields_nothing() {
    let mut watcher = SourceWatcher::new();
    assert_eq!(watcher.observe(None), None);
}

#[test]
fn file_is_handed_out_after_a_stable_second_poll() {
    let mut watcher = SourceWatcher::new();
    let take = file("take.mid", 100, 10);

    assert_eq!(watcher.observe(Some(&take)), None);
    assert_eq!(watcher.observe(Some(&take)), Some(take.clone()));
}

#[test]
fn growing_file_keeps_waiting() {
    let mut watcher = SourceWatcher::new();

    assert_eq!(watcher.observe(Some(&file("take.mid", 100, 10))), None);
    assert_eq!(watcher.observe(Some(&file("take.mid", 200, 11))), None);
    assert_eq!(watcher.observe(Some(&file("take.mid", 300, 12))), None);
    assert!(watcher.observe(Some(&file("take.mid", 300, 12))).is_some());
}

#[test]
fn analysed_file_is_not_handed_out_again() {
    let mut watcher = SourceWatcher::new();
    let take = file("take.mid", 100, 10);
    watcher.observe(Some(&take));
    let ready = watcher.observe(Some(&take)).unwrap();
    watcher.mark_analyzed(&ready);

    assert_eq!(watcher.observe(Some(&take)), None);
    assert_eq!(watcher.observe(Some(&take)), None);
}

#[test]
fn rewritten_file_is_analysed_again() {
    let mut watcher = SourceWatcher::new();
    let first = file("take.mid", 100, 10);
    watcher.mark_analyzed(&first);

    let rewritten = file("take.mid", 100, 20);
    assert_eq!(watcher.observe(Some(&rewritten)), None);
    assert_eq!(watcher.observe(Some(&rewritten)), Some(rewritten.clone()));
}

#[test]
fn switching_files_restarts_the_settle_check() {
    let mut watcher = SourceWatcher::new();

    assert_eq!(watcher.observe(Some(&file("a.mid", 100, 10))), None);
    assert_eq!(watcher.observe(Some(&file("b.mid", 100, 11))), None);
    assert!(watcher.observe(Some(&file("b.mid", 100, 11))).is_some());
}

#[test]
fn reset_forgets_the_last_analysed_file() {
    let mut watcher = SourceWatcher::new();
    let take = file("take.mid", 100, 10);
    watcher.mark_analyzed(&take);
    watcher.reset();

    watcher.observe(Some(&take));
    assert_eq!(watcher.observe(Some(&take)), Some(take));
}
