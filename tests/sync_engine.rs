mod common;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tbwatch::fs::mock::MockFileSystem;
use tbwatch::fs::{FileSystem, RealFileSystem};
use tbwatch::sync::{sync_dir, ApproveAll, GateDecision, SyncGate, SyncKind};

/// Records every gate call and answers with a fixed verdict.
#[derive(Default)]
struct RecordingGate {
    deny_copies: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingGate {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SyncGate for RecordingGate {
    fn on_create_directory(&self, _source: &Path, dest: &Path) -> Result<GateDecision> {
        self.calls.lock().unwrap().push(format!("mkdir {}", dest.display()));
        Ok(GateDecision::Approve)
    }

    fn on_copy_file(&self, _source: &Path, dest: &Path) -> Result<GateDecision> {
        self.calls.lock().unwrap().push(format!("copy {}", dest.display()));
        if self.deny_copies {
            Ok(GateDecision::Deny)
        } else {
            Ok(GateDecision::Approve)
        }
    }
}

struct FailingGate;

impl SyncGate for FailingGate {
    fn on_copy_file(&self, _source: &Path, _dest: &Path) -> Result<GateDecision> {
        anyhow::bail!("policy backend unavailable")
    }
}

#[test]
fn single_nested_file_creates_directory_then_copies() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/dir/file.txt", "hello", 10);
    fs.add_dir("dst");
    let gate = RecordingGate::default();

    let report = sync_dir(&fs, Path::new("src"), Path::new("dst"), &gate).unwrap();

    assert_eq!(report.decisions.len(), 2);
    assert_eq!(report.decisions[0].kind, SyncKind::CreateDirectory);
    assert_eq!(report.decisions[0].dest, PathBuf::from("dst/dir"));
    assert_eq!(report.decisions[0].gate, Some(GateDecision::Approve));
    assert_eq!(report.decisions[1].kind, SyncKind::CopyFile);
    assert_eq!(report.decisions[1].dest, PathBuf::from("dst/dir/file.txt"));
    assert_eq!(report.decisions[1].gate, Some(GateDecision::Approve));
    assert_eq!(report.applied(), 2);

    assert_eq!(gate.calls(), vec!["mkdir dst/dir", "copy dst/dir/file.txt"]);
    assert_eq!(fs.read("dst/dir/file.txt"), Some(b"hello".to_vec()));
}

#[test]
fn second_sync_is_a_no_op_without_gate_calls() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/a.txt", "a", 10);
    fs.add_file_at("src/sub/b.txt", "b", 10);
    fs.add_dir("dst");

    sync_dir(&fs, Path::new("src"), Path::new("dst"), &ApproveAll).unwrap();
    let copies_after_first = fs.copies().len();
    let dirs_after_first = fs.created_dirs().len();

    let gate = RecordingGate::default();
    let report = sync_dir(&fs, Path::new("src"), Path::new("dst"), &gate).unwrap();

    assert_eq!(report.applied(), 0);
    assert_eq!(report.count(SyncKind::Skip), 3);
    assert!(gate.calls().is_empty());
    assert_eq!(fs.copies().len(), copies_after_first);
    assert_eq!(fs.created_dirs().len(), dirs_after_first);
}

#[test]
fn newer_source_is_copied_again_and_older_is_not() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/new.txt", "v2", 20);
    fs.add_file_at("src/old.txt", "v1", 5);
    fs.add_file_at("dst/new.txt", "v1", 10);
    fs.add_file_at("dst/old.txt", "v9", 10);

    let report = sync_dir(&fs, Path::new("src"), Path::new("dst"), &ApproveAll).unwrap();

    assert_eq!(report.count(SyncKind::CopyFile), 1);
    assert_eq!(report.count(SyncKind::Skip), 1);
    assert_eq!(fs.read("dst/new.txt"), Some(b"v2".to_vec()));
    assert_eq!(fs.read("dst/old.txt"), Some(b"v9".to_vec()));
}

#[test]
fn equal_mtime_counts_as_up_to_date() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/same.txt", "new", 10);
    fs.add_file_at("dst/same.txt", "old", 10);

    let report = sync_dir(&fs, Path::new("src"), Path::new("dst"), &ApproveAll).unwrap();

    assert_eq!(report.count(SyncKind::Skip), 1);
    assert_eq!(fs.read("dst/same.txt"), Some(b"old".to_vec()));
}

#[test]
fn denied_copy_is_recorded_but_not_performed() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/a.txt", "a", 10);
    fs.add_dir("dst");
    let gate = RecordingGate {
        deny_copies: true,
        ..RecordingGate::default()
    };

    let report = sync_dir(&fs, Path::new("src"), Path::new("dst"), &gate).unwrap();

    assert_eq!(report.denied(), 1);
    assert_eq!(report.applied(), 0);
    assert!(fs.copies().is_empty());
    assert!(!fs.exists(Path::new("dst/a.txt")));
}

#[test]
fn gate_error_aborts_the_sync() {
    let fs = MockFileSystem::new();
    fs.add_file_at("src/a.txt", "a", 10);
    fs.add_file_at("src/b.txt", "b", 10);
    fs.add_dir("dst");

    let err = sync_dir(&fs, Path::new("src"), Path::new("dst"), &FailingGate).unwrap_err();

    assert!(format!("{err:#}").contains("policy backend unavailable"));
    assert!(fs.copies().is_empty());
}

#[test]
fn real_tree_mirror_is_idempotent_and_preserves_mtime() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("assets");
    let dst = tmp.path().join("report");
    let style = common::write_file_at(&src, "style.css", "body {}", 1_000);
    common::write_file_at(&src, "js/app.js", "run()", 1_000);
    std::fs::create_dir_all(&dst).unwrap();

    let first = sync_dir(&RealFileSystem, &src, &dst, &ApproveAll).unwrap();
    assert_eq!(first.count(SyncKind::CreateDirectory), 1);
    assert_eq!(first.count(SyncKind::CopyFile), 2);
    assert_eq!(
        std::fs::read_to_string(dst.join("js/app.js")).unwrap(),
        "run()"
    );
    assert_eq!(common::mtime(&dst.join("style.css")), common::mtime(&style));

    let second = sync_dir(&RealFileSystem, &src, &dst, &ApproveAll).unwrap();
    assert_eq!(second.applied(), 0);

    // Touching the source makes it newer than the mirror.
    common::write_file_at(&src, "style.css", "body { color: red }", 2_000);
    let third = sync_dir(&RealFileSystem, &src, &dst, &ApproveAll).unwrap();
    assert_eq!(third.count(SyncKind::CopyFile), 1);
    assert!(RealFileSystem.exists(&dst.join("style.css")));
    assert_eq!(
        std::fs::read_to_string(dst.join("style.css")).unwrap(),
        "body { color: red }"
    );
}
