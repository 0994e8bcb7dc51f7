//! End-to-end tests for scanning a Drive folder and moving a recording set.

use anyhow::Result;
use async_trait::async_trait;
use meet_rec_mover::converter::{converted_path, DocumentConverter, UnconfiguredConverter};
use meet_rec_mover::mover::move_set;
use meet_rec_mover::recording::{scan, RecordingSet, Role};
use meet_rec_mover::relocate::{CleanupOutcome, MoveStatus};
use meet_rec_mover::transform::ConversionOutcome;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a fake .docx next to the source document.
struct FakeDriveConverter;

#[async_trait]
impl DocumentConverter for FakeDriveConverter {
    fn name(&self) -> &'static str {
        "fake drive"
    }

    async fn convert(&self, source: &Path) -> Result<PathBuf> {
        let output = converted_path(source);
        fs::write(&output, b"PK docx")?;
        Ok(output)
    }
}

fn populate(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"data").unwrap();
    }
}

#[test]
fn test_video_and_chat_form_one_complete_set() {
    let source = TempDir::new().unwrap();
    populate(source.path(), &["Session A～Recording.mp4", "Session A～Chat.txt"]);

    let report = scan(source.path()).unwrap();

    assert_eq!(report.sets.len(), 1);
    let set = &report.sets[0];
    assert_eq!(set.identity, "Session A");
    assert_eq!(set.video, Some(source.path().join("Session A～Recording.mp4")));
    assert_eq!(set.chat, Some(source.path().join("Session A～Chat.txt")));
    assert!(set.transcript.is_none());
    assert!(set.is_complete());
}

#[test]
fn test_notes_without_recording_yield_no_sets() {
    let source = TempDir::new().unwrap();
    populate(source.path(), &["Notes～Gemini によるメモ.gdoc"]);

    let report = scan(source.path()).unwrap();

    assert!(report.sets.is_empty());
}

#[tokio::test]
async fn test_converted_notes_replace_gdoc_after_move() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    populate(
        source.path(),
        &[
            "Planning 2024 05 01 10:30 JST～Recording",
            "Planning 2024 05 01 10:30 JST～Gemini によるメモ.gdoc",
            "Planning 2024 05 01 10:30 JST～Chat.txt",
        ],
    );

    let mut report = scan(source.path()).unwrap();
    assert_eq!(report.sets.len(), 1);
    let set = report.sets.remove(0);
    let gdoc = set.transcript.clone().unwrap();

    let outcome = move_set(set, destination.path(), &FakeDriveConverter)
        .await
        .unwrap();

    assert!(outcome.is_success(), "{:?}", outcome.failure_reasons());
    let docx_name = "Planning 2024 05 01 10:30 JST～Gemini によるメモ.docx";
    assert!(matches!(
        &outcome.transform.conversion,
        ConversionOutcome::Converted { to, .. } if to.ends_with(docx_name)
    ));

    let dated = destination.path().join("20240501");
    assert!(dated.join("Planning 2024 05 01 10:30 JST～Recording.mp4").exists());
    assert!(dated.join(docx_name).exists());
    assert!(dated.join("Planning 2024 05 01 10:30 JST～Chat.txt").exists());
    assert!(!dated.join("Planning 2024 05 01 10:30 JST～Gemini によるメモ.gdoc").exists());

    assert!(!gdoc.exists());
    assert_eq!(outcome.relocation.cleanup, CleanupOutcome::Removed { path: gdoc });
    assert_eq!(fs::read_dir(source.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_video_collision_does_not_block_chat() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    populate(source.path(), &["Session A～Recording.mp4", "Session A～Chat.txt"]);

    // A file already sitting at the video's target makes that move fail.
    let target_dir = destination.path().join("unknown_date");
    fs::create_dir_all(&target_dir).unwrap();
    fs::write(target_dir.join("Session A～Recording.mp4"), b"existing").unwrap();

    let set = scan(source.path()).unwrap().sets.remove(0);
    let outcome = move_set(set, destination.path(), &FakeDriveConverter)
        .await
        .unwrap();

    assert!(!outcome.is_success());
    let video_move = &outcome.relocation.moves[0];
    assert_eq!(video_move.role, Role::Video);
    assert!(matches!(video_move.status, MoveStatus::Failed { .. }));

    assert!(source.path().join("Session A～Recording.mp4").exists());
    assert!(!source.path().join("Session A～Chat.txt").exists());
    assert!(target_dir.join("Session A～Chat.txt").exists());
    assert_eq!(
        fs::read(target_dir.join("Session A～Recording.mp4")).unwrap(),
        b"existing"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_video_permission_error_does_not_block_chat() {
    use std::os::unix::fs::PermissionsExt;

    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let locked = source.path().join("locked");
    fs::create_dir(&locked).unwrap();
    populate(&locked, &["Session A～Recording.mp4"]);
    populate(source.path(), &["Session A～Chat.txt"]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind root.
    if fs::write(locked.join("writable"), b"").is_ok() {
        eprintln!("Skipping: running with privileges that ignore directory permissions");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut set = RecordingSet::new("Session A", None);
    set.set_path(Role::Video, Some(locked.join("Session A～Recording.mp4")));
    set.set_path(Role::Chat, Some(source.path().join("Session A～Chat.txt")));

    let result = move_set(set, destination.path(), &FakeDriveConverter).await;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let outcome = result.unwrap();

    assert!(!outcome.is_success());
    let video_move = &outcome.relocation.moves[0];
    assert_eq!(video_move.role, Role::Video);
    assert!(matches!(video_move.status, MoveStatus::Failed { .. }));

    let target_dir = destination.path().join("unknown_date");
    assert!(locked.join("Session A～Recording.mp4").exists());
    assert!(!target_dir.join("Session A～Recording.mp4").exists());
    assert!(target_dir.join("Session A～Chat.txt").exists());
    assert!(!source.path().join("Session A～Chat.txt").exists());
}

#[tokio::test]
async fn test_conversion_failure_moves_files_but_keeps_gdoc_and_fails() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    populate(
        source.path(),
        &["Retro～Recording.mp4", "Retro～Gemini によるメモ.gdoc"],
    );

    let set = scan(source.path()).unwrap().sets.remove(0);
    let converter = UnconfiguredConverter::new("Google Drive credentials not found");
    let outcome = move_set(set, destination.path(), &converter).await.unwrap();

    assert!(!outcome.is_success());
    assert!(outcome.relocation.moves.iter().all(|m| m.is_success()));
    assert_eq!(outcome.relocation.cleanup, CleanupOutcome::NotRequired);
    assert!(outcome
        .failure_reasons()
        .iter()
        .any(|r| r.contains("credentials not found")));
    assert!(destination
        .path()
        .join("unknown_date/Retro～Gemini によるメモ.gdoc")
        .exists());
}

#[test]
fn test_rescan_is_stable() {
    let source = TempDir::new().unwrap();
    populate(
        source.path(),
        &[
            "B 2024 05 01 10:30～Recording.mp4",
            "A 2024 05 01 10:30～Recording.mp4",
            "Undated～Recording.mp4",
            "C 2023 12 31 23:59～Recording.mp4",
        ],
    );

    let first = scan(source.path()).unwrap();
    let second = scan(source.path()).unwrap();

    assert_eq!(first, second);
    let order: Vec<&str> = first.sets.iter().map(|s| s.identity.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "A 2024 05 01 10:30",
            "B 2024 05 01 10:30",
            "C 2023 12 31 23:59",
            "Undated"
        ]
    );
}
