//! Moves a transformed recording set into `<destination>/<YYYYMMDD>/`.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{MoverError, MoverResult};
use crate::recording::{RecordingSet, Role};
use crate::transform::TransformReport;

/// Date folder used when the meeting name carries no date.
pub const UNKNOWN_DATE_DIR: &str = "unknown_date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveStatus {
    Moved,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMove {
    pub role: Role,
    pub from: PathBuf,
    pub to: PathBuf,
    pub status: MoveStatus,
}

impl RoleMove {
    pub fn is_success(&self) -> bool {
        self.status == MoveStatus::Moved
    }
}

/// What happened to the pre-conversion document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CleanupOutcome {
    NotRequired,
    /// Kept because the move did not fully succeed.
    Kept { path: PathBuf },
    Removed { path: PathBuf },
    /// Logged only; never fails the move.
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    pub target_dir: PathBuf,
    pub moves: Vec<RoleMove>,
    pub cleanup: CleanupOutcome,
    pub success: bool,
}

impl RelocationReport {
    pub fn failed_moves(&self) -> impl Iterator<Item = &RoleMove> {
        self.moves.iter().filter(|m| !m.is_success())
    }
}

/// `YYYYMMDD` for dated sets, `unknown_date` otherwise.
pub fn date_dir_name(set: &RecordingSet) -> String {
    set.timestamp
        .map(|ts| ts.format("%Y%m%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE_DIR.to_string())
}

pub fn target_dir(set: &RecordingSet, destination_root: &Path) -> PathBuf {
    destination_root.join(date_dir_name(set))
}

/// Move every present member of `set`, then drop the conversion leftover.
///
/// Each role is attempted even if an earlier one failed. The set is consumed:
/// its paths no longer point anywhere once this returns.
pub fn relocate(
    set: RecordingSet,
    transform: &TransformReport,
    destination_root: &Path,
) -> MoverResult<RelocationReport> {
    let target_dir = target_dir(&set, destination_root);
    fs::create_dir_all(&target_dir).map_err(|source| MoverError::DestinationUncreatable {
        path: target_dir.clone(),
        source,
    })?;

    let mut moves = Vec::new();
    for (role, from) in set.members() {
        let Some(file_name) = from.file_name() else {
            moves.push(RoleMove {
                role,
                from: from.to_path_buf(),
                to: target_dir.clone(),
                status: MoveStatus::Failed {
                    reason: "path has no file name".to_string(),
                },
            });
            continue;
        };
        let to = target_dir.join(file_name);

        info!("Moving {}: {:?} -> {:?}", role.as_str(), from, to);
        let status = match move_file(from, &to) {
            Ok(()) => MoveStatus::Moved,
            Err(e) => {
                error!("Failed to move {} {:?}: {}", role.as_str(), from, e);
                MoveStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        moves.push(RoleMove {
            role,
            from: from.to_path_buf(),
            to,
            status,
        });
    }

    let success = moves.iter().all(RoleMove::is_success) && !transform.is_failure();

    let cleanup = match transform.pending_cleanup() {
        None => CleanupOutcome::NotRequired,
        Some(path) if !success => {
            debug!("Keeping {:?} because the move did not fully succeed", path);
            CleanupOutcome::Kept {
                path: path.to_path_buf(),
            }
        }
        Some(path) => {
            info!("Removing converted original {:?}", path);
            match fs::remove_file(path) {
                Ok(()) => CleanupOutcome::Removed {
                    path: path.to_path_buf(),
                },
                Err(e) => {
                    warn!("Failed to remove {:?}: {}", path, e);
                    CleanupOutcome::Failed {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }
                }
            }
        }
    };

    Ok(RelocationReport {
        target_dir,
        moves,
        cleanup,
        success,
    })
}

/// Rename, falling back to copy and delete when crossing filesystems.
/// An existing target is never overwritten.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if to.symlink_metadata().is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) if from.is_file() => {
            debug!("Rename failed ({}), copying {:?} instead", rename_err, from);
            copy_then_remove(from, to, |a, b| fs::copy(a, b))
        }
        Err(e) => Err(e),
    }
}

/// Fallback for moves across filesystems. Whatever happens, either `from` or `to`
/// is left on disk, never a partial `to` next to the original.
fn copy_then_remove<F>(from: &Path, to: &Path, copy: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<u64>,
{
    if let Err(e) = copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
