//! Full move of one recording set: normalize, convert, relocate, clean up.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::converter::DocumentConverter;
use crate::error::MoverResult;
use crate::recording::RecordingSet;
use crate::relocate::{self, RelocationReport};
use crate::transform::{self, TransformReport};

/// Everything that happened while moving a set, for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub identity: String,
    pub transform: TransformReport,
    pub relocation: RelocationReport,
}

impl MoveOutcome {
    pub fn is_success(&self) -> bool {
        self.relocation.success
    }

    /// Human readable reasons the move did not fully succeed.
    pub fn failure_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if let transform::ConversionOutcome::Failed { path, reason } = &self.transform.conversion {
            reasons.push(format!(
                "transcript conversion failed for {}: {}",
                path.display(),
                reason
            ));
        }
        for failed in self.relocation.failed_moves() {
            if let relocate::MoveStatus::Failed { reason } = &failed.status {
                reasons.push(format!(
                    "{} move failed for {}: {}",
                    failed.role.as_str(),
                    failed.from.display(),
                    reason
                ));
            }
        }
        reasons
    }
}

/// Transform `set` in place and move it under `destination_root`.
///
/// Step and per-file failures end up in the returned outcome; only a missing
/// or uncreatable destination is returned as an error.
pub async fn move_set(
    set: RecordingSet,
    destination_root: &Path,
    converter: &dyn DocumentConverter,
) -> MoverResult<MoveOutcome> {
    let identity = set.identity.clone();
    info!("Moving '{}' to {:?}", identity, destination_root);

    let (set, transform) = transform::transform(set, converter).await;
    let relocation = relocate::relocate(set, &transform, destination_root)?;

    let outcome = MoveOutcome {
        identity,
        transform,
        relocation,
    };

    if outcome.is_success() {
        info!("Moved '{}' to {:?}", outcome.identity, outcome.relocation.target_dir);
    } else {
        for reason in outcome.failure_reasons() {
            warn!("'{}': {}", outcome.identity, reason);
        }
    }

    Ok(outcome)
}
