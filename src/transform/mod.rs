//! Normalization applied to a recording set before it is moved.
//!
//! Each step takes the set by value and hands back the updated set together
//! with what happened. Steps never move files out of the source directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::converter::DocumentConverter;
use crate::recording::{RecordingSet, NATIVE_DOCUMENT_EXTENSION, VIDEO_EXTENSION};

/// Longest suffix treated as a real extension when renaming the video.
const MAX_EXTENSION_LEN: usize = 5;

/// Result of giving the video the canonical `.mp4` extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtensionOutcome {
    NoVideo,
    AlreadyCanonical,
    Renamed { from: PathBuf, to: PathBuf },
    /// The video keeps its original name.
    Failed { path: PathBuf, reason: String },
}

impl ExtensionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Result of exporting the notes document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    NotRequired,
    /// `from` is left in place until the move succeeds.
    Converted { from: PathBuf, to: PathBuf },
    /// The transcript still points at the original document.
    Failed { path: PathBuf, reason: String },
}

impl ConversionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub extension: ExtensionOutcome,
    pub conversion: ConversionOutcome,
}

impl TransformReport {
    /// Original document to delete once the set has been moved.
    pub fn pending_cleanup(&self) -> Option<&Path> {
        match &self.conversion {
            ConversionOutcome::Converted { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Only a failed conversion fails the set; a failed rename is tolerated.
    pub fn is_failure(&self) -> bool {
        self.conversion.is_failure()
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

pub fn needs_extension_fix(set: &RecordingSet) -> bool {
    set.video
        .as_deref()
        .map(|video| !has_extension(video, VIDEO_EXTENSION))
        .unwrap_or(false)
}

pub fn needs_conversion(set: &RecordingSet) -> bool {
    set.transcript
        .as_deref()
        .map(|transcript| has_extension(transcript, NATIVE_DOCUMENT_EXTENSION))
        .unwrap_or(false)
}

/// Path the video should have once it carries the `.mp4` extension.
///
/// A short alphanumeric extension is replaced. Anything else after the last
/// dot is part of the meeting name, so `.mp4` is appended instead.
pub fn canonical_video_path(path: &Path) -> PathBuf {
    let replaceable = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or(false);

    if replaceable {
        path.with_extension(VIDEO_EXTENSION)
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(VIDEO_EXTENSION);
        PathBuf::from(name)
    }
}

/// Step A: rename the video in place so it ends in `.mp4`.
pub fn normalize_video_extension(mut set: RecordingSet) -> (RecordingSet, ExtensionOutcome) {
    let Some(video) = set.video.clone() else {
        return (set, ExtensionOutcome::NoVideo);
    };

    if has_extension(&video, VIDEO_EXTENSION) {
        return (set, ExtensionOutcome::AlreadyCanonical);
    }

    let target = canonical_video_path(&video);
    if target.exists() {
        let reason = format!("{} already exists", target.display());
        warn!("Not adding .mp4 extension to {:?}: {}", video, reason);
        return (set, ExtensionOutcome::Failed { path: video, reason });
    }

    info!("Adding .mp4 extension: {:?} -> {:?}", video, target);
    match std::fs::rename(&video, &target) {
        Ok(()) => {
            set.video = Some(target.clone());
            (
                set,
                ExtensionOutcome::Renamed {
                    from: video,
                    to: target,
                },
            )
        }
        Err(e) => {
            error!("Failed to add .mp4 extension to {:?}: {}", video, e);
            (
                set,
                ExtensionOutcome::Failed {
                    path: video,
                    reason: e.to_string(),
                },
            )
        }
    }
}

/// Step B: export a `.gdoc` transcript through the converter.
pub async fn convert_transcript(
    mut set: RecordingSet,
    converter: &dyn DocumentConverter,
) -> (RecordingSet, ConversionOutcome) {
    let Some(transcript) = set.transcript.clone() else {
        return (set, ConversionOutcome::NotRequired);
    };
    if !has_extension(&transcript, NATIVE_DOCUMENT_EXTENSION) {
        return (set, ConversionOutcome::NotRequired);
    }

    info!(
        "Converting transcript with {}: {:?}",
        converter.name(),
        transcript
    );
    let reason = match converter.convert(&transcript).await {
        Ok(converted) if converted.exists() => {
            set.transcript = Some(converted.clone());
            return (
                set,
                ConversionOutcome::Converted {
                    from: transcript,
                    to: converted,
                },
            );
        }
        Ok(converted) => format!(
            "converter reported {} but the file does not exist",
            converted.display()
        ),
        Err(e) => format!("{:#}", e),
    };

    error!("Failed to convert transcript {:?}: {}", transcript, reason);
    (
        set,
        ConversionOutcome::Failed {
            path: transcript,
            reason,
        },
    )
}

/// Run both steps. Neither step's failure stops the other.
pub async fn transform(
    set: RecordingSet,
    converter: &dyn DocumentConverter,
) -> (RecordingSet, TransformReport) {
    let (set, extension) = normalize_video_extension(set);
    let (set, conversion) = convert_transcript(set, converter).await;

    (
        set,
        TransformReport {
            extension,
            conversion,
        },
    )
}
