//! Recording sets and the scan that assembles them.
//!
//! A Google Meet session leaves up to three loosely-named files behind in the
//! Drive folder: the video, the Gemini notes document, and the chat log. This
//! module groups those files by the meeting name they share and orders the
//! resulting sets for selection.

mod classifier;
mod identity;
mod scanner;

pub use classifier::{classify, Role, NATIVE_DOCUMENT_EXTENSION, VIDEO_EXTENSION};
pub use identity::{IdentityExtractor, ParsedTimestamp, CONNECTOR};
pub use scanner::{assemble, compare_for_listing, scan, ScanReport};

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Shown in listings when the meeting name carries no usable date.
pub const DATE_PLACEHOLDER: &str = "????-??-?? ??:??";

/// Artifacts of one meeting, keyed by the shared filename prefix.
///
/// Only built when a video is present. Moving the set consumes it, since the
/// paths it holds are stale afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingSet {
    pub identity: String,
    pub video: Option<PathBuf>,
    pub transcript: Option<PathBuf>,
    pub chat: Option<PathBuf>,
    pub timestamp: Option<NaiveDateTime>,
}

impl RecordingSet {
    pub fn new(identity: impl Into<String>, timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            identity: identity.into(),
            video: None,
            transcript: None,
            chat: None,
            timestamp,
        }
    }

    /// A set is complete once it has a video; notes and chat are optional.
    pub fn is_complete(&self) -> bool {
        self.video.is_some()
    }

    pub fn path(&self, role: Role) -> Option<&Path> {
        match role {
            Role::Video => self.video.as_deref(),
            Role::Transcript => self.transcript.as_deref(),
            Role::Chat => self.chat.as_deref(),
        }
    }

    pub fn set_path(&mut self, role: Role, path: Option<PathBuf>) {
        match role {
            Role::Video => self.video = path,
            Role::Transcript => self.transcript = path,
            Role::Chat => self.chat = path,
        }
    }

    /// Present members in move order (video, transcript, chat).
    pub fn members(&self) -> impl Iterator<Item = (Role, &Path)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(move |role| self.path(role).map(|path| (role, path)))
    }

    /// Bracketed list of the roles present, e.g. `[video, chat]`.
    pub fn status(&self) -> String {
        let parts: Vec<&str> = self.members().map(|(role, _)| role.as_str()).collect();
        format!("[{}]", parts.join(", "))
    }

    /// `YYYY-MM-DD HH:MM`, or a placeholder when the date is unknown.
    pub fn display_date(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
    }
}

impl fmt::Display for RecordingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} {}",
            self.display_date(),
            self.identity,
            self.status()
        )
    }
}

/// Non-fatal findings recorded while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The name contains a date-like pattern that is not a real calendar date.
    InvalidTimestamp { identity: String, text: String },
    /// Several files in one group qualified for the same role.
    AmbiguousRole {
        identity: String,
        role: Role,
        chosen: PathBuf,
        ignored: Vec<PathBuf>,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidTimestamp { identity, text } => {
                write!(f, "Invalid date '{}' in '{}'; date treated as unknown", text, identity)
            }
            Diagnostic::AmbiguousRole {
                identity,
                role,
                chosen,
                ignored,
            } => {
                let ignored: Vec<String> =
                    ignored.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "Multiple {} files for '{}'; using {} and ignoring {}",
                    role.as_str(),
                    identity,
                    chosen.display(),
                    ignored.join(", ")
                )
            }
        }
    }
}
