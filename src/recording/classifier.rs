use serde::Serialize;
use std::path::Path;

/// Video container the recordings are normalized to.
pub const VIDEO_EXTENSION: &str = "mp4";
/// Drive pointer file for a Google Docs document.
pub const NATIVE_DOCUMENT_EXTENSION: &str = "gdoc";

const RECORDING_MARKER: &str = "Recording";
const CHAT_MARKER: &str = "Chat";
const NOTES_MARKERS: &[&str] = &["Gemini によるメモ", "Notes by Gemini"];

/// Part a file plays within a recording set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Video,
    Transcript,
    Chat,
}

impl Role {
    /// Move order.
    pub const ALL: [Role; 3] = [Role::Video, Role::Transcript, Role::Chat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Transcript => "transcript",
            Self::Chat => "chat",
        }
    }
}

/// Assign a role from the filename alone; first matching rule wins.
///
/// Returns `None` for files that belong to none of the roles.
pub fn classify(path: &Path) -> Option<Role> {
    let name = path.file_name()?.to_str()?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if extension == VIDEO_EXTENSION || name.contains(RECORDING_MARKER) {
        return Some(Role::Video);
    }

    if extension == NATIVE_DOCUMENT_EXTENSION
        || NOTES_MARKERS.iter().any(|marker| name.contains(marker))
    {
        return Some(Role::Transcript);
    }

    if (extension == "txt" && name.to_lowercase().contains("chat")) || name.contains(CHAT_MARKER) {
        return Some(Role::Chat);
    }

    None
}
