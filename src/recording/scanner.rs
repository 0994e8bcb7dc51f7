use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::identity::{IdentityExtractor, ParsedTimestamp};
use super::{classify, Diagnostic, RecordingSet, Role};
use crate::error::{MoverError, MoverResult};

/// Ordered recording sets found in one pass over the source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub sets: Vec<RecordingSet>,
    pub diagnostics: Vec<Diagnostic>,
}

/// List the direct children of `source_root` and assemble them into sets.
pub fn scan(source_root: &Path) -> MoverResult<ScanReport> {
    if !source_root.is_dir() {
        return Err(MoverError::SourceNotFound(source_root.to_path_buf()));
    }

    let read_dir = fs::read_dir(source_root).map_err(|source| MoverError::SourceUnreadable {
        path: source_root.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    entries.push(path);
                } else {
                    debug!("Skipping non-file entry: {:?}", path);
                }
            }
            Err(e) => warn!("Failed to read entry in {:?}: {}", source_root, e),
        }
    }
    debug!("Scanned {} files in {:?}", entries.len(), source_root);

    let extractor = IdentityExtractor::new()?;
    let report = assemble(entries, &extractor);

    info!(
        "Found {} recording set(s) in {:?}",
        report.sets.len(),
        source_root
    );
    Ok(report)
}

/// Group raw paths into recording sets. Pure over the file names.
pub fn assemble(mut entries: Vec<PathBuf>, extractor: &IdentityExtractor) -> ScanReport {
    entries.sort();
    entries.dedup();

    let named: Vec<(PathBuf, String)> = entries
        .into_iter()
        .filter_map(|path| match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => {
                let name = name.to_string();
                Some((path, name))
            }
            None => {
                debug!("Skipping non UTF-8 file name: {:?}", path);
                None
            }
        })
        .collect();

    let identities: BTreeSet<String> = named
        .iter()
        .filter_map(|(_, name)| extractor.identity(name))
        .collect();

    let mut groups: BTreeMap<&str, BTreeMap<Role, Vec<PathBuf>>> = BTreeMap::new();
    for (path, name) in &named {
        // The most specific meeting name wins, so "Session A" never claims
        // "Session AB～Recording.mp4".
        let Some(identity) = identities
            .iter()
            .filter(|identity| name.contains(identity.as_str()))
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
        else {
            continue;
        };

        match classify(path) {
            Some(role) => groups
                .entry(identity.as_str())
                .or_default()
                .entry(role)
                .or_default()
                .push(path.clone()),
            None => debug!("Unmatched file in '{}': {:?}", identity, path),
        }
    }

    let mut report = ScanReport::default();
    for (identity, mut roles) in groups {
        if !roles.contains_key(&Role::Video) {
            debug!("Discarding '{}': no video", identity);
            continue;
        }

        let timestamp = match extractor.parse_timestamp(identity) {
            ParsedTimestamp::Valid(ts) => Some(ts),
            ParsedTimestamp::Invalid(text) => {
                report.diagnostics.push(Diagnostic::InvalidTimestamp {
                    identity: identity.to_string(),
                    text,
                });
                None
            }
            ParsedTimestamp::Missing => None,
        };

        let mut set = RecordingSet::new(identity, timestamp);
        for role in Role::ALL {
            let Some(mut candidates) = roles.remove(&role) else {
                continue;
            };
            candidates.sort();
            let chosen = candidates.remove(0);
            if !candidates.is_empty() {
                warn!(
                    "Multiple {} files for '{}', using {:?}",
                    role.as_str(),
                    identity,
                    chosen
                );
                report.diagnostics.push(Diagnostic::AmbiguousRole {
                    identity: identity.to_string(),
                    role,
                    chosen: chosen.clone(),
                    ignored: candidates,
                });
            }
            set.set_path(role, Some(chosen));
        }
        report.sets.push(set);
    }

    report.sets.sort_by(compare_for_listing);
    report
}

/// Newest first, undated sets last, then by meeting name.
pub fn compare_for_listing(a: &RecordingSet, b: &RecordingSet) -> Ordering {
    let by_time = match (&a.timestamp, &b.timestamp) {
        (Some(ta), Some(tb)) => tb.cmp(ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time.then_with(|| a.identity.cmp(&b.identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn assemble_names(names: &[&str]) -> ScanReport {
        let extractor = IdentityExtractor::new().unwrap();
        let entries = names.iter().map(|n| PathBuf::from("/src").join(n)).collect();
        assemble(entries, &extractor)
    }

    fn identities(report: &ScanReport) -> Vec<&str> {
        report.sets.iter().map(|s| s.identity.as_str()).collect()
    }

    #[test]
    fn test_groups_all_three_roles() {
        let report = assemble_names(&[
            "Sync 2024 05 01 10:30 JST～Recording.mp4",
            "Sync 2024 05 01 10:30 JST～Gemini によるメモ.gdoc",
            "Sync 2024 05 01 10:30 JST～Chat.txt",
            "unrelated.pdf",
        ]);

        assert_eq!(report.sets.len(), 1);
        let set = &report.sets[0];
        assert_eq!(set.identity, "Sync 2024 05 01 10:30 JST");
        assert!(set.video.is_some());
        assert!(set.transcript.as_ref().unwrap().ends_with("Sync 2024 05 01 10:30 JST～Gemini によるメモ.gdoc"));
        assert!(set.chat.is_some());
        assert!(set.timestamp.is_some());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_set_without_video_is_dropped() {
        let report = assemble_names(&[
            "Retro～Chat.txt",
            "Retro～Gemini によるメモ.gdoc",
        ]);
        assert!(report.sets.is_empty());
    }

    #[test]
    fn test_longest_identity_claims_file() {
        let report = assemble_names(&[
            "Session A～Recording.mp4",
            "Session AB～Recording.mp4",
            "Session AB～Chat.txt",
        ]);

        assert_eq!(identities(&report), vec!["Session A", "Session AB"]);
        assert!(report.sets[0].chat.is_none());
        assert!(report.sets[1].chat.is_some());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_ordering_newest_first_then_identity_then_undated() {
        let report = assemble_names(&[
            "Zeta～Recording.mp4",
            "Alpha～Recording.mp4",
            "B 2024 05 01 10:30～Recording.mp4",
            "A 2024 05 01 10:30～Recording.mp4",
            "C 2024 06 01 09:00～Recording.mp4",
        ]);

        assert_eq!(
            identities(&report),
            vec![
                "C 2024 06 01 09:00",
                "A 2024 05 01 10:30",
                "B 2024 05 01 10:30",
                "Alpha",
                "Zeta",
            ]
        );
    }

    #[test]
    fn test_same_role_conflict_picks_smallest_path() {
        let report = assemble_names(&[
            "Demo～Recording.mp4",
            "Demo～Recording (1).mp4",
        ]);

        assert_eq!(report.sets.len(), 1);
        assert!(report.sets[0]
            .video
            .as_ref()
            .unwrap()
            .ends_with("Demo～Recording (1).mp4"));
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::AmbiguousRole { role: Role::Video, ignored, .. }] if ignored.len() == 1
        ));
    }

    #[test]
    fn test_invalid_date_is_diagnostic_not_error() {
        let report = assemble_names(&["Sync 2024 13 01 10:30～Recording.mp4"]);

        assert_eq!(report.sets.len(), 1);
        assert!(report.sets[0].timestamp.is_none());
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::InvalidTimestamp {
                identity: "Sync 2024 13 01 10:30".to_string(),
                text: "2024 13 01 10:30".to_string(),
            }]
        );
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = TempDir::new().unwrap();
        for name in [
            "Session A～Recording.mp4",
            "Session A～Chat.txt",
            "Other 2024 01 02 03:04～Recording",
            "Other 2024 01 02 03:04～Gemini によるメモ.gdoc",
        ] {
            File::create(dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("Nested～Recording")).unwrap();

        let first = scan(dir.path()).unwrap();
        let second = scan(dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(identities(&first), vec!["Other 2024 01 02 03:04", "Session A"]);
    }

    #[test]
    fn test_scan_missing_source_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        assert!(matches!(
            scan(&missing),
            Err(MoverError::SourceNotFound(path)) if path == missing
        ));
    }
}
