use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::MoverResult;

/// Glyph Google Meet puts between the meeting name and the artifact kind.
pub const CONNECTOR: char = '～';

/// Result of parsing the date embedded in a meeting name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTimestamp {
    Valid(NaiveDateTime),
    /// Matched the date pattern but is not a real calendar date.
    Invalid(String),
    Missing,
}

/// Pulls the meeting name ("identity") and its date out of raw filenames.
pub struct IdentityExtractor {
    identity_regex: Regex,
    timestamp_regex: Regex,
}

impl IdentityExtractor {
    pub fn new() -> MoverResult<Self> {
        // "<meeting name>～Recording..." or "<meeting name>～Chat..."
        let identity_regex = Regex::new(&format!(r"^(.+?){}(?:Recording|Chat)", CONNECTOR))?;
        // Matches "2024 05 01 10:30" and "2024 05 01 10/30"; Drive renders the
        // hour separator as a slash on some locales. Digits may be full-width.
        let timestamp_regex = Regex::new(
            r"([0-9０-９]{4})\s+([0-9０-９]{2})\s+([0-9０-９]{2})\s+([0-9０-９]{2})[:/]([0-9０-９]{2})",
        )?;

        Ok(Self {
            identity_regex,
            timestamp_regex,
        })
    }

    /// Shared prefix of a filename, or `None` for names without a recording or chat marker.
    pub fn identity(&self, filename: &str) -> Option<String> {
        let captures = self.identity_regex.captures(filename)?;
        let identity = captures.get(1)?.as_str().trim();

        if identity.is_empty() {
            debug!("Ignoring {:?}: empty meeting name", filename);
            return None;
        }
        Some(identity.to_string())
    }

    pub fn parse_timestamp(&self, identity: &str) -> ParsedTimestamp {
        let Some(captures) = self.timestamp_regex.captures(identity) else {
            return ParsedTimestamp::Missing;
        };

        let field = |i: usize| captures.get(i).and_then(|m| parse_digits(m.as_str()));
        let matched = captures
            .get(0)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let parsed = match (field(1), field(2), field(3), field(4), field(5)) {
            (Some(year), Some(month), Some(day), Some(hour), Some(minute)) => {
                NaiveDate::from_ymd_opt(year as i32, month, day)
                    .and_then(|date| date.and_hms_opt(hour, minute, 0))
            }
            _ => None,
        };

        match parsed {
            Some(ts) => ParsedTimestamp::Valid(ts),
            None => {
                warn!("Failed to parse date '{}' in {:?}", matched, identity);
                ParsedTimestamp::Invalid(matched)
            }
        }
    }

    pub fn timestamp(&self, identity: &str) -> Option<NaiveDateTime> {
        match self.parse_timestamp(identity) {
            ParsedTimestamp::Valid(ts) => Some(ts),
            _ => None,
        }
    }
}

/// Decimal value of a run of ASCII or full-width digits.
fn parse_digits(text: &str) -> Option<u32> {
    text.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '０'..='９' => c as u32 - '０' as u32,
            _ => c.to_digit(10)?,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> IdentityExtractor {
        IdentityExtractor::new().unwrap()
    }

    #[test]
    fn test_identity_before_recording_marker() {
        let ex = extractor();
        assert_eq!(
            ex.identity("Session A～Recording.mp4"),
            Some("Session A".to_string())
        );
    }

    #[test]
    fn test_identity_before_chat_marker_is_trimmed() {
        let ex = extractor();
        assert_eq!(
            ex.identity("  Weekly sync - 2024 05 01 10:30 JST ～Chat.txt"),
            Some("Weekly sync - 2024 05 01 10:30 JST".to_string())
        );
    }

    #[test]
    fn test_notes_file_has_no_identity() {
        let ex = extractor();
        assert_eq!(ex.identity("Notes～Gemini によるメモ.gdoc"), None);
        assert_eq!(ex.identity("Session A Recording.mp4"), None);
        assert_eq!(ex.identity("～Recording.mp4"), None);
    }

    #[test]
    fn test_timestamp_separator_insensitive() {
        let ex = extractor();
        let colon = ex.timestamp("Sync 2024 05 01 10:30");
        let slash = ex.timestamp("Sync 2024 05 01 10/30");

        assert!(colon.is_some());
        assert_eq!(colon, slash);
        assert_eq!(
            colon.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2024-05-01 10:30"
        );
    }

    #[test]
    fn test_out_of_range_timestamp_is_invalid() {
        let ex = extractor();
        assert_eq!(
            ex.parse_timestamp("Sync 2024 13 01 10:30"),
            ParsedTimestamp::Invalid("2024 13 01 10:30".to_string())
        );
        assert!(matches!(
            ex.parse_timestamp("Sync 2024 02 30 10:30"),
            ParsedTimestamp::Invalid(_)
        ));
        assert!(ex.timestamp("Sync 2024 05 01 25:00").is_none());
    }

    #[test]
    fn test_full_width_timestamp_is_valid() {
        let ex = extractor();
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        assert_eq!(
            ex.parse_timestamp("定例 ２０２４ ０５ ０１ １０:３０"),
            ParsedTimestamp::Valid(expected)
        );
        assert_eq!(ex.timestamp("定例 2024 ０５ 01 １０/30"), Some(expected));
    }

    #[test]
    fn test_other_script_digits_are_not_a_date() {
        let ex = extractor();
        // Arabic-Indic digits
        assert_eq!(
            ex.parse_timestamp("Sync ٢٠٢٤ ٠٥ ٠١ ١٠:٣٠"),
            ParsedTimestamp::Missing
        );
    }

    #[test]
    fn test_missing_timestamp() {
        let ex = extractor();
        assert_eq!(ex.parse_timestamp("Session A"), ParsedTimestamp::Missing);
        assert_eq!(ex.parse_timestamp("Sync 2024-05-01 10:30"), ParsedTimestamp::Missing);
    }
}
