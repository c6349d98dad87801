//! Directory listing entries and the explicit result of a listing attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One item of a Contents API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub size: u64,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    /// Browser URL, empty when the API omitted it.
    pub fn web_url(&self) -> String {
        self.html_url.clone().unwrap_or_default()
    }

    /// Raw download URL, falling back to the browser URL.
    pub fn raw_url(&self) -> String {
        self.download_url
            .clone()
            .or_else(|| self.html_url.clone())
            .unwrap_or_default()
    }
}

/// Why a listing produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipReason {
    pub location: String,
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() {
            "<root>"
        } else {
            &self.location
        };
        match self.status {
            Some(status) => write!(f, "{location}: HTTP {status}: {}", self.message),
            None => write!(f, "{location}: {}", self.message),
        }
    }
}

/// Result of a walker step.
///
/// `Listed` carries a legitimate (possibly empty) result, e.g. a day without
/// home work. `Skipped` means the fetch failed and the data is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome<T> {
    Listed(T),
    Skipped(SkipReason),
}

impl<T> WalkOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, WalkOutcome::Skipped(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WalkOutcome<U> {
        match self {
            WalkOutcome::Listed(value) => WalkOutcome::Listed(f(value)),
            WalkOutcome::Skipped(reason) => WalkOutcome::Skipped(reason),
        }
    }

    pub fn listed(self) -> Option<T> {
        match self {
            WalkOutcome::Listed(value) => Some(value),
            WalkOutcome::Skipped(_) => None,
        }
    }
}

impl<T: Default> WalkOutcome<T> {
    /// Collapses a skip into an empty value.
    pub fn unwrap_or_empty(self) -> T {
        self.listed().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_contents_api_items() {
        let json = r#"[
            {"name": "Day 01", "path": "Day 01", "type": "dir", "sha": "a1",
             "url": "https://api.github.com/repos/o/r/contents/Day%2001",
             "html_url": "https://github.com/o/r/tree/main/Day%2001",
             "download_url": null, "size": 0},
            {"name": "cw1.SLDPRT", "path": "Day 01/CW/cw1.SLDPRT", "type": "file", "sha": "b2",
             "url": "u", "html_url": "h", "download_url": "d", "size": 42},
            {"name": "weird", "path": "weird", "type": "commit", "sha": "c3"}
        ]"#;

        let entries: Vec<ContentEntry> = serde_json::from_str(json).unwrap();
        assert!(entries[0].is_dir());
        assert_eq!(entries[0].download_url, None);
        assert!(entries[1].is_file());
        assert_eq!(entries[1].raw_url(), "d");
        assert_eq!(entries[1].size, 42);
        assert_eq!(entries[2].entry_type, EntryType::Other);
        assert_eq!(entries[2].web_url(), "");
    }

    #[test]
    fn skipped_outcome_collapses_to_empty() {
        let outcome: WalkOutcome<Vec<u8>> = WalkOutcome::Skipped(SkipReason {
            location: "Day 01".to_string(),
            status: Some(403),
            message: "rate limited".to_string(),
        });
        assert!(outcome.is_skipped());
        assert!(outcome.unwrap_or_empty().is_empty());
    }

    #[test]
    fn skip_reason_names_the_root() {
        let reason = SkipReason {
            location: String::new(),
            status: None,
            message: "connection reset".to_string(),
        };
        assert_eq!(reason.to_string(), "<root>: connection reset");
    }
}
