//! Folder naming convention shared by the tree walker and the upload client.
//!
//! The walker decodes day and type folder names, the uploader encodes project
//! folder paths. Both sides go through this module so the grammar cannot
//! drift:
//!
//! ```text
//! day folder      Day\s*\d+          (case-insensitive)
//! type folder     cw | hw            (case-insensitive, exact)
//! upload folder   {TYPE}/Day {DD}/{type} {NN} day {day}
//! ```
//!
//! [`encode_project_path`] and [`decode_project_path`] are inverses on
//! [`ProjectSlot`].

mod day_key;

pub use day_key::DayKey;

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static DAY_FOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)day\s*\d+").expect("day folder pattern is valid"));

static CANONICAL_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^day\s*(\d+)$").expect("canonical day pattern is valid"));

static PROJECT_FOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(cw|hw)\s*(\d+)\s+day\s*(\d+)$").expect("project folder pattern is valid")
});

/// Class-work or home-work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkType {
    #[serde(rename = "CW")]
    ClassWork,
    #[serde(rename = "HW")]
    HomeWork,
}

impl WorkType {
    pub const ALL: [WorkType; 2] = [WorkType::ClassWork, WorkType::HomeWork];

    /// Upper-case code used in record names and upload roots (`CW`, `HW`).
    pub fn code(self) -> &'static str {
        match self {
            WorkType::ClassWork => "CW",
            WorkType::HomeWork => "HW",
        }
    }

    /// Lower-case form used inside project folder names (`cw`, `hw`).
    pub fn folder_name(self) -> &'static str {
        match self {
            WorkType::ClassWork => "cw",
            WorkType::HomeWork => "hw",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkType::ClassWork => "Class Work",
            WorkType::HomeWork => "Home Work",
        }
    }

    /// Matches a type folder name exactly, ignoring ASCII case.
    pub fn from_folder_name(name: &str) -> Option<Self> {
        WorkType::ALL
            .into_iter()
            .find(|kind| name.eq_ignore_ascii_case(kind.folder_name()))
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WorkType {
    type Err = ConventionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkType::from_folder_name(s.trim()).ok_or_else(|| ConventionError::UnknownType(s.to_string()))
    }
}

/// The `(day, type, number)` triple an uploaded project is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectSlot {
    pub day: u32,
    pub kind: WorkType,
    pub number: u32,
}

impl ProjectSlot {
    pub fn new(day: u32, kind: WorkType, number: u32) -> Self {
        Self { day, kind, number }
    }

    pub fn day_key(&self) -> DayKey {
        DayKey::from_number(self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConventionError {
    #[error("unknown work type: {0}")]
    UnknownType(String),

    #[error("expected `TYPE/Day DD/type NN day D`, got `{0}`")]
    MalformedPath(String),

    #[error("path `{path}` disagrees with itself: {detail}")]
    Inconsistent { path: String, detail: String },
}

/// Whether a directory name looks like a day folder (`Day 1`, `day01`, `Day  7`).
pub fn is_day_folder_name(name: &str) -> bool {
    DAY_FOLDER_RE.is_match(name)
}

/// Whether a project folder name marks a spot test.
pub fn is_spot_test_folder(name: &str) -> bool {
    name.to_ascii_lowercase().contains("spot")
}

/// Builds the repository path an uploaded project is written to.
///
/// Day 6, class work, number 1 becomes `CW/Day 06/cw 01 day 6`.
pub fn encode_project_path(slot: &ProjectSlot) -> String {
    format!(
        "{}/Day {:02}/{} {:02} day {}",
        slot.kind.code(),
        slot.day,
        slot.kind.folder_name(),
        slot.number,
        slot.day
    )
}

/// Parses a path produced by [`encode_project_path`].
pub fn decode_project_path(path: &str) -> Result<ProjectSlot, ConventionError> {
    let malformed = || ConventionError::MalformedPath(path.to_string());

    let mut segments = path.trim_matches('/').split('/');
    let (Some(type_segment), Some(day_segment), Some(project_segment), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(malformed());
    };

    let kind = WorkType::from_folder_name(type_segment).ok_or_else(malformed)?;

    let day_caps = CANONICAL_DAY_RE.captures(day_segment).ok_or_else(malformed)?;
    let folder_day = parse_number(&day_caps[1]).ok_or_else(malformed)?;

    let caps = PROJECT_FOLDER_RE.captures(project_segment).ok_or_else(malformed)?;
    let project_kind = WorkType::from_folder_name(&caps[1]).ok_or_else(malformed)?;
    let number = parse_number(&caps[2]).ok_or_else(malformed)?;
    let suffix_day = parse_number(&caps[3]).ok_or_else(malformed)?;

    if project_kind != kind {
        return Err(ConventionError::Inconsistent {
            path: path.to_string(),
            detail: format!("root is {kind} but project folder is {project_kind}"),
        });
    }
    if suffix_day != folder_day {
        return Err(ConventionError::Inconsistent {
            path: path.to_string(),
            detail: format!("day folder is {folder_day} but project folder says {suffix_day}"),
        });
    }

    Ok(ProjectSlot {
        day: folder_day,
        kind,
        number,
    })
}

fn parse_number(digits: &str) -> Option<u32> {
    digits.parse().ok()
}
