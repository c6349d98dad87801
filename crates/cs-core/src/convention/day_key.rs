use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical `"Day NN"` label for a day folder.
///
/// Built from arbitrary folder names by keeping every digit, dropping leading
/// zeros and left-padding to width 2. Names without digits become `Day 00`.
/// Keys order by day number, so `Day 100` sorts after `Day 99`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    /// Decimal digits without leading zeros; empty for day zero.
    digits: String,
}

impl DayKey {
    pub fn normalize(folder_name: &str) -> Self {
        let digits: String = folder_name.chars().filter(char::is_ascii_digit).collect();
        Self {
            digits: digits.trim_start_matches('0').to_string(),
        }
    }

    pub fn from_number(day: u32) -> Self {
        Self::normalize(&day.to_string())
    }

    /// The zero-padded day part, e.g. `"01"` or `"123"`.
    pub fn padded(&self) -> String {
        format!("{:0>2}", self.digits)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {}", self.padded())
    }
}

impl Ord for DayKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for DayKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DayKey::normalize(&raw))
    }
}
