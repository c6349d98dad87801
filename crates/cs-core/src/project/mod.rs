//! Normalized project map mirrored from the repository.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::convention::{DayKey, WorkType};

/// What a downloadable SOLIDWORKS artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadKind {
    Assembly,
    Part,
    Drawing,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    #[serde(rename = "type")]
    pub kind: DownloadKind,
    pub url: String,
}

/// One tutorial artifact as shown on the showcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// `"<TYPE> <n> - Day <NN>"`
    pub name: String,
    pub detail_page_url: String,
    /// Listing order, not sorted.
    pub downloads: Vec<Download>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_preview_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model3d_url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_spot_test: bool,
}

impl ProjectRecord {
    pub fn display_name(kind: WorkType, number: u32, day: &DayKey) -> String {
        format!("{} {} - {}", kind.code(), number, day)
    }
}

/// Class-work and home-work projects of one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub class_work: Vec<ProjectRecord>,
    pub home_work: Vec<ProjectRecord>,
}

impl DayBucket {
    pub fn projects(&self, kind: WorkType) -> &[ProjectRecord] {
        match kind {
            WorkType::ClassWork => &self.class_work,
            WorkType::HomeWork => &self.home_work,
        }
    }

    /// Replaces (never appends to) the projects of one type.
    pub fn set_projects(&mut self, kind: WorkType, projects: Vec<ProjectRecord>) {
        match kind {
            WorkType::ClassWork => self.class_work = projects,
            WorkType::HomeWork => self.home_work = projects,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.class_work.is_empty() && self.home_work.is_empty()
    }
}

/// Totals shown by the presentation sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCounts {
    pub class_work: usize,
    pub home_work: usize,
    pub days: usize,
}

impl ProjectCounts {
    pub fn total(&self) -> usize {
        self.class_work + self.home_work
    }
}

/// `DayKey -> DayBucket`, iterated in ascending day order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectMap {
    days: BTreeMap<DayKey, DayBucket>,
}

impl ProjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: &DayKey) -> Option<&DayBucket> {
        self.days.get(day)
    }

    /// Bucket for `day`, created empty on first access.
    pub fn bucket_mut(&mut self, day: DayKey) -> &mut DayBucket {
        self.days.entry(day).or_default()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DayKey, DayBucket> {
        self.days.iter()
    }

    pub fn day_keys(&self) -> impl Iterator<Item = &DayKey> {
        self.days.keys()
    }

    /// Replace the `kind` projects of `day` with those in `previous`. Does
    /// nothing unless both maps hold the day.
    pub fn restore_projects(&mut self, previous: &ProjectMap, day: &DayKey, kind: WorkType) {
        if let (Some(bucket), Some(known)) = (self.days.get_mut(day), previous.get(day)) {
            bucket.set_projects(kind, known.projects(kind).to_vec());
        }
    }

    /// Shallow merge: days in `newer` replace same-named days here, days
    /// missing from `newer` are kept.
    pub fn merge(&mut self, newer: ProjectMap) {
        self.days.extend(newer.days);
    }

    pub fn counts(&self) -> ProjectCounts {
        self.days.values().fold(
            ProjectCounts {
                days: self.days.len(),
                ..ProjectCounts::default()
            },
            |mut acc, bucket| {
                acc.class_work += bucket.class_work.len();
                acc.home_work += bucket.home_work.len();
                acc
            },
        )
    }
}

impl<'a> IntoIterator for &'a ProjectMap {
    type Item = (&'a DayKey, &'a DayBucket);
    type IntoIter = btree_map::Iter<'a, DayKey, DayBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

impl FromIterator<(DayKey, DayBucket)> for ProjectMap {
    fn from_iter<I: IntoIterator<Item = (DayKey, DayBucket)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
