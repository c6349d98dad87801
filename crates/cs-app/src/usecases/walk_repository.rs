//! Repository tree walker.
//!
//! One root listing drives two nestings at once: day folders holding
//! `CW`/`HW` type folders (`Day 01/CW/<project>`) and type folders holding
//! day folders (`CW/Day 01/<project>`, as written by the upload client).
//! Projects found under the same day and type by both are concatenated and
//! numbered in that order.
//!
//! Every listing step returns a [`WalkOutcome`]: a failed fetch is
//! `Skipped` with its reason, never an empty list that would look like
//! "no projects". Only a skipped root fails the walk as a whole; deeper
//! skips are collected in [`WalkReport::skipped`], and the day/type pairs
//! they touch in [`WalkReport::incomplete`], and the walk goes on.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn, Instrument};

use cs_core::convention::is_day_folder_name;
use cs_core::ports::RepositoryReaderPort;
use cs_core::{ContentEntry, DayKey, ProjectMap, SkipReason, WalkOutcome, WorkType};

use super::reconcile_project::reconcile_project;

/// A folder that becomes one project record.
///
/// A type folder without subdirectories is itself the project; its
/// listing is already known and kept in `listing`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFolder {
    pub folder: ContentEntry,
    pub listing: Option<Vec<ContentEntry>>,
}

/// Result of a complete walk.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    pub projects: ProjectMap,
    /// Folders whose listing failed below the root.
    pub skipped: Vec<SkipReason>,
    /// Day/type pairs in `projects` that may be missing records because a
    /// listing under them failed.
    pub incomplete: Vec<(DayKey, WorkType)>,
}

impl WalkReport {
    fn mark_incomplete(&mut self, day: &DayKey, kind: WorkType) {
        let pair = (day.clone(), kind);
        if !self.incomplete.contains(&pair) {
            self.incomplete.push(pair);
        }
    }

    /// Put back the `previous` records of every incomplete day/type pair,
    /// so a failed listing never erases projects that were already known.
    pub fn restore_incomplete(&mut self, previous: &ProjectMap) {
        for (day, kind) in &self.incomplete {
            self.projects.restore_projects(previous, day, *kind);
        }
    }
}

pub struct RepositoryWalker {
    reader: Arc<dyn RepositoryReaderPort>,
    courtesy_delay: Duration,
}

impl RepositoryWalker {
    pub fn new(reader: Arc<dyn RepositoryReaderPort>, courtesy_delay: Duration) -> Self {
        Self {
            reader,
            courtesy_delay,
        }
    }

    /// Project folders inside a type folder (or, for the type-first layout,
    /// inside a day folder).
    pub async fn list_project_folders(
        &self,
        container: &ContentEntry,
    ) -> WalkOutcome<Vec<ProjectFolder>> {
        self.pause().await;
        self.fetch(&container.path)
            .await
            .map(|entries| split_projects(container, entries))
    }

    /// Files of one project, reusing the listing a flat folder already has.
    pub async fn list_project_files(&self, project: &ProjectFolder) -> WalkOutcome<Vec<ContentEntry>> {
        if let Some(listing) = &project.listing {
            return WalkOutcome::Listed(listing.clone());
        }
        self.fetch(&project.folder.path).await
    }

    /// Walk the whole tree.
    ///
    /// Fails only when the root listing is skipped; then nothing is known
    /// and the caller must not treat the result as "no projects".
    pub async fn walk(&self) -> Result<WalkReport, SkipReason> {
        let span = info_span!("usecase.walk_repository.execute");

        async {
            let root = match self.fetch("").await {
                WalkOutcome::Listed(entries) => entries,
                WalkOutcome::Skipped(reason) => return Err(reason),
            };

            let mut report = WalkReport::default();
            for day in select_day_folders(root.clone()) {
                self.walk_day_folder(&day, &mut report).await;
            }

            let mut failed_kinds = Vec::new();
            for kind in WorkType::ALL {
                if let Some(type_folder) = find_type_folder(&root, kind) {
                    if !self.walk_type_folder(&type_folder, kind, &mut report).await {
                        failed_kinds.push(kind);
                    }
                }
            }
            // The days under a type folder that could not be listed are
            // unknown; every day of the report may be short of them.
            let days: Vec<DayKey> = report.projects.day_keys().cloned().collect();
            for kind in failed_kinds {
                for day in &days {
                    report.mark_incomplete(day, kind);
                }
            }

            let counts = report.projects.counts();
            info!(
                days = counts.days,
                class_work = counts.class_work,
                home_work = counts.home_work,
                skipped = report.skipped.len(),
                incomplete = report.incomplete.len(),
                "Repository walk finished"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// `Day NN/{CW,HW}/<project>`. A day that cannot be listed adds no
    /// bucket of its own and marks both of its types incomplete.
    async fn walk_day_folder(&self, day: &ContentEntry, report: &mut WalkReport) {
        let key = DayKey::normalize(&day.name);

        self.pause().await;
        let day_entries = match self.fetch(&day.path).await {
            WalkOutcome::Listed(entries) => entries,
            WalkOutcome::Skipped(reason) => {
                report.skipped.push(reason);
                for kind in WorkType::ALL {
                    report.mark_incomplete(&key, kind);
                }
                return;
            }
        };

        report.projects.bucket_mut(key.clone());
        for kind in WorkType::ALL {
            if let Some(type_folder) = find_type_folder(&day_entries, kind) {
                self.collect_projects(&type_folder, kind, &key, report).await;
            }
        }
    }

    /// `{CW,HW}/Day NN/<project>`. Returns `false` when the type folder
    /// itself could not be listed.
    async fn walk_type_folder(
        &self,
        type_folder: &ContentEntry,
        kind: WorkType,
        report: &mut WalkReport,
    ) -> bool {
        self.pause().await;
        let days = match self.fetch(&type_folder.path).await.map(select_day_folders) {
            WalkOutcome::Listed(days) => days,
            WalkOutcome::Skipped(reason) => {
                report.skipped.push(reason);
                return false;
            }
        };

        for day in days {
            let key = DayKey::normalize(&day.name);
            report.projects.bucket_mut(key.clone());
            self.collect_projects(&day, kind, &key, report).await;
        }
        true
    }

    /// Append records for every project inside `container` to the day's
    /// `kind` list, numbered after the records already there. Projects
    /// whose listing fails get no record and no number, and mark the pair
    /// incomplete.
    async fn collect_projects(
        &self,
        container: &ContentEntry,
        kind: WorkType,
        day: &DayKey,
        report: &mut WalkReport,
    ) {
        let folders = match self.list_project_folders(container).await {
            WalkOutcome::Listed(folders) => folders,
            WalkOutcome::Skipped(reason) => {
                report.skipped.push(reason);
                report.mark_incomplete(day, kind);
                return;
            }
        };

        let mut records = report.projects.bucket_mut(day.clone()).projects(kind).to_vec();
        let before = records.len();
        for project in &folders {
            match self.list_project_files(project).await {
                WalkOutcome::Listed(files) => {
                    let number = records.len() as u32 + 1;
                    records.push(reconcile_project(&project.folder, &files, kind, day, number));
                }
                WalkOutcome::Skipped(reason) => {
                    report.skipped.push(reason);
                    report.mark_incomplete(day, kind);
                }
            }
        }

        debug!(
            path = %container.path,
            kind = %kind,
            day = %day,
            projects = records.len() - before,
            "Collected projects"
        );
        report.projects.bucket_mut(day.clone()).set_projects(kind, records);
    }
    async fn fetch(&self, path: &str) -> WalkOutcome<Vec<ContentEntry>> {
        match self.reader.list_contents(path).await {
            Ok(entries) => WalkOutcome::Listed(entries),
            Err(err) => {
                warn!(path = %path, error = %err, "Listing failed, skipping folder");
                WalkOutcome::Skipped(SkipReason {
                    location: path.to_string(),
                    status: err.status(),
                    message: err.to_string(),
                })
            }
        }
    }

    async fn pause(&self) {
        if !self.courtesy_delay.is_zero() {
            tokio::time::sleep(self.courtesy_delay).await;
        }
    }
}

/// Directories whose name looks like a day folder, ordered by day.
pub fn select_day_folders(entries: Vec<ContentEntry>) -> Vec<ContentEntry> {
    let mut days: Vec<ContentEntry> = entries
        .into_iter()
        .filter(|entry| entry.is_dir() && is_day_folder_name(&entry.name))
        .collect();
    days.sort_by_cached_key(|entry| DayKey::normalize(&entry.name));
    days
}

pub fn find_type_folder(entries: &[ContentEntry], kind: WorkType) -> Option<ContentEntry> {
    entries
        .iter()
        .find(|entry| entry.is_dir() && WorkType::from_folder_name(&entry.name) == Some(kind))
        .cloned()
}

/// Split a container listing into projects.
///
/// - subdirectories present: one project per subdirectory, loose files dropped
/// - only files: the container itself is a single project
/// - empty: no projects
pub fn split_projects(container: &ContentEntry, entries: Vec<ContentEntry>) -> Vec<ProjectFolder> {
    let subdirs: Vec<ProjectFolder> = entries
        .iter()
        .filter(|entry| entry.is_dir())
        .map(|entry| ProjectFolder {
            folder: entry.clone(),
            listing: None,
        })
        .collect();

    if !subdirs.is_empty() {
        return subdirs;
    }
    if entries.is_empty() {
        return Vec::new();
    }
    vec![ProjectFolder {
        folder: container.clone(),
        listing: Some(entries),
    }]
}
