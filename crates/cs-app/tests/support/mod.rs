//! Stateful fakes shared by the cs-app integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cs_app::usecases::sync_projects::SharedSyncState;
use cs_app::{RepositoryWalker, SyncProjects};
use cs_core::ports::{
    ClockPort, GitHubApiError, PresentationSinkPort, RepositoryReaderPort, StateStoreError,
    StateStorePort,
};
use cs_core::repository::{CommitSummary, RepositoryMetadata};
use cs_core::{
    ContentEntry, EntryType, FreshnessSource, ProjectCounts, ProjectMap, SyncState,
};
use cs_infra::store::InMemoryProjectStore;

/// In-memory repository tree served through the reader port.
#[derive(Default)]
pub struct FakeRepository {
    listings: Mutex<HashMap<String, Vec<ContentEntry>>>,
    failing: Mutex<HashSet<String>>,
    pushed_at: Mutex<Option<String>>,
    metadata_delay: Mutex<Duration>,
    metadata_calls: AtomicUsize,
    listing_calls: AtomicUsize,
}

impl FakeRepository {
    pub fn new() -> Arc<Self> {
        let repo = Self::default();
        repo.listings.lock().unwrap().insert(String::new(), Vec::new());
        Arc::new(repo)
    }

    pub fn add_dir(&self, path: &str) {
        self.add(path, EntryType::Dir);
        self.listings
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default();
    }

    pub fn add_file(&self, path: &str) {
        self.add(path, EntryType::File);
    }

    fn add(&self, path: &str, entry_type: EntryType) {
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        let entry = ContentEntry {
            name: name.to_string(),
            path: path.to_string(),
            entry_type,
            url: String::new(),
            html_url: Some(format!("https://github.com/o/r/tree/main/{path}")),
            download_url: (entry_type == EntryType::File)
                .then(|| format!("https://raw.githubusercontent.com/o/r/main/{path}")),
            sha: format!("sha-{path}"),
            size: 1,
        };
        self.listings
            .lock()
            .unwrap()
            .entry(parent.to_string())
            .or_default()
            .push(entry);
    }

    pub fn remove_dir(&self, path: &str) {
        let (parent, _) = path.rsplit_once('/').unwrap_or(("", path));
        let mut listings = self.listings.lock().unwrap();
        if let Some(entries) = listings.get_mut(parent) {
            entries.retain(|entry| entry.path != path);
        }
        listings.remove(path);
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }

    pub fn push(&self, marker: &str) {
        *self.pushed_at.lock().unwrap() = Some(marker.to_string());
    }

    pub fn set_metadata_delay(&self, delay: Duration) {
        *self.metadata_delay.lock().unwrap() = delay;
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryReaderPort for FakeRepository {
    async fn list_contents(&self, path: &str) -> Result<Vec<ContentEntry>, GitHubApiError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(path) {
            return Err(GitHubApiError::Status {
                status: 500,
                message: "server error".to_string(),
            });
        }
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| GitHubApiError::NotFound(path.to_string()))
    }

    async fn repository_metadata(&self) -> Result<RepositoryMetadata, GitHubApiError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.metadata_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(RepositoryMetadata {
            full_name: "o/r".to_string(),
            private: false,
            pushed_at: self.pushed_at.lock().unwrap().clone(),
            permissions: None,
        })
    }

    async fn latest_commit(&self) -> Result<Option<CommitSummary>, GitHubApiError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pushed_at.lock().unwrap().clone().map(|sha| CommitSummary {
            sha,
            message: "update".to_string(),
            date: None,
        }))
    }
}

#[derive(Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
    pub writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl StateStorePort for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateStoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StateStoreError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Remembers every notification it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub updates: Mutex<Vec<(ProjectMap, ProjectCounts)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(ProjectMap, ProjectCounts)> {
        self.updates.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PresentationSinkPort for RecordingSink {
    async fn projects_updated(&self, snapshot: &ProjectMap, counts: ProjectCounts) -> anyhow::Result<()> {
        self.updates.lock().unwrap().push((snapshot.clone(), counts));
        Ok(())
    }
}

pub struct FixedClock;

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        1_700_000_000_000
    }
}

pub struct Harness {
    pub repo: Arc<FakeRepository>,
    pub state_store: Arc<MemoryStateStore>,
    pub store: Arc<InMemoryProjectStore>,
    pub sink: Arc<RecordingSink>,
    pub state: SharedSyncState,
    pub sync: Arc<SyncProjects>,
}

impl Harness {
    pub fn new(repo: Arc<FakeRepository>) -> Self {
        Self::with_freshness(repo, FreshnessSource::PushedAt)
    }

    pub fn with_freshness(repo: Arc<FakeRepository>, freshness: FreshnessSource) -> Self {
        let state_store = Arc::new(MemoryStateStore::default());
        let store = Arc::new(InMemoryProjectStore::new());
        let sink = Arc::new(RecordingSink::default());
        let state: SharedSyncState = Arc::new(Mutex::new(SyncState::default()));
        let walker = Arc::new(RepositoryWalker::new(repo.clone(), Duration::ZERO));
        let sync = Arc::new(SyncProjects::new(
            repo.clone(),
            walker,
            store.clone(),
            state_store.clone(),
            sink.clone(),
            Arc::new(FixedClock),
            freshness,
            state.clone(),
        ));
        Self {
            repo,
            state_store,
            store,
            sink,
            state,
            sync,
        }
    }
}

/// The repository of the `Day 01` scenario: nested class work, empty home
/// work.
pub fn day_one_repository() -> Arc<FakeRepository> {
    let repo = FakeRepository::new();
    repo.add_dir("Day 01");
    repo.add_dir("Day 01/CW");
    repo.add_dir("Day 01/CW/Gear");
    repo.add_file("Day 01/CW/Gear/gear.SLDPRT");
    repo.add_file("Day 01/CW/Gear/gear.png");
    repo.add_dir("Day 01/HW");
    repo.push("2024-05-01T10:00:00Z");
    repo
}
