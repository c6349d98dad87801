//! # Dependency wiring
//!
//! The only place that sees `cs-infra`, `cs-app` and the config together.
//! It builds adapters and hands them to the use cases through their ports;
//! it makes no decisions of its own beyond where to start the project map.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::{info, warn};

use cs_app::usecases::{CredentialVault, SharedSyncState, UploadPolicy};
use cs_app::{
    DeleteFiles, FetchLatestProjects, PollingScheduler, RepositoryWalker, SyncProjects,
    UploadProject, ValidateAccess,
};
use cs_core::config::AppConfig;
use cs_core::ports::{
    ClockPort, PresentationSinkPort, ProjectStorePort, RepositoryReaderPort,
    RepositoryWriterPort, StateStorePort,
};
use cs_core::{ProjectMap, SyncState};
use cs_infra::{FileStateStore, GitHubClient, InMemoryProjectStore, JsonSnapshotSink, SystemClock};

/// Everything the CLI commands need, built once per process.
pub struct AppServices {
    pub config: AppConfig,
    pub vault: CredentialVault,
    pub store: Arc<dyn ProjectStorePort>,
    pub sync: Arc<SyncProjects>,
    pub scheduler: PollingScheduler,
    pub fetch: FetchLatestProjects,
    pub upload: UploadProject,
    pub delete: DeleteFiles,
    pub validate: ValidateAccess,
}

pub async fn wire_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let github = Arc::new(GitHubClient::new(&config.github).context("create GitHub client")?);
    let reader: Arc<dyn RepositoryReaderPort> = github.clone();
    let writer: Arc<dyn RepositoryWriterPort> = github;

    let state_store: Arc<dyn StateStorePort> =
        Arc::new(FileStateStore::new(config.storage.state_path.clone()));
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let sink: Arc<dyn PresentationSinkPort> =
        Arc::new(JsonSnapshotSink::new(config.storage.snapshot_path.clone()));
    let store: Arc<dyn ProjectStorePort> =
        Arc::new(InMemoryProjectStore::with_snapshot(initial_projects(&config).await));

    let vault = CredentialVault::new(state_store.clone());
    let coordinates = config.coordinates();
    let state: SharedSyncState = Arc::new(Mutex::new(SyncState::default()));

    let walker = Arc::new(RepositoryWalker::new(reader.clone(), config.sync.courtesy_delay()));

    let sync = Arc::new(SyncProjects::new(
        reader,
        walker.clone(),
        store.clone(),
        state_store,
        sink,
        clock.clone(),
        config.sync.freshness,
        state.clone(),
    ));
    let scheduler = PollingScheduler::new(sync.clone(), config.sync.interval());
    let fetch = FetchLatestProjects::new(walker, clock.clone(), state, config.sync.cache_ttl());

    let upload = UploadProject::new(
        writer.clone(),
        vault.clone(),
        clock,
        coordinates.clone(),
        UploadPolicy::from(&config.upload),
    );
    let delete = DeleteFiles::new(writer.clone(), vault.clone(), coordinates.clone());
    let validate = ValidateAccess::new(writer, vault.clone(), coordinates);

    info!(
        repository = %config.coordinates().full_name(),
        freshness = ?config.sync.freshness,
        "Services wired"
    );

    Ok(AppServices {
        config,
        vault,
        store,
        sync,
        scheduler,
        fetch,
        upload,
        delete,
        validate,
    })
}

/// Seed the store from the last snapshot so the first pass only replaces
/// what it actually lists.
async fn initial_projects(config: &AppConfig) -> ProjectMap {
    let Some(path) = &config.storage.snapshot_path else {
        return ProjectMap::new();
    };

    match JsonSnapshotSink::load(path).await {
        Ok(Some(projects)) => {
            info!(path = %path.display(), days = projects.len(), "Loaded previous snapshot");
            projects
        }
        Ok(None) => ProjectMap::new(),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "Ignoring unreadable snapshot");
            ProjectMap::new()
        }
    }
}
