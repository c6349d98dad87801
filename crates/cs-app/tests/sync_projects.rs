//! Sync pass behavior against an in-memory repository.

mod support;

use std::time::Duration;

use cs_app::{SyncError, SyncOutcome};
use cs_core::ports::{ProjectStorePort, LAST_KNOWN_MARKER_KEY};
use cs_core::convention::encode_project_path;
use cs_core::{DayKey, DownloadKind, FreshnessSource, ProjectSlot, WorkType};

use support::{day_one_repository, FakeRepository, Harness};

#[tokio::test]
async fn day_one_scenario_produces_one_class_work_project() {
    let harness = Harness::new(day_one_repository());

    let outcome = harness.sync.execute(false).await.unwrap();

    let SyncOutcome::Updated { counts, skipped, .. } = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(counts.class_work, 1);
    assert_eq!(counts.home_work, 0);
    assert_eq!(counts.days, 1);
    assert_eq!(skipped, 0);

    let snapshot = harness.store.snapshot().await;
    let bucket = snapshot.get(&DayKey::normalize("Day 01")).unwrap();
    assert_eq!(bucket.class_work.len(), 1);
    assert_eq!(bucket.class_work[0].name, "CW 1 - Day 01");
    let gear = &bucket.class_work[0];
    assert_eq!(gear.downloads.len(), 1);
    assert_eq!(gear.downloads[0].kind, DownloadKind::Part);
    assert_eq!(
        gear.downloads[0].url,
        "https://raw.githubusercontent.com/o/r/main/Day 01/CW/Gear/gear.SLDPRT"
    );
    assert_eq!(
        gear.preview_url.as_deref(),
        Some("https://raw.githubusercontent.com/o/r/main/Day 01/CW/Gear/gear.png")
    );
    assert!(bucket.home_work.is_empty());

    assert_eq!(
        harness.state_store.value(LAST_KNOWN_MARKER_KEY).as_deref(),
        Some("2024-05-01T10:00:00Z")
    );
    let (_, notified) = harness.sink.last().unwrap();
    assert_eq!(notified, counts);
}

#[tokio::test]
async fn unchanged_marker_skips_the_walk() {
    let harness = Harness::new(day_one_repository());
    harness.sync.execute(false).await.unwrap();
    let listings_after_first = harness.repo.listing_calls();

    let outcome = harness.sync.execute(false).await.unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::UpToDate {
            marker: "2024-05-01T10:00:00Z".to_string()
        }
    );
    assert_eq!(harness.repo.listing_calls(), listings_after_first);
    assert_eq!(harness.repo.metadata_calls(), 2);
    assert_eq!(harness.sink.count(), 1);
}

#[tokio::test]
async fn force_walks_even_when_unchanged() {
    let harness = Harness::new(day_one_repository());
    harness.sync.execute(false).await.unwrap();
    let listings_after_first = harness.repo.listing_calls();

    let outcome = harness.sync.execute(true).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Updated { .. }));
    assert_eq!(harness.repo.listing_calls(), 2 * listings_after_first);
    assert_eq!(harness.sink.count(), 2);
}

#[tokio::test]
async fn repeated_walks_give_identical_maps() {
    let harness = Harness::new(day_one_repository());
    harness.sync.execute(false).await.unwrap();
    let first = harness.store.snapshot().await;

    harness.sync.execute(true).await.unwrap();
    let second = harness.store.snapshot().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn stale_days_survive_a_merge() {
    let repo = day_one_repository();
    repo.add_dir("Day 02");
    repo.add_dir("Day 02/HW");
    repo.add_file("Day 02/HW/bracket.SLDPRT");
    let harness = Harness::new(repo.clone());
    harness.sync.execute(false).await.unwrap();

    repo.remove_dir("Day 02");
    repo.push("2024-05-02T08:00:00Z");
    harness.sync.execute(false).await.unwrap();

    let snapshot = harness.store.snapshot().await;
    let stale = snapshot.get(&DayKey::from_number(2)).unwrap();
    assert_eq!(stale.home_work.len(), 1);
    assert_eq!(snapshot.counts().days, 2);
}

#[tokio::test]
async fn root_failure_leaves_the_marker_untouched() {
    let repo = day_one_repository();
    let harness = Harness::new(repo.clone());
    harness.sync.execute(false).await.unwrap();

    repo.push("2024-05-02T08:00:00Z");
    repo.fail("");
    let err = harness.sync.execute(false).await.unwrap_err();

    assert!(matches!(err, SyncError::RootSkipped(_)));
    assert_eq!(
        harness.state_store.value(LAST_KNOWN_MARKER_KEY).as_deref(),
        Some("2024-05-01T10:00:00Z")
    );
    assert!(!harness.sync.is_syncing());

    repo.heal("");
    let outcome = harness.sync.execute(false).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Updated { .. }));
    assert_eq!(
        harness.state_store.value(LAST_KNOWN_MARKER_KEY).as_deref(),
        Some("2024-05-02T08:00:00Z")
    );
}

#[tokio::test]
async fn partial_walk_is_applied_but_retried() {
    let repo = day_one_repository();
    repo.add_dir("Day 02");
    repo.fail("Day 02");
    let harness = Harness::new(repo.clone());

    let outcome = harness.sync.execute(false).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Updated { skipped: 1, .. }));
    assert_eq!(harness.state_store.value(LAST_KNOWN_MARKER_KEY), None);
    assert!(harness
        .store
        .snapshot()
        .await
        .get(&DayKey::from_number(1))
        .is_some());

    repo.heal("Day 02");
    let outcome = harness.sync.execute(false).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Updated { skipped: 0, .. }));
    assert!(harness.state_store.value(LAST_KNOWN_MARKER_KEY).is_some());
}

#[tokio::test]
async fn missing_marker_is_an_error() {
    let repo = FakeRepository::new();
    let harness = Harness::new(repo);

    let err = harness.sync.execute(false).await.unwrap_err();
    assert!(matches!(err, SyncError::NoMarker));
    assert_eq!(harness.repo.listing_calls(), 0);
}

#[tokio::test]
async fn latest_commit_freshness_source() {
    let repo = day_one_repository();
    let harness = Harness::with_freshness(repo, FreshnessSource::LatestCommit);

    let outcome = harness.sync.execute(false).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Updated { .. }));
    assert!(matches!(
        harness.sync.execute(false).await.unwrap(),
        SyncOutcome::UpToDate { .. }
    ));
}

#[tokio::test]
async fn type_first_folders_are_walked_by_default() {
    let repo = FakeRepository::new();
    repo.add_dir("CW");
    repo.add_dir("CW/Day 06");
    repo.add_dir("CW/Day 06/cw 01 day 6");
    repo.add_file("CW/Day 06/cw 01 day 6/gear.SLDASM");
    repo.add_file("CW/Day 06/cw 01 day 6/README.md");
    repo.add_dir("HW");
    repo.add_dir("HW/Day 06");
    repo.add_dir("HW/Day 06/hw 01 day 6");
    repo.add_dir("HW/Day 06/hw 02 spot test day 6");
    repo.push("p1");
    let harness = Harness::new(repo);

    harness.sync.execute(false).await.unwrap();

    let snapshot = harness.store.snapshot().await;
    let bucket = snapshot.get(&DayKey::from_number(6)).unwrap();
    assert_eq!(bucket.class_work.len(), 1);
    assert!(bucket.class_work[0].detail_page_url.ends_with("README.md"));
    assert_eq!(bucket.home_work.len(), 2);
    assert!(bucket.home_work[1].is_spot_test);
    assert_eq!(bucket.home_work[1].name, "HW 2 - Day 06");
}

#[tokio::test]
async fn uploaded_project_appears_next_to_day_first_folders() {
    let repo = day_one_repository();
    let harness = Harness::new(repo.clone());
    harness.sync.execute(false).await.unwrap();

    let folder = encode_project_path(&ProjectSlot::new(6, WorkType::ClassWork, 1));
    repo.add_dir("CW");
    repo.add_dir("CW/Day 06");
    repo.add_dir(&folder);
    repo.add_file(&format!("{folder}/part.SLDPRT"));
    repo.push("2024-05-02T08:00:00Z");

    let outcome = harness.sync.execute(false).await.unwrap();

    let SyncOutcome::Updated { counts, skipped, .. } = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(skipped, 0);
    assert_eq!(counts.class_work, 2);
    let snapshot = harness.store.snapshot().await;
    let day6 = snapshot.get(&DayKey::from_number(6)).unwrap();
    assert_eq!(day6.class_work[0].name, "CW 1 - Day 06");
    assert_eq!(day6.class_work[0].downloads[0].kind, DownloadKind::Part);
    assert_eq!(
        snapshot.get(&DayKey::from_number(1)).unwrap().class_work[0].name,
        "CW 1 - Day 01"
    );
}

#[tokio::test]
async fn failed_type_listing_keeps_known_projects() {
    let repo = day_one_repository();
    let harness = Harness::new(repo.clone());
    harness.sync.execute(false).await.unwrap();
    let before = harness.store.snapshot().await;

    repo.push("2024-05-02T08:00:00Z");
    repo.fail("Day 01/CW");
    let outcome = harness.sync.execute(false).await.unwrap();

    let SyncOutcome::Updated { counts, skipped, .. } = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(skipped, 1);
    assert_eq!(counts.class_work, 1);
    assert_eq!(harness.store.snapshot().await, before);
    let (published, _) = harness.sink.last().unwrap();
    assert_eq!(published.counts().class_work, 1);
    assert_eq!(
        harness.state_store.value(LAST_KNOWN_MARKER_KEY).as_deref(),
        Some("2024-05-01T10:00:00Z")
    );
}

#[tokio::test]
async fn failed_project_listing_keeps_the_whole_type() {
    let repo = day_one_repository();
    repo.add_dir("Day 01/CW/Bracket");
    repo.add_file("Day 01/CW/Bracket/bracket.SLDASM");
    let harness = Harness::new(repo.clone());
    harness.sync.execute(false).await.unwrap();

    repo.push("2024-05-02T08:00:00Z");
    repo.fail("Day 01/CW/Gear");
    harness.sync.execute(false).await.unwrap();

    let snapshot = harness.store.snapshot().await;
    let names: Vec<String> = snapshot
        .get(&DayKey::from_number(1))
        .unwrap()
        .class_work
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["CW 1 - Day 01", "CW 2 - Day 01"]);
    assert_eq!(
        snapshot.get(&DayKey::from_number(1)).unwrap().class_work[0].downloads[0].kind,
        DownloadKind::Part
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_pass_is_refused() {
    let repo = day_one_repository();
    repo.set_metadata_delay(Duration::from_secs(5));
    let harness = Harness::new(repo);

    let sync = harness.sync.clone();
    let first = tokio::spawn(async move { sync.execute(false).await });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(harness.sync.is_syncing());

    let second = harness.sync.execute(false).await.unwrap();
    assert_eq!(second, SyncOutcome::AlreadySyncing);

    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, SyncOutcome::Updated { .. }));
    assert_eq!(harness.repo.metadata_calls(), 1);
    assert!(!harness.sync.is_syncing());
}
