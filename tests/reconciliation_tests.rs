mod common;

use anishelf::db::CatalogStore;
use anishelf::domain::AvailabilityState;
use anishelf::library::{FilesystemError, MediaFile, WalkdirScanner};
use anishelf::models::{NewAnime, NewEpisode};
use anishelf::services::{ReconciliationService, ScanError};
use common::{FakeScanner, FlakyStore, memory_store};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ROOT: &str = "/media/anime";

#[tokio::test]
async fn matching_files_mark_episodes_owned() {
    let store = memory_store().await;
    let frieren = store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();

    let scanner = FakeScanner::with_paths(&[
        "/media/anime/[SubsPlease] Frieren - 01 [1080p].mkv",
        "/media/anime/[SubsPlease] Frieren - 02 [1080p].mkv",
    ]);
    let service = ReconciliationService::new(Arc::new(store.clone()), scanner);

    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.total_files_seen, 2);
    assert_eq!(summary.matched_anime_count, 1);
    assert_eq!(summary.updated_episode_count, 2);
    assert_eq!(summary.created_anime_count, 0);
    assert!(summary.unmatched_files.is_empty());
    assert!(summary.failed_files.is_empty());

    let episodes = store.get_episodes_by_anime_id(frieren.id).await.unwrap();
    assert_eq!(episodes.len(), 2);
    assert!(episodes.iter().all(|e| e.availability == AvailabilityState::Owned));
    assert_eq!(episodes[0].title.as_deref(), Some("Episode 1"));
    assert_eq!(
        episodes[0].local_path.as_deref(),
        Some("/media/anime/[SubsPlease] Frieren - 01 [1080p].mkv")
    );
}

#[tokio::test]
async fn online_episode_keeps_online_signal_when_owned() {
    let store = memory_store().await;
    let anime = store.create_anime(&NewAnime::titled("Mushishi")).await.unwrap();
    store
        .create_episode(
            anime.id,
            &NewEpisode {
                available_online: true,
                ..NewEpisode::numbered(3)
            },
        )
        .await
        .unwrap();

    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&["/media/anime/Mushishi - 03.mkv"]),
    );
    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();
    assert_eq!(summary.updated_episode_count, 1);

    let episode = &store.get_episodes_by_anime_id(anime.id).await.unwrap()[0];
    assert!(episode.owned_locally);
    assert!(episode.available_online);
    assert_eq!(episode.availability, AvailabilityState::OwnedAndAvailableOnline);
}

#[tokio::test]
async fn rescanning_the_same_tree_changes_nothing() {
    let store = memory_store().await;
    let anime = store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();
    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&[
            "/media/anime/Frieren - 01.mkv",
            "/media/anime/Frieren - 02.mkv",
        ]),
    );

    service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();
    let before = store.get_episodes_by_anime_id(anime.id).await.unwrap();

    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();
    let after = store.get_episodes_by_anime_id(anime.id).await.unwrap();

    assert_eq!(summary.updated_episode_count, 0);
    assert_eq!(summary.matched_anime_count, 1);
    assert_eq!(before, after);
}

#[tokio::test]
async fn duplicate_copies_do_not_flip_the_recorded_path() {
    let root = std::env::temp_dir().join(format!("anishelf-dup-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(root.join("backup")).unwrap();
    let primary = root.join("Frieren - 01.mkv");
    std::fs::write(&primary, b"").unwrap();
    std::fs::write(root.join("backup").join("Frieren - 01.mkv"), b"").unwrap();

    let store = memory_store().await;
    let anime = store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();
    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        Arc::new(WalkdirScanner::new(["mkv"])),
    );

    let summary = service.scan_and_reconcile(&root, false).await.unwrap();
    assert_eq!(summary.total_files_seen, 2);
    assert_eq!(summary.updated_episode_count, 1);

    let summary = service.scan_and_reconcile(&root, false).await.unwrap();
    assert_eq!(summary.updated_episode_count, 0);

    let episode = &store.get_episodes_by_anime_id(anime.id).await.unwrap()[0];
    let expected = primary.display().to_string();
    assert_eq!(episode.local_path.as_deref(), Some(expected.as_str()));

    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
async fn moved_file_replaces_a_stale_path() {
    let store = memory_store().await;
    let anime = store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();
    store
        .create_episode(
            anime.id,
            &NewEpisode {
                owned_locally: true,
                local_path: Some("/gone/Frieren - 01.mkv".to_string()),
                ..NewEpisode::numbered(1)
            },
        )
        .await
        .unwrap();

    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&["/media/anime/Frieren - 01.mkv"]),
    );
    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.updated_episode_count, 1);
    let episode = &store.get_episodes_by_anime_id(anime.id).await.unwrap()[0];
    assert_eq!(episode.local_path.as_deref(), Some("/media/anime/Frieren - 01.mkv"));
    assert_eq!(episode.availability, AvailabilityState::Owned);
}

#[tokio::test]
async fn unknown_titles_are_reported_without_create_missing() {
    let store = memory_store().await;
    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&["/media/anime/Dandadan - 01.mkv"]),
    );

    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.matched_anime_count, 0);
    assert_eq!(summary.unmatched_files, vec!["/media/anime/Dandadan - 01.mkv"]);
    assert!(store.list_all_anime().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_missing_creates_one_anime_per_title() {
    let store = memory_store().await;
    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&[
            "/media/anime/Dandadan - 01.mkv",
            "/media/anime/Dandadan - 02.mkv",
            "/media/anime/Your Name.mkv",
        ]),
    );

    let summary = service.scan_and_reconcile(Path::new(ROOT), true).await.unwrap();

    assert_eq!(summary.created_anime_count, 1);
    assert_eq!(summary.matched_anime_count, 1);
    assert_eq!(summary.updated_episode_count, 2);
    assert_eq!(summary.unmatched_files, vec!["/media/anime/Your Name.mkv"]);

    let all = store.list_all_anime().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Dandadan");
    assert_eq!(all[0].status, anishelf::domain::AnimeStatus::PlanToWatch);
}

#[tokio::test]
async fn synonyms_match_case_insensitively() {
    let store = memory_store().await;
    let anime = store
        .create_anime(&NewAnime {
            synonyms: Some("Sousou no Frieren, Frieren".to_string()),
            ..NewAnime::titled("Frieren: Beyond Journey's End")
        })
        .await
        .unwrap();

    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_paths(&["/media/anime/[SubsPlease] SOUSOU NO FRIEREN - 05 [1080p].mkv"]),
    );
    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.matched_anime_count, 1);
    let episodes = store.get_episodes_by_anime_id(anime.id).await.unwrap();
    assert_eq!(episodes[0].number, 5);
}

#[tokio::test]
async fn unreadable_entries_count_as_unmatched() {
    let store = memory_store().await;
    store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();

    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        FakeScanner::with_files(vec![MediaFile::unreadable(PathBuf::from(
            "/media/anime/Frieren - 01.mkv",
        ))]),
    );
    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.total_files_seen, 1);
    assert_eq!(summary.unmatched_files.len(), 1);
    assert_eq!(summary.updated_episode_count, 0);
}

#[tokio::test]
async fn listing_failure_fails_the_scan() {
    let store = memory_store().await;
    let service = ReconciliationService::new(
        Arc::new(store),
        FakeScanner::failing(FilesystemError::NotFound(PathBuf::from("/nope"))),
    );

    let err = service
        .scan_and_reconcile(Path::new("/nope"), false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScanError::Filesystem(FilesystemError::NotFound(_))
    ));
}

#[tokio::test]
async fn per_file_store_failure_is_recorded_and_scan_continues() {
    let store = memory_store().await;
    let anime = store.create_anime(&NewAnime::titled("Frieren")).await.unwrap();

    let service = ReconciliationService::new(
        FlakyStore::new(store.clone(), &[2]),
        FakeScanner::with_paths(&[
            "/media/anime/Frieren - 01.mkv",
            "/media/anime/Frieren - 02.mkv",
            "/media/anime/Frieren - 03.mkv",
        ]),
    );
    let summary = service.scan_and_reconcile(Path::new(ROOT), false).await.unwrap();

    assert_eq!(summary.updated_episode_count, 2);
    assert_eq!(summary.failed_files.len(), 1);
    assert_eq!(summary.failed_files[0].path, "/media/anime/Frieren - 02.mkv");

    let numbers: Vec<i32> = store
        .get_episodes_by_anime_id(anime.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.number)
        .collect();
    assert_eq!(numbers, vec![1, 3]);
}

#[tokio::test]
async fn walkdir_scan_end_to_end() {
    let root = std::env::temp_dir().join(format!("anishelf-scan-{}", uuid::Uuid::new_v4()));
    let season = root.join("Cowboy Bebop").join("Season 1");
    std::fs::create_dir_all(&season).unwrap();
    std::fs::write(season.join("Episode 04.mkv"), b"").unwrap();
    std::fs::write(root.join("Cowboy Bebop - 05.mp4"), b"").unwrap();
    std::fs::write(root.join("notes.txt"), b"").unwrap();

    let store = memory_store().await;
    let anime = store
        .create_anime(&NewAnime::titled("Cowboy Bebop"))
        .await
        .unwrap();

    let service = ReconciliationService::new(
        Arc::new(store.clone()),
        Arc::new(WalkdirScanner::new(["mkv", "mp4"])),
    );
    let summary = service.scan_and_reconcile(&root, false).await.unwrap();

    assert_eq!(summary.total_files_seen, 2);
    assert_eq!(summary.updated_episode_count, 2);
    let numbers: Vec<i32> = store
        .get_episodes_by_anime_id(anime.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.number)
        .collect();
    assert_eq!(numbers, vec![4, 5]);

    std::fs::remove_dir_all(&root).unwrap();
}
