mod common;

use common::{id, kathmandu, nepal_catalog, FailableStorage};
use std::sync::Arc;
use travel_shared::{
    to_feature_collection, DestinationCatalog, ErrorKind, Guide, GuideConfig, InMemoryCatalog,
    KeyValueStore, MemoryStore, PinnedLocation, StorageKey,
};

fn guide_with<S: KeyValueStore>(
    storage: Arc<S>,
    location: PinnedLocation,
) -> Guide<S, InMemoryCatalog, PinnedLocation> {
    Guide::new(
        GuideConfig::default(),
        storage,
        Arc::new(nepal_catalog()),
        Arc::new(location),
    )
    .unwrap()
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn session_and_favorites_survive_restart_on_sqlite() {
    use travel_shared::SqliteStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.db");

    {
        let storage = Arc::new(SqliteStore::open(&path).unwrap());
        let guide = guide_with(storage, PinnedLocation::denied());
        guide.restore().await;

        let user = guide
            .session()
            .sign_in("maya@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(user.name, "maya");

        guide.favorites().add(id("dest003")).await.unwrap();
        guide.favorites().add(id("dest001")).await.unwrap();
        guide.teardown().await.unwrap();
    }

    let storage = Arc::new(SqliteStore::open(&path).unwrap());
    let guide = guide_with(storage, PinnedLocation::denied());
    let report = guide.restore().await;

    assert!(report.is_clean());
    assert_eq!(report.user.as_ref().map(|u| u.email.as_str()), Some("maya@example.com"));
    assert_eq!(report.favorites, 2);

    let names: Vec<String> = guide
        .favorite_destinations()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Phewa Lake", "Pashupatinath"]);
}

#[tokio::test]
async fn sign_out_removes_user_key_and_keeps_favorites() {
    let storage = Arc::new(MemoryStore::new());
    let guide = guide_with(Arc::clone(&storage), PinnedLocation::denied());

    guide
        .session()
        .sign_up("Maya", "maya@example.com", "longenough")
        .await
        .unwrap();
    guide.favorites().add(id("dest002")).await.unwrap();
    assert!(storage.exists(&StorageKey::USER).await.unwrap());

    guide.session().sign_out().await.unwrap();

    assert!(!guide.session().is_authenticated().await);
    assert!(!storage.exists(&StorageKey::USER).await.unwrap());
    assert!(storage.exists(&StorageKey::FAVORITES).await.unwrap());

    let view = guide.view().await;
    assert!(!view.is_authenticated);
    assert_eq!(view.user_name, None);
    assert_eq!(view.favorite_ids, vec![id("dest002")]);
}

#[tokio::test]
async fn short_password_is_rejected_without_writing() {
    let storage = Arc::new(MemoryStore::new());
    let guide = guide_with(Arc::clone(&storage), PinnedLocation::denied());

    let err = guide
        .session()
        .sign_up("Maya", "maya@example.com", "123")
        .await
        .unwrap_err();
    let err: travel_shared::AppError = err.into();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(storage.is_empty().await);
}

#[tokio::test]
async fn sign_in_stays_active_when_storage_fails() {
    let storage = Arc::new(FailableStorage::default());
    let guide = guide_with(Arc::clone(&storage), PinnedLocation::denied());

    storage.set_fail_writes(true);
    assert!(guide
        .session()
        .sign_in("maya@example.com", "secret")
        .await
        .is_err());
    assert!(guide.session().is_authenticated().await);
    assert!(!storage.inner.exists(&StorageKey::USER).await.unwrap());

    storage.set_fail_writes(false);
    guide.session().persist().await.unwrap();
    assert!(storage.inner.exists(&StorageKey::USER).await.unwrap());
}

#[tokio::test]
async fn lookup_by_ids_skips_missing() {
    let catalog = nepal_catalog();
    let found = catalog
        .by_ids(&[id("dest001"), id("missing-id")])
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Pashupatinath");
}

#[tokio::test]
async fn nearby_from_kathmandu_is_sorted_and_bounded() {
    let guide = guide_with(Arc::new(MemoryStore::new()), PinnedLocation::at(kathmandu()));

    let nearby = guide.nearby().await.unwrap();
    let ids: Vec<&str> = nearby.iter().map(|n| n.destination.id.as_str()).collect();
    assert_eq!(ids, vec!["dest001", "dest002", "dest005"]);

    assert!(nearby
        .windows(2)
        .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    assert!(nearby[0].distance_label().ends_with(" km"));

    let collection = to_feature_collection(&nearby);
    assert_eq!(collection.features.len(), 3);
}

#[tokio::test]
async fn nearby_with_wider_radius_reaches_pokhara() {
    let config = GuideConfig {
        nearby_radius_km: 200.0,
        ..GuideConfig::default()
    };
    let guide = Guide::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(nepal_catalog()),
        Arc::new(PinnedLocation::at(kathmandu())),
    )
    .unwrap();

    let nearby = guide.nearby().await.unwrap();
    assert_eq!(nearby.len(), 5);
    assert_eq!(nearby.last().unwrap().destination.id, id("dest003"));
}

#[tokio::test]
async fn denied_location_is_reported() {
    let guide = guide_with(Arc::new(MemoryStore::new()), PinnedLocation::denied());

    let err = guide.nearby().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::LocationPermissionDenied);
    assert!(!err.user_facing_message().is_empty());
}
