//! Load sequencing, editing and saving through the public store API.

use pawlodge_cms::services::admin::{AdminGate, DEFAULT_ADMIN_PASSPHRASE};
use pawlodge_cms::services::content::{
    default_content, ContentStore, MemoryDeviceCache, SourceOutcome,
};
use pawlodge_cms::services::publish::GitPublishBackend;
use pawlodge_cms::test_utils::{MockBackend, MockContentsApi};
use pawlodge_cms::{deep_merge, PublishTarget};
use serde_json::{json, Value};

#[test]
fn test_merge_properties() {
    let doc = json!({"site": {"name": "Pawlodge", "phone": "555"}, "services": [1, 2]});
    assert_eq!(deep_merge(&doc, &json!({})), doc);

    let merged = deep_merge(&doc, &json!({"services": [3]}));
    assert_eq!(merged["services"], json!([3]));

    let merged = deep_merge(&doc, &json!({"site": {"phone": null}}));
    assert_eq!(merged["site"], json!({"name": "Pawlodge", "phone": null}));
}

#[tokio::test]
async fn test_remote_unreachable_falls_back_to_device_copy() {
    let slot = MemoryDeviceCache::with_contents(r#"{"site":{"name":"Local Co","phone":"555-0001"}}"#);
    let defaults = json!({"site": {"name": "Default Co"}});
    let mut store = ContentStore::with_defaults(defaults, slot.clone());

    let report = store.load(&MockBackend::failing(503)).await;

    assert_eq!(
        *store.data(),
        json!({"site": {"name": "Local Co", "phone": "555-0001"}})
    );
    assert_eq!(report.cache, SourceOutcome::Applied);
    assert!(matches!(report.remote, SourceOutcome::Ignored(_)));

    let persisted: Value = serde_json::from_str(&slot.contents().unwrap()).unwrap();
    assert_eq!(persisted, *store.data());
}

#[tokio::test]
async fn test_partial_remote_overrides_only_its_keys() {
    let slot = MemoryDeviceCache::with_contents(r#"{"site":{"name":"Local Co","phone":"555-0001"}}"#);
    let mut store = ContentStore::with_defaults(json!({"site": {"name": "Default Co"}}), slot);

    store
        .load(&MockBackend::returning(json!({"site": {"phone": "555-9999"}})))
        .await;

    assert_eq!(
        *store.data(),
        json!({"site": {"name": "Local Co", "phone": "555-9999"}})
    );
}

#[tokio::test]
async fn test_compiled_defaults_cover_every_section() {
    let mut store = ContentStore::new(MemoryDeviceCache::new());
    store.load(&MockBackend::returning(json!({}))).await;

    let data = store.data();
    assert_eq!(*data, default_content());
    assert!(data.as_object().unwrap().len() >= 11);
}

#[tokio::test]
async fn test_edit_save_and_reload_on_another_device() {
    let repo = MockContentsApi::new();
    let target = PublishTarget::new("meadow", "site");
    let backend = GitPublishBackend::new(repo.clone(), target.clone());

    let defaults = json!({"site": {"name": "Default"}});
    let mut editor = ContentStore::with_defaults(defaults.clone(), MemoryDeviceCache::new());
    editor.load(&backend).await;
    {
        let mut session = AdminGate::default()
            .login(DEFAULT_ADMIN_PASSPHRASE, &mut editor, &backend)
            .unwrap();
        session.update("site.name", json!("Meadow Lodge")).unwrap();
        session.push_item("services", json!({"id": "daycare"})).unwrap();
        session.save().await.unwrap();
    }

    let mut visitor = ContentStore::with_defaults(defaults, MemoryDeviceCache::new());
    visitor.load(&backend).await;

    assert_eq!(visitor.data()["site"]["name"], "Meadow Lodge");
    assert_eq!(visitor.data()["services"], json!([{"id": "daycare"}]));
    assert_eq!(repo.file_text(&target), Some(editor.export()));
}

#[tokio::test]
async fn test_republishing_unchanged_content_is_idempotent() {
    let repo = MockContentsApi::new();
    let target = PublishTarget::new("meadow", "site");
    let backend = GitPublishBackend::new(repo.clone(), target.clone());

    let defaults = json!({"about": {"mission": "Wag"}});
    let mut store = ContentStore::with_defaults(defaults, MemoryDeviceCache::new());
    store.load(&backend).await;
    let session = AdminGate::default()
        .login(DEFAULT_ADMIN_PASSPHRASE, &mut store, &backend)
        .unwrap();

    let first = session.save().await.unwrap();
    let after_first = repo.file_text(&target);
    let second = session.save().await.unwrap();

    assert_eq!(first.digest, second.digest);
    assert_eq!(repo.file_text(&target), after_first);
    let puts = repo.puts();
    assert_eq!(puts[0].content, puts[1].content);
    assert_eq!(puts[1].sha, first.commit_sha);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let slot = MemoryDeviceCache::new();
    let mut store = ContentStore::new(slot.clone());
    store.load(&MockBackend::failing(503)).await;
    store.update_path("contact.general", json!("Ring the bell")).unwrap();

    let exported = store.export();
    let before = store.data();

    store.reset();
    assert_eq!(slot.contents(), None);
    store.import(&exported).unwrap();

    assert_eq!(store.data(), before);
    assert!(store.import("{broken").is_err());
    assert_eq!(store.data(), before);
}
