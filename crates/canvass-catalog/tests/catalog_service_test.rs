//! Integration tests for the dropdown and settings services.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use canvass_catalog::dropdown::{CreateOptionInput, DropdownService, UpdateOptionInput};
use canvass_catalog::settings::{FileUpload, SettingsService};
use canvass_core::delivery::FileStorage;
use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::language::fallback_chain;
use canvass_core::taxonomy::TaxonomyKey;
use canvass_db::repository::{SurrealDropdownRepository, SurrealSettingRepository};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// File storage held in memory.
#[derive(Clone, Default)]
struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl FileStorage for MemoryStorage {
    async fn save(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> CanvassResult<String> {
        let path = format!("{namespace}/{}-{filename}", Uuid::new_v4());
        self.files.lock().unwrap().insert(path.clone(), bytes);
        Ok(path)
    }

    async fn delete(&self, path: &str) -> CanvassResult<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

async fn db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    canvass_db::run_migrations(&db).await.unwrap();
    db
}

fn key(raw: &str) -> TaxonomyKey {
    TaxonomyKey::parse(raw).unwrap()
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn create_input(tenant_id: Uuid, value: &str, pairs: &[(&str, &str)], sort_order: i32) -> CreateOptionInput {
    CreateOptionInput {
        tenant_id,
        kind: key("industry"),
        value: value.into(),
        labels: labels(pairs),
        sort_order,
        active: true,
    }
}

#[tokio::test]
async fn localized_listing_walks_the_fallback_chain() {
    let service = DropdownService::new(SurrealDropdownRepository::new(db().await));
    let tenant_id = Uuid::new_v4();

    service
        .create_option(create_input(tenant_id, "healthcare", &[("en", "Healthcare"), ("es", "Salud")], 0))
        .await
        .unwrap();
    service
        .create_option(create_input(tenant_id, "retail", &[("en", "Retail")], 1))
        .await
        .unwrap();
    service
        .create_option(create_input(tenant_id, "mining", &[], 2))
        .await
        .unwrap();

    let spanish = service
        .list_localized(tenant_id, &key("industry"), &fallback_chain("es"), false)
        .await
        .unwrap();
    let shown: Vec<_> = spanish
        .iter()
        .map(|o| (o.label.as_str(), o.language.as_deref()))
        .collect();
    assert_eq!(
        shown,
        [("Salud", Some("es")), ("Retail", Some("en")), ("mining", None)]
    );
}

#[tokio::test]
async fn duplicate_option_value_is_a_conflict() {
    let service = DropdownService::new(SurrealDropdownRepository::new(db().await));
    let tenant_id = Uuid::new_v4();

    service
        .create_option(create_input(tenant_id, "retail", &[("en", "Retail")], 0))
        .await
        .unwrap();
    let dup = service
        .create_option(create_input(tenant_id, " retail ", &[], 0))
        .await;
    assert!(matches!(dup, Err(CanvassError::Conflict { .. })));
}

#[tokio::test]
async fn options_are_addressed_within_their_kind() {
    let service = DropdownService::new(SurrealDropdownRepository::new(db().await));
    let tenant_id = Uuid::new_v4();

    let option = service
        .create_option(create_input(tenant_id, "retail", &[("en", "Retail")], 0))
        .await
        .unwrap();

    let wrong_kind = service.get_option(tenant_id, &key("sector"), option.id).await;
    assert!(matches!(wrong_kind, Err(CanvassError::NotFound { .. })));

    let updated = service
        .update_option(
            tenant_id,
            &key("industry"),
            option.id,
            UpdateOptionInput {
                labels: Some(labels(&[("en", "Retail"), ("fr", "Commerce")])),
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);
    assert_eq!(updated.labels.len(), 2);

    let bad_labels = service
        .update_option(
            tenant_id,
            &key("industry"),
            option.id,
            UpdateOptionInput {
                labels: Some(labels(&[("french", "Commerce")])),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_labels, Err(CanvassError::Validation { .. })));

    assert_eq!(service.list_kinds(tenant_id).await.unwrap(), vec![key("industry")]);

    service
        .delete_option(tenant_id, &key("industry"), option.id)
        .await
        .unwrap();
    assert!(service.list_kinds(tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_value_and_file_lifecycle() {
    let storage = MemoryStorage::default();
    let service = SettingsService::new(SurrealSettingRepository::new(db().await), storage.clone());
    let tenant_id = Uuid::new_v4();

    let stored = service
        .put_value(tenant_id, key("brand"), json!({"color": "#004488"}))
        .await
        .unwrap();
    assert!(stored.file.is_none());

    let with_file = service
        .attach_file(
            tenant_id,
            key("brand"),
            FileUpload {
                filename: "logo.png".into(),
                bytes: vec![1, 2, 3],
            },
        )
        .await
        .unwrap();
    let first_path = with_file.file.clone().unwrap();
    assert_eq!(with_file.value, json!({"color": "#004488"}));
    assert_eq!(storage.paths(), vec![first_path.clone()]);

    // Replacing the file removes the previous one.
    let replaced = service
        .attach_file(
            tenant_id,
            key("brand"),
            FileUpload {
                filename: "logo-v2.png".into(),
                bytes: vec![4, 5, 6],
            },
        )
        .await
        .unwrap();
    let second_path = replaced.file.clone().unwrap();
    assert_ne!(first_path, second_path);
    assert_eq!(storage.paths(), vec![second_path.clone()]);

    // Updating the value keeps the file.
    let revalued = service
        .put_value(tenant_id, key("brand"), json!({"color": "#ff0000"}))
        .await
        .unwrap();
    assert_eq!(revalued.file.as_deref(), Some(second_path.as_str()));

    assert_eq!(service.list(tenant_id).await.unwrap().len(), 1);

    service.delete(tenant_id, &key("brand")).await.unwrap();
    assert!(storage.paths().is_empty());
    let gone = service.get(tenant_id, &key("brand")).await;
    assert!(matches!(gone, Err(CanvassError::NotFound { .. })));
}

#[tokio::test]
async fn attaching_a_file_creates_the_setting() {
    let service = SettingsService::new(
        SurrealSettingRepository::new(db().await),
        MemoryStorage::default(),
    );
    let tenant_id = Uuid::new_v4();

    let view = service
        .attach_file(
            tenant_id,
            key("terms-of-service"),
            FileUpload {
                filename: "terms.pdf".into(),
                bytes: b"%PDF".to_vec(),
            },
        )
        .await
        .unwrap();
    assert_eq!(view.value, serde_json::Value::Null);
    assert!(view.file.is_some());
}
