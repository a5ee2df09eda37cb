//! Settings store: tenant-wide JSON values under taxonomy keys, each
//! with an optional attached file (logo, terms of service, ...).

use canvass_core::delivery::FileStorage;
use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::models::setting::{Setting, UpsertSetting};
use canvass_core::repository::SettingRepository;
use canvass_core::taxonomy::TaxonomyKey;
use canvass_core::validation::{Validate, require_non_empty};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Upper bound for files attached to a setting.
pub const MAX_SETTING_FILE_BYTES: usize = 10 * 1024 * 1024;

const FILE_NAMESPACE: &str = "settings";

/// Client-facing view of a setting.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingView {
    pub key: TaxonomyKey,
    pub value: serde_json::Value,
    pub file: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Setting> for SettingView {
    fn from(setting: &Setting) -> Self {
        Self {
            key: setting.key.clone(),
            value: setting.value.clone(),
            file: setting.file_path.clone(),
            updated_at: setting.updated_at,
        }
    }
}

#[derive(Debug)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Validate for FileUpload {
    fn validate(&self) -> CanvassResult<()> {
        require_non_empty("filename", &self.filename)?;
        if self.bytes.is_empty() {
            return Err(CanvassError::validation("file is empty"));
        }
        if self.bytes.len() > MAX_SETTING_FILE_BYTES {
            return Err(CanvassError::validation(format!(
                "file must be at most {MAX_SETTING_FILE_BYTES} bytes"
            )));
        }
        Ok(())
    }
}

pub struct SettingsService<S: SettingRepository, F: FileStorage> {
    repo: S,
    storage: F,
}

impl<S: SettingRepository, F: FileStorage> SettingsService<S, F> {
    pub fn new(repo: S, storage: F) -> Self {
        Self { repo, storage }
    }

    pub async fn get(&self, tenant_id: Uuid, key: &TaxonomyKey) -> CanvassResult<SettingView> {
        let setting = self.repo.get(tenant_id, key).await?;
        Ok(SettingView::from(&setting))
    }

    pub async fn list(&self, tenant_id: Uuid) -> CanvassResult<Vec<SettingView>> {
        let settings = self.repo.list(tenant_id).await?;
        Ok(settings.iter().map(SettingView::from).collect())
    }

    /// Set the JSON value of a setting, keeping any attached file.
    #[instrument(skip(self, value))]
    pub async fn put_value(
        &self,
        tenant_id: Uuid,
        key: TaxonomyKey,
        value: serde_json::Value,
    ) -> CanvassResult<SettingView> {
        let file_path = self.existing(tenant_id, &key).await?.and_then(|s| s.file_path);
        let setting = self
            .repo
            .upsert(UpsertSetting {
                tenant_id,
                key,
                value,
                file_path,
            })
            .await?;
        info!(key = %setting.key, "setting stored");
        Ok(SettingView::from(&setting))
    }

    /// Attach a file to a setting, creating it with a `null` value if
    /// needed. A replaced file is removed afterwards; a failed removal
    /// is logged and ignored.
    #[instrument(skip(self, upload), fields(size = upload.bytes.len()))]
    pub async fn attach_file(
        &self,
        tenant_id: Uuid,
        key: TaxonomyKey,
        upload: FileUpload,
    ) -> CanvassResult<SettingView> {
        upload.validate()?;
        let existing = self.existing(tenant_id, &key).await?;

        let path = self
            .storage
            .save(FILE_NAMESPACE, &upload.filename, upload.bytes)
            .await?;

        let (value, old_path) = match existing {
            Some(setting) => (setting.value, setting.file_path),
            None => (serde_json::Value::Null, None),
        };
        let setting = self
            .repo
            .upsert(UpsertSetting {
                tenant_id,
                key,
                value,
                file_path: Some(path),
            })
            .await?;

        if let Some(old) = old_path {
            self.remove_file(&old).await;
        }
        info!(key = %setting.key, "setting file attached");
        Ok(SettingView::from(&setting))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, tenant_id: Uuid, key: &TaxonomyKey) -> CanvassResult<()> {
        let setting = self.repo.get(tenant_id, key).await?;
        self.repo.delete(tenant_id, key).await?;
        if let Some(path) = setting.file_path {
            self.remove_file(&path).await;
        }
        info!(%key, "setting deleted");
        Ok(())
    }

    async fn existing(&self, tenant_id: Uuid, key: &TaxonomyKey) -> CanvassResult<Option<Setting>> {
        match self.repo.get(tenant_id, key).await {
            Ok(setting) => Ok(Some(setting)),
            Err(CanvassError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path, error = %e, "failed to remove stored file");
        }
    }
}
