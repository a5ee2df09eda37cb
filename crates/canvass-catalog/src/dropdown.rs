//! Dropdown service: per-tenant taxonomies whose options carry one
//! label per language.

use std::collections::BTreeMap;

use canvass_core::error::{CanvassError, CanvassResult};
use canvass_core::language::{FallbackChain, is_valid_language_code};
use canvass_core::models::dropdown::{CreateDropdownOption, DropdownOption, UpdateDropdownOption};
use canvass_core::repository::DropdownRepository;
use canvass_core::taxonomy::TaxonomyKey;
use canvass_core::validation::{Validate, require_max_len, require_non_empty};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

const MAX_VALUE_LEN: usize = 100;
const MAX_LABEL_LEN: usize = 200;

fn validate_labels(labels: &BTreeMap<String, String>) -> CanvassResult<()> {
    for (lang, label) in labels {
        if !is_valid_language_code(lang) {
            return Err(CanvassError::validation(format!(
                "label language '{lang}' is not an ISO 639-1 code"
            )));
        }
        require_non_empty("label", label)?;
        require_max_len("label", label, MAX_LABEL_LEN)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CreateOptionInput {
    pub tenant_id: Uuid,
    pub kind: TaxonomyKey,
    pub value: String,
    pub labels: BTreeMap<String, String>,
    pub sort_order: i32,
    pub active: bool,
}

impl Validate for CreateOptionInput {
    fn validate(&self) -> CanvassResult<()> {
        require_non_empty("value", &self.value)?;
        require_max_len("value", &self.value, MAX_VALUE_LEN)?;
        validate_labels(&self.labels)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptionInput {
    pub labels: Option<BTreeMap<String, String>>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

impl Validate for UpdateOptionInput {
    fn validate(&self) -> CanvassResult<()> {
        match &self.labels {
            Some(labels) => validate_labels(labels),
            None => Ok(()),
        }
    }
}

/// An option as shown to a client in its negotiated language.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedOption {
    pub id: Uuid,
    pub value: String,
    pub label: String,
    /// Language the label was found in; `None` when the raw value was
    /// used.
    pub language: Option<String>,
    pub sort_order: i32,
    pub active: bool,
}

impl LocalizedOption {
    pub fn localize(option: &DropdownOption, chain: &FallbackChain) -> Self {
        let (label, language) = option.label_for(chain);
        Self {
            id: option.id,
            value: option.value.clone(),
            label: label.to_string(),
            language: language.map(str::to_string),
            sort_order: option.sort_order,
            active: option.active,
        }
    }
}

pub struct DropdownService<D: DropdownRepository> {
    repo: D,
}

impl<D: DropdownRepository> DropdownService<D> {
    pub fn new(repo: D) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, input), fields(tenant_id = %input.tenant_id, kind = %input.kind))]
    pub async fn create_option(&self, input: CreateOptionInput) -> CanvassResult<DropdownOption> {
        input.validate()?;
        let value = input.value.trim().to_string();

        match self
            .repo
            .get_by_value(input.tenant_id, &input.kind, &value)
            .await
        {
            Ok(_) => {
                return Err(CanvassError::Conflict {
                    entity: "dropdown option".into(),
                    field: "value".into(),
                });
            }
            Err(CanvassError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let option = self
            .repo
            .create(CreateDropdownOption {
                tenant_id: input.tenant_id,
                kind: input.kind,
                value,
                labels: input.labels,
                sort_order: input.sort_order,
                active: input.active,
            })
            .await?;

        info!(option_id = %option.id, "dropdown option created");
        Ok(option)
    }

    /// Fetch an option, requiring it to belong to `kind`.
    pub async fn get_option(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        id: Uuid,
    ) -> CanvassResult<DropdownOption> {
        let option = self.repo.get_by_id(tenant_id, id).await?;
        if &option.kind != kind {
            return Err(CanvassError::NotFound {
                entity: "dropdown option".into(),
                id: id.to_string(),
            });
        }
        Ok(option)
    }

    #[instrument(skip(self, input))]
    pub async fn update_option(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        id: Uuid,
        input: UpdateOptionInput,
    ) -> CanvassResult<DropdownOption> {
        input.validate()?;
        self.get_option(tenant_id, kind, id).await?;
        self.repo
            .update(
                tenant_id,
                id,
                UpdateDropdownOption {
                    labels: input.labels,
                    sort_order: input.sort_order,
                    active: input.active,
                },
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_option(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        id: Uuid,
    ) -> CanvassResult<()> {
        self.get_option(tenant_id, kind, id).await?;
        self.repo.delete(tenant_id, id).await?;
        info!(option_id = %id, "dropdown option deleted");
        Ok(())
    }

    pub async fn list_kinds(&self, tenant_id: Uuid) -> CanvassResult<Vec<TaxonomyKey>> {
        self.repo.list_kinds(tenant_id).await
    }

    /// Options of `kind` with labels resolved along `chain`.
    pub async fn list_localized(
        &self,
        tenant_id: Uuid,
        kind: &TaxonomyKey,
        chain: &FallbackChain,
        include_inactive: bool,
    ) -> CanvassResult<Vec<LocalizedOption>> {
        let options = self
            .repo
            .list_by_kind(tenant_id, kind, include_inactive)
            .await?;
        Ok(options
            .iter()
            .map(|option| LocalizedOption::localize(option, chain))
            .collect())
    }
}
