use crate::app::{ImageChange, OrderedCollectionManager, PortfolioService, ProjectService};
use crate::domain::ordering::order_from_entries;
use crate::domain::{
    ItemId, PersonalInfoPayload, ProjectPayload, SocialLinkPayload, ValidationErrors,
};
use crate::infra::Config;
use crate::storage::{ImageStore, ImageUpload, ItemStore};
use axum::http::HeaderName;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub projects: Arc<ProjectService>,
    pub social_links: Arc<OrderedCollectionManager<SocialLinkPayload>>,
    pub portfolio: Arc<PortfolioService>,
    pub owner_header: HeaderName,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>, config: &Config) -> anyhow::Result<Self> {
        let images = Arc::new(ImageStore::new(&config.upload_dir, config.max_image_bytes));
        Ok(Self {
            projects: Arc::new(ProjectService::new(store.clone(), images)),
            social_links: Arc::new(OrderedCollectionManager::new(store.clone())),
            portfolio: Arc::new(PortfolioService::new(store.clone())),
            owner_header: HeaderName::from_str(&config.owner_header)?,
            store,
        })
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, data: Option<JsonValue>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
        }
    }
}

/// Create/update body for a project. Missing fields default to empty and are
/// reported by validation.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct ProjectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    /// New image; replaces the stored one on update.
    #[serde(default)]
    pub image: Option<ImageUpload>,
    /// Update only: drop the stored image.
    #[serde(default)]
    pub remove_image: bool,
    /// Update only: move the project to this index. Ignored on create.
    #[serde(default)]
    pub display_order: Option<i64>,
}

impl ProjectRequest {
    pub fn payload(&self) -> ProjectPayload {
        ProjectPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            image: None,
            tags: self.tags.clone(),
            demo_url: non_empty(&self.demo_url),
            repo_url: non_empty(&self.repo_url),
            is_featured: self.is_featured,
        }
    }

    pub fn image_change(self) -> ImageChange {
        match (self.image, self.remove_image) {
            (Some(upload), _) => ImageChange::Replace(upload),
            (None, true) => ImageChange::Remove,
            (None, false) => ImageChange::Keep,
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct SocialLinkRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
    /// Update only: move the link to this index. Ignored on create.
    #[serde(default)]
    pub display_order: Option<i64>,
}

impl SocialLinkRequest {
    pub fn payload(&self) -> SocialLinkPayload {
        SocialLinkPayload {
            name: self.name.clone(),
            url: self.url.trim().to_string(),
            icon: self.icon.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct PersonalInfoRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub about_content: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl From<PersonalInfoRequest> for PersonalInfoPayload {
    fn from(request: PersonalInfoRequest) -> Self {
        PersonalInfoPayload {
            name: request.name,
            title: request.title,
            description: request.description,
            about_content: request.about_content,
            email: request.email.trim().to_string(),
            phone: request.phone,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct OrderEntry {
    pub id: ItemId,
    pub display_order: i64,
}

/// Bulk reorder body. `projects` and `links` are accepted as aliases of `items`.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ReorderRequest {
    #[serde(alias = "projects", alias = "links")]
    pub items: Vec<OrderEntry>,
}

impl ReorderRequest {
    /// Ids sorted by requested `display_order`; entries with equal values keep
    /// request order.
    pub fn ordered_ids(&self) -> Result<Vec<ItemId>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (index, entry) in self.items.iter().enumerate() {
            if entry.display_order < 0 {
                errors.push(&format!("items.{}.display_order", index), "must be at least 0");
            }
        }
        errors.into_result()?;

        let entries: Vec<(ItemId, i64)> = self
            .items
            .iter()
            .map(|entry| (entry.id, entry.display_order))
            .collect();
        Ok(order_from_entries(&entries))
    }
}

/// Converts an optional requested position into a reposition index.
pub fn reposition_index(display_order: Option<i64>) -> Result<Option<u32>, ValidationErrors> {
    match display_order {
        None => Ok(None),
        Some(n) if n < 0 => Err(ValidationErrors::single("display_order", "must be at least 0")),
        Some(n) => Ok(Some(u32::try_from(n).unwrap_or(u32::MAX))),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
