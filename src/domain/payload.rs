//! Payload records carried by ordered collections, plus the per-owner personal info.

use crate::domain::ordering::{ItemId, OwnerId};
use crate::domain::validation::{
    check_email, check_url, require_text, ValidationErrors, MAX_SHORT_TEXT,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// The owner-scoped collections managed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Projects,
    SocialLinks,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Projects, Collection::SocialLinks];

    /// Backing table name. Only ever one of these constants, so it is safe to
    /// format into SQL.
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::SocialLinks => "social_links",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Contract for anything stored in an ordered collection.
///
/// The ordering logic never looks inside a payload; it only needs to know
/// which collection it lives in and whether it is well-formed.
pub trait ItemPayload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// A stored item with its typed payload flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem<P> {
    pub id: ItemId,
    pub owner_id: OwnerId,
    pub display_order: i32,
    #[serde(flatten)]
    pub payload: P,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    /// Relative path inside the upload store, or an external image URL.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl ItemPayload for ProjectPayload {
    const COLLECTION: Collection = Collection::Projects;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "title", &self.title, Some(MAX_SHORT_TEXT));
        require_text(&mut errors, "description", &self.description, None);
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            errors.push("tags", "must not contain empty tags");
        }
        if let Some(url) = self.demo_url.as_deref() {
            check_url(&mut errors, "demo_url", url);
        }
        if let Some(url) = self.repo_url.as_deref() {
            check_url(&mut errors, "repo_url", url);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SocialLinkPayload {
    pub name: String,
    pub url: String,
    /// Icon identifier or inline SVG markup.
    pub icon: String,
}

impl ItemPayload for SocialLinkPayload {
    const COLLECTION: Collection = Collection::SocialLinks;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name, Some(MAX_SHORT_TEXT));
        if self.url.trim().is_empty() {
            errors.push("url", "is required");
        } else {
            check_url(&mut errors, "url", &self.url);
        }
        require_text(&mut errors, "icon", &self.icon, None);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonalInfoPayload {
    pub name: String,
    pub title: String,
    pub description: String,
    pub about_content: String,
    pub email: String,
    pub phone: String,
}

impl PersonalInfoPayload {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name, Some(MAX_SHORT_TEXT));
        require_text(&mut errors, "title", &self.title, Some(MAX_SHORT_TEXT));
        require_text(&mut errors, "description", &self.description, None);
        require_text(&mut errors, "about_content", &self.about_content, None);
        require_text(&mut errors, "email", &self.email, Some(MAX_SHORT_TEXT));
        if !self.email.trim().is_empty() {
            check_email(&mut errors, "email", &self.email);
        }
        require_text(&mut errors, "phone", &self.phone, Some(MAX_SHORT_TEXT));
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub details: PersonalInfoPayload,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectPayload {
        ProjectPayload {
            title: "Task Management App".to_string(),
            description: "Drag-and-drop task boards".to_string(),
            image: None,
            tags: vec!["React".to_string(), "Node.js".to_string()],
            demo_url: Some("https://example.com/demo2".to_string()),
            repo_url: None,
            is_featured: true,
        }
    }

    #[test]
    fn test_project_validation_passes() {
        assert!(project().validate().is_ok());
    }

    #[test]
    fn test_project_validation_collects_every_field() {
        let mut bad = project();
        bad.title = String::new();
        bad.description = " ".to_string();
        bad.tags.push("".to_string());
        bad.repo_url = Some("github.com/nope".to_string());

        let errors = bad.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "description", "tags", "repo_url"]);
    }

    #[test]
    fn test_social_link_requires_url() {
        let link = SocialLinkPayload {
            name: "GitHub".to_string(),
            url: "".to_string(),
            icon: "github".to_string(),
        };
        let errors = link.validate().unwrap_err();
        assert_eq!(errors.fields()[0].field, "url");
        assert_eq!(errors.fields()[0].message, "is required");
    }

    #[test]
    fn test_personal_info_validation() {
        let mut info = PersonalInfoPayload {
            name: "Jane Doe".to_string(),
            title: "Full Stack Developer".to_string(),
            description: "I build things.".to_string(),
            about_content: "Longer story.".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+1 234 567 8900".to_string(),
        };
        assert!(info.validate().is_ok());

        info.email = "jane".to_string();
        let errors = info.validate().unwrap_err();
        assert_eq!(errors.fields().len(), 1);
        assert_eq!(errors.fields()[0].field, "email");
    }

    #[test]
    fn test_ordered_item_flattens_payload() {
        let now = Utc::now();
        let item = OrderedItem {
            id: 7,
            owner_id: 1,
            display_order: 2,
            payload: project(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["title"], "Task Management App");
        assert_eq!(json["display_order"], 2);
        assert!(json.get("payload").is_none());
    }
}
