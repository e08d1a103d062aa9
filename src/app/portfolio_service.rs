//! Personal info plus the read models built from all of an owner's content.

use crate::app::collection_manager::OrderedCollectionManager;
use crate::app::error::CollectionResult;
use crate::domain::{
    OrderedItem, OwnerId, PersonalInfo, PersonalInfoPayload, ProjectPayload, SocialLinkPayload,
};
use crate::storage::ItemStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub projects: usize,
    pub social_links: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub personal_info: Option<PersonalInfo>,
    pub projects: Vec<OrderedItem<ProjectPayload>>,
    pub social_links: Vec<OrderedItem<SocialLinkPayload>>,
    pub stats: DashboardStats,
}

/// Everything the public site renders for one owner.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPortfolio {
    pub personal_info: Option<PersonalInfo>,
    pub projects: Vec<OrderedItem<ProjectPayload>>,
    pub social_links: Vec<OrderedItem<SocialLinkPayload>>,
}

pub struct PortfolioService {
    store: Arc<dyn ItemStore>,
    projects: OrderedCollectionManager<ProjectPayload>,
    social_links: OrderedCollectionManager<SocialLinkPayload>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            projects: OrderedCollectionManager::new(store.clone()),
            social_links: OrderedCollectionManager::new(store.clone()),
            store,
        }
    }

    pub async fn personal_info(&self, owner_id: OwnerId) -> CollectionResult<Option<PersonalInfo>> {
        Ok(self.store.personal_info(owner_id).await?)
    }

    /// Validates and upserts the owner's single personal info record.
    pub async fn save_personal_info(
        &self,
        owner_id: OwnerId,
        details: PersonalInfoPayload,
    ) -> CollectionResult<PersonalInfo> {
        details.validate()?;
        let info = self.store.upsert_personal_info(owner_id, &details).await?;
        info!(owner_id, "saved personal info");
        Ok(info)
    }

    pub async fn dashboard(&self, owner_id: OwnerId) -> CollectionResult<Dashboard> {
        let portfolio = self.public_portfolio(owner_id).await?;
        Ok(Dashboard {
            stats: DashboardStats {
                projects: portfolio.projects.len(),
                social_links: portfolio.social_links.len(),
            },
            personal_info: portfolio.personal_info,
            projects: portfolio.projects,
            social_links: portfolio.social_links,
        })
    }

    pub async fn public_portfolio(&self, owner_id: OwnerId) -> CollectionResult<PublicPortfolio> {
        let (personal_info, projects, social_links) = tokio::try_join!(
            self.personal_info(owner_id),
            self.projects.list(owner_id),
            self.social_links.list(owner_id),
        )?;
        Ok(PublicPortfolio {
            personal_info,
            projects,
            social_links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::CollectionError;
    use crate::storage::MemoryItemStore;

    fn details() -> PersonalInfoPayload {
        PersonalInfoPayload {
            name: "Jane Doe".to_string(),
            title: "Full Stack Developer".to_string(),
            description: "Building for the web.".to_string(),
            about_content: "Ten years of shipping software.".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_personal_info_upsert_keeps_one_record() {
        let service = PortfolioService::new(Arc::new(MemoryItemStore::new()));
        assert!(service.personal_info(1).await.unwrap().is_none());

        service.save_personal_info(1, details()).await.unwrap();
        let mut changed = details();
        changed.title = "Staff Engineer".to_string();
        service.save_personal_info(1, changed).await.unwrap();

        let info = service.personal_info(1).await.unwrap().unwrap();
        assert_eq!(info.details.title, "Staff Engineer");
        assert!(service.personal_info(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_personal_info_is_validated() {
        let service = PortfolioService::new(Arc::new(MemoryItemStore::new()));
        let mut bad = details();
        bad.email = "not-an-email".to_string();

        let err = service.save_personal_info(1, bad).await.unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));
        assert!(service.personal_info(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_orders_items() {
        let store: Arc<dyn ItemStore> = Arc::new(MemoryItemStore::new());
        let links = OrderedCollectionManager::<SocialLinkPayload>::new(store.clone());
        let service = PortfolioService::new(store);

        let mut ids = Vec::new();
        for name in ["GitHub", "LinkedIn"] {
            let link = SocialLinkPayload {
                name: name.to_string(),
                url: format!("https://{}.com/jane", name.to_lowercase()),
                icon: name.to_lowercase(),
            };
            ids.push(links.append(1, link).await.unwrap().id);
        }
        links.reorder(1, &[ids[1], ids[0]]).await.unwrap();

        let dashboard = service.dashboard(1).await.unwrap();
        assert_eq!(dashboard.stats.social_links, 2);
        assert_eq!(dashboard.stats.projects, 0);
        assert_eq!(dashboard.social_links[0].payload.name, "LinkedIn");
        assert!(dashboard.personal_info.is_none());

        let other = service.public_portfolio(2).await.unwrap();
        assert!(other.social_links.is_empty());
    }
}
