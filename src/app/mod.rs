pub mod collection_manager;
pub mod error;
pub mod portfolio_service;
pub mod project_service;

pub use collection_manager::OrderedCollectionManager;
pub use error::{CollectionError, CollectionResult};
pub use portfolio_service::{Dashboard, DashboardStats, PortfolioService, PublicPortfolio};
pub use project_service::{ImageChange, Project, ProjectService};
