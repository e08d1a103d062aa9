pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CollectionError, OrderedCollectionManager, PortfolioService, ProjectService};
pub use domain::{ItemPayload, OrderedItem, ProjectPayload, SocialLinkPayload};
pub use infra::{Config, StorageBackend};
pub use storage::{ItemStore, MemoryItemStore, PostgresItemStore};
