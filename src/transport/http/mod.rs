pub mod auth;
pub mod error;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod health;
    pub mod portfolio;
    pub mod projects;
    pub mod social_links;
}

pub use auth::Owner;
pub use error::ApiError;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
