use crate::domain::{Collection, ItemId, ValidationErrors};
use crate::storage::{ImageError, StoreError};
use thiserror::Error;

pub type CollectionResult<T> = std::result::Result<T, CollectionError>;

/// Everything an ordered-collection operation can fail with.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{collection} item {id} belongs to another owner")]
    Ownership { collection: Collection, id: ItemId },

    #[error(
        "reorder must list every {collection} item exactly once (missing: {missing:?}, duplicates: {duplicates:?})"
    )]
    IncompleteSet {
        collection: Collection,
        missing: Vec<ItemId>,
        duplicates: Vec<ItemId>,
    },

    #[error("{collection} item {id} not found")]
    NotFound { collection: Collection, id: ItemId },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<ValidationErrors> for CollectionError {
    fn from(errors: ValidationErrors) -> Self {
        CollectionError::Validation(errors)
    }
}

impl From<ImageError> for CollectionError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Io(e) => CollectionError::Storage(StoreError::Io(e)),
            other => CollectionError::Validation(ValidationErrors::single("image", other.to_string())),
        }
    }
}
