//! Project operations: the ordered collection plus image file handling.

use crate::app::collection_manager::OrderedCollectionManager;
use crate::app::error::CollectionResult;
use crate::domain::{ItemId, ItemPayload, OrderedItem, OwnerId, ProjectPayload};
use crate::storage::{ImageStore, ImageUpload, ItemStore};
use std::sync::Arc;
use tracing::info;

const IMAGE_FOLDER: &str = "projects";

pub type Project = OrderedItem<ProjectPayload>;

/// What an update does with the project's stored image.
#[derive(Debug, Clone, Default)]
pub enum ImageChange {
    #[default]
    Keep,
    Replace(ImageUpload),
    Remove,
}

pub struct ProjectService {
    manager: OrderedCollectionManager<ProjectPayload>,
    images: Arc<ImageStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ItemStore>, images: Arc<ImageStore>) -> Self {
        Self {
            manager: OrderedCollectionManager::new(store),
            images,
        }
    }

    pub fn manager(&self) -> &OrderedCollectionManager<ProjectPayload> {
        &self.manager
    }

    /// Stores the upload (if any) and appends the project. The file is removed
    /// again when the insert fails.
    pub async fn create(
        &self,
        owner_id: OwnerId,
        mut payload: ProjectPayload,
        image: Option<ImageUpload>,
    ) -> CollectionResult<Project> {
        payload.validate()?;

        let saved = match image {
            Some(upload) => Some(self.images.save(IMAGE_FOLDER, &upload).await?),
            None => None,
        };
        if saved.is_some() {
            payload.image = saved.clone();
        }

        match self.manager.append(owner_id, payload).await {
            Ok(project) => Ok(project),
            Err(e) => {
                if let Some(path) = saved {
                    self.images.discard(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Replaces the project's fields and applies `image`. A previous file is
    /// deleted only after the record update committed.
    pub async fn update(
        &self,
        owner_id: OwnerId,
        id: ItemId,
        mut payload: ProjectPayload,
        image: ImageChange,
        reposition: Option<u32>,
    ) -> CollectionResult<Project> {
        let existing = self.manager.get(owner_id, id).await?;
        payload.validate()?;

        let previous = existing.payload.image;
        let mut saved = None;
        payload.image = match image {
            ImageChange::Keep => previous.clone(),
            ImageChange::Replace(upload) => {
                let path = self.images.save(IMAGE_FOLDER, &upload).await?;
                saved = Some(path.clone());
                Some(path)
            }
            ImageChange::Remove => None,
        };

        let updated = match self
            .manager
            .replace_payload(owner_id, id, payload, reposition)
            .await
        {
            Ok(project) => project,
            Err(e) => {
                if let Some(path) = saved {
                    self.images.discard(&path).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = previous {
            if updated.payload.image.as_deref() != Some(old.as_str()) {
                info!(owner_id, id, old = %old, "replacing project image");
                self.images.discard(&old).await;
            }
        }
        Ok(updated)
    }

    /// Deletes the project, then its image file.
    pub async fn delete(&self, owner_id: OwnerId, id: ItemId) -> CollectionResult<Project> {
        let removed = self.manager.delete(owner_id, id).await?;
        if let Some(path) = removed.payload.image.as_deref() {
            self.images.discard(path).await;
        }
        Ok(removed)
    }

    pub async fn toggle_featured(&self, owner_id: OwnerId, id: ItemId) -> CollectionResult<Project> {
        let project = self
            .manager
            .modify(owner_id, id, |p| p.is_featured = !p.is_featured)
            .await?;
        info!(owner_id, id, is_featured = project.payload.is_featured, "toggled featured flag");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::CollectionError;
    use crate::storage::MemoryItemStore;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";
    const GIF: &[u8] = b"GIF89a\x01\0\x01\0";

    fn setup() -> (TempDir, Arc<MemoryItemStore>, ProjectService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryItemStore::new());
        let images = Arc::new(ImageStore::new(dir.path(), 4096));
        let service = ProjectService::new(store.clone(), images);
        (dir, store, service)
    }

    fn payload(title: &str) -> ProjectPayload {
        ProjectPayload {
            title: title.to_string(),
            description: "A project".to_string(),
            image: None,
            tags: vec!["Rust".to_string()],
            demo_url: None,
            repo_url: Some("https://github.com/example/repo".to_string()),
            is_featured: false,
        }
    }

    fn upload(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            data: STANDARD.encode(bytes),
            filename: None,
        }
    }

    fn stored_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path().join(IMAGE_FOLDER))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_create_with_image_stores_file() {
        let (dir, _, service) = setup();
        let project = service.create(1, payload("Site"), Some(upload(PNG))).await.unwrap();

        let path = project.payload.image.unwrap();
        assert!(path.starts_with("projects/") && path.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), PNG);
    }

    #[tokio::test]
    async fn test_create_with_invalid_fields_writes_no_file() {
        let (dir, _, service) = setup();
        let err = service.create(1, payload(""), Some(upload(PNG))).await.unwrap_err();

        assert!(matches!(err, CollectionError::Validation(_)));
        assert_eq!(stored_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_create_with_unsupported_file_is_validation_error() {
        let (_, _, service) = setup();
        let err = service
            .create(1, payload("Site"), Some(upload(b"just text")))
            .await
            .unwrap_err();
        match err {
            CollectionError::Validation(errors) => assert_eq!(errors.fields()[0].field, "image"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_insert_removes_saved_file() {
        let (dir, store, service) = setup();
        store.fail_writes(true);

        let err = service.create(1, payload("Site"), Some(upload(PNG))).await.unwrap_err();
        assert!(matches!(err, CollectionError::Storage(_)));
        assert_eq!(stored_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_and_removes_image() {
        let (dir, _, service) = setup();
        let created = service.create(1, payload("Site"), Some(upload(PNG))).await.unwrap();
        let first = created.payload.image.clone().unwrap();

        let replaced = service
            .update(1, created.id, payload("Site v2"), ImageChange::Replace(upload(GIF)), None)
            .await
            .unwrap();
        let second = replaced.payload.image.clone().unwrap();
        assert!(second.ends_with(".gif"));
        assert!(!dir.path().join(&first).exists());
        assert!(dir.path().join(&second).exists());

        let kept = service
            .update(1, created.id, payload("Site v3"), ImageChange::Keep, None)
            .await
            .unwrap();
        assert_eq!(kept.payload.image.as_deref(), Some(second.as_str()));
        assert!(dir.path().join(&second).exists());

        let cleared = service
            .update(1, created.id, payload("Site v4"), ImageChange::Remove, None)
            .await
            .unwrap();
        assert!(cleared.payload.image.is_none());
        assert!(!dir.path().join(&second).exists());
    }

    #[tokio::test]
    async fn test_update_of_foreign_project_writes_no_file() {
        let (dir, _, service) = setup();
        let theirs = service.create(2, payload("Theirs"), None).await.unwrap();

        let err = service
            .update(1, theirs.id, payload("Mine now"), ImageChange::Replace(upload(PNG)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Ownership { .. }));
        assert_eq!(stored_files(&dir), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_image() {
        let (dir, _, service) = setup();
        let created = service.create(1, payload("Site"), Some(upload(PNG))).await.unwrap();
        let path = created.payload.image.clone().unwrap();

        service.delete(1, created.id).await.unwrap();
        assert!(!dir.path().join(path).exists());
        assert!(service.manager().list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_featured_flips_flag() {
        let (_, _, service) = setup();
        let created = service.create(1, payload("Site"), None).await.unwrap();

        let on = service.toggle_featured(1, created.id).await.unwrap();
        assert!(on.payload.is_featured);
        let off = service.toggle_featured(1, created.id).await.unwrap();
        assert!(!off.payload.is_featured);

        let err = service.toggle_featured(2, created.id).await.unwrap_err();
        assert!(matches!(err, CollectionError::Ownership { .. }));
    }
}
