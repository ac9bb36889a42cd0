//! Document collection store
//!
//! Each document kind persists as one JSON array file in the data
//! directory (`reviews.json`, `prds.json`). Mutations are whole-file
//! read-modify-write under an exclusive advisory lock on a sibling
//! `.lock` file, so concurrent server processes cannot interleave
//! writes. Within one collection, last write wins.

use super::{atomic_write, ensure_dir, read_json, FileResult};
use crate::models::{DocumentKind, DocumentPayload, SavedDocument};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// File-backed store for one document collection
#[derive(Debug, Clone)]
pub struct DocumentStore {
    data_dir: PathBuf,
    kind: DocumentKind,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>, kind: DocumentKind) -> Self {
        DocumentStore {
            data_dir: data_dir.into(),
            kind,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn collection_path(&self) -> PathBuf {
        self.data_dir.join(self.kind.collection_file())
    }

    /// Take the collection's advisory lock. The lock lives on a sibling
    /// file because atomic writes rename over the collection itself.
    /// Released when the returned handle drops.
    fn lock(&self) -> FileResult<File> {
        ensure_dir(&self.data_dir)?;
        let lock_path = self
            .data_dir
            .join(format!("{}.lock", self.kind.collection_file()));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| format!("Failed to open lock file {:?}: {}", lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| format!("Failed to lock {:?}: {}", lock_path, e))?;
        Ok(file)
    }

    /// A missing collection file reads as an empty collection
    fn read_all(&self) -> FileResult<Vec<SavedDocument>> {
        let path = self.collection_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    fn write_all(&self, documents: &[SavedDocument]) -> FileResult<()> {
        let content = serde_json::to_string_pretty(documents)
            .map_err(|e| format!("Failed to serialize {} collection: {}", self.kind, e))?;
        atomic_write(&self.collection_path(), &content)
    }

    /// All documents, in stored (insertion) order
    pub fn list(&self) -> FileResult<Vec<SavedDocument>> {
        let _lock = self.lock()?;
        self.read_all()
    }

    pub fn get(&self, id: &str) -> FileResult<Option<SavedDocument>> {
        let _lock = self.lock()?;
        Ok(self.read_all()?.into_iter().find(|d| d.id == id))
    }

    /// Create and persist a new document shell around the given payload
    pub fn create(
        &self,
        title: impl Into<String>,
        payload: DocumentPayload,
    ) -> FileResult<SavedDocument> {
        self.check_kind(&payload)?;
        let document = SavedDocument::new(title, payload);

        let _lock = self.lock()?;
        let mut documents = self.read_all()?;
        documents.push(document.clone());
        self.write_all(&documents)?;

        log::info!("[store] Created {} {}", self.kind, document.id);
        Ok(document)
    }

    /// Persist a document the caller built, id and timestamps included.
    /// This is the REST POST path, where the client owns id generation.
    pub fn insert(&self, document: SavedDocument) -> FileResult<SavedDocument> {
        self.check_kind(&document.payload)?;

        let _lock = self.lock()?;
        let mut documents = self.read_all()?;
        if documents.iter().any(|d| d.id == document.id) {
            return Err(format!("Duplicate {} id: {}", self.kind, document.id));
        }
        documents.push(document.clone());
        self.write_all(&documents)?;

        log::info!("[store] Created {} {}", self.kind, document.id);
        Ok(document)
    }

    /// Replace a stored document wholesale, bumping `modifiedAt`. Returns
    /// `None` when no document has this id.
    pub fn update(&self, mut document: SavedDocument) -> FileResult<Option<SavedDocument>> {
        self.check_kind(&document.payload)?;
        document.modified_at = Utc::now();

        let _lock = self.lock()?;
        let mut documents = self.read_all()?;
        let Some(slot) = documents.iter_mut().find(|d| d.id == document.id) else {
            return Ok(None);
        };
        // createdAt is immutable once assigned
        document.created_at = slot.created_at;
        *slot = document.clone();
        self.write_all(&documents)?;

        log::debug!("[store] Updated {} {}", self.kind, document.id);
        Ok(Some(document))
    }

    /// Delete by id. Returns `false` when no document had this id.
    pub fn delete(&self, id: &str) -> FileResult<bool> {
        let _lock = self.lock()?;
        let mut documents = self.read_all()?;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Ok(false);
        }
        self.write_all(&documents)?;

        log::info!("[store] Deleted {} {}", self.kind, id);
        Ok(true)
    }

    fn check_kind(&self, payload: &DocumentPayload) -> FileResult<()> {
        if payload.kind() != self.kind {
            return Err(format!(
                "Payload kind {} does not match {} collection",
                payload.kind(),
                self.kind
            ));
        }
        Ok(())
    }
}

/// Data directory for stores, creating it if needed
pub fn init_data_dir(path: &Path) -> FileResult<PathBuf> {
    ensure_dir(path)?;
    log::info!("[store] Data directory: {:?}", path);
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeReviewForm, PrdForm};
    use tempfile::TempDir;

    fn review_store(temp: &TempDir) -> DocumentStore {
        DocumentStore::new(temp.path(), DocumentKind::CodeReview)
    }

    fn review_payload() -> DocumentPayload {
        DocumentPayload::CodeReview(CodeReviewForm::default())
    }

    #[test]
    fn test_list_empty_store() {
        let temp = TempDir::new().unwrap();
        assert!(review_store(&temp).list().unwrap().is_empty());
    }

    #[test]
    fn test_create_get_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);

        let created = store.create("Auth review", review_payload()).unwrap();
        let fetched = store.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Auth review");

        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_bumps_modified_and_keeps_created() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);

        let mut doc = store.create("v1", review_payload()).unwrap();
        doc.title = "v2".to_string();
        let updated = store.update(doc.clone()).unwrap().unwrap();

        assert_eq!(updated.title, "v2");
        assert_eq!(updated.created_at, doc.created_at);
        assert!(updated.modified_at >= doc.modified_at);

        let fetched = store.get(&doc.id).unwrap().unwrap();
        assert_eq!(fetched.title, "v2");
    }

    #[test]
    fn test_insert_keeps_caller_id_and_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);

        let doc = SavedDocument::new("client-made", review_payload());
        let inserted = store.insert(doc.clone()).unwrap();
        assert_eq!(inserted.id, doc.id);
        assert_eq!(inserted.created_at, doc.created_at);

        assert!(store.insert(doc).is_err());
    }

    #[test]
    fn test_update_unknown_id_is_none() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);
        let doc = SavedDocument::new("ghost", review_payload());
        assert!(store.update(doc).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);
        let doc = store.create("to delete", review_payload()).unwrap();

        assert!(store.delete(&doc.id).unwrap());
        assert!(!store.delete(&doc.id).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_collections_are_separate_files() {
        let temp = TempDir::new().unwrap();
        let reviews = review_store(&temp);
        let prds = DocumentStore::new(temp.path(), DocumentKind::Prd);

        reviews.create("review", review_payload()).unwrap();
        prds.create("prd", DocumentPayload::Prd(PrdForm::starter()))
            .unwrap();

        assert_eq!(reviews.list().unwrap().len(), 1);
        assert_eq!(prds.list().unwrap().len(), 1);
        assert!(temp.path().join("reviews.json").exists());
        assert!(temp.path().join("prds.json").exists());
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = review_store(&temp);
        let result = store.create("wrong", DocumentPayload::Prd(PrdForm::default()));
        assert!(result.is_err());
    }
}
