use std::path::{Path, PathBuf};

use super::{StoreError, VectorIndex, validate_doc_id};

/// On-disk home for per-document vector collections.
///
/// One JSON file per `doc_id`; a save replaces the whole collection via a
/// temp-file rename, so concurrent writers resolve to last-writer-wins and
/// readers never observe a torn file.
pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn collection_path(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{doc_id}.json"))
    }

    /// Whether a persisted collection exists for `doc_id`.
    pub fn exists(&self, doc_id: &str) -> bool {
        validate_doc_id(doc_id).is_ok() && self.collection_path(doc_id).exists()
    }

    /// Persist `index` as the collection for `doc_id`, replacing any prior one.
    pub fn save(&self, doc_id: &str, index: &VectorIndex) -> Result<(), StoreError> {
        validate_doc_id(doc_id)?;
        let path = self.collection_path(doc_id);
        let tmp = self.root.join(format!("{doc_id}.json.tmp"));
        std::fs::write(&tmp, serde_json::to_vec(index)?)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(doc_id, entries = index.len(), "Vector collection saved");
        Ok(())
    }

    /// Load the collection for `doc_id`, or `None` when it has never been written.
    pub fn load(&self, doc_id: &str) -> Result<Option<VectorIndex>, StoreError> {
        validate_doc_id(doc_id)?;
        let path = self.collection_path(doc_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
