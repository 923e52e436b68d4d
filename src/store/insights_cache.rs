use std::path::{Path, PathBuf};

use crate::insights::InsightRecord;

use super::{StoreError, validate_doc_id};

/// Durable cache of the last computed insight record per document.
///
/// A record is written exactly once per successful processing run and
/// overwritten wholesale on reprocessing. An absent record while ingestion
/// is in flight is an expected state, not a failure.
pub struct InsightStore {
    root: PathBuf,
}

impl InsightStore {
    /// Open (and create if needed) a cache rooted at `root`.
    pub fn new(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn record_path(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{doc_id}.json"))
    }

    /// Persist `record` for `doc_id`, atomically replacing any prior record.
    pub fn put(&self, doc_id: &str, record: &InsightRecord) -> Result<(), StoreError> {
        validate_doc_id(doc_id)?;
        let tmp = self.root.join(format!("{doc_id}.json.tmp"));
        std::fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        std::fs::rename(&tmp, self.record_path(doc_id))?;
        tracing::debug!(doc_id, "Insight record saved");
        Ok(())
    }

    /// Look up the record for `doc_id`, or `None` when none has been written.
    pub fn get(&self, doc_id: &str) -> Result<Option<InsightRecord>, StoreError> {
        validate_doc_id(doc_id)?;
        let path = self.record_path(doc_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
