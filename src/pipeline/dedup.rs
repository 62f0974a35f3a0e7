use crate::error::Result;
use crate::storage::Store;
use crate::types::CanonicalRecord;
use std::sync::Arc;

/// Coarse duplicate check: same title OR same url for the same user, in any
/// category. Generic titles shared by unrelated postings collide; no fuzzy
/// matching is attempted.
#[derive(Clone)]
pub struct Deduplicator {
    store: Arc<dyn Store>,
}

impl Deduplicator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn is_duplicate(&self, user_id: &str, record: &CanonicalRecord) -> Result<bool> {
        if record.title.is_none() && record.url.is_none() {
            return Ok(false);
        }
        self.store
            .exists_by_title_or_url(user_id, record.title.as_deref(), record.url.as_deref())
            .await
    }
}
