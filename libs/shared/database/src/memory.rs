use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::query::Query;
use crate::store::{Record, RecordStore};

/// In-process table keyed by id. Ids start at 1 and are never reused.
pub struct MemoryStore<R> {
    rows: RwLock<BTreeMap<i64, R>>,
    next_id: AtomicI64,
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.set_id(id);

        self.rows.write().await.insert(id, record.clone());
        debug!("Inserted row {} into {}", id, R::TABLE);
        Ok(record)
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update(&self, record: R) -> Result<R, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound {
                table: R::TABLE,
                id: record.id(),
            }),
        }
    }

    async fn remove(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn query(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let rows = self.rows.read().await;

        let mut matched = Vec::new();
        for record in rows.values() {
            let json = serde_json::to_value(record)?;
            if query.matches(&json) {
                matched.push((json, record.clone()));
            }
        }

        // BTreeMap iteration is by id, so the stable sort breaks ties by id.
        matched.sort_by(|(a, _), (b, _)| query.compare_rows(a, b));
        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }
}
