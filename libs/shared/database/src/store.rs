use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;
use crate::query::Query;

/// A row type that can live in a `RecordStore` table.
///
/// Ids are assigned by the store on insert; whatever id the caller put on a new
/// record is ignored.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);
}

#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError>;

    /// Replaces the stored row with the same id. Fails with `StoreError::NotFound`
    /// when no such row exists.
    async fn update(&self, record: R) -> Result<R, StoreError>;

    /// Hard delete. Returns whether a row was removed.
    async fn remove(&self, id: i64) -> Result<bool, StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<R>, StoreError>;

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        Ok(self.query(query).await?.len())
    }

    async fn exists(&self, query: &Query) -> Result<bool, StoreError> {
        Ok(self.count(query).await? > 0)
    }
}
