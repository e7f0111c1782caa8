use async_trait::async_trait;

use crate::core::pagination::ListQuery;
use crate::core::Result;

/// Base repository trait for master data CRUD operations
/// Master data repositories implement this trait for consistency
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Insert a new record
    async fn create(&self, entity: &T) -> Result<T>;

    /// Find record by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<T>>;

    /// Update an existing record
    async fn update(&self, entity: &T) -> Result<T>;

    /// Delete a record by ID
    async fn delete(&self, id: &str) -> Result<()>;

    /// List records with search and pagination
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>>;
}
