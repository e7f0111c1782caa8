use std::sync::Arc;

use crate::core::traits::Repository;
use crate::core::{AppError, ListQuery, Result};
use crate::modules::inventory::models::{InventoryItem, InventoryItemRequest, StockMovement};
use crate::modules::inventory::repositories::InventoryRepository;

pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<InventoryItem>> {
        self.repo.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<InventoryItem> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Inventory item '{}' not found", id)))
    }

    pub async fn create(&self, request: InventoryItemRequest) -> Result<InventoryItem> {
        request.validate()?;
        let code = self.repo.next_code().await?;
        let item = self.repo.create(&InventoryItem::new(code, request)).await?;
        tracing::info!(id = %item.id, code = %item.item_code, "Inventory item created");
        Ok(item)
    }

    pub async fn update(&self, id: &str, request: InventoryItemRequest) -> Result<InventoryItem> {
        request.validate()?;
        let mut item = self.get(id).await?;
        item.apply(request);
        self.repo.update(&item).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;
        self.repo.delete(id).await
    }

    pub async fn movements(&self, id: &str, query: &ListQuery) -> Result<Vec<StockMovement>> {
        self.get(id).await?;
        self.repo.movements(id, query).await
    }
}
