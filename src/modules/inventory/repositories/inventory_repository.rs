use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::numbering::{master_code, next_sequence};
use crate::core::traits::Repository;
use crate::core::{AppError, ListQuery, Result};
use crate::modules::inventory::models::{InventoryItem, StockMovement, ITEM_CODE_PREFIX};

const ITEM_COLUMNS: &str = "id, item_code, name, description, category, unit, unit_cost, \
     selling_price, quantity_on_hand, reorder_level, is_active, created_at, updated_at";

#[async_trait]
pub trait InventoryRepository: Repository<InventoryItem> {
    async fn next_code(&self) -> Result<String>;

    /// Ledger rows for one item, newest first
    async fn movements(&self, item_id: &str, query: &ListQuery) -> Result<Vec<StockMovement>>;
}

pub struct MySqlInventoryRepository {
    pool: MySqlPool,
}

impl MySqlInventoryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<InventoryItem> for MySqlInventoryRepository {
    async fn create(&self, item: &InventoryItem) -> Result<InventoryItem> {
        let sql = format!(
            "INSERT INTO inventory_items ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ITEM_COLUMNS
        );

        sqlx::query(&sql)
            .bind(&item.id)
            .bind(&item.item_code)
            .bind(&item.name)
            .bind(&item.description)
            .bind(&item.category)
            .bind(&item.unit)
            .bind(item.unit_cost)
            .bind(item.selling_price)
            .bind(item.quantity_on_hand)
            .bind(item.reorder_level)
            .bind(item.is_active)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Inventory item '{}'", item.name)))?;

        Ok(item.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<InventoryItem>> {
        let sql = format!("SELECT {} FROM inventory_items WHERE id = ?", ITEM_COLUMNS);

        let item = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Never touches quantity_on_hand
    async fn update(&self, item: &InventoryItem) -> Result<InventoryItem> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET name = ?, description = ?, category = ?, unit = ?, unit_cost = ?,
                selling_price = ?, reorder_level = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.unit)
        .bind(item.unit_cost)
        .bind(item.selling_price)
        .bind(item.reorder_level)
        .bind(item.is_active)
        .bind(item.updated_at)
        .bind(&item.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, &format!("Inventory item '{}'", item.name)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Inventory item '{}' not found",
                item.id
            )));
        }

        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Inventory item '{}'", id)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Inventory item '{}' not found", id)));
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<InventoryItem>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM inventory_items
            WHERE (? IS NULL OR name LIKE ? OR item_code LIKE ? OR category LIKE ?)
            ORDER BY item_code ASC
            LIMIT ? OFFSET ?
            "#,
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

#[async_trait]
impl InventoryRepository for MySqlInventoryRepository {
    async fn next_code(&self) -> Result<String> {
        let sequence = next_sequence(
            &self.pool,
            "inventory_items",
            "item_code",
            &format!("{}-%", ITEM_CODE_PREFIX),
        )
        .await?;
        Ok(master_code(ITEM_CODE_PREFIX, sequence))
    }

    async fn movements(&self, item_id: &str, query: &ListQuery) -> Result<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, inventory_item_id, movement_type, quantity, balance_after,
                   reference_type, reference_id, reference_number, created_at
            FROM stock_movements
            WHERE inventory_item_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(item_id)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}
