// Stock changes applied inside a document's transaction.
//
// The guarded UPDATE keeps quantity_on_hand non-negative even under
// concurrent completions; the movement row records the resulting balance.

use rust_decimal::Decimal;
use sqlx::{MySql, Transaction};
use uuid::Uuid;

use crate::core::{AppError, Result};
use crate::modules::inventory::models::StockChange;

/// Apply one change and append its ledger row
pub async fn apply_stock_change(
    tx: &mut Transaction<'_, MySql>,
    reference_type: &str,
    change: &StockChange,
) -> Result<Decimal> {
    let delta = change.signed_quantity();

    let result = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity_on_hand = quantity_on_hand + ?, updated_at = NOW()
        WHERE id = ? AND quantity_on_hand + ? >= 0
        "#,
    )
    .bind(delta)
    .bind(&change.inventory_item_id)
    .bind(delta)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        let current: Option<(String, Decimal)> = sqlx::query_as(
            "SELECT item_code, quantity_on_hand FROM inventory_items WHERE id = ?",
        )
        .bind(&change.inventory_item_id)
        .fetch_optional(&mut **tx)
        .await?;

        return Err(match current {
            Some((code, on_hand)) => AppError::InsufficientStock(format!(
                "Item '{}' has {} on hand, cannot remove {}",
                code,
                on_hand,
                change.quantity
            )),
            None => AppError::not_found(format!(
                "Inventory item '{}' not found",
                change.inventory_item_id
            )),
        });
    }

    let balance: Decimal =
        sqlx::query_scalar("SELECT quantity_on_hand FROM inventory_items WHERE id = ?")
            .bind(&change.inventory_item_id)
            .fetch_one(&mut **tx)
            .await?;

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, inventory_item_id, movement_type, quantity, balance_after,
            reference_type, reference_id, reference_number, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&change.inventory_item_id)
    .bind(change.movement_type.as_str())
    .bind(delta)
    .bind(balance)
    .bind(reference_type)
    .bind(&change.reference_id)
    .bind(&change.reference_number)
    .execute(&mut **tx)
    .await?;

    tracing::debug!(
        item_id = %change.inventory_item_id,
        movement = %change.movement_type,
        quantity = %delta,
        balance = %balance,
        reference = %change.reference_number,
        "Stock movement recorded"
    );

    Ok(balance)
}

/// Apply every change of a document in line order
pub async fn apply_stock_changes(
    tx: &mut Transaction<'_, MySql>,
    reference_type: &str,
    changes: &[StockChange],
) -> Result<()> {
    for change in changes {
        apply_stock_change(tx, reference_type, change).await?;
    }
    Ok(())
}
