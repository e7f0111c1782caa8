use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, FieldError, ListQuery, PricedLine, Result, StatusFlow};
use crate::modules::inventory::models::{stock_changes, sum_by};
use crate::modules::inventory::{
    InventoryItem, InventoryRepository, MovementType, StockLine, StockLineInput,
};
use crate::modules::material_receipts::models::{
    CreateMaterialReceiptRequest, MaterialReceipt, MaterialReceiptDetail, ReceiptStatus,
};
use crate::modules::material_receipts::repositories::MaterialReceiptRepository;
use crate::modules::parties::PartyRepository;
use crate::modules::supplier_lpos::{SupplierLpo, SupplierLpoRepository};

/// A draft receipt can only be booked while its LPO is still released
pub fn ensure_lpo_open(lpo: Option<SupplierLpo>, receipt_number: &str) -> Result<()> {
    match lpo {
        Some(lpo) if lpo.status.is_released() => Ok(()),
        Some(lpo) => Err(AppError::InvalidTransition(format!(
            "Supplier LPO {} is {}; material receipt {} can no longer be completed",
            lpo.lpo_number, lpo.status, receipt_number
        ))),
        None => Err(AppError::InvalidTransition(format!(
            "Supplier LPO of material receipt {} no longer exists",
            receipt_number
        ))),
    }
}

/// Refuse receipts that would take an LPO line past its ordered quantity
pub fn ensure_within_ordered(
    lpo_number: &str,
    ordered: &[PricedLine],
    already_received: &[(String, Decimal)],
    requested: &[(String, Decimal)],
) -> Result<()> {
    let mut errors = Vec::new();

    for (line_id, quantity) in requested {
        let Some(line) = ordered.iter().find(|l| &l.id == line_id) else {
            continue;
        };
        let received = already_received
            .iter()
            .find(|(id, _)| id == line_id)
            .map(|(_, q)| *q)
            .unwrap_or(Decimal::ZERO);

        if received + quantity > line.quantity {
            errors.push(FieldError::new(
                format!("line {}", line.line_number),
                format!(
                    "Receiving {} of '{}' exceeds the {} ordered on {} ({} already received)",
                    quantity, line.description, line.quantity, lpo_number, received
                ),
            ));
        }
    }

    AppError::from_fields(errors)
}

pub struct MaterialReceiptService {
    repo: Arc<dyn MaterialReceiptRepository>,
    suppliers: Arc<dyn PartyRepository>,
    lpos: Arc<dyn SupplierLpoRepository>,
    inventory: Arc<dyn InventoryRepository>,
}

impl MaterialReceiptService {
    pub fn new(
        repo: Arc<dyn MaterialReceiptRepository>,
        suppliers: Arc<dyn PartyRepository>,
        lpos: Arc<dyn SupplierLpoRepository>,
        inventory: Arc<dyn InventoryRepository>,
    ) -> Self {
        Self {
            repo,
            suppliers,
            lpos,
            inventory,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<MaterialReceipt>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<ReceiptStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<MaterialReceipt> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Material receipt '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<MaterialReceiptDetail> {
        let receipt = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(MaterialReceiptDetail { receipt, items })
    }

    pub async fn create(
        &self,
        request: CreateMaterialReceiptRequest,
    ) -> Result<MaterialReceiptDetail> {
        request.validate()?;
        let date = request.receipt_date.unwrap_or_else(|| Utc::now().date_naive());

        let (receipt, items) = match clean(request.supplier_lpo_id.clone()) {
            Some(lpo_id) => {
                let lpo = self.lpos.find_by_id(&lpo_id).await?.ok_or_else(|| {
                    AppError::validation(format!("Supplier LPO '{}' does not exist", lpo_id))
                })?;
                if !lpo.status.is_released() {
                    return Err(AppError::validation(format!(
                        "Supplier LPO {} is {}; goods can only be received once it is approved",
                        lpo.lpo_number, lpo.status
                    )));
                }
                if let Some(supplier_id) = clean(request.supplier_id.clone()) {
                    if supplier_id != lpo.supplier_id {
                        return Err(AppError::validation(format!(
                            "Supplier LPO {} belongs to a different supplier",
                            lpo.lpo_number
                        )));
                    }
                }

                let ordered = self.lpos.lines(&lpo_id).await?;
                let number = self.repo.next_number(date).await?;
                let receipt = MaterialReceipt::new(number, lpo.supplier_id.clone(), &request);
                let items = self.lines_from_lpo(&receipt.id, &ordered, &request.items).await?;

                let received = self.repo.lines_for_lpo(&lpo_id).await?;
                ensure_within_ordered(
                    &lpo.lpo_number,
                    &ordered,
                    &sum_by(&received, |l| l.source_line_id.clone()),
                    &sum_by(&items, |l| l.source_line_id.clone()),
                )?;
                (receipt, items)
            }
            None => {
                let supplier_id = clean(request.supplier_id.clone()).unwrap_or_default();
                if self.suppliers.find_by_id(&supplier_id).await?.is_none() {
                    return Err(AppError::validation(format!(
                        "Supplier '{}' does not exist",
                        supplier_id
                    )));
                }
                let number = self.repo.next_number(date).await?;
                let receipt = MaterialReceipt::new(number, supplier_id, &request);
                let items = self.free_lines(&receipt.id, &request.items).await?;
                (receipt, items)
            }
        };

        self.repo.create(&receipt, &items).await?;
        tracing::info!(
            id = %receipt.id,
            number = %receipt.receipt_number,
            lpo_id = ?receipt.supplier_lpo_id,
            lines = items.len(),
            "Material receipt created"
        );

        Ok(MaterialReceiptDetail { receipt, items })
    }

    async fn lines_from_lpo(
        &self,
        receipt_id: &str,
        ordered: &[PricedLine],
        inputs: &[StockLineInput],
    ) -> Result<Vec<StockLine>> {
        let mut lines = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().enumerate() {
            let source_id = clean(input.source_line_id.clone()).unwrap_or_default();
            let source = ordered.iter().find(|l| l.id == source_id).ok_or_else(|| {
                AppError::FieldValidation(vec![FieldError::new(
                    format!("items[{}].source_line_id", idx),
                    format!("'{}' is not a line of this LPO", source_id),
                )])
            })?;

            let item_id = clean(input.inventory_item_id.clone())
                .or_else(|| source.inventory_item_id.clone())
                .ok_or_else(|| {
                    AppError::FieldValidation(vec![FieldError::new(
                        format!("items[{}].inventory_item_id", idx),
                        "The LPO line has no inventory item; inventory_item_id is required",
                    )])
                })?;
            self.ensure_item_exists(&item_id).await?;

            lines.push(StockLine::new(
                receipt_id,
                idx as i32 + 1,
                item_id,
                clean(input.description.clone()).unwrap_or_else(|| source.description.clone()),
                clean(input.unit.clone()).or_else(|| Some(source.unit.clone())),
                input,
            ));
        }
        Ok(lines)
    }

    async fn free_lines(&self, receipt_id: &str, inputs: &[StockLineInput]) -> Result<Vec<StockLine>> {
        let mut lines = Vec::with_capacity(inputs.len());
        for (idx, input) in inputs.iter().enumerate() {
            let item_id = clean(input.inventory_item_id.clone()).unwrap_or_default();
            let item = self.ensure_item_exists(&item_id).await?;
            lines.push(StockLine::new(
                receipt_id,
                idx as i32 + 1,
                item.id,
                clean(input.description.clone()).unwrap_or(item.name),
                clean(input.unit.clone()).or(Some(item.unit)),
                input,
            ));
        }
        Ok(lines)
    }

    async fn ensure_item_exists(&self, item_id: &str) -> Result<InventoryItem> {
        self.inventory.find_by_id(item_id).await?.ok_or_else(|| {
            AppError::validation(format!("Inventory item '{}' does not exist", item_id))
        })
    }

    /// Book the received quantities into stock
    pub async fn complete(&self, id: &str) -> Result<MaterialReceiptDetail> {
        let MaterialReceiptDetail { mut receipt, items } = self.get(id).await?;
        receipt.status.ensure_transition(ReceiptStatus::Completed)?;
        if let Some(lpo_id) = &receipt.supplier_lpo_id {
            ensure_lpo_open(self.lpos.find_by_id(lpo_id).await?, &receipt.receipt_number)?;
        }

        let changes = stock_changes(&items, MovementType::Receipt, &receipt.id, &receipt.receipt_number);
        let now = Utc::now();
        receipt.status = ReceiptStatus::Completed;
        receipt.completed_at = Some(now);
        receipt.updated_at = now;

        self.repo.complete(&receipt, &changes).await?;
        tracing::info!(
            id = %receipt.id,
            number = %receipt.receipt_number,
            lines = changes.len(),
            "Material receipt completed, stock received"
        );

        Ok(MaterialReceiptDetail { receipt, items })
    }

    pub async fn cancel(&self, id: &str) -> Result<MaterialReceipt> {
        let mut receipt = self.find(id).await?;
        receipt.status.ensure_transition(ReceiptStatus::Cancelled)?;
        self.repo.cancel(id).await?;

        tracing::info!(id = %id, number = %receipt.receipt_number, "Material receipt cancelled");
        receipt.status = ReceiptStatus::Cancelled;
        receipt.updated_at = Utc::now();
        Ok(receipt)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let receipt = self.find(id).await?;
        if receipt.status != ReceiptStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Material receipt {} is {}; only drafts can be deleted",
                receipt.receipt_number, receipt.status
            )));
        }
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %receipt.receipt_number, "Material receipt deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Currency, LineItemInput};
    use rust_decimal_macros::dec;

    fn ordered_line(quantity: Decimal) -> PricedLine {
        PricedLine::new(
            "lpo-1",
            1,
            Currency::USD,
            LineItemInput {
                inventory_item_id: Some("item-1".into()),
                description: "Copper cable".into(),
                quantity,
                unit: Some("m".into()),
                unit_price: dec!(2),
                discount_percent: Decimal::ZERO,
                tax_percent: Decimal::ZERO,
                notes: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_receipt_up_to_ordered_quantity_is_allowed() {
        let line = ordered_line(dec!(10));
        let already = vec![(line.id.clone(), dec!(6))];
        let requested = vec![(line.id.clone(), dec!(4))];
        assert!(ensure_within_ordered("LPO-2026-0001", &[line], &already, &requested).is_ok());
    }

    #[test]
    fn test_over_receipt_is_rejected() {
        let line = ordered_line(dec!(10));
        let already = vec![(line.id.clone(), dec!(6))];
        let requested = vec![(line.id.clone(), dec!(4.001))];
        match ensure_within_ordered("LPO-2026-0001", &[line], &already, &requested) {
            Err(AppError::FieldValidation(fields)) => {
                assert!(fields[0].message.contains("exceeds the 10 ordered"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_receipt_completes_only_against_released_lpo() {
        use crate::modules::supplier_lpos::models::CreateSupplierLpoRequest;
        use crate::modules::supplier_lpos::LpoStatus;

        let request: CreateSupplierLpoRequest =
            serde_json::from_value(serde_json::json!({"supplier_id": "sup-1"})).unwrap();
        let mut lpo = SupplierLpo::new("LPO-2026-0007".into(), &request);

        lpo.status = LpoStatus::SentToSupplier;
        assert!(ensure_lpo_open(Some(lpo.clone()), "MR-2026-0001").is_ok());

        lpo.status = LpoStatus::Cancelled;
        let err = ensure_lpo_open(Some(lpo), "MR-2026-0001").unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(matches!(
            ensure_lpo_open(None, "MR-2026-0001"),
            Err(AppError::InvalidTransition(_))
        ));
    }
}
