use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::validation::clean;
use crate::core::{AppError, FieldError, ListQuery, Result, StatusFlow};
use crate::modules::inventory::models::{stock_changes, sum_by};
use crate::modules::inventory::{MovementType, StockLine};
use crate::modules::material_receipts::{MaterialReceiptRepository, ReceiptStatus};
use crate::modules::receipt_returns::models::{
    CreateReceiptReturnRequest, ReceiptReturn, ReceiptReturnDetail, ReturnStatus,
};
use crate::modules::receipt_returns::repositories::ReceiptReturnRepository;

/// Refuse returns that would send back more than a receipt line brought in
pub fn ensure_within_received(
    receipt_number: &str,
    received: &[StockLine],
    already_returned: &[(String, Decimal)],
    requested: &[(String, Decimal)],
) -> Result<()> {
    let mut errors = Vec::new();

    for (line_id, quantity) in requested {
        let Some(line) = received.iter().find(|l| &l.id == line_id) else {
            continue;
        };
        let returned = already_returned
            .iter()
            .find(|(id, _)| id == line_id)
            .map(|(_, q)| *q)
            .unwrap_or(Decimal::ZERO);

        if returned + quantity > line.quantity {
            errors.push(FieldError::new(
                format!("line {}", line.line_number),
                format!(
                    "Returning {} of '{}' exceeds the {} received on {} ({} already returned)",
                    quantity, line.description, line.quantity, receipt_number, returned
                ),
            ));
        }
    }

    AppError::from_fields(errors)
}

pub struct ReceiptReturnService {
    repo: Arc<dyn ReceiptReturnRepository>,
    receipts: Arc<dyn MaterialReceiptRepository>,
}

impl ReceiptReturnService {
    pub fn new(
        repo: Arc<dyn ReceiptReturnRepository>,
        receipts: Arc<dyn MaterialReceiptRepository>,
    ) -> Self {
        Self { repo, receipts }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<ReceiptReturn>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<ReturnStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<ReceiptReturn> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Receipt return '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<ReceiptReturnDetail> {
        let receipt_return = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(ReceiptReturnDetail {
            receipt_return,
            items,
        })
    }

    pub async fn create(&self, request: CreateReceiptReturnRequest) -> Result<ReceiptReturnDetail> {
        request.validate()?;

        let receipt_id = request.material_receipt_id.trim();
        let receipt = self.receipts.find_by_id(receipt_id).await?.ok_or_else(|| {
            AppError::validation(format!("Material receipt '{}' does not exist", receipt_id))
        })?;
        if receipt.status != ReceiptStatus::Completed {
            return Err(AppError::validation(format!(
                "Material receipt {} is {}; only completed receipts can be returned",
                receipt.receipt_number, receipt.status
            )));
        }

        let received = self.receipts.lines(&receipt.id).await?;
        let date = request.return_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let receipt_return = ReceiptReturn::new(number, receipt.supplier_id.clone(), &request);

        let mut items = Vec::with_capacity(request.items.len());
        for (idx, input) in request.items.iter().enumerate() {
            let source_id = clean(input.source_line_id.clone()).unwrap_or_default();
            let source = received.iter().find(|l| l.id == source_id).ok_or_else(|| {
                AppError::FieldValidation(vec![FieldError::new(
                    format!("items[{}].source_line_id", idx),
                    format!(
                        "'{}' is not a line of receipt {}",
                        source_id, receipt.receipt_number
                    ),
                )])
            })?;
            if let Some(item_id) = clean(input.inventory_item_id.clone()) {
                if item_id != source.inventory_item_id {
                    return Err(AppError::FieldValidation(vec![FieldError::new(
                        format!("items[{}].inventory_item_id", idx),
                        "A return must be for the item that was received",
                    )]));
                }
            }

            items.push(StockLine::new(
                &receipt_return.id,
                idx as i32 + 1,
                source.inventory_item_id.clone(),
                clean(input.description.clone()).unwrap_or_else(|| source.description.clone()),
                Some(source.unit.clone()),
                input,
            ));
        }

        let returned = self.repo.lines_for_receipt(&receipt.id).await?;
        ensure_within_received(
            &receipt.receipt_number,
            &received,
            &sum_by(&returned, |l| l.source_line_id.clone()),
            &sum_by(&items, |l| l.source_line_id.clone()),
        )?;

        self.repo.create(&receipt_return, &items).await?;
        tracing::info!(
            id = %receipt_return.id,
            number = %receipt_return.return_number,
            receipt = %receipt.receipt_number,
            "Receipt return created"
        );

        Ok(ReceiptReturnDetail {
            receipt_return,
            items,
        })
    }

    /// Take the returned quantities out of stock
    pub async fn complete(&self, id: &str) -> Result<ReceiptReturnDetail> {
        let ReceiptReturnDetail {
            mut receipt_return,
            items,
        } = self.get(id).await?;
        receipt_return.status.ensure_transition(ReturnStatus::Completed)?;

        let changes = stock_changes(
            &items,
            MovementType::ReceiptReturn,
            &receipt_return.id,
            &receipt_return.return_number,
        );
        let now = Utc::now();
        receipt_return.status = ReturnStatus::Completed;
        receipt_return.completed_at = Some(now);
        receipt_return.updated_at = now;

        self.repo.complete(&receipt_return, &changes).await?;
        tracing::info!(
            id = %receipt_return.id,
            number = %receipt_return.return_number,
            "Receipt return completed, stock removed"
        );

        Ok(ReceiptReturnDetail {
            receipt_return,
            items,
        })
    }

    pub async fn cancel(&self, id: &str) -> Result<ReceiptReturn> {
        let mut receipt_return = self.find(id).await?;
        receipt_return.status.ensure_transition(ReturnStatus::Cancelled)?;
        self.repo.cancel(id).await?;

        receipt_return.status = ReturnStatus::Cancelled;
        receipt_return.updated_at = Utc::now();
        Ok(receipt_return)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let receipt_return = self.find(id).await?;
        if receipt_return.status != ReturnStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Receipt return {} is {}; only drafts can be deleted",
                receipt_return.return_number, receipt_return.status
            )));
        }
        self.repo.delete(id).await
    }
}
