use std::sync::Arc;

use crate::core::line_items::build_lines;
use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, ListQuery, Result, StatusFlow};
use crate::modules::material_receipts::{MaterialReceiptRepository, ReceiptStatus};
use crate::modules::parties::PartyRepository;
use crate::modules::purchase_invoices::models::{
    CreatePurchaseInvoiceRequest, PurchaseInvoice, PurchaseInvoiceDetail, PurchaseInvoiceStatus,
};
use crate::modules::purchase_invoices::repositories::PurchaseInvoiceRepository;
use crate::modules::supplier_lpos::SupplierLpoRepository;

pub struct PurchaseInvoiceService {
    repo: Arc<dyn PurchaseInvoiceRepository>,
    suppliers: Arc<dyn PartyRepository>,
    lpos: Arc<dyn SupplierLpoRepository>,
    receipts: Arc<dyn MaterialReceiptRepository>,
}

impl PurchaseInvoiceService {
    pub fn new(
        repo: Arc<dyn PurchaseInvoiceRepository>,
        suppliers: Arc<dyn PartyRepository>,
        lpos: Arc<dyn SupplierLpoRepository>,
        receipts: Arc<dyn MaterialReceiptRepository>,
    ) -> Self {
        Self {
            repo,
            suppliers,
            lpos,
            receipts,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<PurchaseInvoice>> {
        if let Some(status) = query.status.as_deref() {
            status
                .parse::<PurchaseInvoiceStatus>()
                .map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<PurchaseInvoice> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Purchase invoice '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<PurchaseInvoiceDetail> {
        let invoice = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(PurchaseInvoiceDetail { invoice, items })
    }

    pub async fn create(
        &self,
        request: CreatePurchaseInvoiceRequest,
    ) -> Result<PurchaseInvoiceDetail> {
        request.validate()?;

        let supplier_id = request.supplier_id.trim();
        let supplier = self.suppliers.find_by_id(supplier_id).await?.ok_or_else(|| {
            AppError::validation(format!("Supplier '{}' does not exist", supplier_id))
        })?;

        let supplier_number = request.supplier_invoice_number.trim();
        if let Some(existing) = self
            .repo
            .find_by_supplier_number(supplier_id, supplier_number)
            .await?
        {
            return Err(AppError::conflict(format!(
                "Supplier invoice '{}' from {} is already booked as {}",
                supplier_number, supplier.name, existing.invoice_number
            )));
        }

        if let Some(lpo_id) = clean(request.supplier_lpo_id.clone()) {
            let lpo = self.lpos.find_by_id(&lpo_id).await?.ok_or_else(|| {
                AppError::validation(format!("Supplier LPO '{}' does not exist", lpo_id))
            })?;
            if lpo.supplier_id != supplier.id {
                return Err(AppError::validation(format!(
                    "Supplier LPO {} belongs to a different supplier",
                    lpo.lpo_number
                )));
            }
        }
        if let Some(receipt_id) = clean(request.material_receipt_id.clone()) {
            let receipt = self.receipts.find_by_id(&receipt_id).await?.ok_or_else(|| {
                AppError::validation(format!("Material receipt '{}' does not exist", receipt_id))
            })?;
            if receipt.supplier_id != supplier.id {
                return Err(AppError::validation(format!(
                    "Material receipt {} belongs to a different supplier",
                    receipt.receipt_number
                )));
            }
            if receipt.status != ReceiptStatus::Completed {
                return Err(AppError::validation(format!(
                    "Material receipt {} is {}; only completed receipts can be invoiced",
                    receipt.receipt_number, receipt.status
                )));
            }
        }

        let number = self.repo.next_number(request.invoice_date()).await?;
        let mut invoice = PurchaseInvoice::new(number, &request, supplier.payment_terms_days);
        let (items, totals) = build_lines(&invoice.id, invoice.currency, request.items)?;
        invoice.totals = totals;

        self.repo.create(&invoice, &items).await?;
        tracing::info!(
            id = %invoice.id,
            number = %invoice.invoice_number,
            supplier_invoice = %invoice.supplier_invoice_number,
            total = %invoice.totals.total_amount,
            "Purchase invoice created"
        );

        Ok(PurchaseInvoiceDetail { invoice, items })
    }

    pub async fn change_status(
        &self,
        id: &str,
        status: PurchaseInvoiceStatus,
    ) -> Result<PurchaseInvoice> {
        let mut invoice = self.find(id).await?;
        let from = invoice.status;
        from.ensure_transition(status)?;

        invoice.stamp(status);
        self.repo.update_status(&invoice).await?;
        tracing::info!(id = %id, from = %from, to = %status, "Purchase invoice status changed");
        Ok(invoice)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let invoice = self.find(id).await?;
        if invoice.status != PurchaseInvoiceStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Purchase invoice {} is {}; only drafts can be deleted",
                invoice.invoice_number, invoice.status
            )));
        }
        self.repo.delete(id).await
    }
}
