use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{
    AppError, DocumentSeries, DocumentTotals, LineTable, ListQuery, PricedLine, Result,
};
use crate::modules::purchase_invoices::models::PurchaseInvoice;

pub const PURCHASE_INVOICE_LINES: LineTable =
    LineTable::new("purchase_invoice_items", "purchase_invoice_id");

#[async_trait]
pub trait PurchaseInvoiceRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, invoice: &PurchaseInvoice, lines: &[PricedLine]) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<PurchaseInvoice>>;

    /// Invoice already booked under this supplier's invoice number
    async fn find_by_supplier_number(
        &self,
        supplier_id: &str,
        supplier_invoice_number: &str,
    ) -> Result<Option<PurchaseInvoice>>;

    async fn lines(&self, invoice_id: &str) -> Result<Vec<PricedLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<PurchaseInvoice>>;

    /// Persist status and stamps
    async fn update_status(&self, invoice: &PurchaseInvoice) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlPurchaseInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlPurchaseInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const INVOICE_COLUMNS: &str = "id, invoice_number, supplier_id, supplier_invoice_number, \
     supplier_lpo_id, material_receipt_id, invoice_date, due_date, currency, status, subtotal, \
     discount_total, tax_total, total_amount, notes, approved_at, paid_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: String,
    invoice_number: String,
    supplier_id: String,
    supplier_invoice_number: String,
    supplier_lpo_id: Option<String>,
    material_receipt_id: Option<String>,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    status: String,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self) -> Result<PurchaseInvoice> {
        Ok(PurchaseInvoice {
            id: self.id,
            invoice_number: self.invoice_number,
            supplier_id: self.supplier_id,
            supplier_invoice_number: self.supplier_invoice_number,
            supplier_lpo_id: self.supplier_lpo_id,
            material_receipt_id: self.material_receipt_id,
            invoice_date: self.invoice_date,
            due_date: self.due_date,
            currency: parse_stored(&self.currency)?,
            status: parse_stored(&self.status)?,
            totals: DocumentTotals {
                subtotal: self.subtotal,
                discount_total: self.discount_total,
                tax_total: self.tax_total,
                total_amount: self.total_amount,
            },
            notes: self.notes,
            approved_at: self.approved_at,
            paid_at: self.paid_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl PurchaseInvoiceRepository for MySqlPurchaseInvoiceRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "purchase_invoices",
            "invoice_number",
            DocumentSeries::PurchaseInvoice,
            date,
        )
        .await
    }

    async fn create(&self, invoice: &PurchaseInvoice, lines: &[PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO purchase_invoices ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            INVOICE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&invoice.id)
            .bind(&invoice.invoice_number)
            .bind(&invoice.supplier_id)
            .bind(&invoice.supplier_invoice_number)
            .bind(&invoice.supplier_lpo_id)
            .bind(&invoice.material_receipt_id)
            .bind(invoice.invoice_date)
            .bind(invoice.due_date)
            .bind(invoice.currency.code())
            .bind(invoice.status.as_str())
            .bind(invoice.totals.subtotal)
            .bind(invoice.totals.discount_total)
            .bind(invoice.totals.tax_total)
            .bind(invoice.totals.total_amount)
            .bind(&invoice.notes)
            .bind(invoice.approved_at)
            .bind(invoice.paid_at)
            .bind(invoice.created_at)
            .bind(invoice.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_write(
                    e,
                    &format!(
                        "Supplier invoice '{}'",
                        invoice.supplier_invoice_number
                    ),
                )
            })?;

        PURCHASE_INVOICE_LINES.insert_all(&mut tx, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PurchaseInvoice>> {
        let sql = format!("SELECT {} FROM purchase_invoices WHERE id = ?", INVOICE_COLUMNS);
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn find_by_supplier_number(
        &self,
        supplier_id: &str,
        supplier_invoice_number: &str,
    ) -> Result<Option<PurchaseInvoice>> {
        let sql = format!(
            "SELECT {} FROM purchase_invoices WHERE supplier_id = ? AND LOWER(supplier_invoice_number) = LOWER(?)",
            INVOICE_COLUMNS
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(supplier_id)
            .bind(supplier_invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn lines(&self, invoice_id: &str) -> Result<Vec<PricedLine>> {
        PURCHASE_INVOICE_LINES.fetch(&self.pool, invoice_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<PurchaseInvoice>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM purchase_invoices
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR invoice_number LIKE ? OR supplier_invoice_number LIKE ?)
            ORDER BY invoice_date DESC, invoice_number DESC
            LIMIT ? OFFSET ?
            "#,
            INVOICE_COLUMNS
        );

        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.supplier_id)
            .bind(&query.supplier_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(InvoiceRow::into_invoice).collect()
    }

    async fn update_status(&self, invoice: &PurchaseInvoice) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_invoices
            SET status = ?, approved_at = ?, paid_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(invoice.status.as_str())
        .bind(invoice.approved_at)
        .bind(invoice.paid_at)
        .bind(invoice.updated_at)
        .bind(&invoice.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Purchase invoice '{}' not found",
                invoice.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM purchase_invoice_items WHERE purchase_invoice_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM purchase_invoices WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Purchase invoice '{}'", id)))?;
        tx.commit().await?;
        Ok(())
    }
}
