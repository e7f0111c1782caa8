use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use crate::core::numbering::next_document_number;
use crate::core::status::parse_stored;
use crate::core::{
    AppError, DocumentSeries, DocumentTotals, LineTable, ListQuery, PricedLine, Result,
};
use crate::modules::sales_orders::models::{SalesOrder, SalesOrderStatus};

pub const SALES_ORDER_LINES: LineTable = LineTable::new("sales_order_items", "sales_order_id");

#[async_trait]
pub trait SalesOrderRepository: Send + Sync {
    async fn next_number(&self, date: NaiveDate) -> Result<String>;

    async fn create(&self, order: &SalesOrder, lines: &[PricedLine]) -> Result<()>;

    /// Create the order and link the quotation to it in one transaction.
    /// Fails with Conflict when the quotation was already converted.
    async fn create_from_quotation(
        &self,
        quotation_id: &str,
        order: &SalesOrder,
        lines: &[PricedLine],
    ) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<SalesOrder>>;

    async fn lines(&self, order_id: &str) -> Result<Vec<PricedLine>>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<SalesOrder>>;

    async fn update_status(&self, id: &str, status: SalesOrderStatus) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct MySqlSalesOrderRepository {
    pool: MySqlPool,
}

impl MySqlSalesOrderRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn insert(
        tx: &mut Transaction<'_, MySql>,
        order: &SalesOrder,
        lines: &[PricedLine],
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO sales_orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ORDER_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&order.id)
            .bind(&order.order_number)
            .bind(&order.customer_id)
            .bind(&order.quotation_id)
            .bind(order.order_date)
            .bind(order.delivery_date)
            .bind(&order.customer_reference)
            .bind(order.currency.code())
            .bind(order.status.as_str())
            .bind(order.totals.subtotal)
            .bind(order.totals.discount_total)
            .bind(order.totals.tax_total)
            .bind(order.totals.total_amount)
            .bind(&order.notes)
            .bind(&order.terms)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Sales order '{}'", order.order_number)))?;

        SALES_ORDER_LINES.insert_all(tx, lines).await
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, quotation_id, order_date, \
     delivery_date, customer_reference, currency, status, subtotal, discount_total, tax_total, \
     total_amount, notes, terms, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SalesOrderRow {
    id: String,
    order_number: String,
    customer_id: String,
    quotation_id: Option<String>,
    order_date: NaiveDate,
    delivery_date: Option<NaiveDate>,
    customer_reference: Option<String>,
    currency: String,
    status: String,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total_amount: Decimal,
    notes: Option<String>,
    terms: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SalesOrderRow {
    fn into_order(self) -> Result<SalesOrder> {
        Ok(SalesOrder {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            quotation_id: self.quotation_id,
            order_date: self.order_date,
            delivery_date: self.delivery_date,
            customer_reference: self.customer_reference,
            currency: parse_stored(&self.currency)?,
            status: parse_stored(&self.status)?,
            totals: DocumentTotals {
                subtotal: self.subtotal,
                discount_total: self.discount_total,
                tax_total: self.tax_total,
                total_amount: self.total_amount,
            },
            notes: self.notes,
            terms: self.terms,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl SalesOrderRepository for MySqlSalesOrderRepository {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        next_document_number(
            &self.pool,
            "sales_orders",
            "order_number",
            DocumentSeries::SalesOrder,
            date,
        )
        .await
    }

    async fn create(&self, order: &SalesOrder, lines: &[PricedLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::insert(&mut tx, order, lines).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_from_quotation(
        &self,
        quotation_id: &str,
        order: &SalesOrder,
        lines: &[PricedLine],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        Self::insert(&mut tx, order, lines).await?;

        let claimed = sqlx::query(
            r#"
            UPDATE quotations
            SET sales_order_id = ?, updated_at = NOW()
            WHERE id = ? AND sales_order_id IS NULL
            "#,
        )
        .bind(&order.id)
        .bind(quotation_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Quotation '{}' has already been converted to an order",
                quotation_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SalesOrder>> {
        let sql = format!("SELECT {} FROM sales_orders WHERE id = ?", ORDER_COLUMNS);
        let row = sqlx::query_as::<_, SalesOrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SalesOrderRow::into_order).transpose()
    }

    async fn lines(&self, order_id: &str) -> Result<Vec<PricedLine>> {
        SALES_ORDER_LINES.fetch(&self.pool, order_id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SalesOrder>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM sales_orders
            WHERE (? IS NULL OR status = ?)
              AND (? IS NULL OR customer_id = ?)
              AND (? IS NULL OR order_number LIKE ? OR customer_reference LIKE ?)
            ORDER BY order_date DESC, order_number DESC
            LIMIT ? OFFSET ?
            "#,
            ORDER_COLUMNS
        );

        let rows = sqlx::query_as::<_, SalesOrderRow>(&sql)
            .bind(&query.status)
            .bind(&query.status)
            .bind(&query.customer_id)
            .bind(&query.customer_id)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SalesOrderRow::into_order).collect()
    }

    async fn update_status(&self, id: &str, status: SalesOrderStatus) -> Result<()> {
        let result = sqlx::query("UPDATE sales_orders SET status = ?, updated_at = NOW() WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Sales order '{}' not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Release the quotation so it can be converted again
        sqlx::query("UPDATE quotations SET sales_order_id = NULL WHERE sales_order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales_order_items WHERE sales_order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales_orders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, &format!("Sales order '{}'", id)))?;

        tx.commit().await?;
        Ok(())
    }
}
