use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::Result;
use crate::modules::inventory::models::StockLine;

/// A stock line table, its parent column and the optional column linking to a source line
#[derive(Debug, Clone, Copy)]
pub struct StockLineTable {
    pub table: &'static str,
    pub parent_column: &'static str,
    pub source_column: Option<&'static str>,
}

impl StockLineTable {
    pub const fn new(
        table: &'static str,
        parent_column: &'static str,
        source_column: Option<&'static str>,
    ) -> Self {
        Self {
            table,
            parent_column,
            source_column,
        }
    }

    fn source_select(&self) -> String {
        match self.source_column {
            Some(column) => format!("{} AS source_line_id", column),
            None => "CAST(NULL AS CHAR(36)) AS source_line_id".to_string(),
        }
    }

    pub async fn fetch(&self, pool: &MySqlPool, document_id: &str) -> Result<Vec<StockLine>> {
        let sql = format!(
            r#"
            SELECT id, {parent} AS document_id, line_number, {source}, inventory_item_id,
                   description, quantity, unit, notes
            FROM {table}
            WHERE {parent} = ?
            ORDER BY line_number ASC
            "#,
            parent = self.parent_column,
            source = self.source_select(),
            table = self.table,
        );

        let lines = sqlx::query_as::<_, StockLine>(&sql)
            .bind(document_id)
            .fetch_all(pool)
            .await?;
        Ok(lines)
    }

    /// Lines of every document whose id is returned by `parent_filter`.
    ///
    /// `parent_filter` is a trusted subquery with a single `?` placeholder.
    pub async fn fetch_where(
        &self,
        pool: &MySqlPool,
        parent_filter: &str,
        value: &str,
    ) -> Result<Vec<StockLine>> {
        let sql = format!(
            r#"
            SELECT id, {parent} AS document_id, line_number, {source}, inventory_item_id,
                   description, quantity, unit, notes
            FROM {table}
            WHERE {parent} IN ({filter})
            "#,
            parent = self.parent_column,
            source = self.source_select(),
            table = self.table,
            filter = parent_filter,
        );

        let lines = sqlx::query_as::<_, StockLine>(&sql)
            .bind(value)
            .fetch_all(pool)
            .await?;
        Ok(lines)
    }

    pub async fn insert_all(
        &self,
        tx: &mut Transaction<'_, MySql>,
        lines: &[StockLine],
    ) -> Result<()> {
        let (source_column, source_marker) = match self.source_column {
            Some(column) => (format!(", {}", column), ", ?"),
            None => (String::new(), ""),
        };
        let sql = format!(
            r#"
            INSERT INTO {table} (
                id, {parent}, line_number, inventory_item_id, description,
                quantity, unit, notes{source_column}
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?{source_marker})
            "#,
            table = self.table,
            parent = self.parent_column,
            source_column = source_column,
            source_marker = source_marker,
        );

        for line in lines {
            let mut query = sqlx::query(&sql)
                .bind(&line.id)
                .bind(&line.document_id)
                .bind(line.line_number)
                .bind(&line.inventory_item_id)
                .bind(&line.description)
                .bind(line.quantity)
                .bind(&line.unit)
                .bind(&line.notes);
            if self.source_column.is_some() {
                query = query.bind(&line.source_line_id);
            }
            query.execute(&mut **tx).await?;
        }

        Ok(())
    }

    pub async fn delete_all(&self, tx: &mut Transaction<'_, MySql>, document_id: &str) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            self.table, self.parent_column
        );
        sqlx::query(&sql).bind(document_id).execute(&mut **tx).await?;
        Ok(())
    }
}
