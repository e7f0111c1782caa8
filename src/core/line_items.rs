// Priced document lines shared by quotations, supplier quotes, sales orders,
// supplier LPOs and purchase invoices.
//
// Every priced line table has the same columns; only the table name and the
// parent foreign key differ, which `LineTable` captures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use uuid::Uuid;

use crate::core::amounts::{self, DocumentTotals, LineAmounts};
use crate::core::{AppError, Currency, FieldError, Result};

pub const DEFAULT_UNIT: &str = "pcs";
const MAX_DESCRIPTION_LEN: usize = 500;

/// Line as submitted by the client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItemInput {
    #[serde(default)]
    pub inventory_item_id: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Stored line with computed amounts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLine {
    pub id: String,
    pub document_id: String,
    pub line_number: i32,
    pub inventory_item_id: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
    pub notes: Option<String>,
}

impl PricedLine {
    /// Build and price a new line
    pub fn new(
        document_id: &str,
        line_number: i32,
        currency: Currency,
        input: LineItemInput,
    ) -> Result<Self> {
        AppError::from_fields(validate_input(&input, "item"))?;

        let amounts = amounts::calculate_line(
            currency,
            input.quantity,
            input.unit_price,
            input.discount_percent,
            input.tax_percent,
        )?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            line_number,
            inventory_item_id: input.inventory_item_id,
            description: input.description.trim().to_string(),
            quantity: input.quantity,
            unit: normalize_unit(input.unit),
            unit_price: input.unit_price,
            discount_percent: input.discount_percent,
            tax_percent: input.tax_percent,
            gross_amount: amounts.gross_amount,
            discount_amount: amounts.discount_amount,
            tax_amount: amounts.tax_amount,
            line_total: amounts.line_total,
            notes: input.notes,
        })
    }

    /// Replace the editable fields and recompute amounts, keeping id and position
    pub fn reprice(&mut self, currency: Currency, input: LineItemInput) -> Result<()> {
        let replacement = PricedLine::new(&self.document_id, self.line_number, currency, input)?;
        let id = std::mem::take(&mut self.id);
        *self = PricedLine { id, ..replacement };
        Ok(())
    }

    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            gross_amount: self.gross_amount,
            discount_amount: self.discount_amount,
            tax_amount: self.tax_amount,
            line_total: self.line_total,
        }
    }

    /// Editable fields of the line, as a client would submit them
    pub fn to_input(&self) -> LineItemInput {
        LineItemInput {
            inventory_item_id: self.inventory_item_id.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            unit: Some(self.unit.clone()),
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
            notes: self.notes.clone(),
        }
    }

    /// Copy a line onto another document (quotation -> sales order)
    pub fn copy_to(&self, document_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            ..self.clone()
        }
    }
}

fn normalize_unit(unit: Option<String>) -> String {
    unit.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_UNIT.to_string())
}

/// Field-level checks for one line; `prefix` becomes the field path
pub fn validate_input(input: &LineItemInput, prefix: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let description = input.description.trim();
    if description.is_empty() {
        errors.push(FieldError::new(
            format!("{}.description", prefix),
            "Description cannot be empty",
        ));
    } else if description.len() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new(
            format!("{}.description", prefix),
            format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    if let Err(msg) = amounts::validate_quantity(input.quantity) {
        errors.push(FieldError::new(format!("{}.quantity", prefix), msg));
    }
    if let Err(msg) = amounts::validate_unit_price(input.unit_price) {
        errors.push(FieldError::new(format!("{}.unit_price", prefix), msg));
    }
    if let Err(msg) = amounts::validate_percent(input.discount_percent) {
        errors.push(FieldError::new(format!("{}.discount_percent", prefix), msg));
    }
    if let Err(msg) = amounts::validate_percent(input.tax_percent) {
        errors.push(FieldError::new(format!("{}.tax_percent", prefix), msg));
    }

    errors
}

/// Validate and price a full list of lines for a new document
pub fn build_lines(
    document_id: &str,
    currency: Currency,
    inputs: Vec<LineItemInput>,
) -> Result<(Vec<PricedLine>, DocumentTotals)> {
    let errors: Vec<FieldError> = inputs
        .iter()
        .enumerate()
        .flat_map(|(idx, input)| validate_input(input, &format!("items[{}]", idx)))
        .collect();
    AppError::from_fields(errors)?;

    let lines = inputs
        .into_iter()
        .enumerate()
        .map(|(idx, input)| PricedLine::new(document_id, idx as i32 + 1, currency, input))
        .collect::<Result<Vec<_>>>()?;

    let totals = totals_of(&lines)?;
    Ok((lines, totals))
}

pub fn totals_of(lines: &[PricedLine]) -> Result<DocumentTotals> {
    let amounts: Vec<LineAmounts> = lines.iter().map(PricedLine::amounts).collect();
    DocumentTotals::from_lines(&amounts)
}

/// Append a priced line at the end of the document
pub fn add_line(
    lines: &mut Vec<PricedLine>,
    document_id: &str,
    currency: Currency,
    input: LineItemInput,
) -> Result<PricedLine> {
    let next_number = lines.iter().map(|l| l.line_number).max().unwrap_or(0) + 1;
    let line = PricedLine::new(document_id, next_number, currency, input)?;
    lines.push(line.clone());
    Ok(line)
}

pub fn update_line(
    lines: &mut [PricedLine],
    item_id: &str,
    currency: Currency,
    input: LineItemInput,
) -> Result<PricedLine> {
    let line = lines
        .iter_mut()
        .find(|l| l.id == item_id)
        .ok_or_else(|| AppError::not_found(format!("Line item '{}' not found", item_id)))?;
    line.reprice(currency, input)?;
    Ok(line.clone())
}

/// Recompute every line for a new currency scale
pub fn reprice_all(lines: &mut [PricedLine], currency: Currency) -> Result<DocumentTotals> {
    for line in lines.iter_mut() {
        let input = line.to_input();
        line.reprice(currency, input)?;
    }
    totals_of(lines)
}

/// Remove a line and close the gap in line numbers
pub fn remove_line(lines: &mut Vec<PricedLine>, item_id: &str) -> Result<()> {
    let before = lines.len();
    lines.retain(|l| l.id != item_id);
    if lines.len() == before {
        return Err(AppError::not_found(format!(
            "Line item '{}' not found",
            item_id
        )));
    }
    for (idx, line) in lines.iter_mut().enumerate() {
        line.line_number = idx as i32 + 1;
    }
    Ok(())
}

#[derive(Debug, FromRow)]
pub struct PricedLineRow {
    id: String,
    document_id: String,
    line_number: i32,
    inventory_item_id: Option<String>,
    description: String,
    quantity: Decimal,
    unit: String,
    unit_price: Decimal,
    discount_percent: Decimal,
    tax_percent: Decimal,
    gross_amount: Decimal,
    discount_amount: Decimal,
    tax_amount: Decimal,
    line_total: Decimal,
    notes: Option<String>,
}

impl From<PricedLineRow> for PricedLine {
    fn from(row: PricedLineRow) -> Self {
        Self {
            id: row.id,
            document_id: row.document_id,
            line_number: row.line_number,
            inventory_item_id: row.inventory_item_id,
            description: row.description,
            quantity: row.quantity,
            unit: row.unit,
            unit_price: row.unit_price,
            discount_percent: row.discount_percent,
            tax_percent: row.tax_percent,
            gross_amount: row.gross_amount,
            discount_amount: row.discount_amount,
            tax_amount: row.tax_amount,
            line_total: row.line_total,
            notes: row.notes,
        }
    }
}

/// A priced line table and the column pointing at its parent document
#[derive(Debug, Clone, Copy)]
pub struct LineTable {
    pub table: &'static str,
    pub parent_column: &'static str,
}

impl LineTable {
    pub const fn new(table: &'static str, parent_column: &'static str) -> Self {
        Self {
            table,
            parent_column,
        }
    }

    /// Load the lines of one document ordered by line number
    pub async fn fetch(&self, pool: &MySqlPool, document_id: &str) -> Result<Vec<PricedLine>> {
        let sql = format!(
            r#"
            SELECT id, {parent} AS document_id, line_number, inventory_item_id, description,
                   quantity, unit, unit_price, discount_percent, tax_percent,
                   gross_amount, discount_amount, tax_amount, line_total, notes
            FROM {table}
            WHERE {parent} = ?
            ORDER BY line_number ASC
            "#,
            parent = self.parent_column,
            table = self.table,
        );

        let rows = sqlx::query_as::<_, PricedLineRow>(&sql)
            .bind(document_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(PricedLine::from).collect())
    }

    /// Insert lines within an open transaction
    pub async fn insert_all(
        &self,
        tx: &mut Transaction<'_, MySql>,
        lines: &[PricedLine],
    ) -> Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {table} (
                id, {parent}, line_number, inventory_item_id, description,
                quantity, unit, unit_price, discount_percent, tax_percent,
                gross_amount, discount_amount, tax_amount, line_total, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            parent = self.parent_column,
            table = self.table,
        );

        for line in lines {
            sqlx::query(&sql)
                .bind(&line.id)
                .bind(&line.document_id)
                .bind(line.line_number)
                .bind(&line.inventory_item_id)
                .bind(&line.description)
                .bind(line.quantity)
                .bind(&line.unit)
                .bind(line.unit_price)
                .bind(line.discount_percent)
                .bind(line.tax_percent)
                .bind(line.gross_amount)
                .bind(line.discount_amount)
                .bind(line.tax_amount)
                .bind(line.line_total)
                .bind(&line.notes)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Replace every line of a document within an open transaction
    pub async fn replace_all(
        &self,
        tx: &mut Transaction<'_, MySql>,
        document_id: &str,
        lines: &[PricedLine],
    ) -> Result<()> {
        let sql = format!(
            "DELETE FROM {table} WHERE {parent} = ?",
            table = self.table,
            parent = self.parent_column,
        );
        sqlx::query(&sql)
            .bind(document_id)
            .execute(&mut **tx)
            .await?;

        self.insert_all(tx, lines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn input(description: &str, quantity: &str, price: &str) -> LineItemInput {
        LineItemInput {
            inventory_item_id: None,
            description: description.to_string(),
            quantity: Decimal::from_str(quantity).unwrap(),
            unit: None,
            unit_price: Decimal::from_str(price).unwrap(),
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::from(5),
            notes: None,
        }
    }

    #[test]
    fn test_build_lines_numbers_and_totals() {
        let (lines, totals) = build_lines(
            "doc-1",
            Currency::USD,
            vec![input("Cable 4mm", "10", "2.50"), input("Breaker 32A", "2", "18.00")],
        )
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[1].line_number, 2);
        assert_eq!(lines[0].unit, DEFAULT_UNIT);
        // 25.00 + 1.25 VAT, 36.00 + 1.80 VAT
        assert_eq!(totals.subtotal, Decimal::from_str("61.00").unwrap());
        assert_eq!(totals.tax_total, Decimal::from_str("3.05").unwrap());
        assert_eq!(totals.total_amount, Decimal::from_str("64.05").unwrap());
    }

    #[test]
    fn test_build_lines_reports_field_paths() {
        let err = build_lines(
            "doc-1",
            Currency::USD,
            vec![input("ok", "1", "1"), input(" ", "0", "1")],
        )
        .unwrap_err();

        match err {
            AppError::FieldValidation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert!(names.contains(&"items[1].description"));
                assert!(names.contains(&"items[1].quantity"));
                assert!(!names.iter().any(|n| n.starts_with("items[0]")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_item_manager_operations() {
        let (mut lines, _) =
            build_lines("doc-1", Currency::USD, vec![input("A", "1", "10")]).unwrap();

        let added = add_line(&mut lines, "doc-1", Currency::USD, input("B", "2", "5")).unwrap();
        assert_eq!(added.line_number, 2);

        let first_id = lines[0].id.clone();
        let updated =
            update_line(&mut lines, &first_id, Currency::USD, input("A2", "3", "10")).unwrap();
        assert_eq!(updated.id, first_id);
        assert_eq!(updated.gross_amount, Decimal::from_str("30.00").unwrap());

        remove_line(&mut lines, &first_id).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_number, 1);
        assert!(remove_line(&mut lines, "missing").is_err());
    }

    #[test]
    fn test_reprice_all_follows_currency_scale() {
        let (mut lines, _) =
            build_lines("doc-1", Currency::USD, vec![input("A", "3", "0.3337")]).unwrap();
        assert_eq!(lines[0].gross_amount, Decimal::from_str("1.00").unwrap());

        let totals = reprice_all(&mut lines, Currency::BHD).unwrap();
        assert_eq!(lines[0].gross_amount, Decimal::from_str("1.001").unwrap());
        assert_eq!(totals.subtotal, lines[0].gross_amount);
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_copy_to_new_document() {
        let line = PricedLine::new("q-1", 1, Currency::USD, input("A", "1", "10")).unwrap();
        let copy = line.copy_to("so-1");
        assert_eq!(copy.document_id, "so-1");
        assert_ne!(copy.id, line.id);
        assert_eq!(copy.line_total, line.line_total);
    }
}
