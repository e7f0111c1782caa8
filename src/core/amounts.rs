// Line and header arithmetic shared by every priced document.
//
// gross           = quantity × unit_price
// discount_amount = gross × discount_percent / 100
// tax_amount      = (gross − discount_amount) × tax_percent / 100
// line_total      = gross − discount_amount + tax_amount
//
// Each component is rounded to the currency scale before it is used, so header
// totals built from line sums satisfy total = subtotal − discount + tax exactly.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::{AppError, Currency, Result};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Maximum fractional digits accepted for quantities
pub const QUANTITY_SCALE: u32 = 3;

/// Maximum fractional digits accepted for percentages
pub const PERCENT_SCALE: u32 = 4;

/// Maximum fractional digits stored for unit prices and costs
pub const PRICE_SCALE: u32 = 4;

/// Largest quantity or unit price a DECIMAL(18,4) column holds
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 4);
pub const MAX_UNIT_PRICE: Decimal = MAX_QUANTITY;

/// Largest amount a DECIMAL(18,3) money column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 3);

/// Computed money columns of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineAmounts {
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub line_total: Decimal,
}

/// Header totals derived from line amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total_amount: Decimal,
}

/// Calculate the money columns of one line
pub fn calculate_line(
    currency: Currency,
    quantity: Decimal,
    unit_price: Decimal,
    discount_percent: Decimal,
    tax_percent: Decimal,
) -> Result<LineAmounts> {
    validate_quantity(quantity).map_err(AppError::Validation)?;
    validate_unit_price(unit_price).map_err(AppError::Validation)?;
    validate_percent(discount_percent).map_err(AppError::Validation)?;
    validate_percent(tax_percent).map_err(AppError::Validation)?;

    let gross_amount = quantity
        .checked_mul(unit_price)
        .map(|gross| currency.round(gross))
        .filter(|gross| *gross <= MAX_AMOUNT)
        .ok_or_else(amount_too_large)?;
    // Percentages are capped at 100, so neither product can exceed the gross
    let discount_amount = currency.round(gross_amount * discount_percent / HUNDRED);
    let taxable = gross_amount - discount_amount;
    let tax_amount = currency.round(taxable * tax_percent / HUNDRED);
    let line_total = checked_amount(taxable.checked_add(tax_amount))?;

    Ok(LineAmounts {
        gross_amount,
        discount_amount,
        tax_amount,
        line_total,
    })
}

fn amount_too_large() -> AppError {
    AppError::Validation(format!("Amount cannot exceed {}", MAX_AMOUNT))
}

fn checked_amount(value: Option<Decimal>) -> Result<Decimal> {
    value
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or_else(amount_too_large)
}

impl DocumentTotals {
    /// Sum line amounts into header totals, rejecting sums the money columns cannot hold
    pub fn from_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LineAmounts>,
    {
        lines
            .into_iter()
            .try_fold(DocumentTotals::default(), |totals, line| -> Result<Self> {
                Ok(DocumentTotals {
                    subtotal: checked_amount(totals.subtotal.checked_add(line.gross_amount))?,
                    discount_total: checked_amount(
                        totals.discount_total.checked_add(line.discount_amount),
                    )?,
                    tax_total: checked_amount(totals.tax_total.checked_add(line.tax_amount))?,
                    total_amount: checked_amount(
                        totals.total_amount.checked_add(line.line_total),
                    )?,
                })
            })
    }

    /// Whether the header identity total = subtotal − discount + tax holds
    pub fn is_consistent(&self) -> bool {
        self.total_amount == self.subtotal - self.discount_total + self.tax_total
    }
}

pub fn validate_quantity(quantity: Decimal) -> std::result::Result<(), String> {
    if quantity <= Decimal::ZERO {
        return Err(format!("Quantity must be positive, got: {}", quantity));
    }
    if quantity > MAX_QUANTITY {
        return Err(format!("Quantity cannot exceed {}", MAX_QUANTITY));
    }
    if quantity.normalize().scale() > QUANTITY_SCALE {
        return Err(format!(
            "Quantity cannot have more than {} decimal places",
            QUANTITY_SCALE
        ));
    }
    Ok(())
}

pub fn validate_unit_price(unit_price: Decimal) -> std::result::Result<(), String> {
    if unit_price < Decimal::ZERO {
        return Err(format!(
            "Unit price must be non-negative, got: {}",
            unit_price
        ));
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(format!("Unit price cannot exceed {}", MAX_UNIT_PRICE));
    }
    if unit_price.normalize().scale() > PRICE_SCALE {
        return Err(format!(
            "Unit price allows at most {} decimal places",
            PRICE_SCALE
        ));
    }
    Ok(())
}

/// Percentages are 0..=100 with at most 4 decimal places
pub fn validate_percent(percent: Decimal) -> std::result::Result<(), String> {
    if percent < Decimal::ZERO {
        return Err("Percentage cannot be negative".to_string());
    }
    if percent > HUNDRED {
        return Err("Percentage cannot exceed 100".to_string());
    }
    if percent.normalize().scale() > PERCENT_SCALE {
        return Err(format!(
            "Percentage cannot have more than {} decimal places",
            PERCENT_SCALE
        ));
    }
    Ok(())
}
