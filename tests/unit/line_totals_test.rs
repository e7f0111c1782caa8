// Property-based tests for line pricing and document totals
//
// Properties:
// 1. every component is rounded to the currency scale
// 2. line_total = gross - discount + tax for each line
// 3. header totals are the column sums and satisfy total = subtotal - discount + tax
// 4. a zero-percent line totals exactly to its rounded gross amount

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tradeflow::core::line_items::build_lines;
use tradeflow::core::{Currency, LineItemInput};

const CURRENCIES: [Currency; 4] = [Currency::BHD, Currency::USD, Currency::JPY, Currency::KWD];

fn input(quantity_milli: i64, price_milli: i64, discount_bp: i64, tax_bp: i64) -> LineItemInput {
    LineItemInput {
        inventory_item_id: None,
        description: "Steel angle 50x50x5".to_string(),
        quantity: Decimal::new(quantity_milli, 3),
        unit: None,
        unit_price: Decimal::new(price_milli, 3),
        discount_percent: Decimal::new(discount_bp, 2),
        tax_percent: Decimal::new(tax_bp, 2),
        notes: None,
    }
}

fn line_strategy() -> impl Strategy<Value = (i64, i64, i64, i64)> {
    (1i64..=500_000, 0i64..=5_000_000, 0i64..=10_000, 0i64..=10_000)
}

proptest! {
    /// Property: each line is internally consistent and rounded
    #[test]
    fn test_line_amounts_are_consistent(
        (quantity, price, discount, tax) in line_strategy(),
        currency_idx in 0usize..4
    ) {
        let currency = CURRENCIES[currency_idx];
        let (lines, _) = build_lines("doc-1", currency, vec![input(quantity, price, discount, tax)])
            .expect("valid line");
        let line = &lines[0];

        prop_assert_eq!(
            line.line_total,
            line.gross_amount - line.discount_amount + line.tax_amount
        );
        for amount in [line.gross_amount, line.discount_amount, line.tax_amount, line.line_total] {
            prop_assert_eq!(amount, currency.round(amount), "{} not rounded for {}", amount, currency);
        }
        prop_assert!(line.discount_amount <= line.gross_amount);
        prop_assert!(line.line_total >= Decimal::ZERO);
    }

    /// Property: header totals are the sums of the line columns
    #[test]
    fn test_document_totals_sum_lines(
        specs in prop::collection::vec(line_strategy(), 1..12),
        currency_idx in 0usize..4
    ) {
        let currency = CURRENCIES[currency_idx];
        let inputs = specs
            .iter()
            .map(|&(q, p, d, t)| input(q, p, d, t))
            .collect();
        let (lines, totals) = build_lines("doc-2", currency, inputs).expect("valid lines");

        let subtotal: Decimal = lines.iter().map(|l| l.gross_amount).sum();
        let discount: Decimal = lines.iter().map(|l| l.discount_amount).sum();
        let tax: Decimal = lines.iter().map(|l| l.tax_amount).sum();
        let total: Decimal = lines.iter().map(|l| l.line_total).sum();

        prop_assert_eq!(totals.subtotal, subtotal);
        prop_assert_eq!(totals.discount_total, discount);
        prop_assert_eq!(totals.tax_total, tax);
        prop_assert_eq!(totals.total_amount, total);
        prop_assert!(totals.is_consistent());

        let numbers: Vec<i32> = lines.iter().map(|l| l.line_number).collect();
        let expected: Vec<i32> = (1..=lines.len() as i32).collect();
        prop_assert_eq!(numbers, expected);
    }

    /// Property: without discount and tax the total is the rounded gross
    #[test]
    fn test_plain_line_totals_to_gross(
        quantity in 1i64..=500_000,
        price in 0i64..=5_000_000,
        currency_idx in 0usize..4
    ) {
        let currency = CURRENCIES[currency_idx];
        let (lines, totals) = build_lines("doc-3", currency, vec![input(quantity, price, 0, 0)])
            .expect("valid line");
        let expected = currency.round(Decimal::new(quantity, 3) * Decimal::new(price, 3));
        prop_assert_eq!(lines[0].line_total, expected);
        prop_assert_eq!(totals.total_amount, expected);
        prop_assert_eq!(totals.tax_total, Decimal::ZERO);
    }
}

#[test]
fn test_bahraini_dinar_line_rounds_to_fils() {
    let (lines, totals) = build_lines("doc-4", Currency::BHD, vec![input(3_000, 1_234, 1_000, 1_000)])
        .expect("valid line");
    // 3 x 1.234 = 3.702, 10% discount = 0.370, 10% VAT on 3.332 = 0.333
    assert_eq!(lines[0].gross_amount, dec!(3.702));
    assert_eq!(lines[0].discount_amount, dec!(0.370));
    assert_eq!(lines[0].tax_amount, dec!(0.333));
    assert_eq!(totals.total_amount, dec!(3.665));
}

#[test]
fn test_invalid_lines_report_every_field() {
    let mut bad = input(0, -1_000, 10_100, 0);
    bad.description = "  ".to_string();
    let err = build_lines("doc-5", Currency::USD, vec![input(1_000, 1_000, 0, 0), bad])
        .expect_err("invalid line");

    match err {
        tradeflow::core::AppError::FieldValidation(fields) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(
                names,
                vec![
                    "items[1].description",
                    "items[1].quantity",
                    "items[1].unit_price",
                    "items[1].discount_percent",
                ]
            );
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}

#[test]
fn test_oversized_quantity_is_a_field_error() {
    let mut huge = input(1_000, 2_000, 0, 0);
    huge.quantity = Decimal::MAX;
    let err = build_lines("doc-6", Currency::USD, vec![huge]).expect_err("quantity too large");

    match err {
        tradeflow::core::AppError::FieldValidation(fields) => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "items[0].quantity");
        }
        other => panic!("expected field errors, got {:?}", other),
    }
}

#[test]
fn test_document_total_beyond_money_column_is_rejected() {
    let big = input(1_000, 0, 0, 0);
    let lines: Vec<LineItemInput> = (0..11)
        .map(|_| LineItemInput {
            unit_price: dec!(99999999999999),
            ..big.clone()
        })
        .collect();
    let err = build_lines("doc-7", Currency::USD, lines).expect_err("total too large");
    assert!(matches!(err, tradeflow::core::AppError::Validation(_)));
}
