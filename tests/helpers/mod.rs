// Shared test helpers; each test binary uses a different subset.
#![allow(dead_code)]

pub mod memory;
pub mod test_app;
pub mod test_database;

use rust_decimal::Decimal;
use serde_json::{json, Value};

pub use test_app::TestApp;
pub use test_database::TestDatabase;

/// JSON body for a line item
pub fn line(description: &str, quantity: &str, unit_price: &str) -> Value {
    json!({
        "description": description,
        "quantity": quantity,
        "unit_price": unit_price,
    })
}

/// Read a decimal that the API serialized either as a string or a number
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected a decimal, got {}", other),
    }
}

/// Assert the standard `{"error": {"code", "message"}}` body
pub fn assert_error(body: &Value, code: u16) {
    assert_eq!(body["error"]["code"], code, "unexpected error body: {}", body);
    assert!(
        body["error"]["message"].is_string(),
        "error message missing: {}",
        body
    );
}
