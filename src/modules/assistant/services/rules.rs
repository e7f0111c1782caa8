//! Deterministic answers used when no completion provider is available.

use serde_json::{Map, Value};

use crate::core::line_items::DEFAULT_UNIT;
use crate::modules::assistant::models::AutofillEntity;
use crate::modules::parties::models::party::DEFAULT_PAYMENT_TERMS_DAYS;

const HELP_TOPICS: &[(&[&str], &str)] = &[
    (
        &["enquiry", "enquiries", "rfq"],
        "Enquiries record what a customer asked for. Create one under Enquiries with the \
         customer and the requested items; it moves from new to quoted once a quotation \
         references it.",
    ),
    (
        &["quotation", "quote", "quotations"],
        "Quotations price an enquiry for a customer. Draft quotations can be edited; send, \
         accept or reject them through the status action. An accepted quotation converts into \
         a sales order with its items copied.",
    ),
    (
        &["lpo", "purchase", "po"],
        "Supplier LPOs go draft, submitted, approved, sent_to_supplier, confirmed. A rejected \
         LPO can be edited and resubmitted. Approved LPOs can be emailed to the supplier as a PDF.",
    ),
    (
        &["receipt", "grn", "receive", "received"],
        "Material receipts record goods arriving against an LPO or as a free-standing delivery. \
         Completing a receipt adds the quantities to stock; an LPO line can never be received \
         beyond its ordered quantity.",
    ),
    (
        &["return", "returns"],
        "Receipt returns send goods from a completed material receipt back to the supplier. \
         Completing a return removes the quantities from stock.",
    ),
    (
        &["stock", "inventory", "issue", "issues"],
        "Inventory items carry their quantity on hand. Stock issues take goods out, optionally \
         against a sales order; stock can never go below zero.",
    ),
    (
        &["invoice", "invoices", "bill"],
        "Purchase invoices book a supplier's bill, optionally linked to an LPO and a completed \
         receipt. The due date defaults from the supplier's payment terms.",
    ),
    (
        &["email", "mail", "send"],
        "Documents can be emailed with their PDF attached. Without SMTP settings the dispatch \
         is simulated and still appears in the email log.",
    ),
    (
        &["customer", "customers", "supplier", "suppliers"],
        "Customers and suppliers need a unique name and email. Use autofill to tidy names, \
         emails and phone numbers before saving.",
    ),
    (
        &["pdf", "print", "download"],
        "Quotations, sales orders and supplier LPOs can be downloaded as PDF from their pdf \
         endpoint.",
    ),
];

const FALLBACK_HELP: &str = "I can help with enquiries, quotations, sales orders, supplier LPOs, \
     material receipts, returns, stock issues, purchase invoices and emailing documents. \
     Ask about any of these.";

/// Keyword-matched help text for a chat message
pub fn chat_reply(message: &str) -> String {
    let words = words_of(message);
    let answers: Vec<&str> = HELP_TOPICS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| words.iter().any(|w| w == k)))
        .map(|(_, answer)| *answer)
        .collect();

    if answers.is_empty() {
        FALLBACK_HELP.to_string()
    } else {
        answers.join("\n\n")
    }
}

/// Normalized field suggestions for a form
pub fn autofill(entity: AutofillEntity, fields: &Map<String, Value>) -> Map<String, Value> {
    let mut suggestions = Map::new();
    let text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .map(collapse_spaces)
            .filter(|v| !v.is_empty())
    };

    match entity {
        AutofillEntity::Customer | AutofillEntity::Supplier => {
            for key in ["name", "contact_person"] {
                if let Some(value) = text(key) {
                    suggestions.insert(key.to_string(), Value::String(title_case(&value)));
                }
            }
            if let Some(email) = text("email") {
                suggestions.insert("email".to_string(), Value::String(email.to_lowercase()));
            }
            if let Some(phone) = text("phone").and_then(|p| normalize_phone(&p)) {
                suggestions.insert("phone".to_string(), Value::String(phone));
            }
            if let Some(address) = text("address") {
                suggestions.insert("address".to_string(), Value::String(address));
            }
            if fields.get("payment_terms_days").map_or(true, Value::is_null) {
                suggestions.insert(
                    "payment_terms_days".to_string(),
                    Value::from(DEFAULT_PAYMENT_TERMS_DAYS),
                );
            }
        }
        AutofillEntity::EnquiryItem => {
            if let Some(description) = text("description") {
                if text("unit").is_none() {
                    suggestions.insert(
                        "unit".to_string(),
                        Value::String(infer_unit(&description).to_string()),
                    );
                }
                suggestions.insert("description".to_string(), Value::String(description));
            }
            if fields.get("quantity").map_or(true, Value::is_null) {
                suggestions.insert("quantity".to_string(), Value::String("1".to_string()));
            }
        }
        AutofillEntity::InventoryItem => {
            if let Some(name) = text("name") {
                suggestions.insert("name".to_string(), Value::String(title_case(&name)));
            }
            if text("unit").is_none() {
                let basis = text("description").or_else(|| text("name")).unwrap_or_default();
                suggestions.insert(
                    "unit".to_string(),
                    Value::String(infer_unit(&basis).to_string()),
                );
            }
            if let Some(category) = text("category") {
                suggestions.insert("category".to_string(), Value::String(title_case(&category)));
            }
        }
    }

    suggestions
}

/// Unit of measure implied by a description, `pcs` when nothing matches
pub fn infer_unit(description: &str) -> &'static str {
    const UNITS: &[(&[&str], &str)] = &[
        (&["m", "mtr", "meter", "meters", "metre", "metres"], "m"),
        (&["kg", "kgs", "kilo", "kilogram", "kilograms"], "kg"),
        (&["l", "ltr", "litre", "litres", "liter", "liters"], "ltr"),
        (&["box", "boxes"], "box"),
        (&["roll", "rolls"], "roll"),
        (&["set", "sets", "kit", "kits"], "set"),
        (&["pair", "pairs"], "pair"),
        (&["drum", "drums"], "drum"),
        (&["bag", "bags", "sack", "sacks"], "bag"),
        (&["sheet", "sheets"], "sheet"),
        (&["carton", "cartons", "ctn"], "ctn"),
    ];

    for word in words_of(description) {
        let word = word.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
        if let Some((_, unit)) = UNITS.iter().find(|(names, _)| names.contains(&word)) {
            return *unit;
        }
    }
    DEFAULT_UNIT
}

/// `+` followed by the digits of the number; a leading `00` is an international prefix
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = digits
        .strip_prefix("00")
        .map(str::to_string)
        .unwrap_or(digits);
    if digits.is_empty() {
        None
    } else {
        Some(format!("+{}", digits))
    }
}

pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn words_of(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .map(|w| w.trim_matches('.').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
