use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::line_items::{self, build_lines, totals_of};
use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, LineItemInput, ListQuery, PricedLine, Result, StatusFlow};
use crate::modules::enquiries::EnquiryRepository;
use crate::modules::parties::PartyRepository;
use crate::modules::supplier_quotes::models::{
    CreateSupplierQuoteRequest, SupplierQuote, SupplierQuoteDetail, SupplierQuoteStatus,
    UpdateSupplierQuoteRequest,
};
use crate::modules::supplier_quotes::repositories::SupplierQuoteRepository;

/// Supplier quotes received for one enquiry, cheapest first within each currency
#[derive(Debug, Clone, Serialize)]
pub struct QuoteComparison {
    pub enquiry_id: String,
    pub quote_count: usize,
    /// Cheapest priced quote that has not been rejected; unset when the
    /// candidates are in different currencies
    pub best_quote_id: Option<String>,
    pub mixed_currencies: bool,
    pub quotes: Vec<SupplierQuote>,
}

impl QuoteComparison {
    pub fn rank(enquiry_id: &str, mut quotes: Vec<SupplierQuote>) -> Self {
        quotes.sort_by(|a, b| {
            a.currency
                .code()
                .cmp(b.currency.code())
                .then(a.totals.total_amount.cmp(&b.totals.total_amount))
                .then(a.quote_date.cmp(&b.quote_date))
        });

        // Quotes without priced lines total zero and say nothing about price
        let candidates: Vec<&SupplierQuote> = quotes
            .iter()
            .filter(|q| q.status != SupplierQuoteStatus::Rejected)
            .filter(|q| q.totals.total_amount > Decimal::ZERO)
            .collect();
        let first_currency = candidates.first().map(|q| q.currency);
        let mixed_currencies = candidates
            .iter()
            .any(|q| Some(q.currency) != first_currency);
        let best_quote_id = if mixed_currencies {
            None
        } else {
            candidates
                .iter()
                .min_by_key(|q| q.totals.total_amount)
                .map(|q| q.id.clone())
        };

        Self {
            enquiry_id: enquiry_id.to_string(),
            quote_count: quotes.len(),
            best_quote_id,
            mixed_currencies,
            quotes,
        }
    }
}

pub struct SupplierQuoteService {
    repo: Arc<dyn SupplierQuoteRepository>,
    suppliers: Arc<dyn PartyRepository>,
    enquiries: Arc<dyn EnquiryRepository>,
}

impl SupplierQuoteService {
    pub fn new(
        repo: Arc<dyn SupplierQuoteRepository>,
        suppliers: Arc<dyn PartyRepository>,
        enquiries: Arc<dyn EnquiryRepository>,
    ) -> Self {
        Self {
            repo,
            suppliers,
            enquiries,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierQuote>> {
        if let Some(status) = query.status.as_deref() {
            status
                .parse::<SupplierQuoteStatus>()
                .map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<SupplierQuote> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier quote '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<SupplierQuoteDetail> {
        let quote = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(SupplierQuoteDetail { quote, items })
    }

    pub async fn create(&self, request: CreateSupplierQuoteRequest) -> Result<SupplierQuoteDetail> {
        request.validate()?;

        if self.suppliers.find_by_id(request.supplier_id.trim()).await?.is_none() {
            return Err(AppError::validation(format!(
                "Supplier '{}' does not exist",
                request.supplier_id
            )));
        }
        if let Some(enquiry_id) = clean(request.enquiry_id.clone()) {
            if self.enquiries.find_by_id(&enquiry_id).await?.is_none() {
                return Err(AppError::validation(format!(
                    "Enquiry '{}' does not exist",
                    enquiry_id
                )));
            }
        }

        let date = request.quote_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let mut quote = SupplierQuote::new(number, &request);
        let (items, totals) = build_lines(&quote.id, quote.currency, request.items)?;
        quote.totals = totals;

        self.repo.create(&quote, &items).await?;
        tracing::info!(
            id = %quote.id,
            number = %quote.quote_number,
            total = %quote.totals.total_amount,
            "Supplier quote created"
        );

        Ok(SupplierQuoteDetail { quote, items })
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateSupplierQuoteRequest,
    ) -> Result<SupplierQuoteDetail> {
        let mut quote = self.pending(id).await?;
        request.validate(quote.quote_date)?;

        quote.valid_until = request.valid_until;
        quote.supplier_reference = clean(request.supplier_reference);
        quote.notes = clean(request.notes);
        quote.updated_at = Utc::now();
        self.repo.update_header(&quote).await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let quote = self.pending(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %quote.quote_number, "Supplier quote deleted");
        Ok(())
    }

    pub async fn change_status(
        &self,
        id: &str,
        status: SupplierQuoteStatus,
    ) -> Result<SupplierQuote> {
        let mut quote = self.find(id).await?;
        quote.status.ensure_transition(status)?;
        self.repo.update_status(id, status).await?;

        tracing::info!(id = %id, from = %quote.status, to = %status, "Supplier quote status changed");
        quote.status = status;
        Ok(quote)
    }

    pub async fn compare_for_enquiry(&self, enquiry_id: &str) -> Result<QuoteComparison> {
        if self.enquiries.find_by_id(enquiry_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Enquiry '{}' not found",
                enquiry_id
            )));
        }

        let quotes = self.repo.for_enquiry(enquiry_id).await?;
        Ok(QuoteComparison::rank(enquiry_id, quotes))
    }

    pub async fn list_items(&self, id: &str) -> Result<Vec<PricedLine>> {
        self.find(id).await?;
        self.repo.lines(id).await
    }

    pub async fn add_item(&self, id: &str, input: LineItemInput) -> Result<PricedLine> {
        let quote = self.pending(id).await?;
        let mut lines = self.repo.lines(id).await?;
        let line = line_items::add_line(&mut lines, id, quote.currency, input)?;
        self.repo.save_lines(id, &totals_of(&lines)?, &lines).await?;
        Ok(line)
    }

    pub async fn update_item(
        &self,
        id: &str,
        item_id: &str,
        input: LineItemInput,
    ) -> Result<PricedLine> {
        let quote = self.pending(id).await?;
        let mut lines = self.repo.lines(id).await?;
        let line = line_items::update_line(&mut lines, item_id, quote.currency, input)?;
        self.repo.save_lines(id, &totals_of(&lines)?, &lines).await?;
        Ok(line)
    }

    pub async fn remove_item(&self, id: &str, item_id: &str) -> Result<()> {
        self.pending(id).await?;
        let mut lines = self.repo.lines(id).await?;
        line_items::remove_line(&mut lines, item_id)?;
        self.repo.save_lines(id, &totals_of(&lines)?, &lines).await
    }

    /// Quotes are only editable while pending
    async fn pending(&self, id: &str) -> Result<SupplierQuote> {
        let quote = self.find(id).await?;
        if quote.status != SupplierQuoteStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Supplier quote {} is {} and can no longer be changed",
                quote.quote_number, quote.status
            )));
        }
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Currency, DocumentTotals};
    use crate::modules::supplier_quotes::models::CreateSupplierQuoteRequest;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn quote(supplier: &str, currency: Currency, total: Decimal, day: u32) -> SupplierQuote {
        let request = CreateSupplierQuoteRequest {
            supplier_id: supplier.to_string(),
            enquiry_id: Some("enq-1".to_string()),
            quote_date: NaiveDate::from_ymd_opt(2026, 4, day),
            valid_until: None,
            supplier_reference: None,
            currency,
            notes: None,
            items: Vec::new(),
        };
        let mut quote = SupplierQuote::new(format!("SQ-{}", supplier), &request);
        quote.totals = DocumentTotals {
            subtotal: total,
            total_amount: total,
            ..DocumentTotals::default()
        };
        quote
    }

    #[test]
    fn test_cheapest_priced_quote_wins() {
        let empty = quote("empty", Currency::BHD, Decimal::ZERO, 1);
        let dear = quote("dear", Currency::BHD, dec!(120.500), 2);
        let cheap = quote("cheap", Currency::BHD, dec!(98.250), 3);
        let mut rejected = quote("rejected", Currency::BHD, dec!(50.000), 4);
        rejected.status = SupplierQuoteStatus::Rejected;
        let cheap_id = cheap.id.clone();

        let comparison = QuoteComparison::rank("enq-1", vec![dear, empty, rejected, cheap]);
        assert_eq!(comparison.quote_count, 4);
        assert!(!comparison.mixed_currencies);
        assert_eq!(comparison.best_quote_id, Some(cheap_id));
        let order: Vec<&str> = comparison.quotes.iter().map(|q| q.supplier_id.as_str()).collect();
        assert_eq!(order, vec!["empty", "rejected", "cheap", "dear"]);
    }

    #[test]
    fn test_mixed_currencies_have_no_winner() {
        let dinars = quote("local", Currency::BHD, dec!(100.000), 1);
        let dollars = quote("import", Currency::USD, dec!(90.00), 2);

        let comparison = QuoteComparison::rank("enq-1", vec![dinars, dollars]);
        assert!(comparison.mixed_currencies);
        assert_eq!(comparison.best_quote_id, None);
    }

    #[test]
    fn test_no_priced_quotes_has_no_winner() {
        let comparison =
            QuoteComparison::rank("enq-1", vec![quote("empty", Currency::USD, Decimal::ZERO, 1)]);
        assert_eq!(comparison.best_quote_id, None);
        assert!(!comparison.mixed_currencies);
    }
}
