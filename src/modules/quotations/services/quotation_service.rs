use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::line_items::{self, build_lines, reprice_all, totals_of};
use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, LineItemInput, ListQuery, PricedLine, Result, StatusFlow};
use crate::modules::documents::{DocumentSource, PrintableDocument, PrintableLine};
use crate::modules::enquiries::{EnquiryService, EnquiryStatus};
use crate::modules::parties::PartyRepository;
use crate::modules::quotations::models::{
    CreateQuotationRequest, Quotation, QuotationDetail, QuotationStatus, UpdateQuotationRequest,
};
use crate::modules::quotations::repositories::QuotationRepository;
use crate::modules::sales_orders::models::SalesOrderDetail;
use crate::modules::sales_orders::{QuotationConversion, SalesOrderService};

pub struct QuotationService {
    repo: Arc<dyn QuotationRepository>,
    customers: Arc<dyn PartyRepository>,
    enquiries: Arc<EnquiryService>,
    sales_orders: Arc<SalesOrderService>,
}

impl QuotationService {
    pub fn new(
        repo: Arc<dyn QuotationRepository>,
        customers: Arc<dyn PartyRepository>,
        enquiries: Arc<EnquiryService>,
        sales_orders: Arc<SalesOrderService>,
    ) -> Self {
        Self {
            repo,
            customers,
            enquiries,
            sales_orders,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Quotation>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<QuotationStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<Quotation> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Quotation '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<QuotationDetail> {
        let quotation = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(QuotationDetail { quotation, items })
    }

    pub async fn create(&self, mut request: CreateQuotationRequest) -> Result<QuotationDetail> {
        request.validate()?;

        if self.customers.find_by_id(request.customer_id.trim()).await?.is_none() {
            return Err(AppError::validation(format!(
                "Customer '{}' does not exist",
                request.customer_id
            )));
        }

        let enquiry_id = clean(request.enquiry_id.clone());
        if let Some(enquiry_id) = &enquiry_id {
            let enquiry = self.enquiries.get(enquiry_id).await?;
            if enquiry.enquiry.customer_id != request.customer_id.trim() {
                return Err(AppError::validation(format!(
                    "Enquiry {} belongs to a different customer",
                    enquiry.enquiry.enquiry_number
                )));
            }
            if matches!(
                enquiry.enquiry.status,
                EnquiryStatus::Closed | EnquiryStatus::Cancelled
            ) {
                return Err(AppError::validation(format!(
                    "Enquiry {} is {} and cannot be quoted",
                    enquiry.enquiry.enquiry_number, enquiry.enquiry.status
                )));
            }
            // Unpriced copy of the enquiry items when the client sends none
            if request.items.is_empty() {
                request.items = enquiry
                    .items
                    .into_iter()
                    .map(|item| LineItemInput {
                        inventory_item_id: item.inventory_item_id,
                        description: item.description,
                        quantity: item.quantity,
                        unit: Some(item.unit),
                        unit_price: Decimal::ZERO,
                        discount_percent: Decimal::ZERO,
                        tax_percent: Decimal::ZERO,
                        notes: item.notes,
                    })
                    .collect();
            }
        }

        let date = request
            .quotation_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let mut quotation = Quotation::new(number, &request);
        let (items, totals) = build_lines(&quotation.id, quotation.currency, request.items)?;
        quotation.totals = totals;

        self.repo.create(&quotation, &items).await?;
        tracing::info!(
            id = %quotation.id,
            number = %quotation.quotation_number,
            total = %quotation.totals.total_amount,
            "Quotation created"
        );

        if let Some(enquiry_id) = &enquiry_id {
            self.enquiries.mark_quoted(enquiry_id).await?;
        }

        Ok(QuotationDetail { quotation, items })
    }

    pub async fn update(&self, id: &str, request: UpdateQuotationRequest) -> Result<QuotationDetail> {
        let mut quotation = self.draft(id).await?;
        request.validate(quotation.quotation_date)?;
        let mut items = self.repo.lines(id).await?;

        if let Some(valid_until) = request.valid_until {
            quotation.valid_until = valid_until;
        }
        quotation.reference = clean(request.reference);
        quotation.notes = clean(request.notes);
        quotation.terms = clean(request.terms);
        if let Some(currency) = request.currency {
            if currency != quotation.currency {
                quotation.currency = currency;
                quotation.totals = reprice_all(&mut items, currency)?;
            }
        }
        quotation.updated_at = Utc::now();

        self.repo.update(&quotation, &items).await?;
        Ok(QuotationDetail { quotation, items })
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let quotation = self.draft(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %quotation.quotation_number, "Quotation deleted");
        Ok(())
    }

    pub async fn change_status(&self, id: &str, status: QuotationStatus) -> Result<Quotation> {
        let mut quotation = self.find(id).await?;
        quotation.status.ensure_transition(status)?;

        if status == QuotationStatus::Sent && self.repo.lines(id).await?.is_empty() {
            return Err(AppError::validation(format!(
                "Quotation {} has no items",
                quotation.quotation_number
            )));
        }

        self.repo.update_status(id, status).await?;
        tracing::info!(
            id = %id,
            from = %quotation.status,
            to = %status,
            "Quotation status changed"
        );
        quotation.status = status;
        Ok(quotation)
    }

    /// Accepted quotation -> draft sales order, at most once
    pub async fn convert_to_order(&self, id: &str) -> Result<SalesOrderDetail> {
        let QuotationDetail { quotation, items } = self.get(id).await?;

        if quotation.status != QuotationStatus::Accepted {
            return Err(AppError::InvalidTransition(format!(
                "Quotation {} must be accepted before conversion; it is {}",
                quotation.quotation_number, quotation.status
            )));
        }
        if let Some(order_id) = &quotation.sales_order_id {
            return Err(AppError::conflict(format!(
                "Quotation {} was already converted to sales order '{}'",
                quotation.quotation_number, order_id
            )));
        }
        if items.is_empty() {
            return Err(AppError::validation(format!(
                "Quotation {} has no items",
                quotation.quotation_number
            )));
        }

        self.sales_orders
            .create_from_quotation(QuotationConversion {
                quotation_id: quotation.id,
                quotation_number: quotation.quotation_number,
                customer_id: quotation.customer_id,
                currency: quotation.currency,
                customer_reference: quotation.reference,
                notes: quotation.notes,
                terms: quotation.terms,
                lines: items,
            })
            .await
    }

    pub async fn list_items(&self, id: &str) -> Result<Vec<PricedLine>> {
        self.find(id).await?;
        self.repo.lines(id).await
    }

    pub async fn add_item(&self, id: &str, input: LineItemInput) -> Result<PricedLine> {
        let mut quotation = self.draft(id).await?;
        let mut lines = self.repo.lines(id).await?;
        let line = line_items::add_line(&mut lines, id, quotation.currency, input)?;
        self.save_lines(&mut quotation, &lines).await?;
        Ok(line)
    }

    pub async fn update_item(
        &self,
        id: &str,
        item_id: &str,
        input: LineItemInput,
    ) -> Result<PricedLine> {
        let mut quotation = self.draft(id).await?;
        let mut lines = self.repo.lines(id).await?;
        let line = line_items::update_line(&mut lines, item_id, quotation.currency, input)?;
        self.save_lines(&mut quotation, &lines).await?;
        Ok(line)
    }

    pub async fn remove_item(&self, id: &str, item_id: &str) -> Result<()> {
        let mut quotation = self.draft(id).await?;
        let mut lines = self.repo.lines(id).await?;
        line_items::remove_line(&mut lines, item_id)?;
        self.save_lines(&mut quotation, &lines).await
    }

    async fn save_lines(&self, quotation: &mut Quotation, lines: &[PricedLine]) -> Result<()> {
        quotation.totals = totals_of(lines)?;
        quotation.updated_at = Utc::now();
        self.repo.update(quotation, lines).await
    }

    async fn draft(&self, id: &str) -> Result<Quotation> {
        let quotation = self.find(id).await?;
        if quotation.status != QuotationStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Quotation {} is {}; only drafts can be changed",
                quotation.quotation_number, quotation.status
            )));
        }
        Ok(quotation)
    }
}

#[async_trait]
impl DocumentSource for QuotationService {
    async fn printable(&self, id: &str) -> Result<PrintableDocument> {
        let QuotationDetail { quotation, items } = self.get(id).await?;
        let customer = self.customers.find_by_id(&quotation.customer_id).await?;

        let mut meta = vec![(
            "Valid until".to_string(),
            quotation.valid_until.format("%d %b %Y").to_string(),
        )];
        if let Some(reference) = &quotation.reference {
            meta.push(("Reference".to_string(), reference.clone()));
        }

        Ok(PrintableDocument {
            title: "QUOTATION".to_string(),
            number: quotation.quotation_number,
            date: quotation.quotation_date,
            meta,
            party_heading: "Bill To".to_string(),
            party_lines: customer
                .map(|c| c.address_lines())
                .unwrap_or_else(|| vec![quotation.customer_id.clone()]),
            currency: quotation.currency,
            lines: items.iter().map(PrintableLine::from).collect(),
            totals: Some(quotation.totals),
            notes: quotation.notes,
            terms: quotation.terms,
        })
    }
}
