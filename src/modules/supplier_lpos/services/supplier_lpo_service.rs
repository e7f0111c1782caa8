use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::core::line_items::{build_lines, reprice_all};
use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, ListQuery, PricedLine, Result, StatusFlow};
use crate::modules::documents::{DocumentSource, DocumentType, PrintableDocument, PrintableLine};
use crate::modules::email::models::AttachmentRef;
use crate::modules::email::{EmailDispatch, EmailService, SendEmailRequest};
use crate::modules::parties::PartyRepository;
use crate::modules::supplier_lpos::models::{
    CreateSupplierLpoRequest, LpoAction, LpoEmailRequest, LpoStatus, LpoStatusChange,
    SupplierLpo, SupplierLpoDetail, UpdateSupplierLpoRequest,
};
use crate::modules::supplier_lpos::repositories::SupplierLpoRepository;
use crate::modules::supplier_quotes::SupplierQuoteRepository;

/// Outcome of emailing an LPO to its supplier
#[derive(Debug, Clone, Serialize)]
pub struct LpoEmailOutcome {
    pub dispatch: EmailDispatch,
    pub lpo: SupplierLpo,
}

pub struct SupplierLpoService {
    repo: Arc<dyn SupplierLpoRepository>,
    suppliers: Arc<dyn PartyRepository>,
    quotes: Arc<dyn SupplierQuoteRepository>,
}

impl SupplierLpoService {
    pub fn new(
        repo: Arc<dyn SupplierLpoRepository>,
        suppliers: Arc<dyn PartyRepository>,
        quotes: Arc<dyn SupplierQuoteRepository>,
    ) -> Self {
        Self {
            repo,
            suppliers,
            quotes,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierLpo>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<LpoStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<SupplierLpo> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier LPO '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<SupplierLpoDetail> {
        let lpo = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(SupplierLpoDetail { lpo, items })
    }

    pub async fn lines(&self, id: &str) -> Result<Vec<PricedLine>> {
        self.repo.lines(id).await
    }

    /// New LPOs always start as drafts
    pub async fn create(&self, request: CreateSupplierLpoRequest) -> Result<SupplierLpoDetail> {
        request.validate()?;

        if self.suppliers.find_by_id(request.supplier_id.trim()).await?.is_none() {
            return Err(AppError::validation(format!(
                "Supplier '{}' does not exist",
                request.supplier_id
            )));
        }

        let date = request.lpo_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let mut lpo = SupplierLpo::new(number, &request);

        let quoted_lines = match &lpo.supplier_quote_id {
            Some(quote_id) => self.quoted_lines(quote_id, &lpo.supplier_id).await?,
            None => Vec::new(),
        };

        let (items, totals) = if request.items.is_empty() && !quoted_lines.is_empty() {
            let mut lines: Vec<PricedLine> =
                quoted_lines.iter().map(|l| l.copy_to(&lpo.id)).collect();
            let totals = reprice_all(&mut lines, lpo.currency)?;
            (lines, totals)
        } else {
            build_lines(&lpo.id, lpo.currency, request.items)?
        };
        lpo.totals = totals;

        let opened = LpoStatusChange::new(
            &lpo.id,
            None,
            LpoStatus::Draft,
            lpo.created_by.clone(),
            Some("Created".to_string()),
        );
        self.repo.create(&lpo, &items, &opened).await?;
        tracing::info!(
            id = %lpo.id,
            number = %lpo.lpo_number,
            supplier_id = %lpo.supplier_id,
            total = %lpo.totals.total_amount,
            "Supplier LPO created"
        );

        Ok(SupplierLpoDetail { lpo, items })
    }

    /// Lines of an accepted or pending quote from the same supplier
    async fn quoted_lines(&self, quote_id: &str, supplier_id: &str) -> Result<Vec<PricedLine>> {
        let quote = self.quotes.find_by_id(quote_id).await?.ok_or_else(|| {
            AppError::validation(format!("Supplier quote '{}' does not exist", quote_id))
        })?;
        if quote.supplier_id != supplier_id {
            return Err(AppError::validation(format!(
                "Supplier quote {} belongs to a different supplier",
                quote.quote_number
            )));
        }
        self.quotes.lines(quote_id).await
    }

    /// Edit a draft, or a rejected LPO which then returns to draft
    pub async fn update(
        &self,
        id: &str,
        request: UpdateSupplierLpoRequest,
    ) -> Result<SupplierLpoDetail> {
        let mut lpo = self.find(id).await?;
        if !lpo.status.is_editable() {
            return Err(AppError::InvalidTransition(format!(
                "Supplier LPO {} is {}; only draft or rejected orders can be edited",
                lpo.lpo_number, lpo.status
            )));
        }
        request.validate(lpo.lpo_date)?;

        lpo.expected_delivery_date = request.expected_delivery_date;
        lpo.delivery_address = clean(request.delivery_address);
        lpo.payment_terms = clean(request.payment_terms);
        lpo.notes = clean(request.notes);
        lpo.terms = clean(request.terms);
        if let Some(currency) = request.currency {
            lpo.currency = currency;
        }

        let items = match request.items {
            Some(inputs) => {
                let (items, totals) = build_lines(&lpo.id, lpo.currency, inputs)?;
                lpo.totals = totals;
                items
            }
            None => {
                let mut items = self.repo.lines(id).await?;
                lpo.totals = reprice_all(&mut items, lpo.currency)?;
                items
            }
        };

        let reopened = if lpo.status == LpoStatus::Rejected {
            let action = LpoAction {
                performed_by: request.performed_by,
                notes: Some("Edited after rejection".to_string()),
                supplier_reference: None,
            };
            let change = LpoStatusChange::new(
                id,
                Some(LpoStatus::Rejected),
                LpoStatus::Draft,
                clean(action.performed_by.clone()),
                action.notes.clone(),
            );
            lpo.stamp(LpoStatus::Draft, &action)?;
            Some(change)
        } else {
            lpo.updated_at = Utc::now();
            None
        };

        self.repo.update(&lpo, &items, reopened.as_ref()).await?;
        if reopened.is_some() {
            tracing::info!(id = %id, number = %lpo.lpo_number, "Rejected supplier LPO returned to draft");
        }

        Ok(SupplierLpoDetail { lpo, items })
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let lpo = self.find(id).await?;
        if lpo.status != LpoStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Supplier LPO {} is {}; only drafts can be deleted",
                lpo.lpo_number, lpo.status
            )));
        }
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %lpo.lpo_number, "Supplier LPO deleted");
        Ok(())
    }

    /// Apply one workflow step and append it to the history
    pub async fn transition(
        &self,
        id: &str,
        next: LpoStatus,
        action: LpoAction,
    ) -> Result<SupplierLpo> {
        let mut lpo = self.find(id).await?;
        let from = lpo.status;
        from.ensure_transition(next)?;

        if next == LpoStatus::Submitted && self.repo.lines(id).await?.is_empty() {
            return Err(AppError::validation(format!(
                "Supplier LPO {} needs at least one item before submission",
                lpo.lpo_number
            )));
        }

        lpo.stamp(next, &action)?;
        let change = LpoStatusChange::new(
            id,
            Some(from),
            next,
            clean(action.performed_by),
            clean(action.notes),
        );
        self.repo.transition(&lpo, &change).await?;

        tracing::info!(
            id = %id,
            number = %lpo.lpo_number,
            from = %from,
            to = %next,
            performed_by = ?change.performed_by,
            "Supplier LPO status changed"
        );
        Ok(lpo)
    }

    pub async fn history(&self, id: &str) -> Result<Vec<LpoStatusChange>> {
        self.find(id).await?;
        self.repo.history(id).await
    }

    /// Email the LPO PDF to the supplier.
    ///
    /// An approved LPO moves to `sent_to_supplier` once the dispatch is accepted.
    pub async fn send_email(
        &self,
        id: &str,
        request: LpoEmailRequest,
        email: &EmailService,
    ) -> Result<LpoEmailOutcome> {
        let lpo = self.find(id).await?;
        if !lpo.status.is_released() {
            return Err(AppError::InvalidTransition(format!(
                "Supplier LPO {} is {}; it must be approved before it is emailed",
                lpo.lpo_number, lpo.status
            )));
        }

        let to = match clean(request.to) {
            Some(to) => to,
            None => self
                .suppliers
                .find_by_id(&lpo.supplier_id)
                .await?
                .and_then(|s| s.email)
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Supplier of LPO {} has no email address; provide 'to'",
                        lpo.lpo_number
                    ))
                })?,
        };

        let dispatch = email
            .send(SendEmailRequest {
                to,
                cc: request.cc,
                subject: clean(request.subject)
                    .unwrap_or_else(|| format!("Purchase Order {}", lpo.lpo_number)),
                body: clean(request.body).unwrap_or_else(|| {
                    format!(
                        "Dear Supplier,\n\nPlease find attached our purchase order {}.\n\nRegards",
                        lpo.lpo_number
                    )
                }),
                attachment: Some(AttachmentRef {
                    document_type: DocumentType::SupplierLpo,
                    document_id: lpo.id.clone(),
                }),
            })
            .await?;

        let lpo = if lpo.status == LpoStatus::Approved && dispatch.is_accepted() {
            let action = LpoAction {
                performed_by: request.performed_by,
                notes: Some(format!("Emailed ({})", dispatch.status)),
                supplier_reference: None,
            };
            self.transition(id, LpoStatus::SentToSupplier, action).await?
        } else {
            lpo
        };

        Ok(LpoEmailOutcome { dispatch, lpo })
    }
}

#[async_trait]
impl DocumentSource for SupplierLpoService {
    async fn printable(&self, id: &str) -> Result<PrintableDocument> {
        let SupplierLpoDetail { lpo, items } = self.get(id).await?;
        let supplier = self.suppliers.find_by_id(&lpo.supplier_id).await?;

        let mut meta = vec![("Status".to_string(), lpo.status.to_string())];
        if let Some(date) = lpo.expected_delivery_date {
            meta.push(("Delivery by".to_string(), date.format("%d %b %Y").to_string()));
        }
        if let Some(terms) = &lpo.payment_terms {
            meta.push(("Payment terms".to_string(), terms.clone()));
        }
        if let Some(address) = &lpo.delivery_address {
            meta.push(("Deliver to".to_string(), address.clone()));
        }
        if let Some(approver) = &lpo.approved_by {
            meta.push(("Approved by".to_string(), approver.clone()));
        }

        Ok(PrintableDocument {
            title: "PURCHASE ORDER".to_string(),
            number: lpo.lpo_number,
            date: lpo.lpo_date,
            meta,
            party_heading: "Supplier".to_string(),
            party_lines: supplier
                .map(|s| s.address_lines())
                .unwrap_or_else(|| vec![lpo.supplier_id.clone()]),
            currency: lpo.currency,
            lines: items.iter().map(PrintableLine::from).collect(),
            totals: Some(lpo.totals),
            notes: lpo.notes,
            terms: lpo.terms,
        })
    }
}
