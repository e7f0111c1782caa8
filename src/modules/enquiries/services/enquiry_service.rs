use std::sync::Arc;

use chrono::Utc;

use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, ListQuery, Result, StatusFlow};
use crate::modules::enquiries::models::enquiry::renumber;
use crate::modules::enquiries::models::{
    CreateEnquiryRequest, Enquiry, EnquiryDetail, EnquiryItem, EnquiryItemInput, EnquiryStatus,
    UpdateEnquiryRequest,
};
use crate::modules::enquiries::repositories::EnquiryRepository;
use crate::modules::parties::PartyRepository;

/// Enquiries and their item manager
pub struct EnquiryService {
    repo: Arc<dyn EnquiryRepository>,
    customers: Arc<dyn PartyRepository>,
}

impl EnquiryService {
    pub fn new(repo: Arc<dyn EnquiryRepository>, customers: Arc<dyn PartyRepository>) -> Self {
        Self { repo, customers }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Enquiry>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<EnquiryStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<Enquiry> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Enquiry '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<EnquiryDetail> {
        let enquiry = self.find(id).await?;
        let items = self.repo.items(id).await?;
        Ok(EnquiryDetail { enquiry, items })
    }

    pub async fn create(&self, request: CreateEnquiryRequest) -> Result<EnquiryDetail> {
        request.validate()?;

        if self.customers.find_by_id(request.customer_id.trim()).await?.is_none() {
            return Err(AppError::validation(format!(
                "Customer '{}' does not exist",
                request.customer_id
            )));
        }

        let date = request.enquiry_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let enquiry = Enquiry::new(number, &request);
        let items: Vec<EnquiryItem> = request
            .items
            .into_iter()
            .enumerate()
            .map(|(idx, input)| EnquiryItem::new(&enquiry.id, idx as i32 + 1, input))
            .collect();

        self.repo.create(&enquiry, &items).await?;
        tracing::info!(
            id = %enquiry.id,
            number = %enquiry.enquiry_number,
            items = items.len(),
            "Enquiry created"
        );

        Ok(EnquiryDetail { enquiry, items })
    }

    pub async fn update(&self, id: &str, request: UpdateEnquiryRequest) -> Result<EnquiryDetail> {
        let mut enquiry = self.find(id).await?;
        if enquiry.status.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "Enquiry {} is {} and can no longer be edited",
                enquiry.enquiry_number, enquiry.status
            )));
        }
        request.validate(enquiry.enquiry_date)?;

        enquiry.subject = request.subject.trim().to_string();
        enquiry.required_by = request.required_by;
        enquiry.reference = clean(request.reference);
        enquiry.notes = clean(request.notes);
        enquiry.updated_at = Utc::now();
        self.repo.update_header(&enquiry).await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let enquiry = self.find(id).await?;
        if enquiry.status != EnquiryStatus::New {
            return Err(AppError::InvalidTransition(format!(
                "Only new enquiries can be deleted; {} is {}",
                enquiry.enquiry_number, enquiry.status
            )));
        }
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %enquiry.enquiry_number, "Enquiry deleted");
        Ok(())
    }

    pub async fn change_status(&self, id: &str, status: EnquiryStatus) -> Result<Enquiry> {
        let mut enquiry = self.find(id).await?;
        enquiry.status.ensure_transition(status)?;
        self.repo.update_status(id, status).await?;

        tracing::info!(
            id = %id,
            from = %enquiry.status,
            to = %status,
            "Enquiry status changed"
        );
        enquiry.status = status;
        Ok(enquiry)
    }

    /// Move to `quoted` once a quotation is raised; later stages are left alone
    pub async fn mark_quoted(&self, id: &str) -> Result<()> {
        let enquiry = self.find(id).await?;
        if enquiry.status.can_transition_to(EnquiryStatus::Quoted) {
            self.repo.update_status(id, EnquiryStatus::Quoted).await?;
            tracing::info!(id = %id, from = %enquiry.status, "Enquiry marked as quoted");
        }
        Ok(())
    }

    pub async fn list_items(&self, id: &str) -> Result<Vec<EnquiryItem>> {
        self.find(id).await?;
        self.repo.items(id).await
    }

    pub async fn add_item(&self, id: &str, input: EnquiryItemInput) -> Result<EnquiryItem> {
        let mut items = self.editable_items(id).await?;
        AppError::from_fields(input.validate("item"))?;

        let next_number = items.iter().map(|i| i.line_number).max().unwrap_or(0) + 1;
        let item = EnquiryItem::new(id, next_number, input);
        items.push(item.clone());
        self.repo.save_items(id, &items).await?;
        Ok(item)
    }

    pub async fn update_item(
        &self,
        id: &str,
        item_id: &str,
        input: EnquiryItemInput,
    ) -> Result<EnquiryItem> {
        let mut items = self.editable_items(id).await?;
        AppError::from_fields(input.validate("item"))?;

        let slot = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::not_found(format!("Enquiry item '{}' not found", item_id)))?;
        let replacement = EnquiryItem::new(id, slot.line_number, input);
        *slot = EnquiryItem {
            id: slot.id.clone(),
            ..replacement
        };
        let updated = slot.clone();

        self.repo.save_items(id, &items).await?;
        Ok(updated)
    }

    pub async fn remove_item(&self, id: &str, item_id: &str) -> Result<()> {
        let mut items = self.editable_items(id).await?;
        let before = items.len();
        items.retain(|i| i.id != item_id);
        if items.len() == before {
            return Err(AppError::not_found(format!(
                "Enquiry item '{}' not found",
                item_id
            )));
        }
        renumber(&mut items);
        self.repo.save_items(id, &items).await
    }

    async fn editable_items(&self, id: &str) -> Result<Vec<EnquiryItem>> {
        let enquiry = self.find(id).await?;
        if !enquiry.status.items_editable() {
            return Err(AppError::InvalidTransition(format!(
                "Items of enquiry {} cannot be changed while it is {}",
                enquiry.enquiry_number, enquiry.status
            )));
        }
        self.repo.items(id).await
    }
}
