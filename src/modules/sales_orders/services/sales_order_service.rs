use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::line_items::{build_lines, totals_of};
use crate::core::traits::Repository;
use crate::core::{AppError, Currency, ListQuery, PricedLine, Result, StatusFlow};
use crate::modules::documents::{DocumentSource, PrintableDocument, PrintableLine};
use crate::modules::parties::PartyRepository;
use crate::modules::sales_orders::models::{
    CreateSalesOrderRequest, SalesOrder, SalesOrderDetail, SalesOrderStatus,
};
use crate::modules::sales_orders::repositories::SalesOrderRepository;

/// Header fields carried over from an accepted quotation
#[derive(Debug, Clone)]
pub struct QuotationConversion {
    pub quotation_id: String,
    pub quotation_number: String,
    pub customer_id: String,
    pub currency: Currency,
    pub customer_reference: Option<String>,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub lines: Vec<PricedLine>,
}

pub struct SalesOrderService {
    repo: Arc<dyn SalesOrderRepository>,
    customers: Arc<dyn PartyRepository>,
}

impl SalesOrderService {
    pub fn new(repo: Arc<dyn SalesOrderRepository>, customers: Arc<dyn PartyRepository>) -> Self {
        Self { repo, customers }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<SalesOrder>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<SalesOrderStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<SalesOrder> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sales order '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<SalesOrderDetail> {
        let order = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(SalesOrderDetail { order, items })
    }

    pub async fn create(&self, request: CreateSalesOrderRequest) -> Result<SalesOrderDetail> {
        request.validate()?;

        if self.customers.find_by_id(request.customer_id.trim()).await?.is_none() {
            return Err(AppError::validation(format!(
                "Customer '{}' does not exist",
                request.customer_id
            )));
        }

        let date = request.order_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let mut order = SalesOrder::new(number, &request);
        let (items, totals) = build_lines(&order.id, order.currency, request.items)?;
        order.totals = totals;

        self.repo.create(&order, &items).await?;
        tracing::info!(
            id = %order.id,
            number = %order.order_number,
            total = %order.totals.total_amount,
            "Sales order created"
        );

        Ok(SalesOrderDetail { order, items })
    }

    /// Draft order copying an accepted quotation's lines
    pub async fn create_from_quotation(
        &self,
        conversion: QuotationConversion,
    ) -> Result<SalesOrderDetail> {
        let now = Utc::now();
        let number = self.repo.next_number(now.date_naive()).await?;

        let request = CreateSalesOrderRequest {
            customer_id: conversion.customer_id,
            order_date: Some(now.date_naive()),
            delivery_date: None,
            customer_reference: conversion.customer_reference,
            currency: conversion.currency,
            notes: conversion.notes,
            terms: conversion.terms,
            items: Vec::new(),
        };
        let mut order = SalesOrder::new(number, &request);
        order.quotation_id = Some(conversion.quotation_id.clone());

        let items: Vec<PricedLine> = conversion
            .lines
            .iter()
            .map(|line| line.copy_to(&order.id))
            .collect();
        order.totals = totals_of(&items)?;

        self.repo
            .create_from_quotation(&conversion.quotation_id, &order, &items)
            .await?;
        tracing::info!(
            id = %order.id,
            number = %order.order_number,
            quotation = %conversion.quotation_number,
            "Quotation converted to sales order"
        );

        Ok(SalesOrderDetail { order, items })
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let order = self.find(id).await?;
        if order.status != SalesOrderStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Only draft sales orders can be deleted; {} is {}",
                order.order_number, order.status
            )));
        }
        self.repo.delete(id).await?;
        tracing::info!(id = %id, number = %order.order_number, "Sales order deleted");
        Ok(())
    }

    pub async fn change_status(&self, id: &str, status: SalesOrderStatus) -> Result<SalesOrder> {
        let mut order = self.find(id).await?;
        order.status.ensure_transition(status)?;
        self.repo.update_status(id, status).await?;

        tracing::info!(id = %id, from = %order.status, to = %status, "Sales order status changed");
        order.status = status;
        Ok(order)
    }
}

#[async_trait]
impl DocumentSource for SalesOrderService {
    async fn printable(&self, id: &str) -> Result<PrintableDocument> {
        let SalesOrderDetail { order, items } = self.get(id).await?;
        let customer = self.customers.find_by_id(&order.customer_id).await?;

        let mut meta = vec![("Status".to_string(), order.status.to_string())];
        if let Some(reference) = &order.customer_reference {
            meta.push(("Customer PO".to_string(), reference.clone()));
        }
        if let Some(delivery) = order.delivery_date {
            meta.push(("Delivery".to_string(), delivery.to_string()));
        }

        Ok(PrintableDocument {
            title: "SALES ORDER".to_string(),
            number: order.order_number,
            date: order.order_date,
            meta,
            party_heading: "Customer".to_string(),
            party_lines: customer
                .map(|c| c.address_lines())
                .unwrap_or_else(|| vec![order.customer_id.clone()]),
            currency: order.currency,
            lines: items.iter().map(PrintableLine::from).collect(),
            totals: Some(order.totals),
            notes: order.notes,
            terms: order.terms,
        })
    }
}
