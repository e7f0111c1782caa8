use std::sync::Arc;

use chrono::Utc;

use crate::core::traits::Repository;
use crate::core::validation::clean;
use crate::core::{AppError, ListQuery, Result, StatusFlow};
use crate::modules::inventory::models::stock_changes;
use crate::modules::inventory::{InventoryRepository, MovementType, StockLine};
use crate::modules::sales_orders::SalesOrderRepository;
use crate::modules::stock_issues::models::{
    CreateStockIssueRequest, IssueStatus, StockIssue, StockIssueDetail,
};
use crate::modules::stock_issues::repositories::StockIssueRepository;

pub struct StockIssueService {
    repo: Arc<dyn StockIssueRepository>,
    inventory: Arc<dyn InventoryRepository>,
    sales_orders: Arc<dyn SalesOrderRepository>,
}

impl StockIssueService {
    pub fn new(
        repo: Arc<dyn StockIssueRepository>,
        inventory: Arc<dyn InventoryRepository>,
        sales_orders: Arc<dyn SalesOrderRepository>,
    ) -> Self {
        Self {
            repo,
            inventory,
            sales_orders,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<StockIssue>> {
        if let Some(status) = query.status.as_deref() {
            status.parse::<IssueStatus>().map_err(AppError::Validation)?;
        }
        self.repo.list(query).await
    }

    pub async fn find(&self, id: &str) -> Result<StockIssue> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Stock issue '{}' not found", id)))
    }

    pub async fn get(&self, id: &str) -> Result<StockIssueDetail> {
        let issue = self.find(id).await?;
        let items = self.repo.lines(id).await?;
        Ok(StockIssueDetail { issue, items })
    }

    pub async fn create(&self, request: CreateStockIssueRequest) -> Result<StockIssueDetail> {
        request.validate()?;

        if let Some(order_id) = clean(request.sales_order_id.clone()) {
            if self.sales_orders.find_by_id(&order_id).await?.is_none() {
                return Err(AppError::validation(format!(
                    "Sales order '{}' does not exist",
                    order_id
                )));
            }
        }

        let date = request.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let number = self.repo.next_number(date).await?;
        let issue = StockIssue::new(number, &request);

        let mut items = Vec::with_capacity(request.items.len());
        for (idx, input) in request.items.iter().enumerate() {
            let item_id = clean(input.inventory_item_id.clone()).unwrap_or_default();
            let item = self.inventory.find_by_id(&item_id).await?.ok_or_else(|| {
                AppError::validation(format!("Inventory item '{}' does not exist", item_id))
            })?;
            items.push(StockLine::new(
                &issue.id,
                idx as i32 + 1,
                item.id,
                clean(input.description.clone()).unwrap_or(item.name),
                clean(input.unit.clone()).or(Some(item.unit)),
                input,
            ));
        }

        self.repo.create(&issue, &items).await?;
        tracing::info!(
            id = %issue.id,
            number = %issue.issue_number,
            lines = items.len(),
            "Stock issue created"
        );

        Ok(StockIssueDetail { issue, items })
    }

    /// Take the quantities out of stock; fails as a whole when any item is short
    pub async fn issue(&self, id: &str) -> Result<StockIssueDetail> {
        let StockIssueDetail { mut issue, items } = self.get(id).await?;
        issue.status.ensure_transition(IssueStatus::Issued)?;

        let changes = stock_changes(&items, MovementType::Issue, &issue.id, &issue.issue_number);
        let now = Utc::now();
        issue.status = IssueStatus::Issued;
        issue.issued_at = Some(now);
        issue.updated_at = now;

        self.repo.issue(&issue, &changes).await?;
        tracing::info!(id = %issue.id, number = %issue.issue_number, "Stock issued");

        Ok(StockIssueDetail { issue, items })
    }

    pub async fn cancel(&self, id: &str) -> Result<StockIssue> {
        let mut issue = self.find(id).await?;
        issue.status.ensure_transition(IssueStatus::Cancelled)?;
        self.repo.cancel(id).await?;

        issue.status = IssueStatus::Cancelled;
        issue.updated_at = Utc::now();
        Ok(issue)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let issue = self.find(id).await?;
        if issue.status != IssueStatus::Draft {
            return Err(AppError::InvalidTransition(format!(
                "Stock issue {} is {}; only drafts can be deleted",
                issue.issue_number, issue.status
            )));
        }
        self.repo.delete(id).await
    }
}
