// In-memory repositories for HTTP contract tests.
//
// They follow the same contracts as the MySQL implementations (duplicate checks,
// optimistic status updates) without needing a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use tradeflow::core::numbering::master_code;
use tradeflow::core::traits::Repository;
use tradeflow::core::{AppError, DocumentSeries, DocumentTotals, ListQuery, PricedLine, Result};
use tradeflow::modules::email::{EmailLog, EmailLogRepository};
use tradeflow::modules::parties::{Party, PartyKind, PartyRepository};
use tradeflow::modules::supplier_lpos::models::LpoStatusChange;
use tradeflow::modules::supplier_lpos::{SupplierLpo, SupplierLpoRepository};
use tradeflow::modules::supplier_quotes::{
    SupplierQuote, SupplierQuoteRepository, SupplierQuoteStatus,
};

fn page<T: Clone>(items: impl Iterator<Item = T>, query: &ListQuery) -> Vec<T> {
    items
        .skip(query.offset() as usize)
        .take(query.limit() as usize)
        .collect()
}

fn search_term(query: &ListQuery) -> Option<String> {
    query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

pub struct MemoryParties {
    kind: PartyKind,
    rows: Mutex<Vec<Party>>,
}

impl MemoryParties {
    pub fn new(kind: PartyKind) -> Self {
        Self {
            kind,
            rows: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Repository<Party> for MemoryParties {
    async fn create(&self, party: &Party) -> Result<Party> {
        self.rows.lock().unwrap().push(party.clone());
        Ok(party.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Party>> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, party: &Party) -> Result<Party> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|p| p.id == party.id)
            .ok_or_else(|| AppError::not_found(format!("{} not found", self.kind.label())))?;
        *slot = party.clone();
        Ok(party.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.rows.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Party>> {
        let term = search_term(query);
        let rows = self.rows.lock().unwrap();
        let matching = rows.iter().filter(|p| match &term {
            Some(term) => {
                p.name.to_lowercase().contains(term) || p.code.to_lowercase().contains(term)
            }
            None => true,
        });
        Ok(page(matching.cloned(), query))
    }
}

#[async_trait]
impl PartyRepository for MemoryParties {
    fn kind(&self) -> PartyKind {
        self.kind
    }

    async fn find_duplicate(
        &self,
        name: &str,
        email: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Party>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|p| Some(p.id.as_str()) != exclude_id)
            .find(|p| {
                p.name.to_lowercase() == name.trim().to_lowercase()
                    || matches!((p.email.as_deref(), email), (Some(a), Some(b)) if a.to_lowercase() == b.to_lowercase())
            })
            .cloned())
    }

    async fn next_code(&self) -> Result<String> {
        let count = self.rows.lock().unwrap().len() as i64;
        Ok(master_code(self.kind.code_prefix(), count + 1))
    }
}

#[derive(Default)]
struct LpoStore {
    headers: Vec<SupplierLpo>,
    lines: Vec<PricedLine>,
    history: Vec<LpoStatusChange>,
}

#[derive(Default)]
pub struct MemoryLpos {
    store: Mutex<LpoStore>,
}

#[async_trait]
impl SupplierLpoRepository for MemoryLpos {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        let count = self.store.lock().unwrap().headers.len() as i64;
        Ok(DocumentSeries::SupplierLpo.format(date, count + 1))
    }

    async fn create(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        opened: &LpoStatusChange,
    ) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.headers.push(lpo.clone());
        store.lines.extend_from_slice(lines);
        store.history.push(opened.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SupplierLpo>> {
        let store = self.store.lock().unwrap();
        Ok(store.headers.iter().find(|l| l.id == id).cloned())
    }

    async fn lines(&self, lpo_id: &str) -> Result<Vec<PricedLine>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .lines
            .iter()
            .filter(|l| l.document_id == lpo_id)
            .cloned()
            .collect())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<SupplierLpo>> {
        let store = self.store.lock().unwrap();
        let matching = store.headers.iter().filter(|l| {
            query.status.as_deref().map_or(true, |s| l.status.as_str() == s)
                && query
                    .supplier_id
                    .as_deref()
                    .map_or(true, |s| l.supplier_id == s)
        });
        Ok(page(matching.cloned(), query))
    }

    async fn update(
        &self,
        lpo: &SupplierLpo,
        lines: &[PricedLine],
        change: Option<&LpoStatusChange>,
    ) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let expected = change.and_then(|c| c.from_status).unwrap_or(lpo.status);
        match store.headers.iter_mut().find(|l| l.id == lpo.id) {
            Some(slot) if slot.status == expected => *slot = lpo.clone(),
            Some(_) => {
                return Err(AppError::conflict(format!(
                    "Supplier LPO {} was changed by another request",
                    lpo.lpo_number
                )))
            }
            None => return Err(AppError::not_found("Supplier LPO not found")),
        }
        store.lines.retain(|l| l.document_id != lpo.id);
        store.lines.extend_from_slice(lines);
        if let Some(change) = change {
            store.history.push(change.clone());
        }
        Ok(())
    }

    async fn transition(&self, lpo: &SupplierLpo, change: &LpoStatusChange) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        let slot = store
            .headers
            .iter_mut()
            .find(|l| l.id == lpo.id && Some(l.status) == change.from_status)
            .ok_or_else(|| {
                AppError::conflict(format!("Supplier LPO {} changed underneath", lpo.lpo_number))
            })?;
        *slot = lpo.clone();
        store.history.push(change.clone());
        Ok(())
    }

    async fn history(&self, lpo_id: &str) -> Result<Vec<LpoStatusChange>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .history
            .iter()
            .filter(|h| h.lpo_id == lpo_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.headers.retain(|l| l.id != id);
        store.lines.retain(|l| l.document_id != id);
        store.history.retain(|h| h.lpo_id != id);
        Ok(())
    }
}

/// Supplier quote storage that never holds a quote; LPOs in these tests are keyed in by hand
pub struct NoQuotes;

#[async_trait]
impl SupplierQuoteRepository for NoQuotes {
    async fn next_number(&self, date: NaiveDate) -> Result<String> {
        Ok(DocumentSeries::SupplierQuote.format(date, 1))
    }

    async fn create(&self, _quote: &SupplierQuote, _lines: &[PricedLine]) -> Result<()> {
        Err(AppError::internal("quotes are not stored in this fixture"))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<SupplierQuote>> {
        Ok(None)
    }

    async fn lines(&self, _quote_id: &str) -> Result<Vec<PricedLine>> {
        Ok(Vec::new())
    }

    async fn list(&self, _query: &ListQuery) -> Result<Vec<SupplierQuote>> {
        Ok(Vec::new())
    }

    async fn for_enquiry(&self, _enquiry_id: &str) -> Result<Vec<SupplierQuote>> {
        Ok(Vec::new())
    }

    async fn update_header(&self, _quote: &SupplierQuote) -> Result<()> {
        Ok(())
    }

    async fn save_lines(
        &self,
        _quote_id: &str,
        _totals: &DocumentTotals,
        _lines: &[PricedLine],
    ) -> Result<()> {
        Ok(())
    }

    async fn update_status(&self, _id: &str, _status: SupplierQuoteStatus) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEmailLogs {
    rows: Mutex<Vec<EmailLog>>,
}

impl MemoryEmailLogs {
    pub fn all(&self) -> Vec<EmailLog> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailLogRepository for MemoryEmailLogs {
    async fn record(&self, log: &EmailLog) -> Result<()> {
        self.rows.lock().unwrap().push(log.clone());
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<EmailLog>> {
        let rows = self.rows.lock().unwrap();
        Ok(page(rows.iter().rev().cloned(), query))
    }
}
