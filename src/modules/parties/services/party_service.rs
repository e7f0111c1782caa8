use std::sync::Arc;

use crate::core::traits::Repository;
use crate::core::{AppError, ListQuery, Result};
use crate::modules::parties::models::{Party, PartyKind, PartyRequest};
use crate::modules::parties::repositories::PartyRepository;

/// Customer or supplier maintenance
pub struct PartyService {
    repo: Arc<dyn PartyRepository>,
}

impl PartyService {
    pub fn new(repo: Arc<dyn PartyRepository>) -> Self {
        Self { repo }
    }

    pub fn kind(&self) -> PartyKind {
        self.repo.kind()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Party>> {
        self.repo.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<Party> {
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(format!("{} '{}' not found", self.kind().label(), id))
        })
    }

    pub async fn create(&self, request: PartyRequest) -> Result<Party> {
        request.validate()?;
        let code = self.repo.next_code().await?;
        let party = Party::new(code, request);

        self.ensure_unique(&party, None).await?;

        let created = self.repo.create(&party).await?;
        tracing::info!(
            kind = ?self.kind(),
            id = %created.id,
            code = %created.code,
            "Party created"
        );
        Ok(created)
    }

    pub async fn update(&self, id: &str, request: PartyRequest) -> Result<Party> {
        request.validate()?;
        let mut party = self.get(id).await?;
        party.apply(request);

        self.ensure_unique(&party, Some(id)).await?;

        self.repo.update(&party).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(kind = ?self.kind(), id = %id, "Party deleted");
        Ok(())
    }

    /// Reject a name (case-insensitive) or email already used by another record
    async fn ensure_unique(&self, party: &Party, exclude_id: Option<&str>) -> Result<()> {
        let duplicate = self
            .repo
            .find_duplicate(&party.name, party.email.as_deref(), exclude_id)
            .await?;

        match duplicate {
            Some(existing) if same_name(&existing.name, &party.name) => {
                Err(AppError::conflict(format!(
                    "{} with name '{}' already exists ({})",
                    self.kind().label(),
                    existing.name,
                    existing.code
                )))
            }
            Some(existing) => Err(AppError::conflict(format!(
                "{} with email '{}' already exists ({})",
                self.kind().label(),
                existing.email.unwrap_or_default(),
                existing.code
            ))),
            None => Ok(()),
        }
    }
}

/// Names compare like the `LOWER(name)` lookup, beyond ASCII
fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

