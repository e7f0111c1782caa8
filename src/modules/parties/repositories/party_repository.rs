use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::numbering::{master_code, next_sequence};
use crate::core::traits::Repository;
use crate::core::{AppError, ListQuery, Result};
use crate::modules::parties::models::{Party, PartyKind};

const PARTY_COLUMNS: &str = "id, code, name, email, phone, address, contact_person, tax_number, \
     credit_limit, payment_terms_days, notes, is_active, created_at, updated_at";

/// Storage for one party table (customers or suppliers)
#[async_trait]
pub trait PartyRepository: Repository<Party> {
    fn kind(&self) -> PartyKind;

    /// Another record with the same name (case-insensitive) or email
    async fn find_duplicate(
        &self,
        name: &str,
        email: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Party>>;

    /// Next free `CUST-0001` style code
    async fn next_code(&self) -> Result<String>;
}

pub struct MySqlPartyRepository {
    pool: MySqlPool,
    kind: PartyKind,
}

impl MySqlPartyRepository {
    pub fn new(pool: MySqlPool, kind: PartyKind) -> Self {
        Self { pool, kind }
    }

    fn describe(&self, party: &Party) -> String {
        format!("{} '{}'", self.kind.label(), party.name)
    }
}

#[async_trait]
impl Repository<Party> for MySqlPartyRepository {
    async fn create(&self, party: &Party) -> Result<Party> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.kind.table(),
            PARTY_COLUMNS
        );

        sqlx::query(&sql)
            .bind(&party.id)
            .bind(&party.code)
            .bind(&party.name)
            .bind(&party.email)
            .bind(&party.phone)
            .bind(&party.address)
            .bind(&party.contact_person)
            .bind(&party.tax_number)
            .bind(party.credit_limit)
            .bind(party.payment_terms_days)
            .bind(&party.notes)
            .bind(party.is_active)
            .bind(party.created_at)
            .bind(party.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &self.describe(party)))?;

        Ok(party.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Party>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            PARTY_COLUMNS,
            self.kind.table()
        );

        let party = sqlx::query_as::<_, Party>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(party)
    }

    async fn update(&self, party: &Party) -> Result<Party> {
        let sql = format!(
            r#"
            UPDATE {}
            SET name = ?, email = ?, phone = ?, address = ?, contact_person = ?,
                tax_number = ?, credit_limit = ?, payment_terms_days = ?, notes = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
            self.kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(&party.name)
            .bind(&party.email)
            .bind(&party.phone)
            .bind(&party.address)
            .bind(&party.contact_person)
            .bind(&party.tax_number)
            .bind(party.credit_limit)
            .bind(party.payment_terms_days)
            .bind(&party.notes)
            .bind(party.is_active)
            .bind(party.updated_at)
            .bind(&party.id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &self.describe(party)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "{} '{}' not found",
                self.kind.label(),
                party.id
            )));
        }

        Ok(party.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.kind.table());

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, &format!("{} '{}'", self.kind.label(), id)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "{} '{}' not found",
                self.kind.label(),
                id
            )));
        }

        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Party>> {
        let pattern = query.search_pattern();
        let sql = format!(
            r#"
            SELECT {}
            FROM {}
            WHERE (? IS NULL OR name LIKE ? OR email LIKE ? OR code LIKE ?)
            ORDER BY name ASC
            LIMIT ? OFFSET ?
            "#,
            PARTY_COLUMNS,
            self.kind.table()
        );

        let parties = sqlx::query_as::<_, Party>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(parties)
    }
}

#[async_trait]
impl PartyRepository for MySqlPartyRepository {
    fn kind(&self) -> PartyKind {
        self.kind
    }

    async fn find_duplicate(
        &self,
        name: &str,
        email: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Party>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM {}
            WHERE (LOWER(name) = LOWER(?) OR (? IS NOT NULL AND LOWER(email) = LOWER(?)))
              AND (? IS NULL OR id <> ?)
            LIMIT 1
            "#,
            PARTY_COLUMNS,
            self.kind.table()
        );

        let party = sqlx::query_as::<_, Party>(&sql)
            .bind(name.trim())
            .bind(email)
            .bind(email)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(party)
    }

    async fn next_code(&self) -> Result<String> {
        let prefix = self.kind.code_prefix();
        let sequence = next_sequence(
            &self.pool,
            self.kind.table(),
            "code",
            &format!("{}-%", prefix),
        )
        .await?;

        Ok(master_code(prefix, sequence))
    }
}
