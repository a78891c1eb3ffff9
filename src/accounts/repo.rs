use std::marker::PhantomData;

use anyhow::Context;
use axum::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::Query,
    FromRow, PgPool, Postgres,
};
use uuid::Uuid;

use super::repo_types::{Account, Admin, Driver, Filter, Inserted, Rider};

#[async_trait]
pub trait AccountRepo<A: Account>: Send + Sync {
    async fn find_one(&self, filter: Filter<'_>) -> anyhow::Result<Option<A>>;

    /// Every account, newest first.
    async fn list(&self) -> anyhow::Result<Vec<A>>;

    async fn insert(&self, account: &A) -> anyhow::Result<Inserted>;

    /// Marks the account confirmed and clears its code, but only while it is
    /// still unconfirmed and `otp` is the stored code. Returns whether a row
    /// changed.
    async fn confirm(&self, id: Uuid, otp: &str) -> anyhow::Result<bool>;

    /// Stores a new pending code and forces the account back to unconfirmed.
    async fn reset_otp(&self, id: Uuid, otp: &str) -> anyhow::Result<()>;
}

/// Table layout of an account type.
pub trait PgAccount: Account + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn filter_column(filter: &Filter<'_>) -> Option<&'static str> {
        match filter {
            Filter::Id(_) => Some("id"),
            Filter::Email(_) => Some("email"),
            Filter::LicenseNumber(_) => None,
        }
    }

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments>;
}

#[cfg(test)]
const STATE_COLUMNS: &str = "id, email, password_hash, is_confirmed, confirm_otp, status, created_at";

impl PgAccount for Rider {
    const TABLE: &'static str = "riders";
    const COLUMNS: &'static str = "id, email, password_hash, is_confirmed, confirm_otp, status, created_at, \
         first_name, last_name, phone_number";

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments> {
        let s = &self.state;
        sqlx::query(
            r#"
            INSERT INTO riders (id, email, password_hash, is_confirmed, confirm_otp, status, created_at,
                                first_name, last_name, phone_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(s.id)
        .bind(&s.email)
        .bind(&s.password_hash)
        .bind(s.is_confirmed)
        .bind(&s.confirm_otp)
        .bind(s.status)
        .bind(s.created_at)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.phone_number)
    }
}

impl PgAccount for Driver {
    const TABLE: &'static str = "drivers";
    const COLUMNS: &'static str = "id, email, password_hash, is_confirmed, confirm_otp, status, created_at, \
         first_name, last_name, age, phone_number, license_number, car_number, car_model, car_type, company_made";

    fn filter_column(filter: &Filter<'_>) -> Option<&'static str> {
        match filter {
            Filter::Id(_) => Some("id"),
            Filter::Email(_) => Some("email"),
            Filter::LicenseNumber(_) => Some("license_number"),
        }
    }

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments> {
        let s = &self.state;
        sqlx::query(
            r#"
            INSERT INTO drivers (id, email, password_hash, is_confirmed, confirm_otp, status, created_at,
                                 first_name, last_name, age, phone_number, license_number,
                                 car_number, car_model, car_type, company_made)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(s.id)
        .bind(&s.email)
        .bind(&s.password_hash)
        .bind(s.is_confirmed)
        .bind(&s.confirm_otp)
        .bind(s.status)
        .bind(s.created_at)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.age)
        .bind(&self.phone_number)
        .bind(&self.license_number)
        .bind(&self.car_number)
        .bind(&self.car_model)
        .bind(&self.car_type)
        .bind(&self.company_made)
    }
}

impl PgAccount for Admin {
    const TABLE: &'static str = "admins";
    const COLUMNS: &'static str = "id, email, password_hash, is_confirmed, confirm_otp, status, created_at, \
         first_name, last_name";

    fn insert_query(&self) -> Query<'_, Postgres, PgArguments> {
        let s = &self.state;
        sqlx::query(
            r#"
            INSERT INTO admins (id, email, password_hash, is_confirmed, confirm_otp, status, created_at,
                                first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(s.id)
        .bind(&s.email)
        .bind(&s.password_hash)
        .bind(s.is_confirmed)
        .bind(&s.confirm_otp)
        .bind(s.status)
        .bind(s.created_at)
        .bind(&self.first_name)
        .bind(&self.last_name)
    }
}

/// Maps a unique-index name from the migrations to the request field it guards.
fn duplicate_field(constraint: &str) -> Option<&'static str> {
    if constraint.ends_with("_email_key") {
        Some("email")
    } else if constraint == "drivers_license_number_key" {
        Some("licenseNumber")
    } else {
        None
    }
}

pub struct PgAccounts<A> {
    db: PgPool,
    _kind: PhantomData<fn() -> A>,
}

impl<A> PgAccounts<A> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<A: PgAccount> AccountRepo<A> for PgAccounts<A> {
    async fn find_one(&self, filter: Filter<'_>) -> anyhow::Result<Option<A>> {
        let Some(column) = A::filter_column(&filter) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            A::COLUMNS,
            A::TABLE,
            column
        );
        let query = sqlx::query_as::<_, A>(&sql);
        let query = match filter {
            Filter::Id(id) => query.bind(id),
            Filter::Email(v) | Filter::LicenseNumber(v) => query.bind(v),
        };
        query
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("find {} by {}", A::TABLE, column))
    }

    async fn list(&self) -> anyhow::Result<Vec<A>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC",
            A::COLUMNS,
            A::TABLE
        );
        sqlx::query_as::<_, A>(&sql)
            .fetch_all(&self.db)
            .await
            .with_context(|| format!("list {}", A::TABLE))
    }

    async fn insert(&self, account: &A) -> anyhow::Result<Inserted> {
        match account.insert_query().execute(&self.db).await {
            Ok(_) => Ok(Inserted::Ok),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let field = e.constraint().and_then(duplicate_field);
                match field {
                    Some(field) => Ok(Inserted::Duplicate(field)),
                    None => Err(anyhow::Error::new(sqlx::Error::Database(e))
                        .context(format!("insert into {}", A::TABLE))),
                }
            }
            Err(e) => Err(e).with_context(|| format!("insert into {}", A::TABLE)),
        }
    }

    async fn confirm(&self, id: Uuid, otp: &str) -> anyhow::Result<bool> {
        let sql = format!(
            "UPDATE {} SET is_confirmed = TRUE, confirm_otp = NULL \
             WHERE id = $1 AND is_confirmed = FALSE AND confirm_otp = $2",
            A::TABLE
        );
        let res = sqlx::query(&sql)
            .bind(id)
            .bind(otp)
            .execute(&self.db)
            .await
            .with_context(|| format!("confirm {}", A::TABLE))?;
        Ok(res.rows_affected() == 1)
    }

    async fn reset_otp(&self, id: Uuid, otp: &str) -> anyhow::Result<()> {
        let sql = format!(
            "UPDATE {} SET is_confirmed = FALSE, confirm_otp = $2 WHERE id = $1",
            A::TABLE
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(otp)
            .execute(&self.db)
            .await
            .with_context(|| format!("reset otp in {}", A::TABLE))?;
        Ok(())
    }
}
