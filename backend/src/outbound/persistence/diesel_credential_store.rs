//! PostgreSQL-backed [`CredentialStore`].
//!
//! The table name is configurable, so statements are assembled once from a
//! validated [`TableName`] and every value travels as a bound parameter.
//! Uniqueness of `user_name` and `email` is enforced by unique indexes; a
//! violating insert surfaces as [`CredentialStoreError::Duplicate`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::result::OptionalExtension;
use diesel::sql_query;
use diesel::sql_types::{Bool, Text, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{CredentialStore, CredentialStoreError};
use crate::domain::{
    EmailAddress, NewUser, PasswordHash, User, UserId, UserName, UserValidationError,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::table_name::TableName;

#[derive(QueryableByName)]
struct UserRow {
    #[diesel(sql_type = SqlUuid)]
    id: Uuid,
    #[diesel(sql_type = Text)]
    user_name: String,
    #[diesel(sql_type = Text)]
    email: String,
    #[diesel(sql_type = Text)]
    password_hash: String,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CredentialStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |err: UserValidationError| {
            CredentialStoreError::query(format!("stored user row is invalid: {err}"))
        };
        let new_user = NewUser {
            user_name: UserName::new(row.user_name).map_err(invalid)?,
            email: EmailAddress::new(row.email).map_err(invalid)?,
            password_hash: PasswordHash::new(row.password_hash).map_err(invalid)?,
            created_at: row.created_at,
        };
        Ok(User::from_new(UserId::from_uuid(row.id), new_user))
    }
}

#[derive(QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    taken: bool,
}

/// SQL text for one users table.
#[derive(Debug, Clone)]
struct Statements {
    create_table: String,
    create_user_name_index: String,
    create_email_index: String,
    select_by_email: String,
    select_by_user_name: String,
    exists: String,
    insert: String,
    update_hash: String,
}

impl Statements {
    fn for_table(table: &TableName) -> Self {
        let t = table.quoted();
        let columns = "id, user_name, email, password_hash, created_at";
        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id UUID PRIMARY KEY, \
                 user_name TEXT NOT NULL, \
                 email TEXT NOT NULL, \
                 password_hash TEXT NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL)"
            ),
            create_user_name_index: format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {t} (user_name)",
                table.unique_index("user_name")
            ),
            create_email_index: format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {t} (email)",
                table.unique_index("email")
            ),
            select_by_email: format!("SELECT {columns} FROM {t} WHERE email = $1"),
            select_by_user_name: format!("SELECT {columns} FROM {t} WHERE user_name = $1"),
            exists: format!(
                "SELECT EXISTS (SELECT 1 FROM {t} WHERE email = $1 OR user_name = $2) AS taken"
            ),
            insert: format!("INSERT INTO {t} ({columns}) VALUES ($1, $2, $3, $4, $5)"),
            update_hash: format!("UPDATE {t} SET password_hash = $1 WHERE id = $2"),
        }
    }
}

/// Diesel adapter for the credential store port.
#[derive(Clone)]
pub struct DieselCredentialStore {
    pool: DbPool,
    statements: Statements,
    operation_timeout: Duration,
}

impl DieselCredentialStore {
    /// Create a store over `table`, bounding each call by `operation_timeout`.
    pub fn new(pool: DbPool, table: &TableName, operation_timeout: Duration) -> Self {
        Self {
            pool,
            statements: Statements::for_table(table),
            operation_timeout,
        }
    }

    /// Create the users table and its unique indexes if missing.
    pub async fn ensure_schema(&self) -> Result<(), CredentialStoreError> {
        self.bounded("ensure_schema", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            for statement in [
                &self.statements.create_table,
                &self.statements.create_user_name_index,
                &self.statements.create_email_index,
            ] {
                sql_query(statement.as_str())
                    .execute(&mut conn)
                    .await
                    .map_err(|err| map_diesel_error(err, "ensure_schema"))?;
            }
            Ok(())
        })
        .await?;
        info!("credential store schema ready");
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &str, work: F) -> Result<T, CredentialStoreError>
    where
        F: Future<Output = Result<T, CredentialStoreError>>,
    {
        tokio::time::timeout(self.operation_timeout, work)
            .await
            .map_err(|_| CredentialStoreError::timeout(operation))?
    }

    async fn find_one(
        &self,
        operation: &'static str,
        statement: &str,
        value: &str,
    ) -> Result<Option<User>, CredentialStoreError> {
        self.bounded(operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = sql_query(statement)
                .bind::<Text, _>(value)
                .get_result::<UserRow>(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, operation))?;
            row.map(User::try_from).transpose()
        })
        .await
    }
}

#[async_trait]
impl CredentialStore for DieselCredentialStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError> {
        self.find_one("get_by_email", &self.statements.select_by_email, email)
            .await
    }

    async fn get_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<User>, CredentialStoreError> {
        self.find_one(
            "get_by_user_name",
            &self.statements.select_by_user_name,
            user_name,
        )
        .await
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &EmailAddress,
        user_name: &UserName,
    ) -> Result<bool, CredentialStoreError> {
        self.bounded("exists_by_email_or_user_name", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = sql_query(self.statements.exists.as_str())
                .bind::<Text, _>(email.as_str())
                .bind::<Text, _>(user_name.as_str())
                .get_result::<ExistsRow>(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "exists_by_email_or_user_name"))?;
            Ok(row.taken)
        })
        .await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, CredentialStoreError> {
        let user = User::from_new(UserId::random(), new_user);
        self.bounded("create_user", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            sql_query(self.statements.insert.as_str())
                .bind::<SqlUuid, _>(*user.id().as_uuid())
                .bind::<Text, _>(user.user_name().as_str())
                .bind::<Text, _>(user.email().as_str())
                .bind::<Text, _>(user.password_hash().as_str())
                .bind::<Timestamptz, _>(user.created_at())
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "create_user"))?;
            Ok(())
        })
        .await?;
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), CredentialStoreError> {
        self.bounded("update_password_hash", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            sql_query(self.statements.update_hash.as_str())
                .bind::<Text, _>(password_hash.as_str())
                .bind::<SqlUuid, _>(*id.as_uuid())
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, "update_password_hash"))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn statements_quote_the_configured_table() {
        let table = TableName::new("accounts").expect("valid table");
        let statements = Statements::for_table(&table);

        assert_eq!(
            statements.select_by_email,
            "SELECT id, user_name, email, password_hash, created_at FROM \"accounts\" WHERE email = $1"
        );
        assert!(
            statements
                .create_table
                .starts_with("CREATE TABLE IF NOT EXISTS \"accounts\" (")
        );
        assert_eq!(
            statements.create_email_index,
            "CREATE UNIQUE INDEX IF NOT EXISTS \"accounts_email_key\" ON \"accounts\" (email)"
        );
    }

    #[rstest]
    fn statements_bind_every_value() {
        let statements = Statements::for_table(&TableName::default());

        assert!(statements.insert.ends_with("VALUES ($1, $2, $3, $4, $5)"));
        assert!(statements.update_hash.contains("password_hash = $1 WHERE id = $2"));
        assert!(statements.exists.contains("email = $1 OR user_name = $2"));
    }
}
