//! SQLite implementation for OAuth client storage

use crate::errors::{ConfigError, StorageError};
use crate::oauth::types::ClientInfo;
use crate::storage::context::RequestContext;
use crate::storage::record::{ClientRecord, decode_client};
use crate::storage::table::{ClientStoreOptions, TableName, UserIdPolicy};
use crate::storage::traits::{ClientInfoStore, Result};
use crate::storage::insert_error;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// SQLite implementation of OAuth client storage
pub struct SqliteClientStore {
    pool: SqlitePool,
    table_name: TableName,
    user_id_policy: UserIdPolicy,
    insert_sql: String,
    select_sql: String,
}

impl SqliteClientStore {
    /// Open a new pool for `database_url` and provision the client table.
    pub async fn connect(
        database_url: &str,
        options: ClientStoreOptions,
    ) -> std::result::Result<Self, ConfigError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(options.pool.max_open_connections())
            .min_connections(options.pool.max_idle_connections())
            .max_lifetime(options.pool.max_lifetime())
            .connect(database_url)
            .await
            .map_err(|e| ConfigError::ConnectionFailed(format!("SQLite connection failed: {}", e)))?;

        Self::with_pool(pool, options).await
    }

    /// Provision the client table on a pool owned by the caller.
    ///
    /// Pool settings in `options` are ignored.
    pub async fn with_pool(
        pool: SqlitePool,
        options: ClientStoreOptions,
    ) -> std::result::Result<Self, ConfigError> {
        let table = options.table_name.quoted();
        let store = Self {
            pool,
            insert_sql: format!(
                "INSERT INTO {} (created_at, updated_at, deleted_at, client_id, client_secret, domain, data, public, user_id) \
                 VALUES (?, ?, NULL, ?, ?, ?, ?, ?, ?)",
                table
            ),
            select_sql: format!(
                "SELECT data FROM {} WHERE client_id = ? AND deleted_at IS NULL ORDER BY id LIMIT 1",
                table
            ),
            table_name: options.table_name,
            user_id_policy: options.user_id_policy,
        };

        store.provision(&RequestContext::background()).await?;
        Ok(store)
    }

    pub fn table_name(&self) -> &TableName {
        &self.table_name
    }

    /// The underlying pool, for sharing with other stores
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn table_exists(&self, ctx: &RequestContext) -> Result<bool> {
        ctx.run(async {
            let count = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(self.table_name.as_str())
            .fetch_one(&self.pool)
            .await?;
            Ok::<_, StorageError>(count > 0)
        })
        .await
    }

    fn schema_statements(&self) -> Vec<String> {
        let table = self.table_name.quoted();
        vec![
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    created_at TEXT,
                    updated_at TEXT,
                    deleted_at TEXT,
                    client_id VARCHAR(64),
                    client_secret VARCHAR(128),
                    domain VARCHAR(512),
                    data TEXT,
                    public INTEGER,
                    user_id INTEGER
                )
                "#,
                table
            ),
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} (client_id)",
                self.table_name.index_name("client_id"),
                table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (user_id)",
                self.table_name.index_name("user_id"),
                table
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (deleted_at)",
                self.table_name.index_name("deleted_at"),
                table
            ),
        ]
    }

    async fn provision(&self, ctx: &RequestContext) -> std::result::Result<(), ConfigError> {
        let exists = self
            .table_exists(ctx)
            .await
            .map_err(|e| ConfigError::TableProvisioningFailed(e.to_string()))?;
        if exists {
            tracing::debug!(table = %self.table_name, "client table already exists");
            return Ok(());
        }

        tracing::info!(table = %self.table_name, "creating client table");
        ctx.run(async {
            let mut tx = self.pool.begin().await?;
            for statement in self.schema_statements() {
                sqlx::query(&statement).execute(&mut *tx).await?;
            }
            tx.commit().await?;
            Ok::<_, StorageError>(())
        })
        .await
        .map_err(|e| ConfigError::TableProvisioningFailed(e.to_string()))
    }
}

#[async_trait]
impl<C: ClientInfo> ClientInfoStore<C> for SqliteClientStore {
    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Option<C>> {
        if id.is_empty() {
            return Ok(None);
        }

        let data = ctx
            .run(async {
                let data = sqlx::query_scalar::<_, String>(&self.select_sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok::<_, StorageError>(data)
            })
            .await?;

        match data {
            Some(data) => decode_client(&data).map(Some),
            None => {
                tracing::debug!(client_id = id, table = %self.table_name, "client not found");
                Err(StorageError::NotFound(id.to_string()))
            }
        }
    }

    async fn create(&self, ctx: &RequestContext, client: &C) -> Result<()> {
        let record = ClientRecord::from_client(client, self.user_id_policy)?;
        let now = Utc::now().to_rfc3339();

        ctx.run(async {
            sqlx::query(&self.insert_sql)
                .bind(&now)
                .bind(&now)
                .bind(&record.client_id)
                .bind(&record.client_secret)
                .bind(&record.domain)
                .bind(&record.data)
                .bind(if record.public { 1i64 } else { 0i64 })
                .bind(record.user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| insert_error(e, &record.client_id))?;
            Ok::<_, StorageError>(())
        })
        .await?;

        tracing::debug!(client_id = %record.client_id, table = %self.table_name, "client created");
        Ok(())
    }
}
