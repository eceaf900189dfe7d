//! Postgres-backed inventory store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database | `23502` | `Constraint` | NULL in a NOT NULL column |
//! | Database | `23505` | `Constraint` | Unique violation (should not occur: ids come from a sequence) |
//! | Database | `23514` | `Constraint` | Check constraint violation |
//! | Database | `22001` | `Constraint` | Value too long for a VARCHAR column |
//! | Database (other) | Any other | `Database` | Other database errors |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` | Connection problems |
//! | ColumnDecode / ColumnNotFound | N/A | `Decode` | Schema drift |
//! | Other | N/A | `Database` | Anything else |
//!
//! ## Transactions
//!
//! Every write runs in its own transaction. On failure the transaction is
//! rolled back explicitly before the error is returned.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use pantrykeeper_core::ItemId;
use pantrykeeper_inventory::{InventoryFilter, InventoryItem, ItemPatch, LOW_STOCK_THRESHOLD, NewInventoryItem};

use super::r#trait::{InventoryStore, StoreError};
use crate::config::DatabaseConfig;

/// DDL applied at startup. Idempotent.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS inventory (
    id BIGSERIAL PRIMARY KEY,
    item_name VARCHAR(100) NOT NULL,
    category VARCHAR(50) NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    unit VARCHAR(20) NOT NULL,
    expiry_date DATE,
    donor_name VARCHAR(100),
    date_received TIMESTAMP NOT NULL DEFAULT (NOW() AT TIME ZONE 'utc'),
    location VARCHAR(100),
    notes TEXT
)
"#;

const COLUMNS: &str = "id, item_name, category, quantity, unit, expiry_date, donor_name, date_received, location, notes";

/// Postgres-backed inventory store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is cheap to clone and `Send + Sync`.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `inventory` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn begin(&self, operation: &str) -> Result<Transaction<'static, Postgres>, StoreError> {
        self.pool.begin().await.map_err(|e| map_sqlx_error(operation, e))
    }
}

/// Roll back a transaction that turned out to have nothing to write.
async fn release(tx: Transaction<'static, Postgres>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(operation, error = %e, "rollback failed");
    }
}

/// Roll back `tx` and hand back the error that caused it.
async fn abort(tx: Transaction<'static, Postgres>, operation: &str, err: StoreError) -> StoreError {
    release(tx, operation).await;
    err
}

async fn commit(tx: Transaction<'static, Postgres>, operation: &str) -> Result<(), StoreError> {
    tx.commit().await.map_err(|e| map_sqlx_error(operation, e))
}

#[async_trait::async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip_all, fields(category = ?filter.category, low_stock = filter.low_stock), err)]
    async fn list(&self, filter: &InventoryFilter) -> Result<Vec<InventoryItem>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM inventory
            WHERE ($1::text IS NULL OR category = $1)
                AND (NOT $2 OR quantity < $3)
            ORDER BY id ASC
            "#
        ))
        .bind(filter.category.as_deref())
        .bind(filter.low_stock)
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter()
            .map(|row| InventoryRow::decode(row, "list").map(InventoryItem::from))
            .collect()
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM inventory WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| InventoryRow::decode(&r, "get").map(InventoryItem::from))
            .transpose()
    }

    #[instrument(skip_all, fields(item_name = %item.item_name), err)]
    async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, StoreError> {
        let mut tx = self.begin("create").await?;

        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO inventory (
                item_name,
                category,
                quantity,
                unit,
                expiry_date,
                donor_name,
                date_received,
                location,
                notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&item.item_name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expiry_date)
        .bind(&item.donor_name)
        .bind(super::received_now())
        .bind(&item.location)
        .bind(&item.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create", e))
        .and_then(|row| InventoryRow::decode(&row, "create"));

        match inserted {
            Ok(row) => {
                commit(tx, "create").await?;
                Ok(row.into())
            }
            Err(e) => Err(abort(tx, "create", e).await),
        }
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<Option<InventoryItem>, StoreError> {
        let mut tx = self.begin("update").await?;

        let current = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM inventory WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update", e))
        .and_then(|row| row.map(|r| InventoryRow::decode(&r, "update")).transpose());

        let mut item: InventoryItem = match current {
            Ok(Some(row)) => row.into(),
            Ok(None) => {
                release(tx, "update").await;
                return Ok(None);
            }
            Err(e) => return Err(abort(tx, "update", e).await),
        };

        patch.apply_to(&mut item);

        let written = sqlx::query(
            r#"
            UPDATE inventory SET
                item_name = $2,
                category = $3,
                quantity = $4,
                unit = $5,
                expiry_date = $6,
                donor_name = $7,
                location = $8,
                notes = $9
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&item.item_name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expiry_date)
        .bind(&item.donor_name)
        .bind(&item.location)
        .bind(&item.notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update", e));

        match written {
            Ok(_) => {
                commit(tx, "update").await?;
                Ok(Some(item))
            }
            Err(e) => Err(abort(tx, "update", e).await),
        }
    }

    #[instrument(skip_all, fields(id = %id), err)]
    async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let mut tx = self.begin("delete").await?;

        let deleted = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete", e));

        match deleted {
            Ok(result) if result.rows_affected() > 0 => {
                commit(tx, "delete").await?;
                Ok(true)
            }
            Ok(_) => {
                release(tx, "delete").await;
                Ok(false)
            }
            Err(e) => Err(abort(tx, "delete", e).await),
        }
    }
}

/// Map a SQLx error to a `StoreError`, keeping the failing operation name.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    let operation_name = operation.to_string();
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23502") | Some("23505") | Some("23514") | Some("22001") => StoreError::Constraint {
                    operation: operation_name,
                    message,
                },
                _ => StoreError::Database {
                    operation: operation_name,
                    message,
                },
            }
        }
        sqlx::Error::PoolClosed => StoreError::unavailable(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => StoreError::unavailable(operation, "timed out waiting for a connection"),
        sqlx::Error::Io(e) => StoreError::unavailable(operation, e.to_string()),
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_)) => StoreError::Decode {
            operation: operation_name,
            message: e.to_string(),
        },
        other => StoreError::Database {
            operation: operation_name,
            message: other.to_string(),
        },
    }
}

// SQLx row types

#[derive(Debug)]
struct InventoryRow {
    id: i64,
    item_name: String,
    category: String,
    quantity: i32,
    unit: String,
    expiry_date: Option<NaiveDate>,
    donor_name: Option<String>,
    date_received: NaiveDateTime,
    location: Option<String>,
    notes: Option<String>,
}

impl InventoryRow {
    fn decode(row: &PgRow, operation: &str) -> Result<Self, StoreError> {
        <Self as sqlx::FromRow<'_, PgRow>>::from_row(row).map_err(|e| map_sqlx_error(operation, e))
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for InventoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryRow {
            id: row.try_get("id")?,
            item_name: row.try_get("item_name")?,
            category: row.try_get("category")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
            expiry_date: row.try_get("expiry_date")?,
            donor_name: row.try_get("donor_name")?,
            date_received: row.try_get("date_received")?,
            location: row.try_get("location")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            id: ItemId::new(row.id),
            item_name: row.item_name,
            category: row.category,
            quantity: row.quantity,
            unit: row.unit,
            expiry_date: row.expiry_date,
            donor_name: row.donor_name,
            date_received: row.date_received,
            location: row.location,
            notes: row.notes,
        }
    }
}
