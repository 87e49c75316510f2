//! Generic record store over one SQLite table.
//!
//! Each collection gets a `Store<R>` handle; the table layout comes from the
//! record's [`Record`] impl. The `*_on` variants run on a caller-supplied
//! connection so composite operations can share a transaction.

use std::marker::PhantomData;

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::RecordId;

/// A column value bound into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    NullableText(Option<String>),
    Integer(i64),
    Bool(bool),
    Id(RecordId),
}

/// A typed document stored in its own table, keyed by `RecordId`.
pub trait Record: Sized + Send + Unpin + 'static {
    /// Table name.
    const TABLE: &'static str;
    /// Human-readable name used in error messages.
    const NAME: &'static str;
    /// Columns other than `id`, in the order `values()` yields them.
    const COLUMNS: &'static [&'static str];

    /// Create payload, everything except the id.
    type Draft: Send;
    /// Partial update payload.
    type Patch: Send + Sync;

    fn id(&self) -> RecordId;
    /// Build the record, failing `InvalidId` on malformed reference ids.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Result<Self, AppError>;
    fn values(&self) -> Vec<FieldValue>;
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
    /// Column assignments for the fields present in `patch`.
    fn changes(patch: &Self::Patch) -> Result<Vec<(&'static str, FieldValue)>, AppError>;
}

/// Cloneable handle to one collection.
pub struct Store<R> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Store<R> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    /// Start a transaction on the underlying pool.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin().await?)
    }

    /// Get a record by its client-supplied id.
    pub async fn get(&self, raw_id: &str) -> Result<R, AppError> {
        let id = RecordId::parse(raw_id)?;
        self.find(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found", R::NAME)))
    }

    /// Find a record by id.
    pub async fn find(&self, id: &RecordId) -> Result<Option<R>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.find_on(&mut conn, id).await
    }

    /// List all records in insertion order.
    pub async fn list(&self) -> Result<Vec<R>, AppError> {
        self.find_by(Vec::new()).await
    }

    /// Create a record under a freshly generated id.
    pub async fn create(&self, draft: R::Draft) -> Result<R, AppError> {
        let record = R::from_draft(RecordId::generate(), draft)?;
        let mut conn = self.pool.acquire().await?;
        self.insert_on(&mut conn, &record).await?;
        Ok(record)
    }

    /// Apply the fields present in `patch`.
    ///
    /// Updating an id that matches nothing succeeds without effect.
    pub async fn update(&self, raw_id: &str, patch: &R::Patch) -> Result<(), AppError> {
        let id = RecordId::parse(raw_id)?;
        let changes = R::changes(patch)?;
        if changes.is_empty() {
            return Err(AppError::NoFieldsProvided);
        }

        let mut conn = self.pool.acquire().await?;
        let affected = self.update_on(&mut conn, &id, changes, Vec::new()).await?;
        if affected == 0 {
            tracing::debug!("Update of {} {} matched no record", R::NAME, id);
        }
        Ok(())
    }

    /// Delete a record. Deleting an unknown id succeeds without effect.
    pub async fn delete(&self, raw_id: &str) -> Result<(), AppError> {
        let id = RecordId::parse(raw_id)?;
        let mut conn = self.pool.acquire().await?;
        let affected = self.delete_on(&mut conn, &id).await?;
        if affected == 0 {
            tracing::debug!("Delete of {} {} matched no record", R::NAME, id);
        }
        Ok(())
    }

    /// All records whose columns equal the given values, in insertion order.
    pub async fn find_by(
        &self,
        filters: Vec<(&'static str, FieldValue)>,
    ) -> Result<Vec<R>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_on(&mut conn, filters, None).await
    }

    /// First record whose columns equal the given values.
    pub async fn find_one_by(
        &self,
        filters: Vec<(&'static str, FieldValue)>,
    ) -> Result<Option<R>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let mut found = self.find_by_on(&mut conn, filters, Some(1)).await?;
        Ok(found.pop())
    }

    // ==================== CONNECTION-LEVEL OPERATIONS ====================

    pub async fn find_on(
        &self,
        conn: &mut SqliteConnection,
        id: &RecordId,
    ) -> Result<Option<R>, AppError> {
        let mut found = self
            .find_by_on(conn, vec![("id", FieldValue::Id(*id))], Some(1))
            .await?;
        Ok(found.pop())
    }

    pub async fn insert_on(&self, conn: &mut SqliteConnection, record: &R) -> Result<(), AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} (id, {}) VALUES (",
            R::TABLE,
            R::COLUMNS.join(", ")
        ));
        builder.push_bind(record.id().to_hex());
        for value in record.values() {
            builder.push(", ");
            push_value(&mut builder, value);
        }
        builder.push(")");

        builder.build().execute(&mut *conn).await?;
        Ok(())
    }

    /// Set `changes` on the record with `id` when every guard column matches.
    /// Returns the number of rows changed.
    pub async fn update_on(
        &self,
        conn: &mut SqliteConnection,
        id: &RecordId,
        changes: Vec<(&'static str, FieldValue)>,
        guards: Vec<(&'static str, FieldValue)>,
    ) -> Result<u64, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", R::TABLE));
        for (i, (column, value)) in changes.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(column).push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.to_hex());
        for (column, value) in guards {
            builder.push(" AND ").push(column).push(" = ");
            push_value(&mut builder, value);
        }

        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_on(
        &self,
        conn: &mut SqliteConnection,
        id: &RecordId,
    ) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
        let result = sqlx::query(&sql)
            .bind(id.to_hex())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_on(
        &self,
        conn: &mut SqliteConnection,
        filters: Vec<(&'static str, FieldValue)>,
        limit: Option<i64>,
    ) -> Result<Vec<R>, AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT id, {} FROM {}",
            R::COLUMNS.join(", "),
            R::TABLE
        ));
        for (i, (column, value)) in filters.into_iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder.push(column).push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" ORDER BY rowid");
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows = builder.build().fetch_all(&mut *conn).await?;
        let records = rows.iter().map(R::from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: FieldValue) {
    match value {
        FieldValue::Text(s) => builder.push_bind(s),
        FieldValue::NullableText(s) => builder.push_bind(s),
        FieldValue::Integer(n) => builder.push_bind(n),
        FieldValue::Bool(b) => builder.push_bind(b),
        FieldValue::Id(id) => builder.push_bind(id.to_hex()),
    };
}

/// Decode an id column written by this store.
pub(crate) fn id_column(row: &SqliteRow, column: &str) -> Result<RecordId, sqlx::Error> {
    use sqlx::Row;

    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
