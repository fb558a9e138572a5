// Local tabular store backed by SQLite. Keeps the same seven-column layout
// as a spreadsheet store, header row included, so the matcher sees no
// difference between backends.
use crate::model::StoreError;
use crate::store::traits::{COLUMN_COUNT, TabularStore};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;

const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "manufacturer",
    "reference",
    "name",
    "details",
    "qty",
    "location",
    "uid",
];

const HEADER: [&str; COLUMN_COUNT] = [
    "Manufacturer",
    "REF",
    "Name",
    "Details",
    "Qty",
    "Location",
    "UID",
];

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens the database and runs migrations.
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS store_rows (
                store_id TEXT NOT NULL,
                pos INTEGER NOT NULL,
                manufacturer TEXT NOT NULL DEFAULT '',
                reference TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL DEFAULT '',
                details TEXT NOT NULL DEFAULT '',
                qty TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                uid TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                PRIMARY KEY (store_id, pos)
            );
            ",
        )?;

        Self::migrate_add_column_if_missing(&conn, "store_rows", "updated_at", "TEXT")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Checks for a column and adds it to the table when absent.
    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let existing_columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if !existing_columns.iter().any(|c| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
        }

        Ok(())
    }

    /// Seeds the header row the first time a store id is touched.
    fn ensure_header(conn: &Connection, store_id: &str) -> Result<(), StoreError> {
        let present: Option<i64> = conn
            .query_row(
                "SELECT pos FROM store_rows WHERE store_id = ?1 AND pos = 1",
                params![store_id],
                |row| row.get(0),
            )
            .optional()?;

        if present.is_none() {
            conn.execute(
                "INSERT INTO store_rows (
                    store_id, pos, manufacturer, reference, name, details,
                    qty, location, uid, created_at
                )
                VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    store_id,
                    HEADER[0],
                    HEADER[1],
                    HEADER[2],
                    HEADER[3],
                    HEADER[4],
                    HEADER[5],
                    HEADER[6],
                    Utc::now().to_rfc3339(),
                ],
            )?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl TabularStore for SqliteStore {
    async fn fetch_rows(&self, store_id: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let conn = self.conn.lock().await;
        Self::ensure_header(&conn, store_id)?;

        let mut stmt = conn.prepare(
            "SELECT manufacturer, reference, name, details, qty, location, uid
             FROM store_rows WHERE store_id = ?1 ORDER BY pos ASC",
        )?;

        let rows = stmt.query_map(params![store_id], |row| {
            let mut cells = Vec::with_capacity(COLUMN_COUNT);
            for i in 0..COLUMN_COUNT {
                cells.push(row.get::<_, String>(i)?);
            }
            Ok(cells)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }

        Ok(result)
    }

    async fn append_row(&self, store_id: &str, row: &[String]) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        Self::ensure_header(&conn, store_id)?;

        let next_pos: i64 = conn.query_row(
            "SELECT COALESCE(MAX(pos), 0) + 1 FROM store_rows WHERE store_id = ?1",
            params![store_id],
            |r| r.get(0),
        )?;

        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        conn.execute(
            "INSERT INTO store_rows (
                store_id, pos, manufacturer, reference, name, details,
                qty, location, uid, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                store_id,
                next_pos,
                cell(0),
                cell(1),
                cell(2),
                cell(3),
                cell(4),
                cell(5),
                cell(6),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    async fn update_cell(
        &self,
        store_id: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let column_name = COLUMN_NAMES
            .get(column.wrapping_sub(1))
            .ok_or_else(|| StoreError::InvalidResponse(format!("column {} out of range", column)))?;

        let conn = self.conn.lock().await;
        let sql = format!(
            "UPDATE store_rows SET {} = ?1, updated_at = ?2 WHERE store_id = ?3 AND pos = ?4",
            column_name
        );
        let affected = conn.execute(
            &sql,
            params![value, Utc::now().to_rfc3339(), store_id, row as i64],
        )?;

        if affected == 0 {
            return Err(StoreError::RowNotFound(row));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> SqliteStore {
        SqliteStore::new(":memory:").unwrap()
    }

    #[tokio::test]
    async fn fresh_store_has_only_the_header() {
        let store = memory_store();
        let rows = store.fetch_rows("ward-a").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Manufacturer");
    }

    #[tokio::test]
    async fn appended_rows_come_back_in_order() {
        let store = memory_store();
        store
            .append_row("ward-a", &["ACME".into(), "REF1".into()])
            .await
            .unwrap();
        store
            .append_row("ward-a", &["BAXTER".into(), "X9".into()])
            .await
            .unwrap();

        let rows = store.fetch_rows("ward-a").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "ACME");
        assert_eq!(rows[2][0], "BAXTER");
        // Short rows are padded to the full layout.
        assert_eq!(rows[1][6], "");
    }

    #[tokio::test]
    async fn stores_are_isolated_by_id() {
        let store = memory_store();
        store
            .append_row("ward-a", &["ACME".into(), "REF1".into()])
            .await
            .unwrap();

        let rows = store.fetch_rows("ward-b").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn update_cell_overwrites_in_place() {
        let store = memory_store();
        store
            .append_row("ward-a", &["ACME".into(), "REF1".into(), "Widget".into(), "".into(), "3".into()])
            .await
            .unwrap();

        store.update_cell("ward-a", 2, 5, "10").await.unwrap();
        let rows = store.fetch_rows("ward-a").await.unwrap();
        assert_eq!(rows[1][4], "10");
    }

    #[tokio::test]
    async fn update_cell_rejects_missing_rows() {
        let store = memory_store();
        let err = store.update_cell("ward-a", 9, 5, "10").await.unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound(9)));
    }

    #[tokio::test]
    async fn update_cell_rejects_unknown_columns() {
        let store = memory_store();
        let err = store.update_cell("ward-a", 1, 8, "x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }
}
