use crate::model::StoreError;

/// Column layout of an inventory store, 1-indexed. Row 1 is a header.
pub const COL_MANUFACTURER: usize = 1;
pub const COL_REFERENCE: usize = 2;
pub const COL_NAME: usize = 3;
pub const COL_DETAILS: usize = 4;
pub const COL_QTY: usize = 5;
pub const COL_LOCATION: usize = 6;
pub const COL_UID: usize = 7;
pub const COLUMN_COUNT: usize = 7;

/// A warehouse: a tabular dataset addressed by an opaque store id.
#[async_trait::async_trait]
pub trait TabularStore: Send + Sync {
    /// Returns every row, header first. Trailing empty cells may be absent.
    async fn fetch_rows(&self, store_id: &str) -> Result<Vec<Vec<String>>, StoreError>;

    async fn append_row(&self, store_id: &str, row: &[String]) -> Result<(), StoreError>;

    /// Overwrites a single cell, addressed by 1-based row and column.
    async fn update_cell(
        &self,
        store_id: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError>;
}
