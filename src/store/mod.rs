// Store module: backends implementing the tabular warehouse interface.

pub mod traits;
pub mod sheets;
pub mod sqlite;

pub use traits::{COL_QTY, TabularStore};
pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;
