//! Scans a store's rows for entries matching a (manufacturer, reference)
//! query. Duplicates are legitimate, so every qualifying row is returned.
use crate::model::{MatchOutcome, RowMatch};
use crate::store::TabularStore;
use crate::utils::{clean_cell, parse_qty_cell};

use tracing::warn;

/// Looks up every row whose manufacturer and reference equal the query,
/// case-insensitively and whitespace-trimmed.
///
/// Never fails past this boundary: an unreachable store is logged and
/// reported as `Unavailable`, so the operator can still record stock as a
/// new item. Worst case is a duplicate row, which the data model already
/// tolerates.
pub async fn find_matches(
    store: &dyn TabularStore,
    store_id: &str,
    manufacturer: &str,
    reference: &str,
) -> MatchOutcome {
    let rows = match store.fetch_rows(store_id).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Row fetch failed for store {}: {}", store_id, e);
            return MatchOutcome::Unavailable;
        }
    };

    let want_manufacturer = clean_cell(manufacturer);
    let want_reference = clean_cell(reference);

    let mut matches = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        // Row 1 is the header; rows without both key columns populated
        // cannot match anything.
        if i == 0 {
            continue;
        }
        let populated = row.iter().filter(|c| !c.trim().is_empty()).count();
        if populated < 2 {
            continue;
        }

        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        if clean_cell(cell(0)) == want_manufacturer && clean_cell(cell(1)) == want_reference {
            matches.push(RowMatch {
                row: i + 1,
                current_qty: parse_qty_cell(cell(4)),
                name: row.get(2).cloned().unwrap_or_else(|| "Unknown".to_string()),
                details: row.get(3).cloned().unwrap_or_default(),
            });
        }
    }

    MatchOutcome::Matches(matches)
}
