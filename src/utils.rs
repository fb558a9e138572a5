// Utility functions
use serde_json::Value;

/// Trims and upper-cases a cell or query value for comparison.
pub fn clean_cell(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Parses a stored quantity cell. Non-numeric or missing values count as
/// zero so a malformed legacy row never fails a scan.
pub fn parse_qty_cell(cell: &str) -> u32 {
    cell.trim().parse().unwrap_or(0)
}

/// Coerces the extractor's `qty` field into a pack quantity. The service
/// returns it as a string or a number; anything unparseable defaults to 1.
pub fn coerce_pack_qty(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as u32).unwrap_or(1),
        Value::String(s) => s.trim().parse().unwrap_or(1),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_cell_trims_and_uppercases() {
        assert_eq!(clean_cell("  b braun "), "B BRAUN");
    }

    #[test]
    fn qty_cell_parses_plain_integers() {
        assert_eq!(parse_qty_cell("3"), 3);
        assert_eq!(parse_qty_cell(" 7 "), 7);
    }

    #[test]
    fn qty_cell_treats_garbage_as_zero() {
        assert_eq!(parse_qty_cell("N/A"), 0);
        assert_eq!(parse_qty_cell(""), 0);
        assert_eq!(parse_qty_cell("-2"), 0);
        assert_eq!(parse_qty_cell("3.5"), 0);
    }

    #[test]
    fn pack_qty_accepts_strings_and_numbers() {
        assert_eq!(coerce_pack_qty(&json!("12")), 12);
        assert_eq!(coerce_pack_qty(&json!(4)), 4);
        assert_eq!(coerce_pack_qty(&json!("0")), 0);
    }

    #[test]
    fn pack_qty_defaults_to_one() {
        assert_eq!(coerce_pack_qty(&json!("a box")), 1);
        assert_eq!(coerce_pack_qty(&json!(null)), 1);
        assert_eq!(coerce_pack_qty(&json!(-3)), 1);
        assert_eq!(coerce_pack_qty(&json!(2.5)), 1);
    }
}
