//! The three persistence-facing operations behind an operator decision:
//! scan a label, add stock to an existing row, or append a new row.
use crate::extractor::{FieldExtractor, TextRecognizer};
use crate::model::{ExtractError, ExtractedLabel, RowMatch, StoreError};
use crate::normalizer::KnownManufacturers;
use crate::store::{COL_QTY, TabularStore};

use tracing::info;

/// Runs one image through recognition and field extraction, then corrects
/// the manufacturer against the canonical list. No partial data: a label
/// that yields no text fails the whole scan.
pub async fn scan_label(
    recognizer: &dyn TextRecognizer,
    extractor: &dyn FieldExtractor,
    known: &KnownManufacturers,
    image: &[u8],
) -> Result<ExtractedLabel, ExtractError> {
    let text = recognizer.recognize(image).await?;
    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }

    let mut label = extractor.extract(&text).await?;
    let corrected = known.canonicalize(&label.manufacturer);
    if corrected != label.manufacturer {
        info!("Manufacturer corrected: {} -> {}", label.manufacturer, corrected);
    }
    label.manufacturer = corrected;
    Ok(label)
}

/// Adds stock to an existing row by overwriting its quantity cell.
/// Returns the new total.
pub async fn add_quantity(
    store: &dyn TabularStore,
    store_id: &str,
    target: &RowMatch,
    add_qty: u32,
) -> Result<u32, StoreError> {
    let new_total = target.current_qty + add_qty;
    store
        .update_cell(store_id, target.row, COL_QTY, &new_total.to_string())
        .await?;
    info!("Row {}: quantity {} -> {}", target.row, target.current_qty, new_total);
    Ok(new_total)
}

/// Appends a brand-new inventory row for the verified label.
pub async fn save_new_item(
    store: &dyn TabularStore,
    store_id: &str,
    label: &ExtractedLabel,
    shelf: &str,
) -> Result<(), StoreError> {
    let row = vec![
        label.manufacturer.clone(),
        label.reference.clone(),
        label.name.clone(),
        label.details.clone(),
        label.qty.to_string(),
        shelf.to_string(),
        derive_uid(&label.manufacturer, &label.reference),
    ];
    store.append_row(store_id, &row).await?;
    info!("Saved new item {} / {}", label.manufacturer, label.reference);
    Ok(())
}

/// Short human-scannable tag: first three characters of the manufacturer
/// plus the reference, upper-cased, spaces removed. Not a unique key.
pub fn derive_uid(manufacturer: &str, reference: &str) -> String {
    let prefix: String = manufacturer.chars().take(3).collect();
    format!("{}{}", prefix, reference)
        .to_uppercase()
        .replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubRecognizer {
        text: &'static str,
    }

    #[async_trait::async_trait]
    impl TextRecognizer for StubRecognizer {
        async fn recognize(&self, _image: &[u8]) -> Result<String, ExtractError> {
            Ok(self.text.to_string())
        }
    }

    struct StubExtractor;

    #[async_trait::async_trait]
    impl FieldExtractor for StubExtractor {
        async fn extract(&self, _text: &str) -> Result<ExtractedLabel, ExtractError> {
            Ok(ExtractedLabel {
                manufacturer: "B. Braun Medical".into(),
                reference: "4062981".into(),
                name: "Gravity IV Set".into(),
                details: "150cm".into(),
                qty: 1,
            })
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        appended: Mutex<Vec<Vec<String>>>,
        updates: Mutex<Vec<(usize, usize, String)>>,
    }

    #[async_trait::async_trait]
    impl TabularStore for RecordingStore {
        async fn fetch_rows(&self, _store_id: &str) -> Result<Vec<Vec<String>>, StoreError> {
            Ok(Vec::new())
        }

        async fn append_row(&self, _store_id: &str, row: &[String]) -> Result<(), StoreError> {
            self.appended.lock().unwrap().push(row.to_vec());
            Ok(())
        }

        async fn update_cell(
            &self,
            _store_id: &str,
            row: usize,
            column: usize,
            value: &str,
        ) -> Result<(), StoreError> {
            self.updates.lock().unwrap().push((row, column, value.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn scan_corrects_the_manufacturer() {
        let known = KnownManufacturers::from_lines(["B BRAUN", "BAXTER"]);
        let label = scan_label(
            &StubRecognizer { text: "some label text" },
            &StubExtractor,
            &known,
            b"img",
        )
        .await
        .unwrap();
        assert_eq!(label.manufacturer, "B BRAUN");
        assert_eq!(label.reference, "4062981");
    }

    #[tokio::test]
    async fn empty_text_fails_the_scan() {
        let known = KnownManufacturers::default();
        let err = scan_label(
            &StubRecognizer { text: "  \n " },
            &StubExtractor,
            &known,
            b"img",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::NoText));
    }

    #[tokio::test]
    async fn add_quantity_overwrites_the_qty_cell() {
        let store = RecordingStore::default();
        let target = RowMatch {
            row: 2,
            current_qty: 3,
            name: "Widget".into(),
            details: String::new(),
        };

        let total = add_quantity(&store, "s1", &target, 4).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(
            store.updates.lock().unwrap().as_slice(),
            &[(2, COL_QTY, "7".to_string())]
        );
    }

    #[tokio::test]
    async fn save_builds_the_full_row() {
        let store = RecordingStore::default();
        let label = ExtractedLabel {
            manufacturer: "B BRAUN".into(),
            reference: "4062981".into(),
            name: "Gravity IV Set".into(),
            details: "150cm".into(),
            qty: 0,
        };

        save_new_item(&store, "s1", &label, "Shelf A").await.unwrap();
        let appended = store.appended.lock().unwrap();
        assert_eq!(
            appended[0],
            vec![
                "B BRAUN".to_string(),
                "4062981".into(),
                "Gravity IV Set".into(),
                "150cm".into(),
                "0".into(),
                "Shelf A".into(),
                "BB4062981".into(),
            ]
        );
    }

    #[test]
    fn uid_strips_spaces_and_uppercases() {
        assert_eq!(derive_uid("B BRAUN", "REF 12"), "BBREF12");
        assert_eq!(derive_uid("Baxter", "12-34"), "BAX12-34");
        assert_eq!(derive_uid("AB", "X"), "ABX");
    }
}
