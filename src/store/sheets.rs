// Google Sheets values API backend.
use crate::model::StoreError;
use crate::store::traits::TabularStore;

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

pub struct SheetsStore {
    pub client: Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsStore {
    pub fn new(token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("❗ Failed to create HTTP client");
        Self { client, token }
    }

    fn values_url(&self, store_id: &str, range: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            store_id, range
        )
    }

    /// A1 range for a single cell. The fixed seven-column layout keeps the
    /// column letter in A..G.
    fn cell_range(row: usize, column: usize) -> String {
        let letter = (b'A' + (column as u8) - 1) as char;
        format!("Sheet1!{}{}", letter, row)
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "unknown".into());
            warn!("❌ Sheets {} failed [{}]: {}", action, status, body);
            return Err(StoreError::InvalidResponse(format!("{}: {}", status, body)));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl TabularStore for SheetsStore {
    async fn fetch_rows(&self, store_id: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.values_url(store_id, "Sheet1");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        let response = Self::check(response, "fetch").await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(range.values)
    }

    async fn append_row(&self, store_id: &str, row: &[String]) -> Result<(), StoreError> {
        let url = format!("{}:append", self.values_url(store_id, "Sheet1"));
        let body = serde_json::json!({ "values": [row] });
        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Self::check(response, "append").await?;
        info!("Appended row to store {}", store_id);
        Ok(())
    }

    async fn update_cell(
        &self,
        store_id: &str,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let url = self.values_url(store_id, &Self::cell_range(row, column));
        let body = serde_json::json!({ "values": [[value]] });
        let response = self
            .client
            .put(&url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Self::check(response, "update").await?;
        info!("Updated cell r{}c{} in store {}", row, column, store_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_range_uses_a1_notation() {
        assert_eq!(SheetsStore::cell_range(2, 5), "Sheet1!E2");
        assert_eq!(SheetsStore::cell_range(14, 1), "Sheet1!A14");
    }
}
