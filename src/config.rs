use serde::Deserialize;
use std::fs;

/// One named warehouse the operator can enter.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub store_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sheets,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub locations: Vec<LocationConfig>,
    pub manufacturers_file: String,
    pub backend: StoreBackend,
    #[serde(default)]
    pub google_api_key: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default)]
    pub sheets_token: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_shelf")]
    pub default_shelf: String,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_database_path() -> String {
    "inventory.db".to_string()
}

fn default_shelf() -> String {
    "Shelf A".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
