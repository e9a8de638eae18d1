//! Runtime and collection configuration.

use std::path::PathBuf;

use crate::errors::StoreError;

pub const DEFAULT_STORE_DIR: &str = "data/vector_store";
pub const DEFAULT_COLLECTION: &str = "knowledge_embeddings";

/// Where collections live on disk and which ones the pipeline opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding one `<collection>.jsonl` file per collection.
    pub root_dir: PathBuf,
    /// Default knowledge collection.
    pub collection: String,
    /// Optional professional knowledge collection.
    pub professional_collection: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_STORE_DIR),
            collection: DEFAULT_COLLECTION.to_string(),
            professional_collection: None,
        }
    }
}

impl StoreConfig {
    /// Reads `VECTOR_STORE_DIR`, `VECTOR_COLLECTION`, `PROFESSIONAL_COLLECTION`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, StoreError> {
        let mut cfg = Self::default();
        if let Some(dir) = non_empty_env("VECTOR_STORE_DIR") {
            cfg.root_dir = PathBuf::from(dir);
        }
        if let Some(name) = non_empty_env("VECTOR_COLLECTION") {
            cfg.collection = name;
        }
        cfg.professional_collection = non_empty_env("PROFESSIONAL_COLLECTION");
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_collection_name(&self.collection)?;
        if let Some(p) = &self.professional_collection {
            validate_collection_name(p)?;
        }
        if self.root_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("root_dir is empty".into()));
        }
        Ok(())
    }

    /// File backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root_dir.join(format!("{collection}.jsonl"))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Config("collection is empty".into()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StoreError::Config(format!(
            "collection `{name}` must be [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}
