// src/inventory/sources.rs
use crate::error::LoadError;
use crate::inventory::loader::{parse_inventory, MalformedEntryPolicy};
use crate::inventory::traits::InventorySource;
use crate::types::Inventory;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

/// Inventory stored as a JSON file on disk.
pub struct JsonFileSource {
    path: PathBuf,
    policy: MalformedEntryPolicy,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, policy: MalformedEntryPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }
}

#[async_trait]
impl InventorySource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Inventory, LoadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => LoadError::ResourceNotFound(self.path.clone()),
                _ => LoadError::Io {
                    path: self.path.clone(),
                    source,
                },
            })?;

        let inventory = parse_inventory(&text, self.policy)?;
        info!(
            "Loaded {} products from {}",
            inventory.len(),
            self.path.display()
        );
        Ok(inventory)
    }
}

/// Inventory text already held in memory.
pub struct StaticSource {
    text: String,
    policy: MalformedEntryPolicy,
}

impl StaticSource {
    pub fn new(text: impl Into<String>, policy: MalformedEntryPolicy) -> Self {
        Self {
            text: text.into(),
            policy,
        }
    }
}

#[async_trait]
impl InventorySource for StaticSource {
    fn describe(&self) -> String {
        "<in-memory>".to_string()
    }

    async fn load(&self) -> Result<Inventory, LoadError> {
        parse_inventory(&self.text, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    #[tokio::test]
    async fn missing_file_is_resource_not_found() {
        let source = JsonFileSource::new("does/not/exist.json", MalformedEntryPolicy::Skip);
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, LoadError::ResourceNotFound(path) if path.ends_with("exist.json")));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("inventory-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"{"water": {"price": 1.0, "quantity": 4}}"#)
            .await
            .unwrap();

        let inventory = JsonFileSource::new(&path, MalformedEntryPolicy::Skip)
            .load()
            .await
            .unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(inventory[&ProductId::Water].quantity, 4);
    }

    #[tokio::test]
    async fn static_source_applies_policy() {
        let source = StaticSource::new(r#"{"soda": {"price": 1.5}}"#, MalformedEntryPolicy::Reject);
        assert!(matches!(
            source.load().await,
            Err(LoadError::MalformedEntry { .. })
        ));
    }
}
