// src/inventory/traits.rs
use crate::error::LoadError;
use crate::types::Inventory;
use async_trait::async_trait;

#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Where the data comes from, for log lines.
    fn describe(&self) -> String;

    // Read the resource once and build the inventory from it
    async fn load(&self) -> Result<Inventory, LoadError>;
}
