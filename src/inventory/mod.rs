// src/inventory/mod.rs
pub mod loader;
pub mod sources;
pub mod traits;

pub use loader::{parse_inventory, MalformedEntryPolicy};
pub use sources::{JsonFileSource, StaticSource};
pub use traits::InventorySource;
