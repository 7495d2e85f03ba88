//! A vending machine: a JSON-backed inventory, the purchase rules that
//! guard it, and a terminal front end.
//!
//! - [`inventory`] loads `ProductId -> Item` from a static resource
//! - [`core::machine`] enforces selection, stock and funds checks
//! - [`core::engine`] owns the machine on a tokio task and serializes callers
//! - [`tui`] renders the selection list and forwards key presses to the engine

pub mod config;
pub mod core;
pub mod error;
pub mod inventory;
pub mod tui;
pub mod types;
pub mod utils;

pub use crate::core::{EngineHandle, VendingEngine, VendingMachine};
pub use error::{DepositError, EngineError, LoadError, VendError};
pub use types::{Inventory, Item, MachineSnapshot, ProductId, Receipt, UiEvent};
