pub mod engine;
pub mod machine;

pub use engine::{EngineHandle, VendingEngine};
pub use machine::VendingMachine;
