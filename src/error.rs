// src/error.rs
use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while building the inventory. None of these leave a usable machine behind.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("inventory resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("failed to read inventory resource {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("inventory format error: {0}")]
    Format(String),

    #[error("unknown product selection `{0}`")]
    UnknownSelection(String),

    #[error("inventory entry `{key}` needs a numeric price and an integer quantity")]
    MalformedEntry { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendError {
    #[error("Invalid Selection")]
    InvalidSelection,

    #[error("Out of Stock")]
    OutOfStock,

    #[error("Insufficient Funds: {required} more required")]
    InsufficientFunds { required: Decimal },

    #[error("Order total is too large")]
    TotalOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositError {
    #[error("deposit amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("deposit of {0} would overflow the balance")]
    BalanceOverflow(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Vend(#[from] VendError),

    #[error(transparent)]
    Deposit(#[from] DepositError),

    #[error("vending engine is not running")]
    Closed,
}
