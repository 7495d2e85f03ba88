// src/core/machine.rs
use crate::error::{DepositError, VendError};
use crate::types::{Inventory, Item, MachineSnapshot, ProductId};
use rust_decimal::Decimal;
use std::num::NonZeroU32;

/// Purchase rules over an inventory and the balance deposited so far.
///
/// Plain synchronous state. Callers that share a machine go through
/// [`crate::core::engine::VendingEngine`], which owns it exclusively.
#[derive(Debug, Clone)]
pub struct VendingMachine {
    inventory: Inventory,
    balance: Decimal,
}

impl VendingMachine {
    pub fn new(inventory: Inventory, starting_balance: Decimal) -> Self {
        Self {
            inventory,
            balance: starting_balance.max(Decimal::ZERO),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn item_for(&self, selection: ProductId) -> Option<Item> {
        self.inventory.get(&selection).copied()
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            balance: self.balance,
            inventory: self.inventory.clone(),
        }
    }

    /// Adds `amount` to the balance and returns the new balance.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, DepositError> {
        if amount <= Decimal::ZERO {
            return Err(DepositError::NonPositiveAmount(amount));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(DepositError::BalanceOverflow(amount))?;
        Ok(self.balance)
    }

    /// Checks selection, then stock, then funds. The first failing check wins
    /// and nothing is mutated.
    pub fn vend(&mut self, selection: ProductId, quantity: NonZeroU32) -> Result<(), VendError> {
        let item = self
            .inventory
            .get(&selection)
            .copied()
            .ok_or(VendError::InvalidSelection)?;

        let quantity = quantity.get();
        if item.quantity < quantity {
            return Err(VendError::OutOfStock);
        }

        // A total past Decimal::MAX exceeds any balance the machine can hold.
        let total = item
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or(VendError::TotalOverflow)?;

        if self.balance < total {
            return Err(VendError::InsufficientFunds {
                required: total - self.balance,
            });
        }

        self.balance -= total;
        self.inventory.insert(
            selection,
            Item {
                quantity: item.quantity - quantity,
                ..item
            },
        );
        Ok(())
    }
}
