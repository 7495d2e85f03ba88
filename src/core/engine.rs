// src/core/engine.rs
use crate::core::machine::VendingMachine;
use crate::error::{DepositError, EngineError, VendError};
use crate::types::{Item, MachineSnapshot, ProductId, Receipt, UiEvent};
use crate::utils::money::{format_money, normalize_amount};
use chrono::Utc;
use rust_decimal::Decimal;
use std::num::NonZeroU32;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

const COMMAND_BUFFER: usize = 32;

pub enum Command {
    Vend {
        selection: ProductId,
        quantity: NonZeroU32,
        reply: oneshot::Sender<Result<Receipt, VendError>>,
    },
    Deposit {
        amount: Decimal,
        reply: oneshot::Sender<Result<Decimal, DepositError>>,
    },
    ItemFor {
        selection: ProductId,
        reply: oneshot::Sender<Option<Item>>,
    },
    Snapshot {
        reply: oneshot::Sender<MachineSnapshot>,
    },
}

/// Owns the machine and applies commands one at a time, so every
/// read-modify-write of balance and stock is serialized.
pub struct VendingEngine {
    machine: VendingMachine,
    command_receiver: mpsc::Receiver<Command>,
    ui_sender: mpsc::Sender<UiEvent>,
    currency_unit: Decimal,
}

impl VendingEngine {
    pub fn new(
        machine: VendingMachine,
        ui_sender: mpsc::Sender<UiEvent>,
        currency_unit: Decimal,
    ) -> (Self, EngineHandle) {
        let (command_sender, command_receiver) = mpsc::channel(COMMAND_BUFFER);
        let engine = Self {
            machine,
            command_receiver,
            ui_sender,
            currency_unit,
        };
        (
            engine,
            EngineHandle {
                sender: command_sender,
            },
        )
    }

    fn send_ui_event(&self, event: UiEvent) {
        match self.ui_sender.try_send(event) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("UI Channel closed! Interface is likely dead.");
            }
        }
    }

    /// Runs until every [`EngineHandle`] is dropped, then hands the machine back.
    pub async fn run(mut self) -> VendingMachine {
        info!(
            "Engine starting with {} products, balance {}",
            self.machine.inventory().len(),
            format_money(self.machine.balance())
        );
        self.send_ui_event(UiEvent::Snapshot(self.machine.snapshot()));
        self.send_ui_event(UiEvent::Log(format!(
            "Machine ready: {} products stocked",
            self.machine.inventory().len()
        )));

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command);
        }

        info!("Engine stopped, no handles left");
        self.machine
    }

    fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver just means the caller stopped waiting.
        match command {
            Command::Vend {
                selection,
                quantity,
                reply,
            } => {
                let _ = reply.send(self.handle_vend(selection, quantity));
            }
            Command::Deposit { amount, reply } => {
                let _ = reply.send(self.handle_deposit(amount));
            }
            Command::ItemFor { selection, reply } => {
                let _ = reply.send(self.machine.item_for(selection));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.machine.snapshot());
            }
        }
    }

    fn handle_vend(
        &mut self,
        selection: ProductId,
        quantity: NonZeroU32,
    ) -> Result<Receipt, VendError> {
        let balance_before = self.machine.balance();

        if let Err(e) = self.machine.vend(selection, quantity) {
            warn!("Vend of {} x{} rejected: {}", selection, quantity, e);
            self.send_ui_event(UiEvent::Rejected(e.to_string()));
            return Err(e);
        }

        let balance_after = self.machine.balance();
        let receipt = Receipt {
            id: Uuid::new_v4(),
            selection,
            quantity,
            total: balance_before - balance_after,
            balance_after,
            timestamp: Utc::now(),
        };

        info!(
            "Vended {} x{} for {} (balance {})",
            selection,
            quantity,
            format_money(receipt.total),
            format_money(balance_after)
        );
        self.send_ui_event(UiEvent::Vended(receipt.clone()));
        self.send_ui_event(UiEvent::Snapshot(self.machine.snapshot()));
        Ok(receipt)
    }

    fn handle_deposit(&mut self, amount: Decimal) -> Result<Decimal, DepositError> {
        let result = normalize_amount(amount, self.currency_unit)
            .ok_or(DepositError::BalanceOverflow(amount))
            .and_then(|normalized| {
                if normalized <= Decimal::ZERO {
                    return Err(DepositError::NonPositiveAmount(amount));
                }
                self.machine.deposit(normalized).map(|balance| (normalized, balance))
            });

        match result {
            Ok((normalized, balance)) => {
                info!(
                    "Deposited {} (balance {})",
                    format_money(normalized),
                    format_money(balance)
                );
                self.send_ui_event(UiEvent::Deposited(normalized));
                self.send_ui_event(UiEvent::Snapshot(self.machine.snapshot()));
                Ok(balance)
            }
            Err(e) => {
                warn!("Deposit of {} rejected: {}", amount, e);
                self.send_ui_event(UiEvent::Rejected(e.to_string()));
                Err(e)
            }
        }
    }
}

/// Cheap, cloneable way to reach a running [`VendingEngine`].
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<Command>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| EngineError::Closed)?;
        response.await.map_err(|_| EngineError::Closed)
    }

    pub async fn vend(
        &self,
        selection: ProductId,
        quantity: NonZeroU32,
    ) -> Result<Receipt, EngineError> {
        let receipt = self
            .request(|reply| Command::Vend {
                selection,
                quantity,
                reply,
            })
            .await??;
        Ok(receipt)
    }

    pub async fn deposit(&self, amount: Decimal) -> Result<Decimal, EngineError> {
        let balance = self
            .request(|reply| Command::Deposit { amount, reply })
            .await??;
        Ok(balance)
    }

    pub async fn item_for(&self, selection: ProductId) -> Result<Option<Item>, EngineError> {
        self.request(|reply| Command::ItemFor { selection, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<MachineSnapshot, EngineError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}
