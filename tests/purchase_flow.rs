use rust_decimal::Decimal;
use std::num::NonZeroU32;
use tokio::sync::mpsc;
use vending_machine::inventory::{InventorySource, JsonFileSource, MalformedEntryPolicy};
use vending_machine::{EngineError, ProductId, VendError, VendingEngine, VendingMachine};

fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

async fn bundled_inventory() -> vending_machine::Inventory {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/inventory.json");
    JsonFileSource::new(path, MalformedEntryPolicy::Reject)
        .load()
        .await
        .expect("bundled inventory loads")
}

#[tokio::test]
async fn bundled_inventory_stocks_every_product() {
    let inventory = bundled_inventory().await;

    assert_eq!(inventory.len(), ProductId::ALL.len());
    assert_eq!(inventory[&ProductId::Soda].price, Decimal::new(150, 2));
    assert_eq!(inventory[&ProductId::SportsDrink].quantity, 0);
}

#[tokio::test]
async fn purchase_session_through_engine() {
    let machine = VendingMachine::new(bundled_inventory().await, Decimal::new(10, 0));
    let (ui_tx, _ui_rx) = mpsc::channel(100);
    let (engine, handle) = VendingEngine::new(machine, ui_tx, Decimal::new(1, 2));
    let task = tokio::spawn(engine.run());

    // 10.00 - 2 x 3.50
    let receipt = handle.vend(ProductId::Sandwich, qty(2)).await.unwrap();
    assert_eq!(receipt.balance_after, Decimal::new(3, 0));

    assert_eq!(
        handle.vend(ProductId::SportsDrink, qty(1)).await,
        Err(EngineError::Vend(VendError::OutOfStock))
    );
    assert_eq!(
        handle.vend(ProductId::Sandwich, qty(1)).await,
        Err(EngineError::Vend(VendError::InsufficientFunds {
            required: Decimal::new(50, 2)
        }))
    );

    handle.deposit(Decimal::ONE).await.unwrap();
    handle.vend(ProductId::Sandwich, qty(1)).await.unwrap();

    drop(handle);
    let machine = task.await.unwrap();
    assert_eq!(machine.balance(), Decimal::new(50, 2));
    assert_eq!(machine.item_for(ProductId::Sandwich).unwrap().quantity, 1);
}
