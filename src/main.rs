// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use vending_machine::config::AppConfig;
use vending_machine::inventory::{InventorySource, JsonFileSource};
use vending_machine::tui;
use vending_machine::utils::money::format_money;
use vending_machine::{VendingEngine, VendingMachine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new().context("Failed to load configuration")?;

    // 2. Logging goes to a file, the TUI owns the terminal
    let _guard = init_tracing(&config)?;

    println!("========================================");
    println!("       VENDING MACHINE - v0.1.0");
    println!("========================================");
    println!("Inventory: {}", config.inventory_path);
    println!("Balance:   {}", format_money(config.starting_balance));
    println!("Logs:      {}/", config.log_dir);
    println!("========================================");

    // 3. Load Inventory; any failure here aborts startup
    let source = JsonFileSource::new(&config.inventory_path, config.malformed_entries);
    let inventory = source
        .load()
        .await
        .with_context(|| format!("Failed to load inventory from {}", source.describe()))?;

    // 4. Spawn Engine
    let machine = VendingMachine::new(inventory, config.starting_balance);
    let (ui_tx, ui_rx) = mpsc::channel(100);
    let (engine, handle) = VendingEngine::new(machine, ui_tx, config.currency_unit);
    let engine_task = tokio::spawn(engine.run());

    // 5. Run UI; dropping its handle on exit stops the engine
    tui::run(handle, ui_rx, &config).await?;

    let machine = engine_task.await?;
    info!(
        "Session ended with balance {}",
        format_money(machine.balance())
    );
    println!("Remaining balance: {}", format_money(machine.balance()));

    Ok(())
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "vending.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .with_context(|| format!("Invalid log filter `{}`", config.log_filter))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
