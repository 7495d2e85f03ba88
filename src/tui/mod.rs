// src/tui/mod.rs
use crate::config::AppConfig;
use crate::core::engine::EngineHandle;
use crate::error::{EngineError, VendError};
use crate::types::{MachineSnapshot, ProductId, Receipt, UiEvent};
use crate::utils::money::format_money;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Terminal,
};
use rust_decimal::Decimal;
use std::num::NonZeroU32;
use std::{io, time::Duration};
use tokio::sync::mpsc;

const MAX_LOG_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn for_error(error: &EngineError) -> Self {
        let (title, message) = match error {
            EngineError::Vend(VendError::InvalidSelection) => (
                "Invalid Selection".to_string(),
                "Please make another selection".to_string(),
            ),
            EngineError::Vend(VendError::OutOfStock) => (
                "Out of Stock".to_string(),
                "This item is unavailable. Please make another selection".to_string(),
            ),
            EngineError::Vend(VendError::InsufficientFunds { required }) => (
                "Insufficient Funds".to_string(),
                format!(
                    "You need {} more to complete the transaction",
                    format_money(*required)
                ),
            ),
            EngineError::Vend(VendError::TotalOverflow) => (
                "Order Too Large".to_string(),
                "Please choose a smaller quantity".to_string(),
            ),
            EngineError::Deposit(e) => ("Deposit Rejected".to_string(), e.to_string()),
            EngineError::Closed => (
                "Machine Offline".to_string(),
                "The vending engine has stopped".to_string(),
            ),
        };
        Self { title, message }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Vend,
    Deposit,
    Quit,
}

pub struct App {
    pub snapshot: MachineSnapshot,
    pub cursor: usize,
    pub quantity: NonZeroU32,
    pub alert: Option<Alert>,
    pub logs: Vec<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            snapshot: MachineSnapshot::default(),
            cursor: 0,
            quantity: NonZeroU32::MIN,
            alert: None,
            logs: Vec::new(),
        }
    }

    /// Every product is listed, stocked or not, so missing ones can still be picked.
    pub fn selected(&self) -> ProductId {
        ProductId::ALL[self.cursor]
    }

    pub fn select_next(&mut self) {
        self.cursor = (self.cursor + 1) % ProductId::ALL.len();
    }

    pub fn select_previous(&mut self) {
        self.cursor = self
            .cursor
            .checked_sub(1)
            .unwrap_or(ProductId::ALL.len() - 1);
    }

    pub fn set_quantity(&mut self, digit: char) {
        if let Some(quantity) = digit.to_digit(10).and_then(NonZeroU32::new) {
            self.quantity = quantity;
        }
    }

    /// While an alert is open only `Esc` (dismiss) and `q` (quit) do anything.
    pub fn on_key(&mut self, code: KeyCode) -> KeyAction {
        if self.alert.is_some() {
            match code {
                KeyCode::Esc => self.alert = None,
                KeyCode::Char('q') => return KeyAction::Quit,
                _ => {}
            }
            return KeyAction::None;
        }

        match code {
            KeyCode::Char('q') => return KeyAction::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Char(c @ '1'..='9') => self.set_quantity(c),
            KeyCode::Enter => return KeyAction::Vend,
            KeyCode::Char('d') => return KeyAction::Deposit,
            _ => {}
        }
        KeyAction::None
    }

    pub fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Snapshot(snapshot) => {
                self.snapshot = snapshot;
            }
            UiEvent::Vended(receipt) => {
                self.push_log(format!(
                    "Vended {} x{} for {}",
                    receipt.selection.label(),
                    receipt.quantity,
                    format_money(receipt.total)
                ));
            }
            UiEvent::Deposited(amount) => {
                self.push_log(format!("Deposited {}", format_money(amount)));
            }
            UiEvent::Rejected(reason) => {
                self.push_log(format!("Rejected: {}", reason));
            }
            UiEvent::Log(msg) => self.push_log(msg),
        }
    }

    pub fn on_vend_result(&mut self, result: Result<Receipt, EngineError>) {
        match result {
            Ok(receipt) => {
                self.quantity = NonZeroU32::MIN;
                self.snapshot.balance = receipt.balance_after;
            }
            Err(e) => self.alert = Some(Alert::for_error(&e)),
        }
    }

    pub fn on_deposit_result(&mut self, result: Result<Decimal, EngineError>) {
        match result {
            Ok(balance) => self.snapshot.balance = balance,
            Err(e) => self.alert = Some(Alert::for_error(&e)),
        }
    }

    fn push_log(&mut self, msg: String) {
        self.logs.push(msg);
        if self.logs.len() > MAX_LOG_LINES {
            self.logs.remove(0);
        }
    }
}

/// Takes over the terminal until `q` is pressed. The engine is reached only through `handle`.
pub async fn run(
    handle: EngineHandle,
    rx: mpsc::Receiver<UiEvent>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, handle, rx, config.deposit_step).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: EngineHandle,
    mut rx: mpsc::Receiver<UiEvent>,
    deposit_step: Decimal,
) -> anyhow::Result<()> {
    let mut app = App::new();
    app.snapshot = handle.snapshot().await?;

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.on_key(key.code) {
                    KeyAction::Quit => break,
                    KeyAction::Vend => {
                        let result = handle.vend(app.selected(), app.quantity).await;
                        app.on_vend_result(result);
                    }
                    KeyAction::Deposit => {
                        let result = handle.deposit(deposit_step).await;
                        app.on_deposit_result(result);
                    }
                    KeyAction::None => {}
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }
    }

    Ok(())
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Vending Machine",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Balance: "),
        Span::styled(
            format_money(app.snapshot.balance),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | Quantity: {}", app.quantity)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(header, chunks[0]);

    let products: Vec<ListItem> = ProductId::ALL
        .iter()
        .map(|id| {
            let line = match app.snapshot.inventory.get(id) {
                Some(item) if item.quantity > 0 => Line::from(vec![
                    Span::raw(format!("{:<14}", id.label())),
                    Span::styled(
                        format!("{:>8}", format_money(item.price)),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw(format!("  ({} left)", item.quantity)),
                ]),
                Some(item) => Line::from(vec![
                    Span::raw(format!("{:<14}", id.label())),
                    Span::styled(
                        format!("{:>8}", format_money(item.price)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled("  sold out", Style::default().fg(Color::Red)),
                ]),
                None => Line::from(Span::styled(
                    format!("{:<14}       -", id.label()),
                    Style::default().fg(Color::DarkGray),
                )),
            };
            ListItem::new(line)
        })
        .collect();

    let products_list = List::new(products)
        .block(Block::default().borders(Borders::ALL).title("Selection"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(products_list, chunks[1], &mut state);

    let logs: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::raw(s))))
        .collect();

    let logs_list =
        List::new(logs).block(Block::default().borders(Borders::ALL).title("Activity"));
    f.render_widget(logs_list, chunks[2]);

    let help = Paragraph::new("↑/↓ select  1-9 quantity  Enter vend  d deposit  Esc dismiss  q quit")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);

    if let Some(alert) = &app.alert {
        let area = centered_rect(50, 25, f.size());
        let popup = Paragraph::new(alert.message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(alert.title.as_str())
                    .border_style(Style::default().fg(Color::Red)),
            );
        f.render_widget(Clear, area);
        f.render_widget(popup, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn cursor_wraps_both_ways() {
        let mut app = App::new();
        app.select_previous();
        assert_eq!(app.selected(), ProductId::Gum);
        app.select_next();
        assert_eq!(app.selected(), ProductId::Soda);
    }

    #[test]
    fn only_digits_one_to_nine_set_quantity() {
        let mut app = App::new();
        app.set_quantity('4');
        assert_eq!(app.quantity.get(), 4);
        app.set_quantity('0');
        assert_eq!(app.quantity.get(), 4);
        app.set_quantity('x');
        assert_eq!(app.quantity.get(), 4);
    }

    #[test]
    fn insufficient_funds_alert_names_the_shortfall() {
        let mut app = App::new();
        app.on_vend_result(Err(EngineError::Vend(VendError::InsufficientFunds {
            required: Decimal::new(5, 1),
        })));

        assert_eq!(
            app.alert,
            Some(Alert {
                title: "Insufficient Funds".to_string(),
                message: "You need $0.50 more to complete the transaction".to_string(),
            })
        );
    }

    #[test]
    fn successful_vend_resets_quantity_and_balance() {
        let mut app = App::new();
        app.set_quantity('3');
        app.on_vend_result(Ok(Receipt {
            id: Uuid::new_v4(),
            selection: ProductId::Chips,
            quantity: NonZeroU32::new(3).unwrap(),
            total: Decimal::new(3, 0),
            balance_after: Decimal::new(7, 0),
            timestamp: Utc::now(),
        }));

        assert_eq!(app.quantity, NonZeroU32::MIN);
        assert_eq!(app.snapshot.balance, Decimal::new(7, 0));
        assert!(app.alert.is_none());
    }

    #[test]
    fn only_escape_dismisses_alert() {
        let mut app = App::new();
        app.on_vend_result(Err(EngineError::Vend(VendError::OutOfStock)));

        assert_eq!(app.on_key(KeyCode::Enter), KeyAction::None);
        assert_eq!(app.on_key(KeyCode::Char('d')), KeyAction::None);
        assert_eq!(app.on_key(KeyCode::Down), KeyAction::None);
        assert_eq!(app.cursor, 0);
        assert!(app.alert.is_some());

        assert_eq!(app.on_key(KeyCode::Esc), KeyAction::None);
        assert!(app.alert.is_none());
        assert_eq!(app.on_key(KeyCode::Enter), KeyAction::Vend);
    }

    #[test]
    fn q_quits_even_with_alert_open() {
        let mut app = App::new();
        app.on_deposit_result(Err(EngineError::Closed));
        assert_eq!(app.on_key(KeyCode::Char('q')), KeyAction::Quit);
    }

    #[test]
    fn keys_map_to_actions() {
        let mut app = App::new();
        assert_eq!(app.on_key(KeyCode::Char('j')), KeyAction::None);
        assert_eq!(app.selected(), ProductId::DietSoda);
        assert_eq!(app.on_key(KeyCode::Char('7')), KeyAction::None);
        assert_eq!(app.quantity.get(), 7);
        assert_eq!(app.on_key(KeyCode::Char('d')), KeyAction::Deposit);
    }

    #[test]
    fn total_overflow_has_its_own_alert() {
        let alert = Alert::for_error(&EngineError::Vend(VendError::TotalOverflow));
        assert_eq!(alert.title, "Order Too Large");
    }

    #[test]
    fn log_is_bounded() {
        let mut app = App::new();
        for i in 0..(MAX_LOG_LINES + 5) {
            app.on_event(UiEvent::Log(format!("line {i}")));
        }
        assert_eq!(app.logs.len(), MAX_LOG_LINES);
        assert_eq!(app.logs[0], "line 5");
    }

    #[test]
    fn deposit_result_updates_balance() {
        let mut app = App::new();
        app.on_deposit_result(Ok(Decimal::new(11, 0)));
        assert_eq!(app.snapshot.balance, Decimal::new(11, 0));

        app.on_deposit_result(Err(EngineError::Closed));
        assert_eq!(app.alert.as_ref().unwrap().title, "Machine Offline");
    }
}
