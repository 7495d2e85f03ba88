// src/utils/money.rs
use rust_decimal::Decimal;

/// Floors `amount` to a multiple of `unit`; a zero unit leaves it untouched.
/// Example: amount=1.237, unit=0.05 -> 1.20
///
/// `None` when the intermediate quotient does not fit in a `Decimal`.
pub fn normalize_amount(amount: Decimal, unit: Decimal) -> Option<Decimal> {
    if unit.is_zero() {
        return Some(amount);
    }
    amount.checked_div(unit)?.floor().checked_mul(unit)
}

/// Dollar formatting for the TUI and log lines.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}
