use crate::foundation::error::{Error, Result};

/// Format a monetary magnitude as a compact currency string.
///
/// Values below 1,000 render as whole units; `[1e3, 1e4)` with a two-decimal
/// `k` suffix; `[1e4, 1e5)` with one decimal; `[1e5, 1e6)` with none; values of
/// one million and up render with a one-decimal `M` suffix. Total for finite
/// input; non-finite values are rejected.
pub fn format_currency(value: f64, currency_symbol: &str) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::invalid_input(format!(
            "cannot format non-finite value {value}"
        )));
    }

    if value >= 1e6 {
        return Ok(format!("{currency_symbol}{:.1}M", value / 1e6));
    }
    if value >= 1e3 {
        let thousands = value / 1e3;
        return Ok(if thousands < 10.0 {
            format!("{currency_symbol}{thousands:.2}k")
        } else if thousands < 100.0 {
            format!("{currency_symbol}{thousands:.1}k")
        } else {
            format!("{currency_symbol}{thousands:.0}k")
        });
    }
    Ok(format!("{currency_symbol}{value:.0}"))
}
