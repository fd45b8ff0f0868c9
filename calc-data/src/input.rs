use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes user input for decimal parsing.
///
/// Removes whitespace (including non-breaking spaces used as thousands
/// separators). A comma is a decimal separator unless the input also
/// contains a dot, in which case commas are thousands separators.
fn normalize_amount_input(s: &str) -> String {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains('.') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    }
}

/// Parses an amount, rejecting input that is not a number.
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseAmountError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses an amount leniently: anything that is not a number becomes 0.
///
/// Accepts `"1 234,56"`, `"1,234.56"` and `"1234.56"`. Invalid input is
/// logged as a warning.
pub fn parse_amount(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or_else(|e| {
        tracing::warn!(input = %s, "treating invalid amount as zero: {}", e);
        Decimal::ZERO
    })
}
