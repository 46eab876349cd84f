//! Shared value-cleaning helpers for spreadsheet data
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization as _;

use crate::importers::CellValue;

static CURRENCY_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"R\$|\s|\.").expect("currency pattern is valid"));

/// Outcome of a best-effort monetary parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedMoney {
    pub amount: f64,
    /// False when the cell held something that could not be read as money
    pub parsed: bool,
}

impl ParsedMoney {
    fn ok(amount: f64) -> Self {
        Self {
            amount,
            parsed: true,
        }
    }

    fn fallback() -> Self {
        Self {
            amount: 0.0,
            parsed: false,
        }
    }
}

/// Parse a Brazilian-formatted monetary cell, reporting whether parsing succeeded
///
/// Empty cells count as a successful parse of `0.0`; anything unreadable
/// yields `0.0` with `parsed == false`.
///
/// # Examples
///
/// ```
/// use fuel_dashboard_service::importers::CellValue;
/// use fuel_dashboard_service::utils::parse_money_checked;
///
/// let money = parse_money_checked(&CellValue::Text("R$ 1.234,56".into()));
/// assert!(money.parsed);
/// assert!((money.amount - 1234.56).abs() < 1e-9);
///
/// let garbage = parse_money_checked(&CellValue::Text("garbage".into()));
/// assert!(!garbage.parsed);
/// assert_eq!(garbage.amount, 0.0);
/// ```
pub fn parse_money_checked(raw: &CellValue) -> ParsedMoney {
    match raw {
        CellValue::Empty => ParsedMoney::ok(0.0),
        CellValue::Number(n) => ParsedMoney::ok(*n),
        CellValue::Text(s) => {
            let cleaned = CURRENCY_NOISE.replace_all(s, "").replace(',', ".");
            if cleaned.is_empty() {
                return ParsedMoney::fallback();
            }
            match cleaned.parse::<f64>() {
                Ok(value) if value.is_finite() => ParsedMoney::ok(value),
                _ => ParsedMoney::fallback(),
            }
        }
        CellValue::Bool(_) | CellValue::DateTime(_) => ParsedMoney::fallback(),
    }
}

/// Parse a monetary cell, degrading to `0.0` on anything unreadable
pub fn parse_money(raw: &CellValue) -> f64 {
    parse_money_checked(raw).amount
}

/// Canonicalize a spreadsheet header: strip accents, keep ASCII, trim,
/// lowercase and turn spaces into underscores
///
/// # Examples
///
/// ```
/// use fuel_dashboard_service::utils::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Valor Total"), "valor_total");
/// assert_eq!(normalize_column_name("Combustível"), "combustivel");
/// ```
pub fn normalize_column_name(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    ascii.trim().to_lowercase().replace(' ', "_")
}

/// Uppercase and trim an identifier-like text value
pub fn normalize_label(value: &str) -> String {
    value.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_money_brazilian_format() {
        assert!((parse_money(&text("R$ 1.234,56")) - 1234.56).abs() < 1e-9);
    }

    #[test]
    fn test_parse_money_without_symbol() {
        assert!((parse_money(&text("89,90")) - 89.9).abs() < 1e-9);
        assert!((parse_money(&text(" 2.500 ")) - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_money_missing() {
        assert_eq!(parse_money(&CellValue::Empty), 0.0);
        assert!(parse_money_checked(&CellValue::Empty).parsed);
    }

    #[test]
    fn test_parse_money_garbage() {
        assert_eq!(parse_money(&text("garbage")), 0.0);
        assert_eq!(parse_money(&text("R$")), 0.0);
        assert_eq!(parse_money(&text("-")), 0.0);
        assert!(!parse_money_checked(&text("garbage")).parsed);
    }

    #[test]
    fn test_parse_money_numeric_passthrough() {
        assert_eq!(parse_money(&CellValue::Number(42.0)), 42.0);
        assert_eq!(parse_money(&CellValue::Number(5.79)), 5.79);
    }

    #[test]
    fn test_parse_money_rejects_non_finite_text() {
        assert_eq!(parse_money(&text("NaN")), 0.0);
        assert_eq!(parse_money(&text("inf")), 0.0);
    }

    #[test]
    fn test_parse_money_negative() {
        assert!((parse_money(&text("-R$ 10,50")) + 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Valor Total"), "valor_total");
        assert_eq!(normalize_column_name("Km Atual"), "km_atual");
        assert_eq!(normalize_column_name("Combustível"), "combustivel");
        assert_eq!(normalize_column_name("  Tipo Combustível "), "tipo_combustivel");
        assert_eq!(normalize_column_name("Valor Unitário"), "valor_unitario");
        assert_eq!(
            normalize_column_name("Quantidade de Litros"),
            "quantidade_de_litros"
        );
    }

    #[test]
    fn test_normalize_column_name_keeps_repeated_spaces() {
        assert_eq!(normalize_column_name("Km  Atual"), "km__atual");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  abc1d23 "), "ABC1D23");
        assert_eq!(normalize_label("diesel s10"), "DIESEL S10");
    }
}
