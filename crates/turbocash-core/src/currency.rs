//! Display helpers for the currencies a user can pick.

/// Supported currencies as `(code, symbol, name)`.
pub const CURRENCIES: [(&str, &str, &str); 10] = [
    ("USD", "$", "US Dollar"),
    ("EUR", "€", "Euro"),
    ("GBP", "£", "British Pound"),
    ("CAD", "C$", "Canadian Dollar"),
    ("AUD", "A$", "Australian Dollar"),
    ("JPY", "¥", "Japanese Yen"),
    ("CHF", "CHF", "Swiss Franc"),
    ("CNY", "¥", "Chinese Yuan"),
    ("INR", "₹", "Indian Rupee"),
    ("SGD", "S$", "Singapore Dollar"),
];

const FALLBACK_SYMBOL: &str = "₹";

pub fn is_supported(code: &str) -> bool {
    CURRENCIES
        .iter()
        .any(|(known, _, _)| known.eq_ignore_ascii_case(code))
}

/// Symbol for an ISO code; unknown codes fall back to the rupee sign.
pub fn symbol(code: &str) -> &'static str {
    CURRENCIES
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, symbol, _)| *symbol)
        .unwrap_or(FALLBACK_SYMBOL)
}

/// Renders `amount` with the currency symbol, thousands separators and at
/// most two decimals. Non-finite amounts render as zero.
pub fn format_amount(amount: f64, code: &str) -> String {
    let safe = if amount.is_finite() { amount } else { 0.0 };
    let sign = if safe < 0.0 { "-" } else { "" };
    format!("{sign}{}{}", symbol(code), group_thousands(safe.abs()))
}

fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_and_fallback() {
        assert_eq!(symbol("USD"), "$");
        assert_eq!(symbol("sgd"), "S$");
        assert_eq!(symbol("XYZ"), "₹");
        assert!(is_supported("eur"));
        assert!(!is_supported("XYZ"));
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_amount(1234567.5, "USD"), "$1,234,567.5");
        assert_eq!(format_amount(600.0, "INR"), "₹600");
        assert_eq!(format_amount(15.99, "EUR"), "€15.99");
        assert_eq!(format_amount(-42.1, "GBP"), "-£42.1");
        assert_eq!(format_amount(f64::NAN, "USD"), "$0");
        assert_eq!(format_amount(999.999, "USD"), "$1,000");
    }
}
