use crate::item::sanitize_price;

/// Format `amount` with `symbol`, thousands separators and two decimals:
/// `format_price(1234.5, "₹")` is `"₹1,234.50"`. Negative or non-finite
/// amounts format as zero.
pub fn format_price(amount: f64, symbol: &str) -> String {
    let cents = (sanitize_price(amount) * 100.0).round() as u64;
    let whole = group_thousands(&(cents / 100).to_string());
    format!("{}{}.{:02}", symbol, whole, cents % 100)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
