//! Display helpers for money, percentages and scores.

pub const CURRENCY_SYMBOL: &str = "₹";

/// Renders an amount with `en-IN` digit grouping and two decimals.
///
/// Missing and non-finite values render as zero.
pub fn format_currency(value: impl Into<Option<f64>>) -> String {
    let value = value.into().filter(|v| v.is_finite()).unwrap_or(0.0);
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, CURRENCY_SYMBOL, group_lakh(whole), fraction)
}

// Last three digits form a group, everything above groups by two.
fn group_lakh(digits: &str) -> String {
    let (head, tail) = digits.split_at(digits.len().saturating_sub(3));
    if head.is_empty() {
        return tail.to_string();
    }
    let s = head.chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    let head: String = out.into_iter().rev().collect();
    format!("{},{}", head, tail)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", if value.is_finite() { value } else { 0.0 })
}

/// Scores print without a trailing `.0` when they are whole numbers.
pub fn format_score(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_nan_render_as_zero() {
        assert_eq!(format_currency(None::<f64>), format_currency(0.0));
        assert_eq!(format_currency(f64::NAN), "₹0.00");
    }

    #[test]
    fn groups_digits_the_indian_way() {
        assert_eq!(format_currency(1234567.8), "₹12,34,567.80");
        assert_eq!(format_currency(10000.0), "₹10,000.00");
        assert_eq!(format_currency(999.0), "₹999.00");
        assert_eq!(format_currency(123456789.126), "₹12,34,56,789.13");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(format_currency(-2000.0), "-₹2,000.00");
        assert_eq!(format_currency(-0.001), "₹0.00");
    }

    #[test]
    fn preserves_order_for_same_sign() {
        let values = [0.0, 0.5, 9.99, 1000.0, 100000.0, 2500000.75];
        let parsed: Vec<f64> = values
            .iter()
            .map(|v| {
                format_currency(*v)
                    .trim_start_matches(CURRENCY_SYMBOL)
                    .replace(',', "")
                    .parse::<f64>()
                    .unwrap()
            })
            .collect();
        assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn scores_and_percents() {
        assert_eq!(format_score(55.0), "55");
        assert_eq!(format_score(55.5), "55.5");
        assert_eq!(format_percent(20.0), "20.0%");
        assert_eq!(round1(33.333), 33.3);
    }
}
