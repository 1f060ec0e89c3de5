//! Number formatting for narrative text and chart axes.

use rust_decimal::Decimal;

/// Insert `,` between groups of three digits.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format money as `$1,234.56` with the given number of decimals.
pub fn format_currency(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals).abs().to_string();
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut out = String::new();
    if value.is_sign_negative() && !value.round_dp(decimals).is_zero() {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(whole));

    if decimals > 0 {
        out.push('.');
        let width = decimals as usize;
        out.push_str(&format!("{:0<width$}", fraction));
    }
    out
}

/// Axis tick label for a revenue value, whole dollars.
pub fn format_axis_currency(value: f64) -> String {
    let whole = format!("{:.0}", value.abs());
    let sign = if value < -0.5 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(&whole))
}

/// Format a count with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}
