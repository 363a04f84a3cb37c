/// 金额格式化：千分位、两位小数，`format_currency(-1234.5, "$") == "-$1,234.50"`
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if !amount.is_finite() {
        return format!("{symbol}0.00");
    }
    let text = format!("{:.2}", amount.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    // -0.001 之类四舍五入后为0，不显示负号
    let negative = amount < 0.0 && text.chars().any(|c| c != '0' && c != '.');
    format!("{}{symbol}{grouped}.{frac}", if negative { "-" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_currency(0.0, "$"), "$0.00");
        assert_eq!(format_currency(999.999, "$"), "$1,000.00");
        assert_eq!(format_currency(1234.5, "$"), "$1,234.50");
        assert_eq!(format_currency(1234567.891, "€"), "€1,234,567.89");
        assert_eq!(format_currency(100.0, ""), "100.00");
    }

    #[test]
    fn negatives_and_edge_cases() {
        assert_eq!(format_currency(-3.5, "$"), "-$3.50");
        assert_eq!(format_currency(-0.001, "$"), "$0.00");
        assert_eq!(format_currency(f64::NAN, "$"), "$0.00");
    }
}
