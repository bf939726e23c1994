//! Indian-style number formatting: digits grouped as 1,50,000 (last three,
//! then pairs), with a compact Lakh form for large amounts.

const LAKH: f64 = 100_000.0;

/// Group the digits of a whole number the Indian way.
pub fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

/// Round to the nearest whole number and group, e.g. unit counts.
pub fn format_number(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}", group_indian(rounded.abs() as u64))
}

/// Currency amount: `₹1,50,000`, or `₹1,234.50` when paise are present.
pub fn format_money(amount: f64, symbol: &str) -> String {
    let paise_total = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && paise_total > 0 { "-" } else { "" };
    let (rupees, paise) = (paise_total / 100, paise_total % 100);
    if paise == 0 {
        format!("{sign}{symbol}{}", group_indian(rupees))
    } else {
        format!("{sign}{symbol}{}.{paise:02}", group_indian(rupees))
    }
}

/// Currency amount with both paise digits always shown (invoice columns).
pub fn format_money_exact(amount: f64, symbol: &str) -> String {
    let paise_total = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && paise_total > 0 { "-" } else { "" };
    format!(
        "{sign}{symbol}{}.{:02}",
        group_indian(paise_total / 100),
        paise_total % 100
    )
}

/// Amounts of a lakh or more as `₹1.4 Lakh`; smaller ones as [`format_money`].
pub fn format_compact(amount: f64, symbol: &str) -> String {
    if amount.abs() >= LAKH {
        format!("{symbol}{:.1} Lakh", amount / LAKH)
    } else {
        format_money(amount, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indian_grouping() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(1_000), "1,000");
        assert_eq!(group_indian(78_000), "78,000");
        assert_eq!(group_indian(150_000), "1,50,000");
        assert_eq!(group_indian(12_345_678), "1,23,45,678");
    }

    #[test]
    fn money() {
        assert_eq!(format_money(150_000.0, "₹"), "₹1,50,000");
        assert_eq!(format_money(1_234.5, "₹"), "₹1,234.50");
        assert_eq!(format_money(-500.0, "₹"), "-₹500");
        assert_eq!(format_money_exact(43_660.0, "₹"), "₹43,660.00");
    }

    #[test]
    fn compact() {
        assert_eq!(format_compact(142_000.0, "₹"), "₹1.4 Lakh");
        assert_eq!(format_compact(78_000.0, "₹"), "₹78,000");
        assert_eq!(format_number(5_600.4), "5,600");
    }
}
