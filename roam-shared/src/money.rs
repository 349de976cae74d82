use std::fmt::Write;

/// Format a whole-rupee amount with Indian digit grouping: the last three
/// digits, then groups of two. `39000` renders as `₹39,000`, `1234567` as
/// `₹12,34,567`.
pub fn format_inr(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::new();
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    let _ = write!(out, "₹{grouped}");
    out
}

/// Format a gateway amount expressed in paise as rupees.
pub fn format_inr_subunits(amount_paise: i64) -> String {
    format_inr(amount_paise / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_like_en_in() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(950), "₹950");
        assert_eq!(format_inr(19500), "₹19,500");
        assert_eq!(format_inr(39000), "₹39,000");
        assert_eq!(format_inr(123456), "₹1,23,456");
        assert_eq!(format_inr(1234567), "₹12,34,567");
    }

    #[test]
    fn subunits_drop_paise() {
        assert_eq!(format_inr_subunits(3900000), "₹39,000");
    }
}
