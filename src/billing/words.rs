use crate::error::{Result, SolarError};

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const THOUSAND: u64 = 1_000;
const LAKH: u64 = 100_000;
const CRORE: u64 = 10_000_000;

/// Spell a rupee amount using the Indian scale, e.g.
/// `150000` -> "One Lakh Fifty Thousand Rupees Only".
///
/// Paise are not spelled; the amount is rounded to whole rupees first.
pub fn number_to_words(amount: f64) -> Result<String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(SolarError::invalid(
            "amount",
            format!("{amount} cannot be written in words"),
        ));
    }
    let rupees = amount.round();
    // u64::MAX as f64 rounds up to 2^64, which is already out of range.
    if rupees >= u64::MAX as f64 {
        return Err(SolarError::invalid(
            "amount",
            format!("{amount} is too large to write in words"),
        ));
    }
    Ok(rupees_in_words(rupees as u64))
}

pub fn rupees_in_words(rupees: u64) -> String {
    if rupees == 0 {
        return "Zero Rupees Only".to_string();
    }
    format!("{} Rupees Only", spell(rupees))
}

fn spell(n: u64) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                ones => format!("{} {}", tens, ONES[ones as usize]),
            }
        }
        100..=999 => {
            let head = format!("{} Hundred", ONES[(n / 100) as usize]);
            match n % 100 {
                0 => head,
                rest => format!("{head} and {}", spell(rest)),
            }
        }
        _ if n < LAKH => scaled(n, THOUSAND, "Thousand"),
        _ if n < CRORE => scaled(n, LAKH, "Lakh"),
        _ => scaled(n, CRORE, "Crore"),
    }
}

fn scaled(n: u64, unit: u64, label: &str) -> String {
    let head = format!("{} {label}", spell(n / unit));
    match n % unit {
        0 => head,
        rest => format!("{head} {}", spell(rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: f64) -> String {
        number_to_words(n).unwrap()
    }

    #[test]
    fn zero() {
        assert_eq!(words(0.0), "Zero Rupees Only");
    }

    #[test]
    fn small_numbers() {
        assert_eq!(words(7.0), "Seven Rupees Only");
        assert_eq!(words(19.0), "Nineteen Rupees Only");
        assert_eq!(words(40.0), "Forty Rupees Only");
        assert_eq!(words(99.0), "Ninety Nine Rupees Only");
    }

    #[test]
    fn hundreds_use_and() {
        assert_eq!(words(100.0), "One Hundred Rupees Only");
        assert_eq!(words(305.0), "Three Hundred and Five Rupees Only");
    }

    #[test]
    fn indian_scale() {
        assert_eq!(words(100_000.0), "One Lakh Rupees Only");
        assert!(words(150_000.0).contains("One Lakh Fifty Thousand"));
        assert_eq!(
            words(43_660.0),
            "Forty Three Thousand Six Hundred and Sixty Rupees Only"
        );
        assert_eq!(
            words(12_345_678.0),
            "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred and Seventy Eight Rupees Only"
        );
        assert_eq!(words(20_000_000.0), "Two Crore Rupees Only");
    }

    #[test]
    fn paise_are_rounded() {
        assert_eq!(words(999.6), "One Thousand Rupees Only");
        assert_eq!(words(10.4), "Ten Rupees Only");
    }

    #[test]
    fn negative_is_rejected() {
        assert!(number_to_words(-1.0).is_err());
        assert!(number_to_words(f64::INFINITY).is_err());
    }

    #[test]
    fn amounts_beyond_u64_are_rejected() {
        assert!(number_to_words(1e20).is_err());
        assert!(number_to_words(1e25).is_err());
        assert!(number_to_words(f64::INFINITY).is_err());
        assert!(number_to_words(1e18).is_ok());
    }
}
