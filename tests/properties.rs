//! Property-based tests for the estimator and the invoice arithmetic.

use proptest::prelude::*;
use solarbook::billing::{
    compute_invoice_totals, generate_invoice_number, number_to_words, parse_invoice_number,
    random_invoice_number, InvoiceItem,
};
use solarbook::estimator::{estimate, payback, subsidy_for, CalculatorInput, MAX_SUBSIDY};

fn input() -> impl Strategy<Value = CalculatorInput> {
    (100.0f64..50_000.0, 2.0f64..15.0, 10.0f64..2_000.0)
        .prop_map(|(bill, rate, roof)| CalculatorInput::new(bill, rate, roof))
}

fn line() -> impl Strategy<Value = InvoiceItem> {
    (1u32..50, 0u32..200_000).prop_map(|(qty, rate)| {
        InvoiceItem::new("Line", "998314", f64::from(qty), f64::from(rate)).unwrap()
    })
}

proptest! {
    #[test]
    fn net_cost_is_cost_minus_subsidy(input in input()) {
        let result = estimate(&input).unwrap();
        prop_assert_eq!(result.net_cost, result.system_cost - result.subsidy_amount);
        prop_assert!(result.subsidy_amount <= MAX_SUBSIDY);
        prop_assert_eq!(result.subsidy_amount, subsidy_for(result.recommended_capacity_kw));
    }

    #[test]
    fn capacity_and_coverage_stay_in_range(input in input()) {
        let result = estimate(&input).unwrap();
        prop_assert!((1..=10).contains(&result.recommended_capacity_kw));
        prop_assert!(result.coverage_percent <= 100);
        prop_assert!(result.payback_years <= 25);
    }

    #[test]
    fn payback_never_shrinks_as_cost_rises(
        savings in 1_000.0f64..200_000.0,
        cost in 0.0f64..2_000_000.0,
        extra in 0.0f64..500_000.0,
    ) {
        prop_assert!(payback(savings, cost).years <= payback(savings, cost + extra).years);
    }

    #[test]
    fn gst_halves_match_and_add_up(items in prop::collection::vec(line(), 0..8)) {
        let totals = compute_invoice_totals(&items);
        prop_assert_eq!(totals.cgst, totals.sgst);
        prop_assert_eq!(totals.total, totals.subtotal + totals.cgst + totals.sgst);
    }

    #[test]
    fn words_always_end_in_rupees_only(amount in 0u32..1_000_000_000) {
        let words = number_to_words(f64::from(amount)).unwrap();
        prop_assert!(words.ends_with(" Rupees Only"));
        prop_assert!(!words.contains("  "));
    }

    #[test]
    fn random_numbers_are_well_formed(seed in any::<u64>(), year in 2000i32..2100) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let number = random_invoice_number(&mut rng, year);
        let (parsed_year, seq) = parse_invoice_number(&number).unwrap();
        prop_assert_eq!(parsed_year, year);
        prop_assert!((1..=9999).contains(&seq));
    }
}

#[test]
fn generated_number_matches_pattern() {
    let number = generate_invoice_number();
    assert_eq!(number.len(), "RS-2026-0001".len());
    assert!(number.starts_with("RS-"));
    assert!(parse_invoice_number(&number).is_some());
}
