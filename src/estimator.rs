//! Rooftop system sizing and savings projection.
//!
//! Every figure is derived from three inputs (monthly bill, tariff and
//! usable roof area) and the fixed yield, cost and subsidy assumptions
//! below. Results are recomputed on demand and never persisted.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolarError};

/// Yearly generation of 1 kW of panels in the service region.
pub const UNITS_PER_KW_PER_YEAR: f64 = 1400.0;
/// Roof footprint needed per installed kW.
pub const SQ_FT_PER_KW: f64 = 10.0;
/// Residential systems are capped at this size.
pub const MAX_RESIDENTIAL_KW: u32 = 10;
/// Installed cost per kW in rupees.
pub const COST_PER_KW: f64 = 55_000.0;
/// Grid emission factor (kg CO2 per unit).
pub const CO2_KG_PER_UNIT: f64 = 0.82;
/// Yearly tariff escalation used for savings projections.
pub const TARIFF_ESCALATION: f64 = 0.05;
/// Panel lifetime used for projections and the payback search.
pub const PROJECTION_YEARS: u32 = 25;
/// Trees needed to absorb one tonne of CO2.
pub const TREES_PER_TONNE_CO2: f64 = 45.0;

/// Subsidy per kW for the first two kW.
pub const SUBSIDY_PER_KW_UP_TO_2: f64 = 30_000.0;
/// Subsidy for the third kW.
pub const SUBSIDY_PER_KW_2_TO_3: f64 = 18_000.0;
/// Scheme cap, reached at 3 kW.
pub const MAX_SUBSIDY: f64 = 78_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInput {
    pub monthly_bill: f64,
    pub electricity_rate: f64,
    pub roof_area_sq_ft: f64,
}

impl CalculatorInput {
    pub fn new(monthly_bill: f64, electricity_rate: f64, roof_area_sq_ft: f64) -> Self {
        Self {
            monthly_bill,
            electricity_rate,
            roof_area_sq_ft,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("monthly bill", self.monthly_bill)?;
        ensure_positive("electricity rate", self.electricity_rate)?;
        ensure_positive("roof area", self.roof_area_sq_ft)?;
        Ok(())
    }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SolarError::invalid(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(SolarError::invalid(field, "must be greater than 0"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorResult {
    pub monthly_units: f64,
    pub yearly_units: f64,
    pub recommended_capacity_kw: u32,
    pub yearly_generation_units: f64,
    pub coverage_percent: u32,
    pub system_cost: f64,
    pub subsidy_amount: f64,
    pub net_cost: f64,
    pub yearly_savings: f64,
    pub total_savings_25_years: f64,
    /// Years until cumulative savings cover the net cost, capped at 25.
    pub payback_years: u32,
    /// False when savings never catch up with the net cost inside the
    /// projection horizon; `payback_years` then reads 25.
    pub payback_within_horizon: bool,
    pub co2_saved_tonnes: f64,
    pub equivalent_trees: u64,
}

impl CalculatorResult {
    pub fn monthly_savings(&self) -> f64 {
        self.yearly_savings / 12.0
    }
}

/// Outcome of the payback search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payback {
    pub years: u32,
    pub within_horizon: bool,
}

/// Government rooftop subsidy for a system of `capacity_kw`.
pub fn subsidy_for(capacity_kw: u32) -> f64 {
    match capacity_kw {
        0 => 0.0,
        1..=2 => f64::from(capacity_kw) * SUBSIDY_PER_KW_UP_TO_2,
        3 => 2.0 * SUBSIDY_PER_KW_UP_TO_2 + f64::from(capacity_kw - 2) * SUBSIDY_PER_KW_2_TO_3,
        _ => MAX_SUBSIDY,
    }
}

/// Savings in year `year` (0-based) after tariff escalation.
pub fn escalated_savings(yearly_savings: f64, year: u32) -> f64 {
    yearly_savings * (1.0 + TARIFF_ESCALATION).powi(year as i32)
}

/// Walk the escalating savings series until it covers `net_cost`.
pub fn payback(yearly_savings: f64, net_cost: f64) -> Payback {
    let mut years = 0;
    let mut cumulative = 0.0;
    while cumulative < net_cost && years < PROJECTION_YEARS {
        cumulative += escalated_savings(yearly_savings, years);
        years += 1;
    }
    Payback {
        years,
        within_horizon: cumulative >= net_cost,
    }
}

pub fn estimate(input: &CalculatorInput) -> Result<CalculatorResult> {
    input.validate()?;

    let monthly_units = input.monthly_bill / input.electricity_rate;
    let yearly_units = monthly_units * 12.0;

    let by_demand = (yearly_units / UNITS_PER_KW_PER_YEAR).ceil();
    let by_area = (input.roof_area_sq_ft / SQ_FT_PER_KW).floor();
    let capacity = by_demand
        .min(by_area)
        .min(f64::from(MAX_RESIDENTIAL_KW))
        .max(1.0) as u32;

    let yearly_generation = f64::from(capacity) * UNITS_PER_KW_PER_YEAR;
    let coverage_percent = (yearly_generation / yearly_units * 100.0).round().min(100.0) as u32;

    let system_cost = f64::from(capacity) * COST_PER_KW;
    let subsidy = subsidy_for(capacity);
    let net_cost = system_cost - subsidy;

    let yearly_savings = yearly_generation.min(yearly_units) * input.electricity_rate;
    let total_savings: f64 = (0..PROJECTION_YEARS)
        .map(|year| escalated_savings(yearly_savings, year))
        .sum();
    let payback = payback(yearly_savings, net_cost);

    let co2_saved_tonnes =
        yearly_generation * CO2_KG_PER_UNIT * f64::from(PROJECTION_YEARS) / 1000.0;
    let equivalent_trees = (co2_saved_tonnes * TREES_PER_TONNE_CO2).round() as u64;

    tracing::debug!(
        capacity_kw = capacity,
        net_cost,
        payback_years = payback.years,
        "estimated rooftop system"
    );

    Ok(CalculatorResult {
        monthly_units,
        yearly_units,
        recommended_capacity_kw: capacity,
        yearly_generation_units: yearly_generation,
        coverage_percent,
        system_cost,
        subsidy_amount: subsidy,
        net_cost,
        yearly_savings,
        total_savings_25_years: total_savings,
        payback_years: payback.years,
        payback_within_horizon: payback.within_horizon,
        co2_saved_tonnes,
        equivalent_trees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn subsidy_bands() {
        assert_eq!(subsidy_for(0), 0.0);
        assert_eq!(subsidy_for(1), 30_000.0);
        assert_eq!(subsidy_for(2), 60_000.0);
        assert_eq!(subsidy_for(3), 78_000.0);
        assert_eq!(subsidy_for(4), 78_000.0);
        assert_eq!(subsidy_for(10), 78_000.0);
    }

    #[test]
    fn typical_household() {
        let result = estimate(&CalculatorInput::new(3000.0, 8.0, 200.0)).unwrap();

        assert!(close(result.monthly_units, 375.0));
        assert!(close(result.yearly_units, 4500.0));
        assert_eq!(result.recommended_capacity_kw, 4);
        assert!(close(result.yearly_generation_units, 5600.0));
        assert_eq!(result.coverage_percent, 100);
        assert_eq!(result.system_cost, 220_000.0);
        assert_eq!(result.subsidy_amount, 78_000.0);
        assert_eq!(result.net_cost, 142_000.0);
        assert!(close(result.yearly_savings, 36_000.0));
        assert_eq!(result.payback_years, 4);
        assert!(result.payback_within_horizon);
        assert!(close(result.co2_saved_tonnes, 114.8));
        assert_eq!(result.equivalent_trees, 5166);
        assert!((result.total_savings_25_years - 1_718_175.6).abs() < 1.0);
    }

    #[test]
    fn roof_area_limits_capacity() {
        let result = estimate(&CalculatorInput::new(10_000.0, 8.0, 30.0)).unwrap();
        assert_eq!(result.recommended_capacity_kw, 3);
        assert_eq!(result.subsidy_amount, 78_000.0);
        assert!(result.coverage_percent < 100);
    }

    #[test]
    fn capacity_is_capped_and_floored() {
        let big = estimate(&CalculatorInput::new(100_000.0, 8.0, 5000.0)).unwrap();
        assert_eq!(big.recommended_capacity_kw, MAX_RESIDENTIAL_KW);

        let tiny_roof = estimate(&CalculatorInput::new(3000.0, 8.0, 5.0)).unwrap();
        assert_eq!(tiny_roof.recommended_capacity_kw, 1);
        assert_eq!(tiny_roof.subsidy_amount, 30_000.0);
    }

    #[test]
    fn payback_outside_horizon_is_flagged() {
        let p = payback(100.0, 1_000_000.0);
        assert_eq!(p.years, PROJECTION_YEARS);
        assert!(!p.within_horizon);
    }

    #[test]
    fn payback_with_nothing_to_recover() {
        let p = payback(36_000.0, 0.0);
        assert_eq!(p.years, 0);
        assert!(p.within_horizon);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let err = estimate(&CalculatorInput::new(3000.0, 0.0, 200.0)).unwrap_err();
        assert!(err.to_string().contains("electricity rate"));

        assert!(estimate(&CalculatorInput::new(-1.0, 8.0, 200.0)).is_err());
        assert!(estimate(&CalculatorInput::new(3000.0, 8.0, f64::NAN)).is_err());
    }
}
