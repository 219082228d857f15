use super::constants::{CO2_FROM_GALLON_GASOLINE_LBS, SOCIAL_COST_CO2_LBS};
use super::types::{Savings, SavingsInputs};

/// Rounds to `decimals` places, ties to even.
///
/// Scales by `10^decimals`, rounds to an integer and scales back, so
/// `round_half_even(0.125, 2)` is `0.12` and `round_half_even(2.5, 0)` is `2.0`.
/// Non-finite values pass through unchanged.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    if decimals == 0 {
        return value.round_ties_even();
    }
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

fn electric_co2_lbs(inputs: &SavingsInputs) -> f64 {
    let co2_lbs_per_kwh = inputs.co2_per_mwh_lbs / 1000.0;
    inputs.kpm * co2_lbs_per_kwh * inputs.annual_miles
}

fn gasoline_co2_lbs(inputs: &SavingsInputs) -> f64 {
    CO2_FROM_GALLON_GASOLINE_LBS * (inputs.annual_miles / inputs.mpg)
}

fn electric_fuel_cost(inputs: &SavingsInputs) -> f64 {
    inputs.cost_per_kwh * inputs.kpm * inputs.annual_miles
}

fn gasoline_fuel_cost(inputs: &SavingsInputs) -> f64 {
    inputs.gas_cost * inputs.annual_miles / inputs.mpg
}

/// Evaluates the yearly CO2 and cost savings of driving electric.
///
/// The emission totals and the fuel cost difference are rounded before they
/// feed `comp_cost`, which is rounded once more. No validation happens here:
/// `mpg == 0.0` yields infinite or NaN fields.
pub fn eval_electric(inputs: &SavingsInputs) -> Savings {
    let co2_total_electric = round_half_even(electric_co2_lbs(inputs), 0);
    let co2_total_gasoline = round_half_even(gasoline_co2_lbs(inputs), 0);
    let co2_lbs_reduction = round_half_even(co2_total_gasoline - co2_total_electric, 0);

    let cost_dollars = round_half_even(
        gasoline_fuel_cost(inputs) - electric_fuel_cost(inputs),
        2,
    );
    let comp_cost = round_half_even(cost_dollars + SOCIAL_COST_CO2_LBS * co2_lbs_reduction, 2);

    Savings {
        co2_total_electric,
        co2_total_gasoline,
        co2_lbs_reduction,
        cost_dollars,
        comp_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridFuel;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_savings(
        savings: &Savings,
        electric: f64,
        gasoline: f64,
        reduction: f64,
        cost: f64,
        comp: f64,
    ) {
        assert_approx(savings.co2_total_electric, electric);
        assert_approx(savings.co2_total_gasoline, gasoline);
        assert_approx(savings.co2_lbs_reduction, reduction);
        assert_approx(savings.cost_dollars, cost);
        assert_approx(savings.comp_cost, comp);
    }

    fn sample_inputs() -> SavingsInputs {
        SavingsInputs::default()
    }

    #[test]
    fn reference_averages_match_known_savings() {
        let savings = eval_electric(&sample_inputs());
        assert_savings(&savings, 3974.0, 7334.0, 3360.0, 570.13, 859.70);
    }

    #[test]
    fn less_efficient_gasoline_car_saves_more() {
        let mut inputs = sample_inputs();
        inputs.mpg = 25.0;

        let savings = eval_electric(&inputs);
        assert_savings(&savings, 3974.0, 10561.0, 6587.0, 1138.37, 1706.05);
    }

    #[test]
    fn repeated_evaluation_is_bit_identical() {
        let mut inputs = sample_inputs();
        inputs.mpg = 27.3;
        inputs.cost_per_kwh = 0.2113;

        let first = eval_electric(&inputs);
        let second = eval_electric(&inputs);
        assert_eq!(first.co2_total_electric.to_bits(), second.co2_total_electric.to_bits());
        assert_eq!(first.co2_total_gasoline.to_bits(), second.co2_total_gasoline.to_bits());
        assert_eq!(first.co2_lbs_reduction.to_bits(), second.co2_lbs_reduction.to_bits());
        assert_eq!(first.cost_dollars.to_bits(), second.cost_dollars.to_bits());
        assert_eq!(first.comp_cost.to_bits(), second.comp_cost.to_bits());
    }

    #[test]
    fn zero_miles_yields_zero_savings() {
        let mut inputs = sample_inputs();
        inputs.annual_miles = 0.0;

        let savings = eval_electric(&inputs);
        assert_savings(&savings, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    #[test]
    fn zero_mpg_propagates_infinity() {
        let mut inputs = sample_inputs();
        inputs.mpg = 0.0;

        let savings = eval_electric(&inputs);
        assert!(savings.co2_total_gasoline.is_infinite());
        assert!(savings.co2_lbs_reduction.is_infinite());
        assert!(savings.cost_dollars.is_infinite());
        assert!(savings.comp_cost.is_infinite());
        assert_approx(savings.co2_total_electric, 3974.0);
    }

    #[test]
    fn zero_mpg_and_zero_miles_propagates_nan() {
        let mut inputs = sample_inputs();
        inputs.mpg = 0.0;
        inputs.annual_miles = 0.0;

        let savings = eval_electric(&inputs);
        assert!(savings.co2_total_gasoline.is_nan());
        assert!(savings.comp_cost.is_nan());
    }

    #[test]
    fn comp_cost_combines_already_rounded_figures() {
        // 1.5 lbs electric rounds up to 2, 0.1547 dollars rounds to 0.15.
        let inputs = SavingsInputs {
            mpg: 1e9,
            annual_miles: 1.0,
            gas_cost: 3.45,
            kpm: 1.0,
            cost_per_kwh: 0.1547,
            co2_per_mwh_lbs: 1500.0,
        };

        let savings = eval_electric(&inputs);
        assert_approx(savings.co2_total_electric, 2.0);
        assert_approx(savings.co2_total_gasoline, 0.0);
        assert_approx(savings.co2_lbs_reduction, -2.0);
        assert_approx(savings.cost_dollars, -0.15);
        assert_approx(savings.comp_cost, -0.32);

        let two_stage = round_half_even(
            savings.cost_dollars + SOCIAL_COST_CO2_LBS * savings.co2_lbs_reduction,
            2,
        );
        assert_eq!(savings.comp_cost.to_bits(), two_stage.to_bits());

        let raw_reduction = gasoline_co2_lbs(&inputs) - electric_co2_lbs(&inputs);
        let raw_cost = gasoline_fuel_cost(&inputs) - electric_fuel_cost(&inputs);
        let single_stage = round_half_even(raw_cost + SOCIAL_COST_CO2_LBS * raw_reduction, 2);
        assert_approx(single_stage, -0.28);
        assert!((single_stage - savings.comp_cost).abs() > 0.01);
    }

    #[test]
    fn emission_totals_round_ties_to_even() {
        let inputs = SavingsInputs {
            mpg: 1e12,
            annual_miles: 1.0,
            gas_cost: 0.0,
            kpm: 1.0,
            cost_per_kwh: 0.0,
            co2_per_mwh_lbs: 2500.0,
        };

        let savings = eval_electric(&inputs);
        assert_approx(savings.co2_total_electric, 2.0);
        assert_approx(savings.co2_lbs_reduction, -2.0);
    }

    #[test]
    fn round_half_even_handles_ties_and_non_finite_values() {
        assert_approx(round_half_even(0.5, 0), 0.0);
        assert_approx(round_half_even(1.5, 0), 2.0);
        assert_approx(round_half_even(-2.5, 0), -2.0);
        assert_approx(round_half_even(0.125, 2), 0.12);
        assert_approx(round_half_even(0.375, 2), 0.38);
        assert_approx(round_half_even(570.1349, 2), 570.13);
        assert!(round_half_even(f64::INFINITY, 2).is_infinite());
        assert!(round_half_even(f64::NAN, 0).is_nan());
    }

    #[test]
    fn clean_grid_only_counts_gasoline_emissions() {
        let mut inputs = sample_inputs();
        inputs.co2_per_mwh_lbs = GridFuel::Wind.co2_per_mwh_lbs();

        let savings = eval_electric(&inputs);
        assert_approx(savings.co2_total_electric, 0.0);
        assert_approx(savings.co2_lbs_reduction, savings.co2_total_gasoline);
    }

    #[test]
    fn coal_grid_is_dirtier_than_average() {
        let mut inputs = sample_inputs();
        inputs.co2_per_mwh_lbs = GridFuel::Coal.co2_per_mwh_lbs();

        let coal = eval_electric(&inputs);
        let average = eval_electric(&sample_inputs());
        assert!(coal.co2_total_electric > average.co2_total_electric);
        assert!(coal.co2_lbs_reduction < average.co2_lbs_reduction);
        assert_approx(coal.cost_dollars, average.cost_dollars);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_higher_mpg_lowers_gasoline_emissions_and_cost(
            mpg in 5u32..80,
            mpg_increase in 1u32..40,
            annual_miles in 1_000u32..40_000,
            gas_cost_cents in 100u32..800,
            kpm_milli in 150u32..500,
            co2_per_mwh in 0u32..2_500
        ) {
            let mut lower = sample_inputs();
            lower.mpg = mpg as f64;
            lower.annual_miles = annual_miles as f64;
            lower.gas_cost = gas_cost_cents as f64 / 100.0;
            lower.kpm = kpm_milli as f64 / 1000.0;
            lower.co2_per_mwh_lbs = co2_per_mwh as f64;

            let mut higher = lower;
            higher.mpg = (mpg + mpg_increase) as f64;

            let lower_savings = eval_electric(&lower);
            let higher_savings = eval_electric(&higher);

            prop_assert!(gasoline_co2_lbs(&higher) < gasoline_co2_lbs(&lower));
            prop_assert!(higher_savings.co2_total_gasoline <= lower_savings.co2_total_gasoline);
            prop_assert!(gasoline_fuel_cost(&higher) < gasoline_fuel_cost(&lower));
            prop_assert!(higher_savings.cost_dollars < lower_savings.cost_dollars);
            prop_assert!(
                (higher_savings.co2_total_electric - lower_savings.co2_total_electric).abs() <= EPS
            );
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_positive_inputs_give_finite_consistent_savings(
            mpg_tenths in 10u32..1_500,
            annual_miles in 0u32..60_000,
            gas_cost_cents in 0u32..1_000,
            kpm_milli in 0u32..1_000,
            kwh_cost_tenth_cents in 0u32..1_000,
            co2_per_mwh in 0u32..3_000
        ) {
            let inputs = SavingsInputs {
                mpg: mpg_tenths as f64 / 10.0,
                annual_miles: annual_miles as f64,
                gas_cost: gas_cost_cents as f64 / 100.0,
                kpm: kpm_milli as f64 / 1000.0,
                cost_per_kwh: kwh_cost_tenth_cents as f64 / 1000.0,
                co2_per_mwh_lbs: co2_per_mwh as f64,
            };

            let savings = eval_electric(&inputs);
            prop_assert!(savings.co2_total_electric.is_finite());
            prop_assert!(savings.co2_total_gasoline.is_finite());
            prop_assert!(savings.comp_cost.is_finite());
            prop_assert!(savings.co2_total_electric >= 0.0);
            prop_assert!(savings.co2_total_gasoline >= 0.0);
            prop_assert!(savings.co2_total_electric.fract() == 0.0);
            prop_assert!(savings.co2_total_gasoline.fract() == 0.0);
            prop_assert!(
                (savings.co2_lbs_reduction
                    - (savings.co2_total_gasoline - savings.co2_total_electric))
                    .abs()
                    <= EPS
            );
            let cents = savings.cost_dollars * 100.0;
            prop_assert!((cents - cents.round()).abs() <= 1e-6);
        }
    }
}
