/// Pounds in one metric ton.
pub const POUNDS_PER_METRIC_TON: f64 = 2204.6226218;

/// Social cost of carbon per metric ton of CO2 (middle value of the 2022 EPA proposal).
pub const SOCIAL_COST_CO2_METRIC_TON: f64 = 190.00;
pub const SOCIAL_COST_CO2_LBS: f64 = SOCIAL_COST_CO2_METRIC_TON / POUNDS_PER_METRIC_TON;

/// CO2 released by burning one gallon of gasoline (EPA equivalencies calculator).
pub const CO2_FROM_GALLON_GASOLINE_METRIC_TONS: f64 = 0.008887;
pub const CO2_FROM_GALLON_GASOLINE_LBS: f64 =
    CO2_FROM_GALLON_GASOLINE_METRIC_TONS * POUNDS_PER_METRIC_TON;

/// U.S. averages used whenever a caller leaves an input unset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReferenceAverages {
    pub mpg: f64,
    pub annual_miles: f64,
    pub gas_cost: f64,
    pub kpm: f64,
    pub cost_per_kwh: f64,
    pub co2_per_mwh_lbs: f64,
}

pub const REFERENCE_AVERAGES: ReferenceAverages = ReferenceAverages {
    mpg: 36.0,
    annual_miles: 13_476.0,
    gas_cost: 3.45,
    kpm: 0.346,
    cost_per_kwh: 0.1547,
    co2_per_mwh_lbs: 852.3,
};
