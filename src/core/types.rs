use serde::Serialize;

use super::constants::REFERENCE_AVERAGES;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GridFuel {
    Solar,
    Petroleum,
    Hydro,
    NaturalGas,
    Coal,
    Wind,
}

impl GridFuel {
    /// Pounds of CO2 emitted per kWh generated (EIA FAQ 74).
    pub fn co2_lbs_per_kwh(self) -> f64 {
        match self {
            GridFuel::Solar | GridFuel::Hydro | GridFuel::Wind => 0.0,
            GridFuel::Petroleum => 2.44,
            GridFuel::NaturalGas => 0.97,
            GridFuel::Coal => 2.26,
        }
    }

    pub fn co2_per_mwh_lbs(self) -> f64 {
        self.co2_lbs_per_kwh() * 1000.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsInputs {
    pub mpg: f64,
    pub annual_miles: f64,
    pub gas_cost: f64,
    pub kpm: f64,
    pub cost_per_kwh: f64,
    pub co2_per_mwh_lbs: f64,
}

impl Default for SavingsInputs {
    fn default() -> Self {
        let averages = REFERENCE_AVERAGES;
        Self {
            mpg: averages.mpg,
            annual_miles: averages.annual_miles,
            gas_cost: averages.gas_cost,
            kpm: averages.kpm,
            cost_per_kwh: averages.cost_per_kwh,
            co2_per_mwh_lbs: averages.co2_per_mwh_lbs,
        }
    }
}

/// Yearly savings of an electric car over a gasoline one.
///
/// Serialized keys match the dashboard's historical result record.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Savings {
    #[serde(rename = "CO2_total_electric")]
    pub co2_total_electric: f64,
    #[serde(rename = "CO2_total_gasoline")]
    pub co2_total_gasoline: f64,
    pub co2_lbs_reduction: f64,
    pub cost_dollars: f64,
    pub comp_cost: f64,
}
