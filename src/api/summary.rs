use serde::Serialize;

use crate::core::Savings;

const PROJECTION_YEARS: f64 = 10.0;
const CHART_TITLE: &str = "Pounds of CO2 Emitted Per Year";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub label: String,
    pub co2_lbs: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub bars: Vec<ChartBar>,
}

/// Formats `value` with `decimals` places and comma thousands separators.
fn with_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let negative = value < 0.0 && formatted.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

pub fn format_count(value: f64) -> String {
    with_thousands(value, 0)
}

/// `-$1,234.50` style currency text.
pub fn format_dollars(value: f64) -> String {
    let grouped = with_thousands(value, 2);
    match grouped.strip_prefix('-') {
        Some(magnitude) => format!("-${magnitude}"),
        None => format!("${grouped}"),
    }
}

pub fn summary_lines(savings: &Savings) -> Vec<String> {
    vec![
        format!(
            "CO2 Reduced: {} lbs/year",
            format_count(savings.co2_lbs_reduction)
        ),
        format!("Savings: {}/year", format_dollars(savings.cost_dollars)),
        format!(
            "Including the social cost of carbon you would save {} per year.",
            format_dollars(savings.comp_cost)
        ),
        format!(
            "Over 10 years you would save {} and {} pounds of CO2.",
            format_dollars(savings.comp_cost * PROJECTION_YEARS),
            format_count(savings.co2_lbs_reduction * PROJECTION_YEARS)
        ),
    ]
}

pub fn chart_data(savings: &Savings) -> ChartData {
    ChartData {
        title: CHART_TITLE.to_string(),
        bars: vec![
            ChartBar {
                label: "Gasoline car".to_string(),
                co2_lbs: savings.co2_total_gasoline,
            },
            ChartBar {
                label: "Electric car".to_string(),
                co2_lbs: savings.co2_total_electric,
            },
        ],
    }
}
