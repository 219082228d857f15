use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::constants::REFERENCE_AVERAGES;
use crate::core::{GridFuel, Savings, SavingsInputs, eval_electric};

mod summary;

pub use summary::{ChartBar, ChartData, chart_data, format_count, format_dollars, summary_lines};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGridFuel {
    Solar,
    Petroleum,
    Hydro,
    NaturalGas,
    Coal,
    Wind,
}

impl From<CliGridFuel> for GridFuel {
    fn from(value: CliGridFuel) -> Self {
        match value {
            CliGridFuel::Solar => GridFuel::Solar,
            CliGridFuel::Petroleum => GridFuel::Petroleum,
            CliGridFuel::Hydro => GridFuel::Hydro,
            CliGridFuel::NaturalGas => GridFuel::NaturalGas,
            CliGridFuel::Coal => GridFuel::Coal,
            CliGridFuel::Wind => GridFuel::Wind,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGridFuel {
    Solar,
    Petroleum,
    Hydro,
    #[serde(alias = "naturalGas", alias = "natural_gas", alias = "Natural gas")]
    NaturalGas,
    Coal,
    Wind,
}

impl From<ApiGridFuel> for CliGridFuel {
    fn from(value: ApiGridFuel) -> Self {
        match value {
            ApiGridFuel::Solar => CliGridFuel::Solar,
            ApiGridFuel::Petroleum => CliGridFuel::Petroleum,
            ApiGridFuel::Hydro => CliGridFuel::Hydro,
            ApiGridFuel::NaturalGas => CliGridFuel::NaturalGas,
            ApiGridFuel::Coal => CliGridFuel::Coal,
            ApiGridFuel::Wind => CliGridFuel::Wind,
        }
    }
}

/// A numeric field as typed into the dashboard: either a JSON number or text
/// such as `"$3.45"` or `"13,476"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ApiAmount {
    Number(f64),
    Text(String),
}

impl ApiAmount {
    fn resolve(&self, key: &str) -> Result<f64, String> {
        match self {
            ApiAmount::Number(value) => Ok(*value),
            ApiAmount::Text(text) => parse_amount(text).map_err(|e| format!("{key}: {e}")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EstimatePayload {
    mpg: Option<ApiAmount>,
    annual_miles: Option<ApiAmount>,
    gas_cost: Option<ApiAmount>,
    kpm: Option<ApiAmount>,
    cost_per_kwh: Option<ApiAmount>,
    co2_per_mwh_lbs: Option<ApiAmount>,
    grid_fuel: Option<ApiGridFuel>,
}

#[derive(Parser, Debug)]
#[command(
    name = "estimate",
    allow_negative_numbers = true,
    about = "Yearly CO2 and fuel cost savings of switching from a gasoline car to an electric car"
)]
struct Cli {
    #[arg(
        long,
        default_value_t = REFERENCE_AVERAGES.mpg,
        value_parser = parse_amount,
        help = "Miles per gallon of the gasoline car"
    )]
    mpg: f64,
    #[arg(
        long,
        default_value_t = REFERENCE_AVERAGES.annual_miles,
        value_parser = parse_amount,
        help = "Miles driven per year, e.g. 13,476"
    )]
    annual_miles: f64,
    #[arg(
        long,
        default_value_t = REFERENCE_AVERAGES.gas_cost,
        value_parser = parse_amount,
        help = "Cost of one gallon of gasoline, e.g. $3.45"
    )]
    gas_cost: f64,
    #[arg(
        long,
        default_value_t = REFERENCE_AVERAGES.kpm,
        value_parser = parse_amount,
        help = "Kilowatt-hours per mile of the electric car"
    )]
    kpm: f64,
    #[arg(
        long,
        default_value_t = REFERENCE_AVERAGES.cost_per_kwh,
        value_parser = parse_amount,
        help = "Cost of one kWh of electricity"
    )]
    cost_per_kwh: f64,
    #[arg(
        long,
        value_parser = parse_amount,
        help = "Pounds of CO2 emitted per MWh on the grid; defaults to --grid-fuel or the U.S. average (852.3)"
    )]
    co2_per_mwh_lbs: Option<f64>,
    #[arg(
        long,
        value_enum,
        help = "Derive the grid intensity from a single generation fuel"
    )]
    grid_fuel: Option<CliGridFuel>,
    #[arg(long, help = "Print the full JSON response instead of the summary")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    inputs: SavingsInputs,
    savings: Savings,
    summary: Vec<String>,
    chart: ChartData,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Parses a user-typed amount, ignoring `$` signs, thousands separators and
/// surrounding whitespace.
pub fn parse_amount(text: &str) -> Result<f64, String> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("invalid amount '{text}'"))
}

/// Names used to report an invalid input back to whoever supplied it.
struct InputLabels {
    mpg: &'static str,
    annual_miles: &'static str,
    gas_cost: &'static str,
    kpm: &'static str,
    cost_per_kwh: &'static str,
    co2_per_mwh_lbs: &'static str,
}

const CLI_LABELS: InputLabels = InputLabels {
    mpg: "--mpg",
    annual_miles: "--annual-miles",
    gas_cost: "--gas-cost",
    kpm: "--kpm",
    cost_per_kwh: "--cost-per-kwh",
    co2_per_mwh_lbs: "--co2-per-mwh-lbs",
};

const API_LABELS: InputLabels = InputLabels {
    mpg: "mpg",
    annual_miles: "annualMiles",
    gas_cost: "gasCost",
    kpm: "kpm",
    cost_per_kwh: "costPerKwh",
    co2_per_mwh_lbs: "co2PerMwhLbs",
};

fn build_inputs(cli: &Cli, labels: &InputLabels) -> Result<SavingsInputs, String> {
    let co2_per_mwh_lbs = match (cli.co2_per_mwh_lbs, cli.grid_fuel) {
        (Some(value), _) => value,
        (None, Some(fuel)) => GridFuel::from(fuel).co2_per_mwh_lbs(),
        (None, None) => REFERENCE_AVERAGES.co2_per_mwh_lbs,
    };

    let inputs = SavingsInputs {
        mpg: cli.mpg,
        annual_miles: cli.annual_miles,
        gas_cost: cli.gas_cost,
        kpm: cli.kpm,
        cost_per_kwh: cli.cost_per_kwh,
        co2_per_mwh_lbs,
    };

    for (name, value) in [
        (labels.mpg, inputs.mpg),
        (labels.annual_miles, inputs.annual_miles),
        (labels.gas_cost, inputs.gas_cost),
        (labels.kpm, inputs.kpm),
        (labels.cost_per_kwh, inputs.cost_per_kwh),
        (labels.co2_per_mwh_lbs, inputs.co2_per_mwh_lbs),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if inputs.mpg <= 0.0 {
        return Err(format!("{} must be > 0", labels.mpg));
    }

    for (name, value) in [
        (labels.annual_miles, inputs.annual_miles),
        (labels.gas_cost, inputs.gas_cost),
        (labels.kpm, inputs.kpm),
        (labels.cost_per_kwh, inputs.cost_per_kwh),
        (labels.co2_per_mwh_lbs, inputs.co2_per_mwh_lbs),
    ] {
        if value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    Ok(inputs)
}

/// Runs the one-shot estimator; `args[0]` is the subcommand name.
///
/// `--help` and `--version` print and exit; every other flag error is returned.
pub fn run_estimate<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let rendered = e.to_string();
            return Err(rendered
                .trim_end()
                .trim_start_matches("error: ")
                .to_string());
        }
    };
    let inputs = build_inputs(&cli, &CLI_LABELS)?;
    let response = build_estimate_response(inputs, eval_electric(&inputs));
    if cli.json {
        serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to encode JSON: {e}"))
    } else {
        Ok(response.summary.join("\n"))
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/estimate",
            get(estimate_get_handler).post(estimate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("EV savings HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn estimate_get_handler(
    payload: Result<Query<EstimatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => estimate_handler_impl(payload),
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

async fn estimate_post_handler(
    payload: Result<Json<EstimatePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => estimate_handler_impl(payload),
        Err(rejection) => rejected_payload_response(&rejection.body_text()),
    }
}

fn rejected_payload_response(msg: &str) -> Response {
    log::warn!("Rejected estimate payload: {msg}");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn estimate_handler_impl(payload: EstimatePayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            log::warn!("Rejected estimate request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let savings = eval_electric(&inputs);
    log::info!(
        "Estimated mpg={} annual_miles={} co2_per_mwh_lbs={}: co2_lbs_reduction={} comp_cost={}",
        inputs.mpg,
        inputs.annual_miles,
        inputs.co2_per_mwh_lbs,
        savings.co2_lbs_reduction,
        savings.comp_cost
    );
    json_response(StatusCode::OK, build_estimate_response(inputs, savings))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<SavingsInputs, String> {
    let payload = serde_json::from_str::<EstimatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: EstimatePayload) -> Result<SavingsInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = &payload.mpg {
        cli.mpg = v.resolve("mpg")?;
    }
    if let Some(v) = &payload.annual_miles {
        cli.annual_miles = v.resolve("annualMiles")?;
    }
    if let Some(v) = &payload.gas_cost {
        cli.gas_cost = v.resolve("gasCost")?;
    }
    if let Some(v) = &payload.kpm {
        cli.kpm = v.resolve("kpm")?;
    }
    if let Some(v) = &payload.cost_per_kwh {
        cli.cost_per_kwh = v.resolve("costPerKwh")?;
    }
    if let Some(v) = &payload.co2_per_mwh_lbs {
        cli.co2_per_mwh_lbs = Some(v.resolve("co2PerMwhLbs")?);
    }
    if let Some(v) = payload.grid_fuel {
        cli.grid_fuel = Some(v.into());
    }

    build_inputs(&cli, &API_LABELS)
}

fn default_cli_for_api() -> Cli {
    Cli {
        mpg: REFERENCE_AVERAGES.mpg,
        annual_miles: REFERENCE_AVERAGES.annual_miles,
        gas_cost: REFERENCE_AVERAGES.gas_cost,
        kpm: REFERENCE_AVERAGES.kpm,
        cost_per_kwh: REFERENCE_AVERAGES.cost_per_kwh,
        co2_per_mwh_lbs: None,
        grid_fuel: None,
        json: false,
    }
}

fn build_estimate_response(inputs: SavingsInputs, savings: Savings) -> EstimateResponse {
    EstimateResponse {
        inputs,
        summary: summary_lines(&savings),
        chart: chart_data(&savings),
        savings,
    }
}
