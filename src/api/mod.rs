use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{ModelError, OlgModel, Params, ProductionFunction, SimSeries};

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct SpendingOverride {
    pub period: usize,
    pub value: f64,
}

fn parse_spending_override(raw: &str) -> Result<SpendingOverride, String> {
    let Some((period, value)) = raw.split_once('=') else {
        return Err(format!("expected PERIOD=VALUE, got '{raw}'"));
    };
    let period = period
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid period '{period}': {e}"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid spending '{value}': {e}"))?;
    Ok(SpendingOverride { period, value })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    sigma: Option<f64>,
    beta: Option<f64>,
    production_function: Option<String>,
    alpha: Option<f64>,
    theta: Option<f64>,
    delta: Option<f64>,
    tau_w: Option<f64>,
    tau_r: Option<f64>,
    k_lag_ini: Option<f64>,
    b_lag_ini: Option<f64>,
    #[serde(alias = "simT")]
    periods: Option<usize>,
    exogenous_spending: Option<Vec<SpendingOverride>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "olg",
    about = "Two-period overlapping-generations economy with taxes and government debt"
)]
struct Cli {
    #[arg(long, default_value_t = 2.0, help = "CRRA coefficient")]
    sigma: f64,
    #[arg(long, default_value_t = 1.0 / 1.40, help = "Discount factor")]
    beta: f64,
    #[arg(long, default_value = "ces", help = "ces or cobb-douglas")]
    production_function: String,
    #[arg(long, default_value_t = 0.30, help = "Capital weight")]
    alpha: f64,
    #[arg(
        long,
        default_value_t = 0.05,
        allow_hyphen_values = true,
        help = "CES substitution parameter"
    )]
    theta: f64,
    #[arg(long, default_value_t = 0.50, help = "Depreciation rate")]
    delta: f64,
    #[arg(long, default_value_t = 0.10, help = "Labor income tax")]
    tau_w: f64,
    #[arg(long, default_value_t = 0.20, help = "Capital income tax")]
    tau_r: f64,
    #[arg(long, default_value_t = 1.0, help = "Initial capital stock")]
    k_lag_ini: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        allow_hyphen_values = true,
        help = "Initial government debt"
    )]
    b_lag_ini: f64,
    #[arg(long, default_value_t = 50, help = "Length of simulation")]
    periods: usize,
    #[arg(
        long = "exogenous-spending",
        value_parser = parse_spending_override,
        help = "Fix government spending in a period instead of balancing the budget, e.g. 10=0.05"
    )]
    exogenous_spending: Vec<SpendingOverride>,
}

#[derive(Debug)]
struct ApiRequest {
    params: Params,
    exogenous_spending: Vec<SpendingOverride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    params: Params,
    elapsed_seconds: f64,
    residual_evaluations: usize,
    saving_rates: Vec<f64>,
    series: SimSeries,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

// A single-period run solves nothing and would report NaN fields as null.
const MIN_PERIODS: usize = 2;

fn build_params(cli: &Cli) -> Result<Params, ModelError> {
    if cli.periods < MIN_PERIODS {
        return Err(ModelError::invalid(
            "periods",
            format!("must be >= {MIN_PERIODS}"),
        ));
    }
    let production_function = cli.production_function.parse::<ProductionFunction>()?;
    let params = Params {
        sigma: cli.sigma,
        beta: cli.beta,
        production_function,
        alpha: cli.alpha,
        theta: cli.theta,
        delta: cli.delta,
        tau_w: cli.tau_w,
        tau_r: cli.tau_r,
        k_lag_ini: cli.k_lag_ini,
        b_lag_ini: cli.b_lag_ini,
        sim_t: cli.periods,
    };
    params.validate()?;
    Ok(params)
}

fn api_request_from_cli(cli: Cli) -> Result<ApiRequest, ModelError> {
    let params = build_params(&cli)?;
    Ok(ApiRequest {
        params,
        exogenous_spending: cli.exogenous_spending,
    })
}

fn run_simulation(request: &ApiRequest) -> Result<SimulateResponse, ModelError> {
    let mut model = OlgModel::new(request.params.clone())?;
    for spending in &request.exogenous_spending {
        model.set_exogenous_spending(spending.period, spending.value)?;
    }
    let report = model.simulate()?;

    Ok(SimulateResponse {
        params: model.par().clone(),
        elapsed_seconds: report.elapsed.as_secs_f64(),
        residual_evaluations: report.residual_evaluations,
        saving_rates: report.saving_rates,
        series: model.sim().clone(),
    })
}

pub fn run_cli<I, T>(args: I) -> Result<String, Box<dyn Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let request = api_request_from_cli(cli)?;
    let response = run_simulation(&request)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("OLG HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let result = api_request_from_payload(payload).and_then(|request| run_simulation(&request));
    match result {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!(error = %err, "simulation request failed");
            error_response(status_for(&err), &err.to_string())
        }
    }
}

fn status_for(err: &ModelError) -> StatusCode {
    if err.is_configuration() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
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
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload).map_err(|e| e.to_string())
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, ModelError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.sigma {
        cli.sigma = v;
    }
    if let Some(v) = payload.beta {
        cli.beta = v;
    }
    if let Some(v) = payload.production_function {
        cli.production_function = v;
    }
    if let Some(v) = payload.alpha {
        cli.alpha = v;
    }
    if let Some(v) = payload.theta {
        cli.theta = v;
    }
    if let Some(v) = payload.delta {
        cli.delta = v;
    }
    if let Some(v) = payload.tau_w {
        cli.tau_w = v;
    }
    if let Some(v) = payload.tau_r {
        cli.tau_r = v;
    }
    if let Some(v) = payload.k_lag_ini {
        cli.k_lag_ini = v;
    }
    if let Some(v) = payload.b_lag_ini {
        cli.b_lag_ini = v;
    }
    if let Some(v) = payload.periods {
        cli.periods = v;
    }
    if let Some(v) = payload.exogenous_spending {
        cli.exogenous_spending = v;
    }

    api_request_from_cli(cli)
}

fn default_cli_for_api() -> Cli {
    let par = Params::default();
    Cli {
        sigma: par.sigma,
        beta: par.beta,
        production_function: par.production_function.to_string(),
        alpha: par.alpha,
        theta: par.theta,
        delta: par.delta,
        tau_w: par.tau_w,
        tau_r: par.tau_r,
        k_lag_ini: par.k_lag_ini,
        b_lag_ini: par.b_lag_ini,
        periods: par.sim_t,
        exogenous_spending: Vec::new(),
    }
}
