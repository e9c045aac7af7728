use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use super::error::ModelError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductionFunction {
    Ces,
    CobbDouglas,
}

impl ProductionFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductionFunction::Ces => "ces",
            ProductionFunction::CobbDouglas => "cobb-douglas",
        }
    }
}

impl fmt::Display for ProductionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionFunction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ces" => Ok(ProductionFunction::Ces),
            "cobb-douglas" => Ok(ProductionFunction::CobbDouglas),
            _ => Err(ModelError::UnsupportedTechnology(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    pub sigma: f64,
    pub beta: f64,
    pub production_function: ProductionFunction,
    pub alpha: f64,
    // CES only
    pub theta: f64,
    pub delta: f64,
    pub tau_w: f64,
    pub tau_r: f64,
    pub k_lag_ini: f64,
    pub b_lag_ini: f64,
    pub sim_t: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            beta: 1.0 / 1.40,
            production_function: ProductionFunction::Ces,
            alpha: 0.30,
            theta: 0.05,
            delta: 0.50,
            tau_w: 0.10,
            tau_r: 0.20,
            k_lag_ini: 1.0,
            b_lag_ini: 0.0,
            sim_t: 50,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(ModelError::invalid("sigma", "must be > 0"));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(ModelError::invalid("beta", "must be between 0 and 1"));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ModelError::invalid("alpha", "must be between 0 and 1"));
        }
        if !(0.0..=1.0).contains(&self.delta) {
            return Err(ModelError::invalid("delta", "must be between 0 and 1"));
        }
        if self.production_function == ProductionFunction::Ces
            && (!self.theta.is_finite() || self.theta == 0.0)
        {
            return Err(ModelError::invalid(
                "theta",
                "must be finite and non-zero for ces production",
            ));
        }
        if !(0.0..1.0).contains(&self.tau_w) {
            return Err(ModelError::invalid("tau_w", "must be in [0, 1)"));
        }
        if !(0.0..1.0).contains(&self.tau_r) {
            return Err(ModelError::invalid("tau_r", "must be in [0, 1)"));
        }
        if !self.k_lag_ini.is_finite() || self.k_lag_ini <= 0.0 {
            return Err(ModelError::invalid("k_lag_ini", "must be > 0"));
        }
        if !self.b_lag_ini.is_finite() {
            return Err(ModelError::invalid("b_lag_ini", "must be finite"));
        }
        if self.sim_t == 0 {
            return Err(ModelError::invalid("sim_t", "must be > 0"));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TerminalPeriod {
    CarryForward,
    // young consumption and capital stay NaN
    LeaveOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub edge_eps: f64,
    pub bracket_max_iterations: u32,
    pub xtol: f64,
    pub rtol: f64,
    pub max_iterations: u32,
    pub terminal_period: TerminalPeriod,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            edge_eps: 1e-8,
            bracket_max_iterations: 500,
            xtol: 2e-12,
            rtol: 4.0 * f64::EPSILON,
            max_iterations: 100,
            terminal_period: TerminalPeriod::CarryForward,
        }
    }
}

// Real-valued series start at NaN. Spending starts at zero with a balanced budget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimSeries {
    pub c1: Vec<f64>,
    pub c2: Vec<f64>,
    pub k: Vec<f64>,
    pub y: Vec<f64>,
    pub k_lag: Vec<f64>,
    pub w: Vec<f64>,
    pub rk: Vec<f64>,
    pub rb: Vec<f64>,
    pub r: Vec<f64>,
    pub rt: Vec<f64>,
    pub g: Vec<f64>,
    pub tax: Vec<f64>,
    pub b: Vec<f64>,
    pub balanced_budget: Vec<bool>,
    pub b_lag: Vec<f64>,
}

impl SimSeries {
    pub fn new(periods: usize) -> Self {
        let nan = || vec![f64::NAN; periods];
        Self {
            c1: nan(),
            c2: nan(),
            k: nan(),
            y: nan(),
            k_lag: nan(),
            w: nan(),
            rk: nan(),
            rb: nan(),
            r: nan(),
            rt: nan(),
            g: vec![0.0; periods],
            tax: nan(),
            b: nan(),
            balanced_budget: vec![true; periods],
            b_lag: nan(),
        }
    }

    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    pub fn real_series(&self) -> [(&'static str, &[f64]); 14] {
        [
            ("C1", self.c1.as_slice()),
            ("C2", self.c2.as_slice()),
            ("K", self.k.as_slice()),
            ("Y", self.y.as_slice()),
            ("K_lag", self.k_lag.as_slice()),
            ("w", self.w.as_slice()),
            ("rk", self.rk.as_slice()),
            ("rb", self.rb.as_slice()),
            ("r", self.r.as_slice()),
            ("rt", self.rt.as_slice()),
            ("G", self.g.as_slice()),
            ("T", self.tax.as_slice()),
            ("B", self.b.as_slice()),
            ("B_lag", self.b_lag.as_slice()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub elapsed: Duration,
    pub saving_rates: Vec<f64>,
    pub residual_evaluations: usize,
}
