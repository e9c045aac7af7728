use std::time::Instant;

use tracing::{debug, info};

use super::error::ModelError;
use super::fiscal;
use super::solver::{bisect, find_bracket};
use super::types::{Params, SimSeries, SimulationReport, SolverConfig, TerminalPeriod};

#[derive(Debug, Clone)]
pub struct OlgModel {
    par: Params,
    solver: SolverConfig,
    // None balances the budget
    fiscal_path: Vec<Option<f64>>,
    sim: SimSeries,
}

impl Default for OlgModel {
    fn default() -> Self {
        let par = Params::default();
        Self {
            solver: SolverConfig::default(),
            fiscal_path: vec![None; par.sim_t],
            sim: SimSeries::new(par.sim_t),
            par,
        }
    }
}

impl OlgModel {
    pub fn new(par: Params) -> Result<Self, ModelError> {
        par.validate()?;
        debug!(
            production_function = %par.production_function,
            periods = par.sim_t,
            "initializing model"
        );
        Ok(Self {
            solver: SolverConfig::default(),
            fiscal_path: vec![None; par.sim_t],
            sim: SimSeries::new(par.sim_t),
            par,
        })
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn par(&self) -> &Params {
        &self.par
    }

    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    pub fn sim(&self) -> &SimSeries {
        &self.sim
    }

    pub fn set_exogenous_spending(&mut self, t: usize, g: f64) -> Result<(), ModelError> {
        if t >= self.par.sim_t {
            return Err(ModelError::invalid(
                "exogenous_spending",
                format!("period {t} is outside the horizon of {}", self.par.sim_t),
            ));
        }
        if !g.is_finite() {
            return Err(ModelError::invalid(
                "exogenous_spending",
                format!("spending in period {t} must be finite"),
            ));
        }
        self.fiscal_path[t] = Some(g);
        self.sim.balanced_budget[t] = false;
        self.sim.g[t] = g;
        Ok(())
    }

    fn fresh_series(&self) -> SimSeries {
        let mut sim = SimSeries::new(self.par.sim_t);
        for (t, spending) in self.fiscal_path.iter().enumerate() {
            if let Some(g) = spending {
                sim.balanced_budget[t] = false;
                sim.g[t] = *g;
            }
        }
        sim
    }

    // On failure the series keep whatever was written up to the failing period.
    pub fn simulate(&mut self) -> Result<SimulationReport, ModelError> {
        let t0 = Instant::now();
        self.sim = self.fresh_series();

        let par = &self.par;
        let solver = &self.solver;
        let sim = &mut self.sim;
        let sim_t = par.sim_t;

        sim.k_lag[0] = par.k_lag_ini;
        sim.b_lag[0] = par.b_lag_ini;

        let mut saving_rates = Vec::with_capacity(sim_t.saturating_sub(1));
        let mut residual_evaluations = 0;

        for t in 0..sim_t {
            simulate_before_s(par, sim, t);

            if t == sim_t - 1 {
                break;
            }

            let s = solve_saving_rate(par, solver, sim, t, &mut residual_evaluations)?;
            simulate_after_s(par, sim, t, s);
            saving_rates.push(s);
            debug!(period = t, s, k = sim.k[t], c1 = sim.c1[t], "period solved");
        }

        if solver.terminal_period == TerminalPeriod::CarryForward {
            if let Some(&s) = saving_rates.last() {
                simulate_after_s(par, sim, sim_t - 1, s);
            }
        }

        let elapsed = t0.elapsed();
        info!(
            periods = sim_t,
            residual_evaluations,
            "simulation done in {:.2} secs",
            elapsed.as_secs_f64()
        );

        Ok(SimulationReport {
            elapsed,
            saving_rates,
            residual_evaluations,
        })
    }
}

/// Probing the objective rewrites period `t`'s post-solve fields and period
/// `t + 1`'s pre-solve fields.
pub fn solve_saving_rate(
    par: &Params,
    solver: &SolverConfig,
    sim: &mut SimSeries,
    t: usize,
    evaluations: &mut usize,
) -> Result<f64, ModelError> {
    let bracket = find_bracket(
        |s| {
            *evaluations += 1;
            euler_error(s, par, sim, t)
        },
        solver,
    )
    .map_err(|e| e.at_period(t))?;

    let root = bisect(
        |s| {
            *evaluations += 1;
            euler_error(s, par, sim, t)
        },
        bracket,
        solver,
    )
    .map_err(|e| e.at_period(t))?;

    debug!(
        period = t,
        s_min = bracket.lower,
        s_max = bracket.upper,
        s = root.x,
        iterations = root.iterations,
        "saving rate found"
    );
    Ok(root.x)
}

/// Writes the post-solve fields of period `t` and the pre-solve fields of
/// period `t + 1`, so `t + 1 < sim.len()` is required. NaN flags a saving
/// rate that leads to an undefined economy.
pub fn euler_error(s: f64, par: &Params, sim: &mut SimSeries, t: usize) -> f64 {
    simulate_after_s(par, sim, t, s);
    simulate_before_s(par, sim, t + 1);

    let lhs = sim.c1[t].powf(-par.sigma);
    let rhs = (1.0 + sim.rt[t + 1]) * par.beta * sim.c2[t + 1].powf(-par.sigma);

    lhs - rhs
}

pub fn simulate_before_s(par: &Params, sim: &mut SimSeries, t: usize) {
    if t > 0 {
        sim.k_lag[t] = sim.k[t - 1];
        sim.b_lag[t] = sim.b[t - 1];
    }

    let k_lag = sim.k_lag[t];
    let b_lag = sim.b_lag[t];

    let market = par
        .production_function
        .factor_market(k_lag, par.alpha, par.theta);
    sim.y[t] = market.y;
    sim.rk[t] = market.rk;
    sim.w[t] = market.w;

    let fiscal = fiscal::settle(
        par,
        market.rk,
        market.w,
        k_lag,
        b_lag,
        sim.balanced_budget[t],
        sim.g[t],
    );
    sim.r[t] = fiscal.r;
    sim.rb[t] = fiscal.rb;
    sim.rt[t] = fiscal.rt;
    sim.c2[t] = fiscal.c2;
    sim.tax[t] = fiscal.tax;
    sim.g[t] = fiscal.g;
    sim.b[t] = fiscal.b;
}

pub fn simulate_after_s(par: &Params, sim: &mut SimSeries, t: usize, s: f64) {
    sim.c1[t] = (1.0 - par.tau_w) * sim.w[t] * (1.0 - s);

    let investment = sim.y[t] - sim.c1[t] - sim.c2[t] - sim.g[t];
    sim.k[t] = (1.0 - par.delta) * sim.k_lag[t] + investment;
}
