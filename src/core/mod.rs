mod engine;
mod error;
mod fiscal;
mod production;
mod solver;
mod types;

pub use engine::{
    OlgModel, euler_error, simulate_after_s, simulate_before_s, solve_saving_rate,
};
pub use error::{ModelError, SolveError};
pub use fiscal::{FiscalOutcome, settle};
pub use production::FactorMarket;
pub use solver::{Bracket, Root, bisect, find_bracket};
pub use types::{
    Params, ProductionFunction, SimSeries, SimulationReport, SolverConfig, TerminalPeriod,
};
