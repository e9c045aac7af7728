use super::types::ProductionFunction;

const LABOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorMarket {
    pub y: f64,
    // before depreciation
    pub rk: f64,
    pub w: f64,
}

impl ProductionFunction {
    pub fn factor_market(self, k_lag: f64, alpha: f64, theta: f64) -> FactorMarket {
        match self {
            ProductionFunction::Ces => ces(k_lag, alpha, theta),
            ProductionFunction::CobbDouglas => cobb_douglas(k_lag, alpha),
        }
    }
}

fn ces(k_lag: f64, alpha: f64, theta: f64) -> FactorMarket {
    let y = (alpha * k_lag.powf(-theta) + (1.0 - alpha) * LABOR.powf(-theta)).powf(-1.0 / theta);
    let rk = alpha * k_lag.powf(-theta - 1.0) * y.powf(1.0 + theta);
    let w = (1.0 - alpha) * LABOR.powf(-theta - 1.0) * y.powf(1.0 + theta);
    FactorMarket { y, rk, w }
}

fn cobb_douglas(k_lag: f64, alpha: f64) -> FactorMarket {
    let y = k_lag.powf(alpha) * LABOR.powf(1.0 - alpha);
    let rk = alpha * k_lag.powf(alpha - 1.0) * LABOR.powf(1.0 - alpha);
    let w = (1.0 - alpha) * k_lag.powf(alpha) * LABOR.powf(-alpha);
    FactorMarket { y, rk, w }
}
