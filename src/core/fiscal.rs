use super::types::Params;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiscalOutcome {
    pub r: f64,
    pub rb: f64,
    // after tax
    pub rt: f64,
    pub c2: f64,
    pub tax: f64,
    pub g: f64,
    pub b: f64,
}

// With a balanced budget `spending` is ignored.
pub fn settle(
    par: &Params,
    rk: f64,
    w: f64,
    k_lag: f64,
    b_lag: f64,
    balanced_budget: bool,
    spending: f64,
) -> FiscalOutcome {
    // no-arbitrage between capital and bonds
    let r = rk - par.delta;
    let rb = r;
    let rt = (1.0 - par.tau_r) * r;

    let wealth = k_lag + b_lag;
    let c2 = (1.0 + rt) * wealth;

    let tax = par.tau_r * r * wealth + par.tau_w * w;
    let g = if balanced_budget {
        tax - r * b_lag
    } else {
        spending
    };
    let b = (1.0 + r) * b_lag - tax + g;

    FiscalOutcome {
        r,
        rb,
        rt,
        c2,
        tax,
        g,
        b,
    }
}
