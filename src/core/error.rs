use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unsupported production function '{0}' (expected 'ces' or 'cobb-douglas')")]
    UnsupportedTechnology(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("cannot find bracket for s in period {period} after {iterations} iterations")]
    BracketNotFound { period: usize, iterations: u32 },

    #[error("euler error does not change sign on [{lower}, {upper}] in period {period}")]
    RootNotFound {
        period: usize,
        lower: f64,
        upper: f64,
    },

    #[error("bisection did not converge in period {period} after {iterations} iterations")]
    NotConverged { period: usize, iterations: u32 },
}

impl ModelError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ModelError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ModelError::UnsupportedTechnology(_) | ModelError::InvalidParameter { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    #[error("no sign change found after {iterations} iterations")]
    BracketNotFound { iterations: u32 },

    #[error("f({lower}) and f({upper}) must have different signs")]
    NotBracketed { lower: f64, upper: f64 },

    #[error("failed to converge after {iterations} iterations")]
    NotConverged { iterations: u32 },
}

impl SolveError {
    pub fn at_period(self, period: usize) -> ModelError {
        match self {
            SolveError::BracketNotFound { iterations } => ModelError::BracketNotFound {
                period,
                iterations,
            },
            SolveError::NotBracketed { lower, upper } => ModelError::RootNotFound {
                period,
                lower,
                upper,
            },
            SolveError::NotConverged { iterations } => ModelError::NotConverged {
                period,
                iterations,
            },
        }
    }
}
