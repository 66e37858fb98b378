pub mod cross_validation;
pub mod sgd;
pub mod types;

pub use cross_validation::{CrossValidationReport, MetricSummary, cross_validate};
pub use sgd::fit;
pub use types::{Estimate, FactorModel};
