pub mod metrics;

pub use metrics::{BiasLevel, EvaluationReport, RmseAssessment, accuracy_within, evaluate};
