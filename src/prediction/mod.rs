pub mod service;

pub use service::{Prediction, PredictionService};
