pub mod settings;

pub use settings::{AppConfig, DatasetSettings, Hyperparameters, PathSettings, ServingSettings};
