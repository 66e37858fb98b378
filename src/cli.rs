use clap::{Args, Parser, Subcommand};

use crate::config::settings::Hyperparameters;

#[derive(Parser, Debug)]
#[command(author, version, about = "library book recommender")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the recommendation server (requires a trained model)
    Serve {
        /// Port number (optional, defaults to 5001)
        #[arg(short, long, default_value_t = 5001)]
        port: u16,
        /// Reject users without any ratings instead of falling back to averages
        #[arg(long)]
        strict: bool,
    },
    /// Create the rating store tables if they do not exist
    InitDb,
    /// Fit a model on all ratings in the store, evaluate it and save it
    Train {
        #[command(flatten)]
        hyperparameters: HyperparameterArgs,
        /// Skip the k-fold cross-validation run
        #[arg(long)]
        skip_cv: bool,
    },
    /// Run k-fold cross-validation without saving a model
    CrossValidate {
        #[command(flatten)]
        hyperparameters: HyperparameterArgs,
        /// Number of folds
        #[arg(short, long, default_value_t = 5)]
        folds: usize,
    },
    /// Print recommendations for one user using the saved model
    Recommend {
        #[arg(short, long)]
        user_id: i64,
        #[arg(short = 'n', long, default_value_t = 10)]
        top_n: usize,
        /// Also consider books the user already rated or borrowed
        #[arg(long)]
        include_borrowed: bool,
    },
}

/// Optional overrides of the default training hyperparameters.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct HyperparameterArgs {
    /// Number of latent factors
    #[arg(long)]
    pub factors: Option<usize>,
    #[arg(long)]
    pub epochs: Option<usize>,
    #[arg(long)]
    pub learning_rate: Option<f64>,
    #[arg(long)]
    pub regularization: Option<f64>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl HyperparameterArgs {
    pub fn apply(&self, base: Hyperparameters) -> Hyperparameters {
        Hyperparameters {
            factors: self.factors.unwrap_or(base.factors),
            epochs: self.epochs.unwrap_or(base.epochs),
            learning_rate: self.learning_rate.unwrap_or(base.learning_rate),
            regularization: self.regularization.unwrap_or(base.regularization),
            random_seed: self.seed.unwrap_or(base.random_seed),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = Cli::parse_from(["library_recommender", "train", "--factors", "20", "--skip-cv"]);
        let Command::Train {
            hyperparameters,
            skip_cv,
        } = cli.command
        else {
            panic!("expected train command");
        };

        assert!(skip_cv);
        let params = hyperparameters.apply(Hyperparameters::default());
        assert_eq!(params.factors, 20);
        assert_eq!(params.epochs, Hyperparameters::default().epochs);
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::parse_from(["library_recommender", "serve"]);
        assert_eq!(
            cli.command,
            Command::Serve {
                port: 5001,
                strict: false
            }
        );
    }
}
