use anyhow::Result;

use library_recommender::cli::Command;
use library_recommender::{
    handle_cross_validate, handle_init_db, handle_recommend, handle_serve, handle_train, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port, strict } => handle_serve(*port, *strict),
        Command::InitDb => handle_init_db(),
        Command::Train {
            hyperparameters,
            skip_cv,
        } => handle_train(hyperparameters, *skip_cv),
        Command::CrossValidate {
            hyperparameters,
            folds,
        } => handle_cross_validate(hyperparameters, *folds),
        Command::Recommend {
            user_id,
            top_n,
            include_borrowed,
        } => handle_recommend(*user_id, *top_n, *include_borrowed),
    }
}
