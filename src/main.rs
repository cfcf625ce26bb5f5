//! Tabular Pipeline - Main Entry Point

use clap::Parser;
use tabular_pipeline::cli::{
    cmd_algorithms, cmd_columns, cmd_generate, cmd_learning_curve, Cli, Commands, GenerateArgs,
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabular_pipeline=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            data,
            target,
            algorithm,
            test_size,
            seed,
            artifacts,
            no_learning_curve,
            config,
            output,
        } => {
            let args = GenerateArgs {
                data,
                target,
                algorithm,
                test_size,
                seed,
                artifacts,
                no_learning_curve,
                config,
                output,
            };
            cmd_generate(&args)?;
        }
        Commands::LearningCurve { artifacts, id, output } => {
            cmd_learning_curve(&artifacts, &id, &output)?;
        }
        Commands::Columns { data } => {
            cmd_columns(&data)?;
        }
        Commands::Algorithms => {
            cmd_algorithms()?;
        }
    }

    Ok(())
}
