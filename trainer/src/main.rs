use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use trainer::configs::{Adapter, Config};

#[derive(Parser)]
#[command(about = "Trains and runs a two layer digit classifier")]
struct Cli {
    /// The json configuration file
    #[arg(short, long, value_name = "PATH", default_value = "config.json")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trains the network and stores its parameters
    Train,
    /// Reports the accuracy of the stored parameters
    Evaluate {
        /// Use every sample of the dataset instead of only the holdout ones
        #[arg(long)]
        all: bool,
    },
    /// Classifies a feature row or a drawn digit
    Predict {
        /// A file holding a single row of features, or a grid of grayscale pixels
        #[arg(value_name = "PATH")]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("failed to read config {}", cli.config.display()))?;

    match cli.command {
        Command::Train => {
            let (_, report) = trainer::train(&config)?;

            if let Some(loss) = report.trace.epoch_means().last() {
                println!("final epoch loss: {loss:.6}");
            }
            match report.holdout_accuracy {
                Some(accuracy) => println!(
                    "holdout accuracy: {accuracy:.4} ({} samples)",
                    report.holdout_samples
                ),
                None => println!("no samples held out"),
            }
            println!("parameters saved to {}", config.output_dir.display());
        }
        Command::Evaluate { all } => {
            let accuracy = trainer::evaluate(&config, all)?;
            println!("accuracy: {accuracy:.4}");
        }
        Command::Predict { input } => {
            let dims = Adapter::new().adapt_model(&config.model)?;
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read input {}", input.display()))?;

            let features = trainer::read_input(&text, dims)?;
            let prediction = trainer::predict(&config, features.view())?;
            info!("predicted class {}", prediction.class);

            for (class, p) in prediction.probabilities.iter().enumerate() {
                println!("{class}: {p:.4}");
            }
            println!("prediction: {}", prediction.class);
        }
    }

    Ok(())
}
