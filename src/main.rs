use mnist_mlp::config::{Config, Variant};
use mnist_mlp::layers::{Activation, OutputLayer};
use mnist_mlp::mnist_dataset::load_mnist;
use mnist_mlp::model::Mlp;
use mnist_mlp::optim::BiasUpdate;
use mnist_mlp::report::{CostCsv, ProgressObserver};
use mnist_mlp::train::{evaluate, Trainer};
use mnist_mlp::{run, Result};

use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network, then evaluate it on the test split
    Train {
        /// JSON config file; flags below override its values
        #[arg(long)]
        config: Option<String>,
        /// Preset used when no config file is given
        #[arg(long, value_enum, default_value_t = Variant::ReluSoftmax)]
        variant: Variant,
        #[arg(long)]
        nb_epochs: Option<usize>,
        #[arg(long)]
        learning_rate: Option<f32>,
        #[arg(long, value_enum)]
        activation: Option<Activation>,
        #[arg(long, value_enum)]
        output: Option<OutputLayer>,
        #[arg(long, value_enum)]
        bias_update: Option<BiasUpdate>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "data/")]
        data_dir: String,
        #[arg(long, default_value = "weights/")]
        weights_folder: String,
        #[arg(long, default_value = "checkpoints/final.json")]
        checkpoint: String,
        #[arg(long, default_value = "cost.csv")]
        cost_csv_path: String,
    },
    /// Evaluate a checkpoint on the test split
    Eval {
        #[arg(long)]
        checkpoint: String,
        #[arg(long, default_value = "data/")]
        data_dir: String,
    },
    /// Run inference on a file
    Run {
        #[arg(long)]
        checkpoint: String,
        #[arg(long)]
        image_path: String,
    },
}

struct TrainArgs {
    config: Config,
    data_dir: String,
    weights_folder: String,
    checkpoint: String,
    cost_csv_path: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Train {
            config,
            variant,
            nb_epochs,
            learning_rate,
            activation,
            output,
            bias_update,
            seed,
            data_dir,
            weights_folder,
            checkpoint,
            cost_csv_path,
        } => load_config(config.as_deref(), variant).and_then(|mut config| {
            if let Some(nb_epochs) = nb_epochs {
                config.training.epochs = nb_epochs;
            }
            if let Some(learning_rate) = learning_rate {
                config.training.learning_rate = learning_rate;
            }
            if let Some(activation) = activation {
                config.network.activation = activation;
            }
            if let Some(output) = output {
                config.network.output = output;
            }
            if let Some(bias_update) = bias_update {
                config.training.bias_update = bias_update;
            }
            if seed.is_some() {
                config.network.seed = seed;
            }
            train(TrainArgs {
                config,
                data_dir,
                weights_folder,
                checkpoint,
                cost_csv_path,
            })
        }),
        Commands::Eval {
            checkpoint,
            data_dir,
        } => eval(&checkpoint, &data_dir),
        Commands::Run {
            checkpoint,
            image_path,
        } => run::run(&checkpoint, &image_path).map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&str>, variant: Variant) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading config from: {}", path);
            Config::from_file(path)
        }
        None => Ok(Config::preset(variant)),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let TrainArgs {
        config,
        data_dir,
        weights_folder,
        checkpoint,
        cost_csv_path,
    } = args;
    // fail on a bad config before loading 70k images
    config.validate()?;
    info!("{:?}", config);

    let (train_dataset, test_dataset) = load_mnist(&data_dir)?;
    let mut nn = Mlp::new(&config.network)?;
    let trainer = Trainer::new(&config.training)?;

    let mut observers = (
        ProgressObserver::new(config.training.epochs, train_dataset.len()),
        CostCsv::create(&cost_csv_path)?,
    );
    let report = trainer.fit(&mut nn, &train_dataset, config.training.epochs, &mut observers)?;
    drop(observers);
    info!(
        "Trained on {} examples, cost samples written to {}",
        report.examples_seen, cost_csv_path
    );

    let evaluation = evaluate(&nn, &test_dataset)?;
    println!("Accuracy: {}", evaluation.accuracy);

    for path in nn.save_weights(&weights_folder)? {
        info!("Saved {}", path);
    }
    if let Some(parent) = Path::new(&checkpoint).parent() {
        fs::create_dir_all(parent)?;
    }
    nn.to_checkpoint(&checkpoint)?;
    info!("Saved checkpoint to {}", checkpoint);
    Ok(())
}

fn eval(checkpoint: &str, data_dir: &str) -> Result<()> {
    let nn = Mlp::from_checkpoint(checkpoint)?;
    let (_, test_dataset) = load_mnist(data_dir)?;
    let evaluation = evaluate(&nn, &test_dataset)?;
    println!("Accuracy: {}", evaluation.accuracy);
    Ok(())
}
