use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use rarity_io::{CollectionName, CreatureGenerator, CsvStore, RecordStore, render_chart, seed_store};
use rarity_machine::{FEATURE_COLUMNS, Machine, MachineConfig};

#[derive(Parser)]
#[command(name = "rarity")]
#[command(about = "Creature rarity classification with a rebalanced kernel SVM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Location of the record store.
#[derive(Args, Debug, Clone)]
struct StoreArgs {
    /// Directory holding collection files
    #[arg(long, default_value = "data")]
    store_dir: PathBuf,

    /// Collection name (must match [a-zA-Z0-9_-]+)
    #[arg(long, default_value = "monsters")]
    collection: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChartFormat {
    Json,
    Html,
}

#[derive(Subcommand)]
enum Command {
    /// Insert freshly generated creatures into the store
    Seed {
        #[command(flatten)]
        store: StoreArgs,

        /// Number of creatures to generate
        #[arg(long, default_value_t = 1000)]
        amount: usize,
    },

    /// Delete every creature in the store
    Reset {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Count the creatures in the store
    Count {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Render the store as an HTML table
    Table {
        #[command(flatten)]
        store: StoreArgs,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Render a scatter chart of two columns colored by a third
    Chart {
        #[command(flatten)]
        store: StoreArgs,

        /// Column on the x axis
        #[arg(long, default_value = "Health")]
        x: String,

        /// Column on the y axis
        #[arg(long, default_value = "Energy")]
        y: String,

        /// Column used for color
        #[arg(long, default_value = "Rarity")]
        target: String,

        /// Output document format
        #[arg(long, value_enum, default_value_t = ChartFormat::Html)]
        format: ChartFormat,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fit a machine on the store and save it
    Train {
        #[command(flatten)]
        store: StoreArgs,

        /// Path of the saved model
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,
    },

    /// Predict the rarity of one creature with a saved model
    Predict {
        /// Path to the saved model
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,

        #[arg(long)]
        level: f64,

        #[arg(long)]
        health: f64,

        #[arg(long)]
        energy: f64,

        #[arg(long)]
        sanity: f64,
    },

    /// Describe a saved model
    Info {
        /// Path to the saved model
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,

        /// Join lines with <br> for embedding in a page
        #[arg(long, default_value_t = false)]
        html: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SeedOutput {
    collection: String,
    inserted: usize,
    acknowledged: bool,
    total: usize,
}

#[derive(Serialize)]
struct ResetOutput {
    collection: String,
    acknowledged: bool,
    total: usize,
}

#[derive(Serialize)]
struct CountOutput {
    collection: String,
    count: usize,
}

#[derive(Serialize)]
struct TrainOutput {
    model: PathBuf,
    n_records: usize,
    classes: Vec<String>,
    class_counts: BTreeMap<String, usize>,
    n_balanced_per_class: usize,
    n_support: usize,
    timestamp: String,
}

#[derive(Serialize)]
struct InfoOutput {
    name: String,
    timestamp: String,
    classes: Vec<String>,
    feature_names: Vec<String>,
    description: String,
}

fn open_store(args: &StoreArgs) -> Result<CsvStore> {
    let collection = CollectionName::new(args.collection.clone())?;
    CsvStore::open(&args.store_dir, &collection).context("failed to open record store")
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Seed { store, amount } => {
            let mut handle = open_store(&store)?;
            let mut generator = CreatureGenerator::new(cli.seed);
            let acknowledged =
                seed_store(&mut handle, &mut generator, amount).context("seeding failed")?;

            let output = SeedOutput {
                collection: store.collection,
                inserted: amount,
                acknowledged,
                total: handle.count()?,
            };
            handle.close()?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Reset { store } => {
            let mut handle = open_store(&store)?;
            let acknowledged = handle.delete_all().context("reset failed")?;

            let output = ResetOutput {
                collection: store.collection,
                acknowledged,
                total: handle.count()?,
            };
            handle.close()?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Count { store } => {
            let handle = open_store(&store)?;
            let output = CountOutput {
                count: handle.count()?,
                collection: store.collection,
            };
            handle.close()?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Table { store, output } => {
            let handle = open_store(&store)?;
            let table = handle.fetch_all()?;
            handle.close()?;
            emit(&table.to_html(), output.as_deref())?;
        }

        Command::Chart {
            store,
            x,
            y,
            target,
            format,
            output,
        } => {
            let handle = open_store(&store)?;
            let table = handle.fetch_all()?;
            handle.close()?;

            let chart = render_chart(&table, &x, &y, &target).context("chart rendering failed")?;
            let text = match format {
                ChartFormat::Json => chart.to_json(),
                ChartFormat::Html => chart.to_html(),
            };
            emit(&text, output.as_deref())?;
        }

        Command::Train { store, model } => {
            // 1. Fetch the training table
            let handle = open_store(&store)?;
            let table = handle.fetch_all()?;
            handle.close()?;
            info!(n_records = table.n_rows(), "training table fetched");

            // 2. Fit
            let config = MachineConfig::new().with_seed(cli.seed);
            let machine =
                Machine::with_config(&table, &config).context("model training failed")?;

            // 3. Save
            machine.save(&model).context("failed to save model")?;

            // 4. Print summary
            let plan = machine.oversampling().plan();
            let class_counts = machine
                .classes()
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), plan.before().get(&i).copied().unwrap_or(0)))
                .collect();
            let output = TrainOutput {
                model,
                n_records: table.n_rows(),
                classes: machine.classes().to_vec(),
                class_counts,
                n_balanced_per_class: machine
                    .undersampling()
                    .plan()
                    .after()
                    .values()
                    .copied()
                    .next()
                    .unwrap_or(0),
                n_support: machine.classifier().n_support(),
                timestamp: machine.timestamp().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            level,
            health,
            energy,
            sanity,
        } => {
            let machine = Machine::open(&model).context("failed to load model")?;
            let features = rarity_io::Table::from_numeric_row(
                &FEATURE_COLUMNS,
                &[level, health, energy, sanity],
            )?;
            let prediction = machine.predict(&features).context("prediction failed")?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }

        Command::Info { model, html } => {
            let machine = Machine::open(&model).context("failed to load model")?;
            let description = if html {
                machine.describe_html()
            } else {
                machine.describe()
            };
            let output = InfoOutput {
                name: machine.name().to_string(),
                timestamp: machine.timestamp().to_string(),
                classes: machine.classes().to_vec(),
                feature_names: machine.feature_names().to_vec(),
                description,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
