use anyhow::Context;
use clap::Parser;
use signkit::script::Script;
use signkit::{init_logging, Config, TransactionFile};
use std::path::PathBuf;

/// Replays a placement script and writes the resulting transaction.
#[derive(Parser, Debug)]
#[command(name = "signkit")]
#[command(version = signkit::VERSION)]
#[command(about = "Place signature fields on a document and assign recipients", long_about = None)]
struct Cli {
    /// Placement script (JSON)
    script: PathBuf,

    /// Config file; defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the transaction here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!(
        "SignKit {} (built {})",
        signkit::VERSION,
        signkit::BUILD_DATE
    );

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match Config::default_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(_) => Config::default(),
        },
    };

    let script = Script::load_from_file(&args.script)?;
    let transaction = script.run(config)?;
    let file = TransactionFile::new(transaction);

    match &args.output {
        Some(path) => {
            file.save_to_file(path)?;
            tracing::info!("Wrote transaction to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&file)?),
    }

    Ok(())
}
