use clap::Parser;
use etl_pipeline::constants::{DEFAULT_CONFIG_PATH, DEFAULT_SOURCE};
use etl_pipeline::Pipeline;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "etl_pipeline")]
#[command(about = "Fetch a CSV source, clean it, and write Parquet and CSV outputs")]
#[command(version)]
struct Cli {
    /// Configured data source to run
    #[arg(default_value = DEFAULT_SOURCE)]
    source: String,

    /// Pipeline configuration file (YAML, or TOML by extension)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let pipeline = Pipeline::new(&cli.config)?;
    let result = pipeline.run(&cli.source)?;

    println!("Pipeline completed! Processed {} rows", result.height());
    Ok(())
}
