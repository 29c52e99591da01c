//! Format command implementation

use anyhow::Result;
use clap::Args;
use config_provider::DriverChain;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct FormatArgs {
    /// Files to classify (they do not need to exist)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print a JSON array instead of one line per file
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FormatRecord {
    file: String,
    format: Option<&'static str>,
}

pub fn run(args: FormatArgs) -> Result<()> {
    let chain = DriverChain::default();
    let records: Vec<FormatRecord> = args
        .files
        .iter()
        .map(|file| FormatRecord { file: file.display().to_string(), format: chain.format_of(file) })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}: {}", record.file, record.format.unwrap_or("unsupported"));
        }
    }
    Ok(())
}
