//! Load command implementation

use anyhow::{Context, Result};
use clap::Args;
use config_provider::{ConfigLoader, MemoryContainer};
use std::path::PathBuf;

use super::utils::parse_replacement;

#[derive(Args)]
pub struct LoadArgs {
    /// Config file to load (.json, .yml, .yaml, .toml, .php, optionally with .dist)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Store the whole config under this single key
    #[arg(short, long, value_name = "KEY")]
    pub prefix: Option<String>,

    /// Placeholder replacement, e.g. `-r root=/var/www` replaces %root% (repeatable)
    #[arg(short = 'r', long = "replace", value_name = "NAME=VALUE", value_parser = parse_replacement)]
    pub replacements: Vec<(String, String)>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: LoadArgs) -> Result<()> {
    let mut loader = ConfigLoader::new(&args.file).replacements(args.replacements);
    if let Some(prefix) = args.prefix {
        loader = loader.prefix(prefix);
    }

    let mut container = MemoryContainer::new();
    loader
        .register(&mut container)
        .with_context(|| format!("Failed to load config file {}", args.file.display()))?;
    tracing::debug!("Container holds {} entries", container.len());

    let tree = container.into_tree();
    let rendered =
        if args.compact { serde_json::to_string(&tree)? } else { serde_json::to_string_pretty(&tree)? };
    println!("{rendered}");
    Ok(())
}
