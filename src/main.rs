//! config-provider: inspect how a config file loads into a container

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
