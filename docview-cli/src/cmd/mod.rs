pub mod css;
pub mod nav;
pub mod outline;
pub mod render;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use docview_core::NavTrees;

use crate::config::DocviewConfig;

pub fn add_output_arg(command: Command) -> Command {
    command.arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .value_name("FILE")
            .help("Write to FILE instead of stdout"),
    )
}

/// Print `content` or write it to `--output`.
pub fn write_output(args: &ArgMatches, content: &str) -> Result<()> {
    match args.try_get_one::<String>("output").unwrap_or(None) {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write {path}"))?;
            tracing::info!(%path, bytes = content.len(), "wrote output");
        }
        None if content.ends_with('\n') => print!("{content}"),
        None => println!("{content}"),
    }
    Ok(())
}

/// Navigation trees named by the configuration, if any.
pub fn load_nav(config: &DocviewConfig) -> Result<Option<NavTrees>> {
    let Some(path) = &config.cli.nav else {
        return Ok(None);
    };
    let trees = NavTrees::load(path).with_context(|| format!("failed to load {path}"))?;
    Ok(Some(trees))
}
