mod cmd;
mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

use crate::config::DocviewConfig;

fn cli() -> Command {
    Command::new("docview")
        .about("Render Markdown documentation, outlines and navigation")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./docview.toml]")
                .global(true),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .value_name("SET")
                .value_parser(["public", "internal"])
                .help("Document set to read from [default: public]")
                .global(true),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Directory holding the documents")
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Fetch documents from this host instead of --root")
                .global(true),
        )
        .arg(
            Arg::new("nav")
                .long("nav")
                .value_name("FILE")
                .help("Navigation tree JSON")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr")
                .global(true),
        )
        .subcommand(cmd::render::make_subcommand())
        .subcommand(cmd::outline::make_subcommand())
        .subcommand(cmd::nav::make_subcommand())
        .subcommand(cmd::css::make_subcommand())
}

fn init_tracing(level: &str, verbose: bool) {
    // --verbose wins, then RUST_LOG, then the configured level
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let Some((name, args)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };

    let config = DocviewConfig::load(args)?;
    init_tracing(&config.core.log.level, args.get_flag("verbose"));

    match name {
        "render" => cmd::render::execute(args, &config),
        "outline" => cmd::outline::execute(args, &config),
        "nav" => cmd::nav::execute(args, &config),
        "css" => cmd::css::execute(args, &config),
        _ => unreachable!("unknown subcommand {name}"),
    }
}
