use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use docview_core::nav::{NavRow, RowKind};
use docview_core::search::{NavSearch, SearchBox};

use super::{add_output_arg, load_nav, write_output};
use crate::config::DocviewConfig;

pub fn make_subcommand() -> Command {
    let command = Command::new("nav")
        .about("Print the navigation tree with the current page marked")
        .arg(
            Arg::new("current")
                .long("current")
                .value_name("URL")
                .help("Current route, e.g. /public/guide/setup"),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("TERM")
                .help("List pages matching TERM instead of the tree"),
        );
    add_output_arg(command)
}

pub fn format_rows(rows: &[NavRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let indent = "  ".repeat(row.depth);
        let line = match row.kind {
            RowKind::Section => format!("{indent}+ {}\n", row.label),
            RowKind::Page => {
                let marker = if row.active { "*" } else { "-" };
                let path = row.path.as_deref().unwrap_or_default();
                format!("{indent}{marker} {} ({path})\n", row.label)
            }
        };
        out.push_str(&line);
    }
    out
}

pub fn execute(args: &ArgMatches, config: &DocviewConfig) -> Result<()> {
    let trees = load_nav(config)?.context("no navigation tree given, pass --nav FILE")?;
    let tree = trees.get(config.docset()?);

    if let Some(term) = args.get_one::<String>("search") {
        let mut search = SearchBox::new(NavSearch::new(tree));
        search.input(term);
        let output: String = search
            .results()
            .iter()
            .map(|hit| format!("{} ({})\n", hit.title, hit.path))
            .collect();
        return write_output(args, &output);
    }

    let current = args.get_one::<String>("current").map(String::as_str).unwrap_or_default();
    let mut output = format_rows(&tree.rows(current));
    if let Some(first) = tree.first_page() {
        output.push_str(&format!("\nfirst page: {first}\n"));
    }
    write_output(args, &output)
}
