use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use docview_core::scroll::Intersection;
use docview_core::viewer::ViewState;
use docview_core::{DocViewer, Theme};

use super::{add_output_arg, load_nav, write_output};
use crate::config::DocviewConfig;

pub fn make_subcommand() -> Command {
    let command = Command::new("render")
        .about("Render a document to an HTML page or JSON")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Document path inside the set, e.g. guide/setup")
                .required(true),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .value_parser(["html", "json"])
                .default_value("html")
                .help("Output format"),
        )
        .arg(
            Arg::new("theme")
                .long("theme")
                .value_name("DIR")
                .help("Theme directory overriding the built-in templates"),
        )
        .arg(
            Arg::new("active")
                .long("active")
                .value_name("ID")
                .help("Heading to mark as current in the table of contents"),
        );
    add_output_arg(command)
}

pub fn execute(args: &ArgMatches, config: &DocviewConfig) -> Result<()> {
    let path = args.get_one::<String>("path").map(String::as_str).unwrap_or_default();
    let request = config.request(path)?;
    let docset = request.docset;

    let mut viewer = DocViewer::new(config.store()?, &config.core);
    viewer.load(request);

    if let Some(id) = args.get_one::<String>("active") {
        viewer.spy_mut().on_intersections(&[Intersection::enter(id.as_str())]);
    }

    let format = args.get_one::<String>("format").map(String::as_str);
    let output = match (format, viewer.state()) {
        (Some("json"), ViewState::Ready(document)) => serde_json::to_string_pretty(document)?,
        (Some("json"), _) => String::new(),
        _ => {
            let theme = match &config.cli.theme {
                Some(dir) => Theme::from_dir(dir, &config.core.render)?,
                None => Theme::builtin(&config.core.render)?,
            };
            let nav = load_nav(config)?;
            theme.render_viewer(&config.core.site, &viewer, nav.as_ref().map(|n| n.get(docset)))?
        }
    };

    if !output.is_empty() {
        write_output(args, &output)?;
    }

    match viewer.failure() {
        Some(failure) => anyhow::bail!(failure.message()),
        None => Ok(()),
    }
}
