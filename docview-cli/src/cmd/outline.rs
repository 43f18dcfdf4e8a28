use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use docview_core::{DocViewer, Outline};

use super::{add_output_arg, write_output};
use crate::config::DocviewConfig;

pub fn make_subcommand() -> Command {
    let command = Command::new("outline")
        .about("Print the heading outline of a document")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Document path inside the set")
                .required(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the outline as JSON"),
        );
    add_output_arg(command)
}

/// One heading per line, indented by level, with its anchor.
pub fn format_outline(outline: &Outline) -> String {
    let mut out = String::new();
    for item in outline.items() {
        let indent = "  ".repeat(usize::from(item.level.saturating_sub(1)));
        out.push_str(&format!("{indent}{} #{}\n", item.text, item.id));
    }
    out
}

pub fn execute(args: &ArgMatches, config: &DocviewConfig) -> Result<()> {
    let path = args.get_one::<String>("path").map(String::as_str).unwrap_or_default();
    let request = config.request(path)?;

    let mut viewer = DocViewer::new(config.store()?, &config.core);
    viewer.load(request);
    if let Some(failure) = viewer.failure() {
        anyhow::bail!(failure.message());
    }

    let outline = viewer.outline().cloned().unwrap_or_default();
    let output = if args.get_flag("json") {
        serde_json::to_string_pretty(&outline)?
    } else if outline.is_empty() {
        tracing::info!("document has no headings");
        return Ok(());
    } else {
        format_outline(&outline)
    };

    write_output(args, &output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docview_core::MarkdownRenderer;

    #[test]
    fn test_format_outline() {
        let outline = MarkdownRenderer::new()
            .render("# Intro\n\n## Setup\n\n### Linux\n\n## Setup\n")
            .outline;
        assert_eq!(
            format_outline(&outline),
            "Intro #intro\n  Setup #setup\n    Linux #linux\n  Setup #setup-3\n"
        );
    }
}
