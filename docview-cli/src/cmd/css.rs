use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use docview_core::postprocess::{highlight_stylesheet, theme_names};

use super::{add_output_arg, write_output};
use crate::config::DocviewConfig;

pub fn make_subcommand() -> Command {
    let command = Command::new("css")
        .about("Print the stylesheet for highlighted code")
        .arg(
            Arg::new("list")
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List the available highlight themes"),
        );
    add_output_arg(command)
}

pub fn execute(args: &ArgMatches, config: &DocviewConfig) -> Result<()> {
    if args.get_flag("list") {
        let mut names: Vec<_> = theme_names().collect();
        names.sort_unstable();
        return write_output(args, &names.join("\n"));
    }

    let render = &config.core.render;
    let css = highlight_stylesheet(&render.light_theme, &render.dark_theme, &render.dark_scope);
    write_output(args, &css)
}
