use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

use ember_core::{SiteBuilder, SiteConfig};

use crate::config::EmberConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Site root holding the manifest and content sources [default: .]"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site [default: ./out]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory [default: ./theme]"),
        )
        .arg(
            Arg::new("manifest")
                .short('m')
                .long("manifest")
                .value_name("FILE")
                .help("Site manifest [default: ./ember.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Build the static site from its sources")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = EmberConfig::load(args)?;
    let site = run(&config)?;

    println!(
        "Built {} pages ({} posts) in {}",
        site.page_urls().len(),
        site.graph().posts().len(),
        site.output_dir().display()
    );

    Ok(())
}

/// One full build pass, shared with the serve command.
pub fn run(config: &EmberConfig) -> Result<ember_core::Site> {
    let build = &config.build;

    let manifest_path = Path::new(&build.manifest);
    let site_config = if manifest_path.exists() {
        SiteConfig::read(manifest_path)?
    } else {
        SiteConfig::default()
    };

    let site = SiteBuilder::new()
        .source_dir(&build.source)
        .output_dir(&build.output)
        .theme_dir(&build.theme)
        .site_config(site_config)
        .build()?;
    site.render_all()?;

    Ok(site)
}
