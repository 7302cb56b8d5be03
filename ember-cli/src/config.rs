use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Build settings merged from defaults, the site manifest's `[build]`
/// section, `EMBER_*` environment variables and CLI flags.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmberConfig {
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Site root holding the manifest, metadata and content sources
    pub source: String,
    /// Output directory for the generated site
    pub output: String,
    /// Theme directory
    pub theme: String,
    /// Site manifest path
    pub manifest: String,
    /// Host for the dev server
    pub host: String,
    /// Port for the dev server
    pub port: u16,
    /// Open the browser automatically
    pub open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            output: "./out".to_string(),
            theme: "./theme".to_string(),
            manifest: "./ember.toml".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

impl Default for EmberConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
        }
    }
}

impl EmberConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (EMBER_*)
    /// 3. The manifest's [build] section
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let manifest_file = args
            .get_one::<String>("manifest")
            .cloned()
            .unwrap_or_else(|| "./ember.toml".to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add the manifest if it exists
        if Path::new(&manifest_file).exists() {
            builder = builder.add_source(File::with_name(&manifest_file.replace(".toml", "")));
        }

        // 3. Add environment variables with EMBER_ prefix
        builder = builder.add_source(
            Environment::with_prefix("EMBER")
                .prefix_separator("_")
                .separator("__"), // Double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = std::collections::HashMap::new();

        if let Some(source) = args.get_one::<String>("source") {
            cli_overrides.insert("build.source".to_string(), source.clone());
        }
        if let Some(output) = args.get_one::<String>("output") {
            cli_overrides.insert("build.output".to_string(), output.clone());
        }
        if let Some(theme) = args.get_one::<String>("theme") {
            cli_overrides.insert("build.theme".to_string(), theme.clone());
        }
        if let Some(manifest) = args.get_one::<String>("manifest") {
            cli_overrides.insert("build.manifest".to_string(), manifest.clone());
        }
        // Serve-only flags; absent on the build subcommand
        if let Some(host) = args.try_get_one::<String>("host").unwrap_or(None) {
            cli_overrides.insert("build.host".to_string(), host.clone());
        }
        if let Some(port) = args.try_get_one::<String>("port").unwrap_or(None) {
            if let Ok(port_num) = port.parse::<u16>() {
                cli_overrides.insert("build.port".to_string(), port_num.to_string());
            }
        }
        if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("build.open".to_string(), "true".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        let config = builder.build()?;
        let ember_config: EmberConfig = config.try_deserialize()?;

        Ok(ember_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn app() -> Command {
        Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("theme").long("theme").value_name("DIR"))
            .arg(Arg::new("manifest").long("manifest").value_name("FILE"))
    }

    #[test]
    fn defaults() {
        let matches = app().try_get_matches_from(vec!["test"]).unwrap();
        let config = EmberConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, ".");
        assert_eq!(config.build.output, "./out");
        assert_eq!(config.build.theme, "./theme");
        assert_eq!(config.build.port, 3000);
        assert!(!config.build.open);
    }

    #[test]
    fn cli_args_override_defaults() {
        let matches = app()
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/source",
                "--output",
                "/custom/output",
            ])
            .unwrap();

        let config = EmberConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "/custom/source");
        assert_eq!(config.build.output, "/custom/output");
        // Non-overridden values keep their defaults
        assert_eq!(config.build.theme, "./theme");
    }
}
